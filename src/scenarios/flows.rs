use tracing::info;

use crate::error::{HarnessError, ensure};
use crate::lifecycle::unit::TestUnit;
use crate::pages::cart::CartPage;
use crate::pages::checkout::{CheckoutCompletePage, CheckoutPage, CustomerInfo};
use crate::pages::inventory::InventoryPage;
use crate::pages::login::LoginPage;

/// Inputs that must be rejected without leaking backend details, keyed by
/// the suffix of their scenario name.
pub const INJECTION_INPUTS: &[(&str, &str)] = &[
    ("script_tag", "<script>alert('xss')</script>"),
    ("drop_table", "'; DROP TABLE users; --"),
    ("always_true", "' OR '1'='1"),
    ("dash_comment", "admin' --"),
    ("hash_comment", "admin' #"),
    ("block_comment", "admin'/*"),
    ("union_select", "' UNION SELECT * FROM users; --"),
];

pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Banner fragment shown for unknown username/password pairs.
const CREDENTIALS_MISMATCH: &str = "do not match";

fn login_as_valid_user(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let valid = unit.env().valid.clone();
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.login(&valid.username, &valid.password)?;
    ensure(login.is_logged_in()?, "Login should redirect to inventory page")
}

fn error_banner(login: &mut LoginPage<'_>) -> Result<String, HarnessError> {
    let message = login.error_message()?.unwrap_or_default();
    ensure(!message.is_empty(), "Error message should be displayed")?;
    Ok(message)
}

/// Submit `username`/`password` and expect the unknown-credentials banner.
fn expect_mismatch(
    login: &mut LoginPage<'_>,
    username: &str,
    password: &str,
    what: &str,
) -> Result<(), HarnessError> {
    login.login(username, password)?;
    let message = error_banner(login)?;
    ensure(
        message.contains(CREDENTIALS_MISMATCH),
        format!("{} should be rejected as unknown credentials, got '{}'", what, message),
    )
}

// ============================================================================
// Login
// ============================================================================

pub fn login_valid(unit: &mut TestUnit) -> Result<(), HarnessError> {
    login_as_valid_user(unit)?;
    let url = unit.page().current_url()?;
    ensure(
        url.contains("/inventory.html"),
        format!("URL should contain inventory.html after login, got {}", url),
    )
}

pub fn login_invalid(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let invalid = unit.env().invalid.clone();
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.login(&invalid.username, &invalid.password)?;

    ensure(
        !login.is_logged_in()?,
        "Login should fail with invalid credentials",
    )?;
    let message = error_banner(&mut login)?;
    ensure(
        message.contains("Epic sadface"),
        "Error message should contain 'Epic sadface'",
    )?;
    ensure(
        message.contains("Username and password do not match"),
        "Error message should mention username and password not matching",
    )
}

pub fn login_locked_out(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let password = unit
        .env()
        .credentials
        .password_for("locked_out_user")?
        .to_string();
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.login("locked_out_user", &password)?;

    let message = error_banner(&mut login)?;
    ensure(
        message.contains("locked out"),
        "Locked out user should not be able to login",
    )
}

pub fn login_empty_credentials(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.login("", "")?;

    let message = error_banner(&mut login)?;
    ensure(
        message.contains("required"),
        "Empty credentials should be rejected",
    )
}

pub fn login_injection(unit: &mut TestUnit, input: &str) -> Result<(), HarnessError> {
    info!("Trying malicious input: {}", input);
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.login(input, input)?;

    let message = error_banner(&mut login)?.to_lowercase();
    ensure(
        !message.contains("sql"),
        "Error message should not expose SQL details",
    )?;
    ensure(
        !message.contains("syntax"),
        "Error message should not expose syntax details",
    )
}

pub fn login_long_input(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let long_input = "a".repeat(1000);
    let mut login = LoginPage::new(unit);
    login.open()?;
    expect_mismatch(&mut login, &long_input, &long_input, "Long input")
}

pub fn login_special_characters(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let mut login = LoginPage::new(unit);
    login.open()?;
    expect_mismatch(
        &mut login,
        SPECIAL_CHARACTERS,
        SPECIAL_CHARACTERS,
        "Special characters",
    )
}

/// Five bad logins must not lock the valid user out.
pub fn login_repeated_failures(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let invalid = unit.env().invalid.clone();
    let valid = unit.env().valid.clone();
    let mut login = LoginPage::new(unit);
    login.open()?;

    for attempt in 1..=5 {
        expect_mismatch(
            &mut login,
            &invalid.username,
            &invalid.password,
            &format!("Failed attempt {}", attempt),
        )?;
    }

    login.login(&valid.username, &valid.password)?;
    ensure(
        login.is_logged_in()?,
        "Valid user should still be able to login after multiple failed attempts",
    )
}

pub fn password_masking(unit: &mut TestUnit) -> Result<(), HarnessError> {
    let valid = unit.env().valid.clone();
    let mut login = LoginPage::new(unit);
    login.open()?;
    login.fill_username(&valid.username)?;
    login.fill_password(&valid.password)?;

    let field_type = login.password_field_type()?;
    ensure(
        field_type.as_deref() == Some("password"),
        format!("Password field should be of type 'password', got {:?}", field_type),
    )
}

pub fn session_cleared_cookies(unit: &mut TestUnit) -> Result<(), HarnessError> {
    login_as_valid_user(unit)?;

    unit.page().clear_cookies()?;
    unit.with_retry("Reload after clearing cookies", |page| {
        page.reload().map_err(HarnessError::from)
    })?;

    ensure(
        LoginPage::new(unit).is_on_login_page()?,
        "Should be redirected to login page after clearing cookies",
    )
}

// ============================================================================
// Cart and checkout
// ============================================================================

pub fn cart_add_extremes(unit: &mut TestUnit) -> Result<(), HarnessError> {
    login_as_valid_user(unit)?;

    let mut inventory = InventoryPage::new(unit);
    let expensive = inventory.add_most_expensive_to_cart()?;
    let cheap = inventory.add_cheapest_to_cart()?;

    let count = inventory.cart_item_count()?;
    ensure(count == 2, format!("Cart should contain 2 items, found {}", count))?;
    inventory.open_cart()?;

    let items = CartPage::new(unit).items()?;
    for expected in [&expensive, &cheap] {
        let found = items.iter().find(|item| item.name == expected.name);
        let Some(found) = found else {
            return Err(HarnessError::Assertion(format!(
                "Cart should contain '{}'",
                expected.name
            )));
        };
        ensure(
            (found.price - expected.price).abs() <= 0.01,
            format!(
                "Price of '{}' in cart is {:.2}, expected {:.2}",
                expected.name, found.price, expected.price
            ),
        )?;
    }
    Ok(())
}

pub fn checkout_process(unit: &mut TestUnit) -> Result<(), HarnessError> {
    login_as_valid_user(unit)?;

    let mut inventory = InventoryPage::new(unit);
    let expensive = inventory.add_most_expensive_to_cart()?;
    let cheap = inventory.add_cheapest_to_cart()?;
    inventory.open_cart()?;

    let items = CartPage::new(unit).items()?;
    ensure(items.len() == 2, format!("Cart should contain 2 items, found {}", items.len()))?;

    // Start checkout, back out, and drop the expensive item
    CartPage::new(unit).proceed_to_checkout()?;
    CheckoutPage::new(unit).cancel()?;
    InventoryPage::new(unit).open_cart()?;

    let mut cart = CartPage::new(unit);
    cart.remove_item_by_name(&expensive.name)?;
    let remaining = cart.items()?;
    ensure(
        remaining.len() == 1,
        format!("Cart should contain 1 item after removal, found {}", remaining.len()),
    )?;
    ensure(
        remaining.iter().all(|item| item.name != expensive.name),
        "Expensive item should be removed",
    )?;
    ensure(
        remaining.iter().any(|item| item.name == cheap.name),
        "Cheap item should still be in cart",
    )?;
    cart.proceed_to_checkout()?;

    let customer = CustomerInfo::random();
    let mut checkout = CheckoutPage::new(unit);
    checkout.enter_customer_info(&customer)?;
    checkout.continue_to_overview()?;
    ensure(
        checkout.is_overview_displayed()?,
        "Checkout overview should be displayed",
    )?;
    checkout.finish()?;

    let mut complete = CheckoutCompletePage::new(unit);
    ensure(
        complete.is_confirmation_displayed()?,
        "Order confirmation should be displayed",
    )?;
    ensure(
        complete.header_text()?.is_some(),
        "Complete header text should be present",
    )?;
    let body = complete.body_text()?.unwrap_or_default();
    ensure(
        body.contains("Your order has been dispatched"),
        "Complete text should mention order dispatched",
    )
}
