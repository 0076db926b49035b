use crate::error::HarnessError;
use crate::lifecycle::unit::TestUnit;

pub const USERNAME_INPUT: &str = "#user-name";
pub const PASSWORD_INPUT: &str = "#password";
pub const LOGIN_BUTTON: &str = "#login-button";
pub const ERROR_MESSAGE: &str = "[data-test='error']";

/// Path the storefront redirects to after a successful login.
pub const INVENTORY_PATH: &str = "/inventory.html";

/// The storefront's login form.
pub struct LoginPage<'a> {
    unit: &'a mut TestUnit,
}

impl<'a> LoginPage<'a> {
    pub fn new(unit: &'a mut TestUnit) -> Self {
        Self { unit }
    }

    pub fn open(&mut self) -> Result<(), HarnessError> {
        let url = self.unit.env().base_url.clone();
        self.unit.navigate(&url)?;
        Ok(())
    }

    pub fn fill_username(&mut self, username: &str) -> Result<(), HarnessError> {
        self.unit.fill(USERNAME_INPUT, username, "username")?;
        Ok(())
    }

    pub fn fill_password(&mut self, password: &str) -> Result<(), HarnessError> {
        self.unit.fill(PASSWORD_INPUT, password, "password")?;
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), HarnessError> {
        self.unit.click(LOGIN_BUTTON, "login button")?;
        Ok(())
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), HarnessError> {
        self.fill_username(username)?;
        self.fill_password(password)?;
        self.submit()
    }

    /// Text of the error banner, `None` when no banner is shown.
    pub fn error_message(&mut self) -> Result<Option<String>, HarnessError> {
        Ok(self.unit.page().query_text(ERROR_MESSAGE)?)
    }

    pub fn is_logged_in(&mut self) -> Result<bool, HarnessError> {
        let url = self.unit.page().current_url()?;
        Ok(url.contains(INVENTORY_PATH))
    }

    pub fn is_on_login_page(&mut self) -> Result<bool, HarnessError> {
        let has_form = self.unit.page().query_count(USERNAME_INPUT)? > 0;
        Ok(has_form && !self.is_logged_in()?)
    }

    /// `type` attribute of the password input.
    pub fn password_field_type(&mut self) -> Result<Option<String>, HarnessError> {
        Ok(self.unit.page().query_attribute(PASSWORD_INPUT, "type")?)
    }
}
