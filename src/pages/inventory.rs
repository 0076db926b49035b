use tracing::info;

use crate::error::HarnessError;
use crate::inventory::validator::{ItemSnapshot, PricedItem, cheapest, most_expensive};
use crate::lifecycle::unit::TestUnit;
use crate::pages::xpath_literal;

pub const INVENTORY_ITEM: &str = ".inventory_item";
pub const ITEM_NAME: &str = ".inventory_item_name";
pub const ITEM_PRICE: &str = ".inventory_item_price";
pub const CART_BADGE: &str = ".shopping_cart_badge";
pub const CART_LINK: &str = ".shopping_cart_link";

/// Product listing shown after login.
pub struct InventoryPage<'a> {
    unit: &'a mut TestUnit,
}

impl<'a> InventoryPage<'a> {
    pub fn new(unit: &'a mut TestUnit) -> Self {
        Self { unit }
    }

    /// Names and raw prices of every listed item, in page order.
    pub fn snapshot(&mut self) -> Result<ItemSnapshot, HarnessError> {
        Ok(self
            .unit
            .page()
            .item_snapshot(INVENTORY_ITEM, ITEM_NAME, ITEM_PRICE)?)
    }

    pub fn cheapest_item(&mut self) -> Result<PricedItem, HarnessError> {
        let snapshot = self.snapshot()?;
        Ok(cheapest(&snapshot)?)
    }

    pub fn most_expensive_item(&mut self) -> Result<PricedItem, HarnessError> {
        let snapshot = self.snapshot()?;
        Ok(most_expensive(&snapshot)?)
    }

    pub fn add_item_to_cart_by_name(&mut self, name: &str) -> Result<(), HarnessError> {
        let selector = format!(
            "xpath=//*[text()={}]/ancestor::div[contains(@class,'inventory_item')]//button[contains(@id,'add-to-cart')]",
            xpath_literal(name)
        );
        self.unit
            .click(&selector, &format!("add to cart for '{}'", name))?;
        Ok(())
    }

    pub fn add_cheapest_to_cart(&mut self) -> Result<PricedItem, HarnessError> {
        let item = self.cheapest_item()?;
        info!("Adding cheapest item '{}' (${:.2})", item.name, item.price);
        self.add_item_to_cart_by_name(&item.name)?;
        Ok(item)
    }

    pub fn add_most_expensive_to_cart(&mut self) -> Result<PricedItem, HarnessError> {
        let item = self.most_expensive_item()?;
        info!("Adding most expensive item '{}' (${:.2})", item.name, item.price);
        self.add_item_to_cart_by_name(&item.name)?;
        Ok(item)
    }

    /// Number shown on the cart badge, 0 when the badge is hidden.
    pub fn cart_item_count(&mut self) -> Result<u32, HarnessError> {
        if self.unit.page().query_count(CART_BADGE)? == 0 {
            return Ok(0);
        }
        let text = self.unit.page().query_text(CART_BADGE)?.unwrap_or_default();
        text.trim().parse().map_err(|_| {
            HarnessError::Assertion(format!("Cart badge shows '{}', not a number", text))
        })
    }

    pub fn open_cart(&mut self) -> Result<(), HarnessError> {
        self.unit.click(CART_LINK, "cart link")?;
        Ok(())
    }
}
