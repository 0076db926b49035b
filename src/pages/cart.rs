use crate::error::{HarnessError, ValidationError};
use crate::inventory::price::parse_price;
use crate::inventory::validator::PricedItem;
use crate::lifecycle::unit::TestUnit;
use crate::pages::inventory::{ITEM_NAME, ITEM_PRICE};
use crate::pages::xpath_literal;

pub const CART_ITEM: &str = ".cart_item";
pub const CHECKOUT_BUTTON: &str = "#checkout";

/// Remove button in the cart row of the item called `name`.
pub fn remove_button(name: &str) -> String {
    format!(
        "xpath=//*[text()={}]/ancestor::div[contains(@class,'cart_item')]//button[starts-with(@id,'remove-')]",
        xpath_literal(name)
    )
}

pub struct CartPage<'a> {
    unit: &'a mut TestUnit,
}

impl<'a> CartPage<'a> {
    pub fn new(unit: &'a mut TestUnit) -> Self {
        Self { unit }
    }

    /// Items currently in the cart, in page order. Every row must carry a
    /// readable price.
    pub fn items(&mut self) -> Result<Vec<PricedItem>, HarnessError> {
        let snapshot = self
            .unit
            .page()
            .item_snapshot(CART_ITEM, ITEM_NAME, ITEM_PRICE)?;

        let mut items = Vec::with_capacity(snapshot.len());
        let mut missing = Vec::new();
        for row in snapshot.items {
            match parse_price(row.raw_price.as_deref()).value() {
                Some(price) => items.push(PricedItem {
                    name: row.name,
                    price,
                }),
                None => missing.push(row.name),
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError::MissingPrices(missing).into());
        }
        Ok(items)
    }

    pub fn remove_item_by_name(&mut self, name: &str) -> Result<(), HarnessError> {
        self.unit
            .click(&remove_button(name), &format!("remove '{}'", name))?;
        Ok(())
    }

    pub fn proceed_to_checkout(&mut self) -> Result<(), HarnessError> {
        self.unit.click(CHECKOUT_BUTTON, "checkout button")?;
        Ok(())
    }
}
