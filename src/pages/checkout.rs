use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::HarnessError;
use crate::lifecycle::unit::TestUnit;

pub const FIRST_NAME_INPUT: &str = "#first-name";
pub const LAST_NAME_INPUT: &str = "#last-name";
pub const POSTAL_CODE_INPUT: &str = "#postal-code";
pub const CONTINUE_BUTTON: &str = "#continue";
pub const CANCEL_BUTTON: &str = "#cancel";
pub const FINISH_BUTTON: &str = "#finish";
pub const SUMMARY_INFO: &str = ".summary_info";

pub const COMPLETE_HEADER: &str = ".complete-header";
pub const COMPLETE_TEXT: &str = ".complete-text";

/// Data typed into the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl CustomerInfo {
    /// Throwaway customer: 8-letter first name, 10-letter last name,
    /// 5-digit postal code.
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng>(rng: &mut R) -> Self {
        Self {
            first_name: random_letters(rng, 8),
            last_name: random_letters(rng, 10),
            postal_code: (0..5)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect(),
        }
    }
}

fn random_letters<R: Rng>(rng: &mut R, len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let c = char::from(rng.sample(Alphanumeric));
        if c.is_ascii_alphabetic() {
            out.push(c);
        }
    }
    out
}

/// Checkout steps one (customer info) and two (overview).
pub struct CheckoutPage<'a> {
    unit: &'a mut TestUnit,
}

impl<'a> CheckoutPage<'a> {
    pub fn new(unit: &'a mut TestUnit) -> Self {
        Self { unit }
    }

    pub fn enter_customer_info(&mut self, info: &CustomerInfo) -> Result<(), HarnessError> {
        self.unit
            .fill(FIRST_NAME_INPUT, &info.first_name, "first name")?;
        self.unit.fill(LAST_NAME_INPUT, &info.last_name, "last name")?;
        self.unit
            .fill(POSTAL_CODE_INPUT, &info.postal_code, "postal code")?;
        Ok(())
    }

    pub fn continue_to_overview(&mut self) -> Result<(), HarnessError> {
        self.unit.click(CONTINUE_BUTTON, "continue button")?;
        Ok(())
    }

    /// Leave checkout; the storefront goes back to the inventory.
    pub fn cancel(&mut self) -> Result<(), HarnessError> {
        self.unit.click(CANCEL_BUTTON, "cancel button")?;
        Ok(())
    }

    pub fn is_overview_displayed(&mut self) -> Result<bool, HarnessError> {
        Ok(self.unit.page().query_count(SUMMARY_INFO)? > 0)
    }

    pub fn finish(&mut self) -> Result<(), HarnessError> {
        self.unit.click(FINISH_BUTTON, "finish button")?;
        Ok(())
    }
}

/// Order confirmation.
pub struct CheckoutCompletePage<'a> {
    unit: &'a mut TestUnit,
}

impl<'a> CheckoutCompletePage<'a> {
    pub fn new(unit: &'a mut TestUnit) -> Self {
        Self { unit }
    }

    pub fn is_confirmation_displayed(&mut self) -> Result<bool, HarnessError> {
        Ok(self.unit.page().query_count(COMPLETE_HEADER)? > 0)
    }

    pub fn header_text(&mut self) -> Result<Option<String>, HarnessError> {
        Ok(self.unit.page().query_text(COMPLETE_HEADER)?)
    }

    pub fn body_text(&mut self) -> Result<Option<String>, HarnessError> {
        Ok(self.unit.page().query_text(COMPLETE_TEXT)?)
    }
}
