use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::inventory::price::{PriceParseResult, parse_price, prices_equal};

// ============================================================================
// Snapshot model
// ============================================================================

/// One inventory item as read from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub name: String,

    /// Text of the price element, `None` when the element is absent
    #[serde(default)]
    pub raw_price: Option<String>,
}

impl SnapshotItem {
    pub fn new(name: impl Into<String>, raw_price: Option<&str>) -> Self {
        Self {
            name: name.into(),
            raw_price: raw_price.map(str::to_string),
        }
    }
}

/// Items in page order at the moment of validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSnapshot {
    pub items: Vec<SnapshotItem>,
}

impl ItemSnapshot {
    pub fn new(items: Vec<SnapshotItem>) -> Self {
        Self { items }
    }

    /// Build from `(name, raw price)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        Self {
            items: pairs
                .into_iter()
                .map(|(name, price)| SnapshotItem::new(name, price))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieFlags {
    pub low: bool,
    pub high: bool,
}

/// Everything one validation pass learned about a snapshot.
///
/// Item sets keep snapshot order. Missing and malformed prices both land in
/// `missing_items`; extremes are computed over the remaining valid items only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub missing_items: Vec<String>,
    pub lowest_price_items: Vec<String>,
    pub highest_price_items: Vec<String>,
    pub has_tie: TieFlags,
}

impl ValidationReport {
    pub fn has_missing_prices(&self) -> bool {
        !self.missing_items.is_empty()
    }
}

/// An item picked by price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub name: String,
    pub price: f64,
}

// ============================================================================
// Validation
// ============================================================================

/// Parse every item once and collect missing prices and tie groups.
pub fn validate(snapshot: &ItemSnapshot) -> ValidationReport {
    let (valid, missing_items) = partition(snapshot);

    if valid.is_empty() {
        return ValidationReport {
            missing_items,
            ..ValidationReport::default()
        };
    }

    let min = valid.iter().map(|i| i.price).fold(f64::INFINITY, f64::min);
    let max = valid.iter().map(|i| i.price).fold(f64::NEG_INFINITY, f64::max);

    let lowest_price_items = names_at(&valid, min);
    let highest_price_items = names_at(&valid, max);

    ValidationReport {
        missing_items,
        has_tie: TieFlags {
            low: lowest_price_items.len() > 1,
            high: highest_price_items.len() > 1,
        },
        lowest_price_items,
        highest_price_items,
    }
}

/// The cheapest item; ties resolve to the first one in snapshot order.
pub fn cheapest(snapshot: &ItemSnapshot) -> Result<PricedItem, ValidationError> {
    select(snapshot, Extreme::Lowest)
}

/// The most expensive item; ties resolve to the first one in snapshot order.
pub fn most_expensive(snapshot: &ItemSnapshot) -> Result<PricedItem, ValidationError> {
    select(snapshot, Extreme::Highest)
}

#[derive(Debug, Clone, Copy)]
enum Extreme {
    Lowest,
    Highest,
}

fn select(snapshot: &ItemSnapshot, extreme: Extreme) -> Result<PricedItem, ValidationError> {
    let (valid, missing) = partition(snapshot);
    if !missing.is_empty() {
        return Err(ValidationError::MissingPrices(missing));
    }

    let (target, label) = match extreme {
        Extreme::Lowest => (
            valid.iter().map(|i| i.price).fold(f64::INFINITY, f64::min),
            "lowest",
        ),
        Extreme::Highest => (
            valid.iter().map(|i| i.price).fold(f64::NEG_INFINITY, f64::max),
            "highest",
        ),
    };

    let mut group = valid
        .into_iter()
        .filter(|item| prices_equal(item.price, target));
    let chosen = group.next().ok_or(ValidationError::NoValidPrices)?;

    let others: Vec<String> = group.map(|item| item.name).collect();
    if !others.is_empty() {
        warn!(
            "Multiple items share the {} price: {}, {}; selecting '{}'",
            label,
            chosen.name,
            others.join(", "),
            chosen.name
        );
    }

    Ok(chosen)
}

fn partition(snapshot: &ItemSnapshot) -> (Vec<PricedItem>, Vec<String>) {
    let mut valid = Vec::new();
    let mut missing = Vec::new();

    for item in &snapshot.items {
        match parse_price(item.raw_price.as_deref()) {
            PriceParseResult::Parsed { value } => valid.push(PricedItem {
                name: item.name.clone(),
                price: value,
            }),
            PriceParseResult::Missing | PriceParseResult::Malformed { .. } => {
                missing.push(item.name.clone())
            }
        }
    }

    (valid, missing)
}

fn names_at(valid: &[PricedItem], target: f64) -> Vec<String> {
    valid
        .iter()
        .filter(|item| prices_equal(item.price, target))
        .map(|item| item.name.clone())
        .collect()
}
