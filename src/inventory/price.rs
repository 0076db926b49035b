use serde::{Deserialize, Serialize};

/// Absolute tolerance used when comparing two parsed prices.
pub const PRICE_EPSILON: f64 = 0.001;

/// Outcome of parsing one raw price token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PriceParseResult {
    Parsed { value: f64 },
    Missing,
    Malformed { raw: String },
}

impl PriceParseResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            PriceParseResult::Parsed { value } => Some(*value),
            _ => None,
        }
    }
}

/// Parse the text of a price element such as `"$29.99"`.
///
/// Absent or blank text is `Missing`. A single leading `$` is stripped before
/// the numeric parse; anything that still isn't a finite number is `Malformed`.
pub fn parse_price(raw: Option<&str>) -> PriceParseResult {
    let trimmed = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return PriceParseResult::Missing,
    };

    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => PriceParseResult::Parsed { value },
        _ => PriceParseResult::Malformed {
            raw: trimmed.to_string(),
        },
    }
}

/// Equality within [`PRICE_EPSILON`].
pub fn prices_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < PRICE_EPSILON
}
