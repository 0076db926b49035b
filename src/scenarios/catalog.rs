use crate::error::HarnessError;
use crate::lifecycle::suite::TestCase;
use crate::lifecycle::unit::TestUnit;
use crate::scenarios::flows;

type Flow = fn(&mut TestUnit) -> Result<(), HarnessError>;

/// Fixed storefront scenarios, in execution order.
pub const FLOWS: &[(&str, Flow)] = &[
    ("login_valid", flows::login_valid),
    ("login_invalid", flows::login_invalid),
    ("login_locked_out", flows::login_locked_out),
    ("login_empty_credentials", flows::login_empty_credentials),
    ("login_long_input", flows::login_long_input),
    ("login_special_characters", flows::login_special_characters),
    ("login_repeated_failures", flows::login_repeated_failures),
    ("password_masking", flows::password_masking),
    ("session_cleared_cookies", flows::session_cleared_cookies),
    ("cart_add_extremes", flows::cart_add_extremes),
    ("checkout_process", flows::checkout_process),
];

/// Every built-in scenario: the fixed flows, then one `login_injection_*`
/// case per malicious input so each gets its own context.
pub fn scenarios() -> Vec<TestCase> {
    let fixed = FLOWS
        .iter()
        .map(|(name, flow)| TestCase::new(name, *flow));

    let injections = flows::INJECTION_INPUTS.iter().map(|(label, input)| {
        TestCase::new(&format!("login_injection_{}", label), move |unit| {
            flows::login_injection(unit, input)
        })
    });

    fixed.chain(injections).collect()
}

pub fn scenario_names() -> Vec<String> {
    scenarios().into_iter().map(|case| case.name).collect()
}

/// Test cases for `names`, or for every scenario when `names` is empty.
///
/// Unknown names are a usage error.
pub fn select(names: &[String]) -> Result<Vec<TestCase>, HarnessError> {
    let available = scenarios();
    if names.is_empty() {
        return Ok(available);
    }

    names
        .iter()
        .map(|wanted| {
            available
                .iter()
                .find(|case| &case.name == wanted)
                .cloned()
                .ok_or_else(|| {
                    let known: Vec<&str> = available.iter().map(|c| c.name.as_str()).collect();
                    HarnessError::Programming(format!(
                        "Unknown scenario '{}' (available: {})",
                        wanted,
                        known.join(", ")
                    ))
                })
        })
        .collect()
}
