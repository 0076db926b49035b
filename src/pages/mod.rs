pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod login;

/// Quote `text` as an XPath string literal, falling back to `concat()` when
/// it contains both quote kinds.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
