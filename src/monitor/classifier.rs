use regex::Regex;

use crate::error::ConfigError;

/// Decides whether a URL or message is known noise.
///
/// Patterns must match the whole text, so `.*favicon.ico.*` ignores any URL
/// mentioning the favicon while `favicon` alone ignores nothing but itself.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    patterns: Vec<Regex>,
}

impl ErrorClassifier {
    /// Compile the ignore patterns. An invalid pattern is a configuration error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| ConfigError::Pattern {
                    pattern: pattern.to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Classifier that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_ignorable(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
