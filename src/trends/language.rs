//! Locale selection for upstream requests.
//!
//! This is a character-class heuristic, not a language detector: text made
//! only of ASCII letters, digits and spaces is English, anything else is
//! treated as Chinese.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Chinese,
}

impl Locale {
    pub fn classify(text: &str) -> Self {
        if text.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
            Locale::English
        } else {
            Locale::Chinese
        }
    }

    /// The `hl` parameter value sent upstream.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Chinese => "zh-CN",
        }
    }
}
