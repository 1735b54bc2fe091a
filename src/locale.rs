use std::fmt;

use serde::{Deserialize, Serialize};

/// Display languages the text tables carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    French,
}

impl Locale {
    /// Parse a language tag such as `fr`, `fr-CA` or `en_US`.
    /// Anything that is not French falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match language.as_str() {
            "fr" | "french" => Locale::French,
            _ => Locale::English,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::French => "fr",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("fr"), Locale::French);
        assert_eq!(Locale::from_tag("fr-CA"), Locale::French);
        assert_eq!(Locale::from_tag("FR_ca"), Locale::French);
        assert_eq!(Locale::from_tag("en-US"), Locale::English);
        assert_eq!(Locale::from_tag(""), Locale::English);
        assert_eq!(Locale::from_tag("de"), Locale::English);
    }
}
