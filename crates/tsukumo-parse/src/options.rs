use serde::{Deserialize, Serialize};

/// Delimiters used when no configuration overrides them.
pub const DEFAULT_DELIMITERS: &str = " _.&+,|-";

/// Per-call parser configuration.
///
/// Every field has a default, so a partial TOML `[parser]` table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Characters that split free text into tokens.
    pub allowed_delimiters: String,
    /// Literal substrings erased from the filename before tokenizing.
    pub ignored_strings: Vec<String>,
    pub parse_episode_number: bool,
    pub parse_episode_title: bool,
    pub parse_file_extension: bool,
    pub parse_release_group: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allowed_delimiters: DEFAULT_DELIMITERS.to_string(),
            ignored_strings: Vec::new(),
            parse_episode_number: true,
            parse_episode_title: true,
            parse_file_extension: true,
            parse_release_group: true,
        }
    }
}

impl Options {
    pub fn is_allowed_delimiter(&self, c: char) -> bool {
        !c.is_ascii_alphanumeric() && self.allowed_delimiters.contains(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.parse_episode_number);
        assert!(options.ignored_strings.is_empty());
        assert!(options.is_allowed_delimiter('_'));
        assert!(options.is_allowed_delimiter('-'));
        assert!(!options.is_allowed_delimiter('!'));
    }

    #[test]
    fn test_partial_deserialize() {
        let options: Options =
            serde_json::from_str(r#"{"parse_release_group": false}"#).unwrap();
        assert!(!options.parse_release_group);
        assert!(options.parse_episode_title);
        assert_eq!(options.allowed_delimiters, DEFAULT_DELIMITERS);
    }
}
