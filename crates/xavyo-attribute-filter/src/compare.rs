//! String comparison used by matchers

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{FilterConfigError, FilterConfigResult};

/// How a configured string is compared with a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    #[default]
    Exact,
    Substring,
    Regex,
}

/// A compiled string comparison.
#[derive(Debug, Clone)]
pub enum StringComparison {
    Exact { expected: String, case_sensitive: bool },
    Substring { expected: String, case_sensitive: bool },
    Regex(Regex),
}

impl StringComparison {
    pub fn exact(expected: impl Into<String>, case_sensitive: bool) -> Self {
        StringComparison::Exact {
            expected: expected.into(),
            case_sensitive,
        }
    }

    pub fn substring(expected: impl Into<String>, case_sensitive: bool) -> Self {
        StringComparison::Substring {
            expected: expected.into(),
            case_sensitive,
        }
    }

    /// Compile a regex. It must match the whole candidate.
    pub fn regex(pattern: &str, case_sensitive: bool) -> FilterConfigResult<Self> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source| FilterConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(StringComparison::Regex(regex))
    }

    /// Build a comparison from configuration parts.
    pub fn from_mode(
        mode: ComparisonMode,
        value: &str,
        case_sensitive: bool,
    ) -> FilterConfigResult<Self> {
        match mode {
            ComparisonMode::Exact => Ok(Self::exact(value, case_sensitive)),
            ComparisonMode::Substring => Ok(Self::substring(value, case_sensitive)),
            ComparisonMode::Regex => Self::regex(value, case_sensitive),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            StringComparison::Exact {
                expected,
                case_sensitive: true,
            } => candidate == expected,
            StringComparison::Exact {
                expected,
                case_sensitive: false,
            } => candidate.to_lowercase() == expected.to_lowercase(),
            StringComparison::Substring {
                expected,
                case_sensitive: true,
            } => candidate.contains(expected.as_str()),
            StringComparison::Substring {
                expected,
                case_sensitive: false,
            } => candidate
                .to_lowercase()
                .contains(expected.to_lowercase().as_str()),
            StringComparison::Regex(regex) => regex.is_match(candidate),
        }
    }
}
