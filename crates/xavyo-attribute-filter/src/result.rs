//! Three-valued match results
//!
//! `Indeterminate` means the matcher had no opinion, for example because the
//! request lacked the data it inspects. It is neither a permit nor a deny.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a matcher or requirement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Permit,
    Deny,
    Indeterminate,
}

impl MatchResult {
    /// `Permit` for true, `Deny` for false.
    #[must_use]
    pub fn from_bool(matched: bool) -> Self {
        if matched {
            MatchResult::Permit
        } else {
            MatchResult::Deny
        }
    }

    /// Conjunction: `Deny` dominates, then `Indeterminate`.
    #[must_use]
    pub fn and(self, other: MatchResult) -> MatchResult {
        match (self, other) {
            (MatchResult::Deny, _) | (_, MatchResult::Deny) => MatchResult::Deny,
            (MatchResult::Indeterminate, _) | (_, MatchResult::Indeterminate) => {
                MatchResult::Indeterminate
            }
            _ => MatchResult::Permit,
        }
    }

    /// Disjunction: `Permit` dominates, then `Indeterminate`.
    #[must_use]
    pub fn or(self, other: MatchResult) -> MatchResult {
        match (self, other) {
            (MatchResult::Permit, _) | (_, MatchResult::Permit) => MatchResult::Permit,
            (MatchResult::Indeterminate, _) | (_, MatchResult::Indeterminate) => {
                MatchResult::Indeterminate
            }
            _ => MatchResult::Deny,
        }
    }

    /// Negation: swaps `Permit` and `Deny`, keeps `Indeterminate`.
    #[must_use]
    pub fn not(self) -> MatchResult {
        match self {
            MatchResult::Permit => MatchResult::Deny,
            MatchResult::Deny => MatchResult::Permit,
            MatchResult::Indeterminate => MatchResult::Indeterminate,
        }
    }

    /// Conjunction of all results; `Permit` for none.
    pub fn all<I: IntoIterator<Item = MatchResult>>(results: I) -> MatchResult {
        results
            .into_iter()
            .fold(MatchResult::Permit, MatchResult::and)
    }

    /// Disjunction of all results; `Deny` for none.
    pub fn any<I: IntoIterator<Item = MatchResult>>(results: I) -> MatchResult {
        results.into_iter().fold(MatchResult::Deny, MatchResult::or)
    }

    pub fn is_permit(self) -> bool {
        self == MatchResult::Permit
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Permit => write!(f, "permit"),
            MatchResult::Deny => write!(f, "deny"),
            MatchResult::Indeterminate => write!(f, "indeterminate"),
        }
    }
}
