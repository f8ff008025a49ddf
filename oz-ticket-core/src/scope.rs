//! Scope syntax and subset rules
//!
//! A scope is a list of permission names. Tickets may only ever narrow the scope
//! they were derived from, so the subset check is what stops escalation during
//! issuance and reissuance.

use crate::TicketError;
use std::collections::HashSet;

/// Validates scopes and answers subset questions.
pub trait ScopeValidator: Send + Sync {
    /// Checks the scope is well formed.
    fn validate(&self, scope: &[String]) -> Result<(), TicketError>;

    /// Returns true when every item of `subset` is also in `scope`.
    fn is_subset(&self, scope: &[String], subset: &[String]) -> bool;
}

/// The default scope rules: items are non-empty and unique.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeRules;

impl ScopeValidator for ScopeRules {
    fn validate(&self, scope: &[String]) -> Result<(), TicketError> {
        let mut seen = HashSet::with_capacity(scope.len());
        for item in scope {
            if item.is_empty() {
                return Err(TicketError::validation(
                    "scope includes null or empty value",
                ));
            }

            if !seen.insert(item.as_str()) {
                return Err(TicketError::validation(format!(
                    "scope includes duplicated item: {item}"
                )));
            }
        }

        Ok(())
    }

    fn is_subset(&self, scope: &[String], subset: &[String]) -> bool {
        if scope.len() < subset.len() {
            return false;
        }

        let scope: HashSet<&str> = scope.iter().map(String::as_str).collect();
        subset.iter().all(|item| scope.contains(item.as_str()))
    }
}
