//! # Error Types
//!
//! Domain-specific error types for lapak-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ValidationError  - structurally invalid rule, raised at authoring     │
//! │                     time by the Rule Store, never by the evaluator     │
//! │  ResolveError     - no rule matches the scope/time fallback;           │
//! │                     recoverable, the caller decides zero vs hard-fail  │
//! │  EvaluateError    - a resolved rule failed the evaluator's own         │
//! │                     activation re-check, or no tier covered the input  │
//! │  CoreError        - umbrella returned by the Fee Aggregator            │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        ResolveError    ─┼──► CoreError ──► caller                      │
//! │        EvaluateError   ─┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (rule id, input, bounds)
//! 3. Errors are enum variants, never String
//! 4. The engine never retries or silently substitutes defaults; every
//!    failure is returned as a typed result

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::settlement::FeeKind;

// =============================================================================
// Validation Error
// =============================================================================

/// Structural rule validation errors.
///
/// Raised at rule-authoring time, before a rule enters a catalog. A rule that
/// fails any check is rejected whole; the store never partially accepts.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A scoped rule carries an empty shop/category reference.
    #[error("{scope} scope requires a non-empty reference")]
    MissingScopeRef { scope: String },

    /// A rule with zero tiers is invalid.
    #[error("rule must define at least one tier")]
    EmptyTiers,

    /// Tier count exceeds the crate-level cap.
    #[error("rule cannot have more than {max} tiers (found {found})")]
    TooManyTiers { found: usize, max: usize },

    /// The first tier must cover the bottom of the input domain.
    #[error("first tier must start at 0 (found {found})")]
    FirstTierNotZero { found: i64 },

    /// A tier does not start exactly where the previous one ends.
    #[error("tier {index} breaks contiguity: expected lower bound {expected}, found {found}")]
    TierNotContiguous {
        index: usize,
        expected: i64,
        found: i64,
    },

    /// A tier's bounds are inverted or empty.
    #[error("tier {index} has an empty range: {min} is not below {max}")]
    EmptyTierRange { index: usize, min: i64, max: i64 },

    /// Only the final tier may have an unbounded upper end.
    #[error("tier {index} is unbounded but is not the last tier")]
    UnboundedTierNotLast { index: usize },

    /// The final tier must be unbounded so the domain has no gap at the top.
    #[error("last tier must be unbounded (found upper bound {max})")]
    BoundedLastTier { max: i64 },

    /// A monetary field carries a negative value.
    #[error("{field} must not be negative (found {found})")]
    NegativeAmount { field: String, found: i64 },

    /// A percentage rate is outside 0..=10000 bps.
    #[error("{field} must be between 0 and {max} basis points (found {found})")]
    RateOutOfRange { field: String, found: u32, max: u32 },

    /// `effective_from` is not strictly before `effective_to`.
    #[error("effective window is inverted: {from} is not before {to}")]
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., rule id is not a UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Resolve Error
// =============================================================================

/// Rule resolution failures.
///
/// `NotFound` is recoverable: the Fee Aggregator degrades it to a zero line
/// item with an explicit "no rule matched" flag. It must never silently turn
/// into a hidden default rate.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No active, effective rule matched at any scope level.
    #[error("no rule matched (shop={shop_id:?}, category={category_id:?})")]
    NotFound {
        shop_id: Option<String>,
        category_id: Option<String>,
    },
}

// =============================================================================
// Evaluate Error
// =============================================================================

/// Tier evaluation failures.
///
/// The first three variants mean a rule failed the evaluator's standalone
/// activation re-check. When the rule came from the resolver an instant
/// earlier, that is a resolver/evaluator disagreement and is logged upstream
/// as an anomaly. `NoApplicableTier` indicates a structurally invalid rule
/// slipped past validation; always a defect, never expected in steady state.
#[derive(Debug, Error)]
pub enum EvaluateError {
    /// The rule's kill switch is off.
    #[error("rule {rule_id} is inactive")]
    InactiveRule { rule_id: String },

    /// Evaluation time is before the rule's effective window.
    #[error("rule {rule_id} is not effective until {effective_from}")]
    NotYetEffective {
        rule_id: String,
        effective_from: DateTime<Utc>,
    },

    /// Evaluation time is at or past the rule's effective window end.
    #[error("rule {rule_id} expired at {effective_to}")]
    Expired {
        rule_id: String,
        effective_to: DateTime<Utc>,
    },

    /// No tier covered the input. Structurally impossible for a validated
    /// rule, but rules are external input and must be checked defensively.
    #[error("no tier in rule {rule_id} covers input {input}")]
    NoApplicableTier { rule_id: String, input: i64 },
}

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error returned by the Fee Aggregator.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Structural rule validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rule resolution failed where degradation was not allowed.
    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// A freshly resolved rule failed the evaluator re-check.
    #[error("{kind} evaluation failed: {source}")]
    Evaluate {
        kind: FeeKind,
        #[source]
        source: EvaluateError,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TierNotContiguous {
            index: 2,
            expected: 500_000,
            found: 600_000,
        };
        assert_eq!(
            err.to_string(),
            "tier 2 breaks contiguity: expected lower bound 500000, found 600000"
        );

        let err = ValidationError::MissingScopeRef {
            scope: "shop".to_string(),
        };
        assert_eq!(err.to_string(), "shop scope requires a non-empty reference");
    }

    #[test]
    fn test_evaluate_error_messages() {
        let err = EvaluateError::InactiveRule {
            rule_id: "rule-1".to_string(),
        };
        assert_eq!(err.to_string(), "rule rule-1 is inactive");

        let err = EvaluateError::NoApplicableTier {
            rule_id: "rule-1".to_string(),
            input: 42,
        };
        assert_eq!(err.to_string(), "no tier in rule rule-1 covers input 42");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::EmptyTiers.into();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_evaluate_error_keeps_kind_context() {
        let err = CoreError::Evaluate {
            kind: FeeKind::Commission,
            source: EvaluateError::InactiveRule {
                rule_id: "rule-1".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "commission evaluation failed: rule rule-1 is inactive"
        );
    }
}
