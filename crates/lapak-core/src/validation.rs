//! # Validation Module
//!
//! Structural validation for pricing rules (the Rule Store contract).
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin frontend (TypeScript)                                  │
//! │  ├── Basic format checks (empty, ranges)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust, authoring time)                           │
//! │  ├── Scope/reference consistency                                       │
//! │  ├── Tier contiguity and ordering                                      │
//! │  ├── Non-negative numeric fields                                       │
//! │  └── Valid time window                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Tier Evaluator (defensive re-check)                          │
//! │  └── NoApplicableTier guards against rules that slipped past           │
//! │                                                                         │
//! │  Defense in depth: rules are external input at every layer             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checks run in a fixed order and reject on the first violation; a rule is
//! never partially accepted. All functions are pure.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::rule::{RateTier, RuleScope, TierRate, WeightBracket};
use crate::{MAX_RATE_BPS, MAX_TIERS_PER_RULE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Scope
// =============================================================================

/// Validates a rule scope.
///
/// The tagged union already makes an inconsistent scope unrepresentable;
/// what remains is rejecting blank references.
pub fn validate_scope(scope: &RuleScope) -> ValidationResult<()> {
    match scope.reference() {
        Some(reference) if reference.trim().is_empty() => Err(ValidationError::MissingScopeRef {
            scope: scope.label().to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Tier Contiguity
// =============================================================================

/// Validates amount tiers: non-empty, sorted ascending, gap-free,
/// overlap-free, exactly the last tier unbounded.
///
/// ## Example
/// ```rust
/// use lapak_core::money::{FeeRate, Money};
/// use lapak_core::rule::{RateTier, TierRate};
/// use lapak_core::validation::validate_rate_tiers;
///
/// let tiers = vec![
///     RateTier {
///         min: Money::zero(),
///         max: Some(Money::new(500_000)),
///         rate: TierRate::Percentage(FeeRate::from_bps(500)),
///     },
///     RateTier {
///         min: Money::new(500_000),
///         max: None,
///         rate: TierRate::Percentage(FeeRate::from_bps(300)),
///     },
/// ];
/// assert!(validate_rate_tiers(&tiers).is_ok());
/// ```
pub fn validate_rate_tiers(tiers: &[RateTier]) -> ValidationResult<()> {
    let bounds: Vec<(i64, Option<i64>)> = tiers
        .iter()
        .map(|tier| (tier.min.amount(), tier.max.map(|max| max.amount())))
        .collect();
    validate_contiguous(&bounds)
}

/// Validates weight brackets with the same contiguity rules as amount tiers.
///
/// The upper-inclusive boundary semantics of brackets do not change the
/// structural requirement: each bracket's recorded upper bound must equal
/// the next bracket's lower bound, the first bracket starts at 0 grams (so
/// zero-weight shipments always have a home), and only the last is
/// unbounded.
pub fn validate_weight_brackets(brackets: &[WeightBracket]) -> ValidationResult<()> {
    let bounds: Vec<(i64, Option<i64>)> = brackets
        .iter()
        .map(|bracket| (bracket.min_grams, bracket.max_grams))
        .collect();
    validate_contiguous(&bounds)
}

/// Shared contiguity check over `(min, max)` bounds.
fn validate_contiguous(bounds: &[(i64, Option<i64>)]) -> ValidationResult<()> {
    if bounds.is_empty() {
        return Err(ValidationError::EmptyTiers);
    }
    if bounds.len() > MAX_TIERS_PER_RULE {
        return Err(ValidationError::TooManyTiers {
            found: bounds.len(),
            max: MAX_TIERS_PER_RULE,
        });
    }

    let (first_min, _) = bounds[0];
    if first_min != 0 {
        return Err(ValidationError::FirstTierNotZero { found: first_min });
    }

    let last = bounds.len() - 1;
    for (index, &(min, max)) in bounds.iter().enumerate() {
        match max {
            Some(max) => {
                if max <= min {
                    return Err(ValidationError::EmptyTierRange { index, min, max });
                }
                if index == last {
                    return Err(ValidationError::BoundedLastTier { max });
                }
                let (next_min, _) = bounds[index + 1];
                if next_min != max {
                    return Err(ValidationError::TierNotContiguous {
                        index: index + 1,
                        expected: max,
                        found: next_min,
                    });
                }
            }
            None => {
                if index != last {
                    return Err(ValidationError::UnboundedTierNotLast { index });
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Fields
// =============================================================================

/// Validates a tier or COD rate: percentage capped at [`MAX_RATE_BPS`],
/// fixed amounts non-negative.
pub fn validate_tier_rate(field: &str, rate: &TierRate) -> ValidationResult<()> {
    match rate {
        TierRate::Percentage(rate) => {
            if rate.bps() > MAX_RATE_BPS {
                return Err(ValidationError::RateOutOfRange {
                    field: field.to_string(),
                    found: rate.bps(),
                    max: MAX_RATE_BPS,
                });
            }
            Ok(())
        }
        TierRate::Fixed(amount) => validate_non_negative(field, *amount),
    }
}

/// Validates that a monetary field is not negative. Zero is allowed
/// (free shipping brackets, zero fixed components).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            found: amount.amount(),
        });
    }
    Ok(())
}

// =============================================================================
// Time Window
// =============================================================================

/// Validates the effective window: when both ends are set, `from` must be
/// strictly before `to`. Open ends are always valid.
pub fn validate_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from >= to {
            return Err(ValidationError::InvalidWindow { from, to });
        }
    }
    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a rule id.
///
/// ## Rules
/// - Must not be empty
/// - Must be a valid UUID
///
/// ## Example
/// ```rust
/// use lapak_core::validation::validate_rule_id;
///
/// assert!(validate_rule_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_rule_id("not-a-uuid").is_err());
/// ```
pub fn validate_rule_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::FeeRate;
    use chrono::TimeZone;

    fn pct_tier(min: i64, max: Option<i64>, bps: u32) -> RateTier {
        RateTier {
            min: Money::new(min),
            max: max.map(Money::new),
            rate: TierRate::Percentage(FeeRate::from_bps(bps)),
        }
    }

    #[test]
    fn test_validate_scope() {
        assert!(validate_scope(&RuleScope::Global).is_ok());
        assert!(validate_scope(&RuleScope::Shop("shop-1".into())).is_ok());
        assert!(matches!(
            validate_scope(&RuleScope::Shop("".into())),
            Err(ValidationError::MissingScopeRef { .. })
        ));
        assert!(matches!(
            validate_scope(&RuleScope::Category("   ".into())),
            Err(ValidationError::MissingScopeRef { .. })
        ));
    }

    #[test]
    fn test_contiguous_tiers_accepted() {
        let tiers = vec![
            pct_tier(0, Some(500_000), 500),
            pct_tier(500_000, Some(2_000_000), 400),
            pct_tier(2_000_000, None, 300),
        ];
        assert!(validate_rate_tiers(&tiers).is_ok());
    }

    #[test]
    fn test_empty_tiers_rejected() {
        assert!(matches!(
            validate_rate_tiers(&[]),
            Err(ValidationError::EmptyTiers)
        ));
    }

    #[test]
    fn test_gap_rejected() {
        let tiers = vec![pct_tier(0, Some(500_000), 500), pct_tier(600_000, None, 300)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::TierNotContiguous {
                index: 1,
                expected: 500_000,
                found: 600_000,
            })
        ));
    }

    #[test]
    fn test_overlap_rejected() {
        let tiers = vec![pct_tier(0, Some(500_000), 500), pct_tier(400_000, None, 300)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::TierNotContiguous { .. })
        ));
    }

    #[test]
    fn test_first_tier_must_start_at_zero() {
        let tiers = vec![pct_tier(100, None, 500)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::FirstTierNotZero { found: 100 })
        ));
    }

    #[test]
    fn test_bounded_last_tier_rejected() {
        let tiers = vec![pct_tier(0, Some(500_000), 500)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::BoundedLastTier { max: 500_000 })
        ));
    }

    #[test]
    fn test_unbounded_middle_tier_rejected() {
        let tiers = vec![pct_tier(0, None, 500), pct_tier(500_000, None, 300)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::UnboundedTierNotLast { index: 0 })
        ));
    }

    #[test]
    fn test_inverted_tier_range_rejected() {
        let tiers = vec![pct_tier(0, Some(0), 500), pct_tier(0, None, 300)];
        assert!(matches!(
            validate_rate_tiers(&tiers),
            Err(ValidationError::EmptyTierRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_weight_brackets_share_contiguity_rules() {
        let brackets = vec![
            WeightBracket {
                min_grams: 0,
                max_grams: Some(5_000),
                surcharge: Money::zero(),
            },
            WeightBracket {
                min_grams: 5_000,
                max_grams: None,
                surcharge: Money::new(10_000),
            },
        ];
        assert!(validate_weight_brackets(&brackets).is_ok());

        let gapped = vec![
            WeightBracket {
                min_grams: 0,
                max_grams: Some(5_000),
                surcharge: Money::zero(),
            },
            WeightBracket {
                min_grams: 6_000,
                max_grams: None,
                surcharge: Money::new(10_000),
            },
        ];
        assert!(matches!(
            validate_weight_brackets(&gapped),
            Err(ValidationError::TierNotContiguous { .. })
        ));
    }

    #[test]
    fn test_rate_bounds() {
        let ok = TierRate::Percentage(FeeRate::from_bps(MAX_RATE_BPS));
        assert!(validate_tier_rate("rate", &ok).is_ok());

        let too_high = TierRate::Percentage(FeeRate::from_bps(MAX_RATE_BPS + 1));
        assert!(matches!(
            validate_tier_rate("rate", &too_high),
            Err(ValidationError::RateOutOfRange { .. })
        ));

        let negative_fixed = TierRate::Fixed(Money::new(-1));
        assert!(matches!(
            validate_tier_rate("rate", &negative_fixed),
            Err(ValidationError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_window_validation() {
        let early = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        assert!(validate_window(None, None).is_ok());
        assert!(validate_window(Some(early), None).is_ok());
        assert!(validate_window(Some(early), Some(late)).is_ok());
        assert!(matches!(
            validate_window(Some(late), Some(early)),
            Err(ValidationError::InvalidWindow { .. })
        ));
        // Zero-length window is also invalid
        assert!(validate_window(Some(early), Some(early)).is_err());
    }

    #[test]
    fn test_validate_rule_id() {
        assert!(validate_rule_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_rule_id("").is_err());
        assert!(validate_rule_id("not-a-uuid").is_err());
    }
}
