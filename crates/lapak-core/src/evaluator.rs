//! # Tier Evaluator
//!
//! Computes monetary results from a resolved rule and a numeric input.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Tier Evaluation Pipeline                             │
//! │                                                                         │
//! │  rule + input + as_of                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Activation re-check ──► InactiveRule / NotYetEffective / Expired      │
//! │       │ (safe to call standalone; never assumed from the resolver)     │
//! │       ▼                                                                 │
//! │  Override check ───────► free-shipping threshold zeroes the fee        │
//! │       │                  BEFORE any tier lookup                         │
//! │       ▼                                                                 │
//! │  Tier lookup ──────────► amount tiers:   min <= x < max  (half-open)   │
//! │       │                  weight brackets: first with x <= max          │
//! │       ▼                  (miss = NoApplicableTier, always a defect)    │
//! │  Fee math ─────────────► percentage (round half-up, once) or fixed,    │
//! │       │                  + fixed component, floor at min_fee (COD)     │
//! │       ▼                                                                 │
//! │  FeeComputation { amount, rate }                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is a pure function of (rule snapshot, input, as_of):
//! evaluating the same triple repeatedly yields identical output.

use chrono::{DateTime, Utc};

use crate::error::EvaluateError;
use crate::money::Money;
use crate::rule::{ScopedRule, ShippingTariff, TierRate, TieredRule};

// =============================================================================
// Computation Result
// =============================================================================

/// The outcome of one independent fee computation: the rounded amount plus
/// the rate that produced it, kept for the settlement audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeComputation {
    /// Final fee, rounded exactly once.
    pub amount: Money,
    /// The tier rate (or bracket surcharge) that was applied.
    pub rate: TierRate,
}

// =============================================================================
// Activation Re-check
// =============================================================================

/// Re-checks that a rule is active and effective at `as_of`.
///
/// The resolver already filtered on both conditions, but the evaluator must
/// be safe to call standalone, so it never assumes. A failure here on a
/// freshly resolved rule is a resolver/evaluator disagreement and is logged
/// upstream as an anomaly.
pub fn check_active<R: ScopedRule>(rule: &R, as_of: DateTime<Utc>) -> Result<(), EvaluateError> {
    if !rule.is_active() {
        return Err(EvaluateError::InactiveRule {
            rule_id: rule.id().to_string(),
        });
    }
    if let Some(from) = rule.effective_from() {
        if as_of < from {
            return Err(EvaluateError::NotYetEffective {
                rule_id: rule.id().to_string(),
                effective_from: from,
            });
        }
    }
    if let Some(to) = rule.effective_to() {
        if as_of >= to {
            return Err(EvaluateError::Expired {
                rule_id: rule.id().to_string(),
                effective_to: to,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Amount Rules (commission & marketplace fee)
// =============================================================================

/// Evaluates a tiered commission or marketplace-fee rule on an order amount.
///
/// Tier lookup scans in ascending order and selects the first tier where
/// `amount >= min` and (`max` unbounded or `amount < max`), the half-open
/// contiguous partition. The rounding for percentage tiers happens exactly
/// once, inside [`Money::apply_rate`]; the fixed component is whole-rupiah
/// integer addition and introduces no further rounding.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use lapak_core::evaluator::evaluate_amount;
/// use lapak_core::money::{FeeRate, Money};
/// use lapak_core::rule::{RuleScope, TieredRule};
///
/// let rule = TieredRule::flat_percentage(RuleScope::Global, FeeRate::from_bps(500));
/// let fee = evaluate_amount(&rule, Money::new(1_000_000), Utc::now()).unwrap();
/// assert_eq!(fee.amount.amount(), 50_000);
/// ```
pub fn evaluate_amount(
    rule: &TieredRule,
    amount: Money,
    as_of: DateTime<Utc>,
) -> Result<FeeComputation, EvaluateError> {
    check_active(rule, as_of)?;

    let tier = rule
        .tiers
        .iter()
        .find(|tier| tier.contains(amount))
        .ok_or_else(|| EvaluateError::NoApplicableTier {
            rule_id: rule.id.clone(),
            input: amount.amount(),
        })?;

    let base = match tier.rate {
        TierRate::Percentage(rate) => amount.apply_rate(rate),
        TierRate::Fixed(fee) => fee,
    };
    let fixed = rule.fixed_component.unwrap_or_else(Money::zero);

    Ok(FeeComputation {
        amount: base + fixed,
        rate: tier.rate,
    })
}

// =============================================================================
// Shipping Tariffs
// =============================================================================

/// Evaluates a shipping tariff for a parcel weight and order value.
///
/// The free-shipping threshold is checked **before** any bracket lookup:
/// an order at or above it ships free regardless of weight. Otherwise the
/// fee is `base_fee + surcharge` of the first bracket (ascending) whose
/// upper bound is unbounded or `weight_grams <= max_grams`. Upper bounds
/// are inclusive for weights, so a parcel of exactly 5 kg stays in a
/// `[0–5 kg]` bracket and a zero-weight shipment lands in the first one.
pub fn evaluate_shipping(
    tariff: &ShippingTariff,
    weight_grams: i64,
    order_value: Money,
    as_of: DateTime<Utc>,
) -> Result<FeeComputation, EvaluateError> {
    check_active(tariff, as_of)?;

    if let Some(threshold) = tariff.free_shipping_threshold {
        if order_value >= threshold {
            return Ok(FeeComputation {
                amount: Money::zero(),
                rate: TierRate::Fixed(Money::zero()),
            });
        }
    }

    let bracket = tariff
        .brackets
        .iter()
        .find(|bracket| bracket.max_grams.map_or(true, |max| weight_grams <= max))
        .ok_or_else(|| EvaluateError::NoApplicableTier {
            rule_id: tariff.id.clone(),
            input: weight_grams,
        })?;

    Ok(FeeComputation {
        amount: tariff.base_fee + bracket.surcharge,
        rate: TierRate::Fixed(bracket.surcharge),
    })
}

/// Evaluates the COD fee sub-rule of a shipping tariff.
///
/// Returns `Ok(None)` when the tariff carries no COD sub-rule; the caller
/// decides how to surface that (the Fee Aggregator degrades it to a zero
/// line flagged "no rule matched"). The computed fee is floored at the
/// sub-rule's `min_fee`.
pub fn evaluate_cod(
    tariff: &ShippingTariff,
    cod_amount: Money,
    as_of: DateTime<Utc>,
) -> Result<Option<FeeComputation>, EvaluateError> {
    check_active(tariff, as_of)?;

    let cod = match &tariff.cod_fee {
        Some(cod) => cod,
        None => return Ok(None),
    };

    let raw = match cod.rate {
        TierRate::Percentage(rate) => cod_amount.apply_rate(rate),
        TierRate::Fixed(fee) => fee,
    };

    Ok(Some(FeeComputation {
        amount: raw.max(cod.min_fee),
        rate: cod.rate,
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================
