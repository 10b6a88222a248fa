//! # Fee Aggregator
//!
//! Orchestrates the Scope Resolver and Tier Evaluator across the commission,
//! marketplace-fee, and shipping catalogs for a single order, producing an
//! itemized `Settlement`.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settlement Computation                               │
//! │                                                                         │
//! │  OrderContext                                                           │
//! │       │                                                                 │
//! │       ├──► commission catalog ──► resolve ──► evaluate ──► line item   │
//! │       │                                                                 │
//! │       ├──► fee catalog ────────► resolve ──► evaluate ──► line item   │
//! │       │                                                                 │
//! │       └──► shipping catalog ───► resolve ──► shipping line (weight)    │
//! │                                          └─► COD line (cod_amount)     │
//! │                                                                         │
//! │  Each sub-computation is independent: no shared mutable state, so      │
//! │  callers may settle many orders concurrently over one snapshot.        │
//! │                                                                         │
//! │  NotFound degrades to a ZERO line with rule_matched = false; it        │
//! │  never silently becomes a hidden default rate.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, EvaluateError};
use crate::evaluator::{evaluate_amount, evaluate_cod, evaluate_shipping, FeeComputation};
use crate::money::Money;
use crate::resolver::{ResolveContext, RuleCatalog};
use crate::rule::{ScopedRule, ShippingTariff, TierRate, TieredRule};

// =============================================================================
// Fee Kind
// =============================================================================

/// Which charge a settlement line item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    /// Marketplace commission on the order amount.
    Commission,
    /// Payment/marketplace fee on the order amount.
    MarketplaceFee,
    /// Shipping fee on the parcel weight.
    Shipping,
    /// Cash-on-delivery fee on the COD amount.
    CodFee,
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeeKind::Commission => "commission",
            FeeKind::MarketplaceFee => "marketplace_fee",
            FeeKind::Shipping => "shipping",
            FeeKind::CodFee => "cod_fee",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Order Context
// =============================================================================

/// Everything the engine needs to know about one order.
///
/// ## Design Notes
/// - `as_of` makes the evaluation timestamp injectable for deterministic
///   testing; `None` means "now", resolved once at the settlement boundary
///   so every sub-computation sees the same instant.
/// - `weight_grams` is absent for orders that do not ship (digital goods);
///   no shipping line is emitted for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderContext {
    /// Shop the order belongs to.
    pub shop_id: Option<String>,

    /// Category of the ordered items.
    pub category_id: Option<String>,

    /// Gross order amount.
    pub amount: Money,

    /// Parcel weight in grams (5 kg = 5000 g).
    pub weight_grams: Option<i64>,

    /// Amount collected on delivery, when the order is COD.
    pub cod_amount: Option<Money>,

    /// Evaluation timestamp; `None` = call time.
    #[ts(as = "Option<String>")]
    pub as_of: Option<DateTime<Utc>>,
}

impl OrderContext {
    /// Minimal context: a gross amount with no scope coordinates.
    pub fn new(amount: Money) -> Self {
        OrderContext {
            shop_id: None,
            category_id: None,
            amount,
            weight_grams: None,
            cod_amount: None,
            as_of: None,
        }
    }

    fn resolve_context(&self) -> ResolveContext {
        ResolveContext {
            shop_id: self.shop_id.clone(),
            category_id: self.category_id.clone(),
        }
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// One itemized charge in a settlement, keeping the rule id and rate that
/// produced it for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementLine {
    /// Which charge this is.
    pub kind: FeeKind,

    /// The rule that produced the amount; `None` when no rule matched.
    pub rule_id: Option<String>,

    /// The applied tier rate or bracket surcharge; `None` when no rule
    /// matched.
    pub rate: Option<TierRate>,

    /// Computed charge, rounded exactly once.
    pub amount: Money,

    /// Explicit "a rule matched" flag. A `false` here means the zero amount
    /// is a degradation, not a priced result.
    pub rule_matched: bool,
}

impl SettlementLine {
    fn computed(kind: FeeKind, rule_id: &str, computation: FeeComputation) -> Self {
        SettlementLine {
            kind,
            rule_id: Some(rule_id.to_string()),
            rate: Some(computation.rate),
            amount: computation.amount,
            rule_matched: true,
        }
    }

    fn unmatched(kind: FeeKind) -> Self {
        SettlementLine {
            kind,
            rule_id: None,
            rate: None,
            amount: Money::zero(),
            rule_matched: false,
        }
    }
}

/// The aggregated, itemized monetary outcome of applying commission, fee,
/// and shipping rules to one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Gross order amount.
    pub gross_amount: Money,

    /// Ordered fee line items (commission, fee, shipping, COD).
    pub lines: Vec<SettlementLine>,

    /// Sum of all line amounts.
    pub total_fees: Money,

    /// Gross minus total fees.
    pub net_payable: Money,
}

// =============================================================================
// Settlement Engine
// =============================================================================

/// The Fee Aggregator: three rule catalogs and a pure settlement function
/// over them.
///
/// ## Concurrency
/// `compute_settlement` takes `&self` and mutates nothing: an engine built
/// from one rule snapshot may price any number of orders in parallel.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    /// Marketplace commission rules.
    pub commissions: RuleCatalog<TieredRule>,
    /// Payment/marketplace fee rules.
    pub marketplace_fees: RuleCatalog<TieredRule>,
    /// Shipping-zone tariffs (with COD sub-rules).
    pub shipping: RuleCatalog<ShippingTariff>,
}

impl SettlementEngine {
    /// Creates an engine with three empty catalogs.
    pub fn new() -> Self {
        SettlementEngine::default()
    }

    /// Computes the full settlement breakdown for one order.
    ///
    /// Commission and marketplace fee are charged on the gross amount; the
    /// shipping fee on the parcel weight; the COD fee on the COD amount.
    /// A resolution miss degrades to a zero line flagged
    /// `rule_matched = false`. An evaluator rejection of a freshly resolved
    /// rule is a resolver/evaluator disagreement: logged as an anomaly and
    /// returned as a typed error, never papered over.
    pub fn compute_settlement(&self, order: &OrderContext) -> CoreResult<Settlement> {
        let as_of = order.as_of.unwrap_or_else(Utc::now);
        let ctx = order.resolve_context();

        let mut lines = Vec::with_capacity(4);
        lines.push(amount_line(
            FeeKind::Commission,
            &self.commissions,
            &ctx,
            order.amount,
            as_of,
        )?);
        lines.push(amount_line(
            FeeKind::MarketplaceFee,
            &self.marketplace_fees,
            &ctx,
            order.amount,
            as_of,
        )?);

        if order.weight_grams.is_some() || order.cod_amount.is_some() {
            match self.shipping.resolve(&ctx, as_of) {
                Ok(tariff) => {
                    if let Some(weight) = order.weight_grams {
                        let computation =
                            evaluate_shipping(tariff, weight, order.amount, as_of)
                                .map_err(|source| anomaly(FeeKind::Shipping, tariff, source))?;
                        lines.push(SettlementLine::computed(
                            FeeKind::Shipping,
                            &tariff.id,
                            computation,
                        ));
                    }
                    if let Some(cod_amount) = order.cod_amount {
                        match evaluate_cod(tariff, cod_amount, as_of)
                            .map_err(|source| anomaly(FeeKind::CodFee, tariff, source))?
                        {
                            Some(computation) => lines.push(SettlementLine::computed(
                                FeeKind::CodFee,
                                &tariff.id,
                                computation,
                            )),
                            // Tariff matched but carries no COD sub-rule:
                            // same degradation path as a resolution miss.
                            None => lines.push(SettlementLine::unmatched(FeeKind::CodFee)),
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "no shipping tariff matched; settling at zero");
                    if order.weight_grams.is_some() {
                        lines.push(SettlementLine::unmatched(FeeKind::Shipping));
                    }
                    if order.cod_amount.is_some() {
                        lines.push(SettlementLine::unmatched(FeeKind::CodFee));
                    }
                }
            }
        }

        let total_fees = lines
            .iter()
            .fold(Money::zero(), |total, line| total + line.amount);

        Ok(Settlement {
            gross_amount: order.amount,
            total_fees,
            net_payable: order.amount - total_fees,
            lines,
        })
    }
}

/// Resolves and evaluates one amount-based catalog (commission or fee) into
/// a settlement line.
fn amount_line(
    kind: FeeKind,
    catalog: &RuleCatalog<TieredRule>,
    ctx: &ResolveContext,
    amount: Money,
    as_of: DateTime<Utc>,
) -> CoreResult<SettlementLine> {
    match catalog.resolve(ctx, as_of) {
        Ok(rule) => {
            let computation = evaluate_amount(rule, amount, as_of)
                .map_err(|source| anomaly(kind, rule, source))?;
            Ok(SettlementLine::computed(kind, &rule.id, computation))
        }
        Err(err) => {
            tracing::debug!(kind = %kind, error = %err, "no rule matched; settling line at zero");
            Ok(SettlementLine::unmatched(kind))
        }
    }
}

/// A freshly resolved rule failed the evaluator's re-check. This indicates a
/// resolver/evaluator disagreement and is surfaced loudly.
fn anomaly<R: ScopedRule>(kind: FeeKind, rule: &R, source: EvaluateError) -> CoreError {
    tracing::warn!(
        kind = %kind,
        rule_id = %rule.id(),
        error = %source,
        "resolved rule failed the evaluator re-check"
    );
    CoreError::Evaluate { kind, source }
}

// =============================================================================
// Unit Tests
// =============================================================================
