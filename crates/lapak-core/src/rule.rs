//! # Rule Data Model
//!
//! Domain types for the Rule Store: scoped, time-bounded, tiered pricing
//! rules shared by the commission, marketplace-fee, and shipping catalogs.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Rule Types                                      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TieredRule    │   │ ShippingTariff  │   │   RuleScope     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  Global         │       │
//! │  │  scope          │   │  scope          │   │  Shop(id)       │       │
//! │  │  tiers          │   │  base_fee       │   │  Category(id)   │       │
//! │  │  fixed_component│   │  brackets       │   └─────────────────┘       │
//! │  │  effective_*    │   │  cod_fee        │                             │
//! │  │  is_active      │   │  free threshold │   ┌─────────────────┐       │
//! │  └─────────────────┘   │  effective_*    │   │   TierRate      │       │
//! │                        │  is_active      │   │  ─────────────  │       │
//! │   commission + fee     └─────────────────┘   │  Percentage(bps)│       │
//! │   catalogs share the                         │  Fixed(Money)   │       │
//! │   TieredRule shape                           └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! Rules are created and updated by the external administrative collaborator;
//! this engine only reads immutable snapshots. Retirement is modeled by
//! setting `effective_to` or `is_active = false`, never by physical removal,
//! so the audit trail survives. A rule is never mutated mid-evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::{FeeRate, Money};
use crate::validation;

// =============================================================================
// Rule Scope
// =============================================================================

/// The specificity level of a pricing rule.
///
/// Modeled as a tagged union so scope/reference consistency holds by
/// construction: a `Shop` scope always carries exactly its shop id and a
/// `Global` scope cannot carry a stray reference. The only residual
/// structural check is that the carried reference is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "scope", content = "reference", rename_all = "snake_case")]
pub enum RuleScope {
    /// Platform-wide default.
    Global,
    /// Applies to a single shop.
    Shop(String),
    /// Applies to a product category.
    Category(String),
}

impl RuleScope {
    /// Resolution precedence: SHOP > CATEGORY > GLOBAL.
    #[inline]
    pub const fn precedence(&self) -> u8 {
        match self {
            RuleScope::Shop(_) => 2,
            RuleScope::Category(_) => 1,
            RuleScope::Global => 0,
        }
    }

    /// The reference carried by a scoped variant.
    pub fn reference(&self) -> Option<&str> {
        match self {
            RuleScope::Global => None,
            RuleScope::Shop(id) | RuleScope::Category(id) => Some(id.as_str()),
        }
    }

    /// Lowercase label for messages and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            RuleScope::Global => "global",
            RuleScope::Shop(_) => "shop",
            RuleScope::Category(_) => "category",
        }
    }
}

// =============================================================================
// Rates, Tiers, Brackets
// =============================================================================

/// How a tier (or COD sub-rule) turns its input into a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TierRate {
    /// Fee = input × rate, rounded half-up once.
    Percentage(FeeRate),
    /// Fee = the absolute value, regardless of input size.
    Fixed(Money),
}

/// One amount bracket of a tiered commission or marketplace-fee rule.
///
/// Amount tiers partition `[0, ∞)` half-open: a tier matches when
/// `min <= amount < max`, and only the last tier has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateTier {
    /// Inclusive lower bound.
    pub min: Money,
    /// Exclusive upper bound; `None` = unbounded (last tier only).
    pub max: Option<Money>,
    /// Rate applied to the full input amount.
    pub rate: TierRate,
}

impl RateTier {
    /// Half-open membership: `min <= amount` and (`max` unbounded or
    /// `amount < max`). An order amount exactly on a boundary belongs to
    /// the upper tier.
    #[inline]
    pub fn contains(&self, amount: Money) -> bool {
        amount >= self.min && self.max.map_or(true, |max| amount < max)
    }
}

/// One weight bracket of a shipping tariff.
///
/// Weight brackets are upper-inclusive: scanning in ascending order, the
/// first bracket whose upper bound is unbounded or `weight <= max_grams`
/// wins, so a parcel weighing exactly a boundary value stays in the lower
/// bracket and zero-weight shipments land in the first bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeightBracket {
    /// Lower bound in grams; the first bracket must start at 0.
    pub min_grams: i64,
    /// Inclusive upper bound in grams; `None` = unbounded (last bracket only).
    pub max_grams: Option<i64>,
    /// Surcharge added on top of the tariff's base fee.
    pub surcharge: Money,
}

/// Cash-on-delivery fee sub-rule attached to a shipping tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CodFeeRule {
    /// Percentage of the COD amount, or a flat fee.
    pub rate: TierRate,
    /// Floor: the computed fee is raised to at least this amount.
    pub min_fee: Money,
}

// =============================================================================
// Scoped Rule Trait
// =============================================================================

/// The seam shared by every rule kind so the Scope Resolver and the
/// evaluator's activation re-check stay generic over commission, fee, and
/// shipping rules.
pub trait ScopedRule {
    fn id(&self) -> &str;
    fn scope(&self) -> &RuleScope;
    fn is_active(&self) -> bool;
    fn effective_from(&self) -> Option<DateTime<Utc>>;
    fn effective_to(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// Structural validation in a fixed order: scope reference, tier
    /// contiguity, numeric ranges, time window. First violation wins.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Retires the rule at `at` by closing its effective window.
    /// Retirement never deletes: the audit trail keeps the rule visible.
    fn retire(&mut self, at: DateTime<Utc>);

    /// Half-open effective window check: `from <= as_of < to`, with either
    /// end open when unset.
    fn is_effective_at(&self, as_of: DateTime<Utc>) -> bool {
        let started = self.effective_from().map_or(true, |from| from <= as_of);
        let not_ended = self.effective_to().map_or(true, |to| as_of < to);
        started && not_ended
    }
}

// =============================================================================
// Tiered Rule (commission & marketplace fee)
// =============================================================================

/// A scoped, time-bounded, tiered pricing rule over order amounts.
///
/// Both the commission catalog and the marketplace-fee catalog hold this
/// shape; only the catalog they live in distinguishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TieredRule {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Specificity level plus its reference.
    pub scope: RuleScope,

    /// Contiguous amount tiers, ascending, last unbounded.
    pub tiers: Vec<RateTier>,

    /// Optional flat charge added after the tier computation.
    pub fixed_component: Option<Money>,

    /// Start of the half-open validity interval; `None` = open-ended.
    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,

    /// End of the half-open validity interval; `None` = open-ended.
    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,

    /// Kill switch independent of the time window.
    pub is_active: bool,

    /// When the rule was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the rule was last modified. Resolution tie-break key.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl TieredRule {
    /// Creates an active, open-ended rule with a fresh UUID.
    pub fn new(scope: RuleScope, tiers: Vec<RateTier>) -> Self {
        let now = Utc::now();
        TieredRule {
            id: Uuid::new_v4().to_string(),
            scope,
            tiers,
            fixed_component: None,
            effective_from: None,
            effective_to: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Convenience: a single unbounded percentage tier.
    pub fn flat_percentage(scope: RuleScope, rate: FeeRate) -> Self {
        TieredRule::new(
            scope,
            vec![RateTier {
                min: Money::zero(),
                max: None,
                rate: TierRate::Percentage(rate),
            }],
        )
    }
}

impl ScopedRule for TieredRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &RuleScope {
        &self.scope
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn effective_from(&self) -> Option<DateTime<Utc>> {
        self.effective_from
    }

    fn effective_to(&self) -> Option<DateTime<Utc>> {
        self.effective_to
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_scope(&self.scope)?;
        validation::validate_rate_tiers(&self.tiers)?;
        for (index, tier) in self.tiers.iter().enumerate() {
            validation::validate_tier_rate(&format!("tier {index} rate"), &tier.rate)?;
        }
        if let Some(fixed) = self.fixed_component {
            validation::validate_non_negative("fixed_component", fixed)?;
        }
        validation::validate_window(self.effective_from, self.effective_to)?;
        Ok(())
    }

    fn retire(&mut self, at: DateTime<Utc>) {
        self.effective_to = Some(at);
        self.updated_at = at;
    }
}

// =============================================================================
// Shipping Tariff
// =============================================================================

/// A scoped shipping-zone tariff: base fee plus weight-bracket surcharges,
/// with an optional COD fee sub-rule and free-shipping threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingTariff {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Specificity level plus its reference.
    pub scope: RuleScope,

    /// Charged for every shipment before bracket surcharges.
    pub base_fee: Money,

    /// Contiguous weight brackets, ascending, last unbounded.
    pub brackets: Vec<WeightBracket>,

    /// Cash-on-delivery fee sub-rule, when the tariff supports COD.
    pub cod_fee: Option<CodFeeRule>,

    /// Orders at or above this value ship free, regardless of weight.
    pub free_shipping_threshold: Option<Money>,

    /// Start of the half-open validity interval; `None` = open-ended.
    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,

    /// End of the half-open validity interval; `None` = open-ended.
    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,

    /// Kill switch independent of the time window.
    pub is_active: bool,

    /// When the tariff was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the tariff was last modified. Resolution tie-break key.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ShippingTariff {
    /// Creates an active, open-ended tariff with a fresh UUID.
    pub fn new(scope: RuleScope, base_fee: Money, brackets: Vec<WeightBracket>) -> Self {
        let now = Utc::now();
        ShippingTariff {
            id: Uuid::new_v4().to_string(),
            scope,
            base_fee,
            brackets,
            cod_fee: None,
            free_shipping_threshold: None,
            effective_from: None,
            effective_to: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ScopedRule for ShippingTariff {
    fn id(&self) -> &str {
        &self.id
    }

    fn scope(&self) -> &RuleScope {
        &self.scope
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn effective_from(&self) -> Option<DateTime<Utc>> {
        self.effective_from
    }

    fn effective_to(&self) -> Option<DateTime<Utc>> {
        self.effective_to
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_scope(&self.scope)?;
        validation::validate_weight_brackets(&self.brackets)?;
        validation::validate_non_negative("base_fee", self.base_fee)?;
        for (index, bracket) in self.brackets.iter().enumerate() {
            validation::validate_non_negative(
                &format!("bracket {index} surcharge"),
                bracket.surcharge,
            )?;
        }
        if let Some(cod) = &self.cod_fee {
            validation::validate_tier_rate("cod_fee rate", &cod.rate)?;
            validation::validate_non_negative("cod_fee min_fee", cod.min_fee)?;
        }
        if let Some(threshold) = self.free_shipping_threshold {
            validation::validate_non_negative("free_shipping_threshold", threshold)?;
        }
        validation::validate_window(self.effective_from, self.effective_to)?;
        Ok(())
    }

    fn retire(&mut self, at: DateTime<Utc>) {
        self.effective_to = Some(at);
        self.updated_at = at;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
