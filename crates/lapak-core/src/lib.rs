//! # lapak-core: Pure Pricing & Settlement Logic for Lapak
//!
//! This crate is the **heart** of the Lapak marketplace's monetary pipeline.
//! It resolves which commission, marketplace-fee, and shipping rules apply
//! to an order and computes an itemized settlement, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lapak Settlement Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Order Service / Admin Backend (external)           │   │
//! │  │   loads rule snapshots ── builds OrderContext ── stores result  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process call                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lapak-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   rule    │  │ resolver  │  │ evaluator │  │settlement │  │   │
//! │  │   │  scopes   │  │  priority │  │   tier    │  │ aggregate │  │   │
//! │  │   │  tiers    │  │  fallback │  │  lookup   │  │ breakdown │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Rule persistence, HTTP routing, auth, and the admin UI are external   │
//! │  collaborators; they exchange serialized snapshots with this core.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`rule`] - Rule data model (scopes, tiers, brackets, tariffs)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`validation`] - Structural rule validation (the Rule Store contract)
//! - [`resolver`] - Scope Resolver with SHOP > CATEGORY > GLOBAL fallback
//! - [`evaluator`] - Tier Evaluator (bracket lookup + fee math)
//! - [`settlement`] - Fee Aggregator producing `Settlement` breakdowns
//! - [`format`] - Stateless presentation formatting
//! - [`error`] - Typed error taxonomy
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every evaluation is deterministic over
//!    (rule snapshot, input, as_of) - same input = same output
//! 2. **Immutable Snapshots**: rules are never mutated mid-evaluation, so
//!    concurrent callers need no locks
//! 3. **Integer Money**: whole rupiah in i64, percentage math in basis
//!    points, rounded half-up exactly once per computation
//! 4. **Explicit Errors**: all failures are typed; a missing rule degrades
//!    to a flagged zero line, never a hidden default rate
//!
//! ## Example Usage
//!
//! ```rust
//! use lapak_core::money::{FeeRate, Money};
//! use lapak_core::rule::{RuleScope, TieredRule};
//! use lapak_core::settlement::{OrderContext, SettlementEngine};
//!
//! let mut engine = SettlementEngine::new();
//! engine
//!     .commissions
//!     .insert(TieredRule::flat_percentage(
//!         RuleScope::Global,
//!         FeeRate::from_bps(500), // 5%
//!     ))
//!     .unwrap();
//!
//! let settlement = engine
//!     .compute_settlement(&OrderContext::new(Money::new(1_000_000)))
//!     .unwrap();
//!
//! // 5% commission on Rp1.000.000
//! assert_eq!(settlement.lines[0].amount.amount(), 50_000);
//! assert_eq!(settlement.net_payable.amount(), 950_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod evaluator;
pub mod format;
pub mod money;
pub mod resolver;
pub mod rule;
pub mod settlement;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lapak_core::Money` instead of
// `use lapak_core::money::Money`

pub use error::{CoreError, CoreResult, EvaluateError, ResolveError, ValidationError};
pub use evaluator::{evaluate_amount, evaluate_cod, evaluate_shipping, FeeComputation};
pub use money::{FeeRate, Money};
pub use resolver::{ResolveContext, RuleCatalog};
pub use rule::{
    CodFeeRule, RateTier, RuleScope, ScopedRule, ShippingTariff, TierRate, TieredRule,
    WeightBracket,
};
pub use settlement::{FeeKind, OrderContext, Settlement, SettlementEngine, SettlementLine};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum percentage rate a rule may carry, in basis points (100%).
///
/// ## Business Reason
/// A commission or fee above the full order amount is always an authoring
/// mistake; the store rejects it before it can reach a catalog.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Maximum number of tiers (or weight brackets) per rule.
///
/// ## Business Reason
/// Real tariff schedules top out around a dozen brackets. The cap keeps
/// tier lookup trivially O(n) and rejects runaway rule definitions from
/// bulk imports. Can be made configurable per-tenant in future versions.
pub const MAX_TIERS_PER_RULE: usize = 50;
