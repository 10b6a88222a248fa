//! # Scope Resolver
//!
//! In-memory rule catalog plus the priority fallback search that picks the
//! single best-matching active rule for a request context.
//!
//! ## Priority Fallback
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Resolution Order (first match wins)                     │
//! │                                                                         │
//! │  context.shop_id set? ──► SHOP rule for that shop,                     │
//! │       │ no match           active + effective at as_of                  │
//! │       ▼                                                                 │
//! │  context.category_id? ──► CATEGORY rule for that category              │
//! │       │ no match                                                        │
//! │       ▼                                                                 │
//! │  GLOBAL rule ───────────► platform-wide default                        │
//! │       │ no match                                                        │
//! │       ▼                                                                 │
//! │  ResolveError::NotFound  (caller decides: zero line item or hard fail) │
//! │                                                                         │
//! │  Ties at one level break to the most recently modified rule.           │
//! │  An inactive or expired SHOP rule does NOT block the fallback:         │
//! │  the most specific *active* rule always wins.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! A catalog is an immutable snapshot during evaluation: resolution never
//! mutates rules, so any number of orders may resolve against the same
//! catalog concurrently. Writers (the external admin collaborator) build a
//! new snapshot; they never mutate one mid-flight.

use chrono::{DateTime, Utc};

use crate::error::{ResolveError, ValidationError};
use crate::rule::{RuleScope, ScopedRule};

// =============================================================================
// Resolve Context
// =============================================================================

/// The scope coordinates of a request: which shop and category an order
/// belongs to. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveContext {
    pub shop_id: Option<String>,
    pub category_id: Option<String>,
}

impl ResolveContext {
    /// A context with neither shop nor category (global rules only).
    pub fn global() -> Self {
        ResolveContext::default()
    }

    /// A context for a shop and category pair.
    pub fn new(shop_id: impl Into<String>, category_id: impl Into<String>) -> Self {
        ResolveContext {
            shop_id: Some(shop_id.into()),
            category_id: Some(category_id.into()),
        }
    }

    /// A shop-only context.
    pub fn for_shop(shop_id: impl Into<String>) -> Self {
        ResolveContext {
            shop_id: Some(shop_id.into()),
            category_id: None,
        }
    }

    /// A category-only context.
    pub fn for_category(category_id: impl Into<String>) -> Self {
        ResolveContext {
            shop_id: None,
            category_id: Some(category_id.into()),
        }
    }
}

// =============================================================================
// Rule Catalog
// =============================================================================

/// An in-memory index of rules of one kind (commission, fee, or shipping).
///
/// ## Invariants
/// - Every held rule passed structural validation at insert time
/// - Rules are retired by closing their window, never removed (audit trail)
#[derive(Debug, Clone)]
pub struct RuleCatalog<R: ScopedRule> {
    rules: Vec<R>,
}

impl<R: ScopedRule> Default for RuleCatalog<R> {
    fn default() -> Self {
        RuleCatalog::new()
    }
}

impl<R: ScopedRule> RuleCatalog<R> {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        RuleCatalog { rules: Vec::new() }
    }

    /// Validates and inserts a rule. A rule held by a catalog is therefore
    /// structurally valid by construction.
    pub fn insert(&mut self, rule: R) -> Result<(), ValidationError> {
        rule.validate()?;
        self.rules.push(rule);
        Ok(())
    }

    /// Retires the rule with `rule_id` at `at` by closing its effective
    /// window. Returns whether a rule was found.
    pub fn retire(&mut self, rule_id: &str, at: DateTime<Utc>) -> bool {
        match self.rules.iter_mut().find(|rule| rule.id() == rule_id) {
            Some(rule) => {
                rule.retire(at);
                true
            }
            None => false,
        }
    }

    /// Number of rules held, including retired ones.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog holds no rules at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over all held rules, including retired ones.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rules.iter()
    }

    /// Finds the single best-matching rule for `ctx` at `as_of`.
    ///
    /// Fixed priority fallback, first match wins:
    /// 1. SHOP rule for `ctx.shop_id` (when set)
    /// 2. CATEGORY rule for `ctx.category_id` (when set)
    /// 3. GLOBAL rule
    ///
    /// At every level only rules that are active and effective at `as_of`
    /// count; ties break to the most recently modified. A miss at every
    /// level is `NotFound`; the caller must treat that as "no applicable
    /// rule", not as zero-cost.
    pub fn resolve(&self, ctx: &ResolveContext, as_of: DateTime<Utc>) -> Result<&R, ResolveError> {
        if let Some(shop_id) = &ctx.shop_id {
            let found = self.best_match(as_of, |scope| {
                matches!(scope, RuleScope::Shop(id) if id == shop_id)
            });
            if let Some(rule) = found {
                return Ok(rule);
            }
        }

        if let Some(category_id) = &ctx.category_id {
            let found = self.best_match(as_of, |scope| {
                matches!(scope, RuleScope::Category(id) if id == category_id)
            });
            if let Some(rule) = found {
                return Ok(rule);
            }
        }

        if let Some(rule) = self.best_match(as_of, |scope| matches!(scope, RuleScope::Global)) {
            return Ok(rule);
        }

        Err(ResolveError::NotFound {
            shop_id: ctx.shop_id.clone(),
            category_id: ctx.category_id.clone(),
        })
    }

    /// The most recently modified rule at one scope level that is active
    /// and effective at `as_of`.
    fn best_match(
        &self,
        as_of: DateTime<Utc>,
        scope_matches: impl Fn(&RuleScope) -> bool,
    ) -> Option<&R> {
        self.rules
            .iter()
            .filter(|rule| {
                rule.is_active() && rule.is_effective_at(as_of) && scope_matches(rule.scope())
            })
            .max_by_key(|rule| rule.updated_at())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
