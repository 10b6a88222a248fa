//! # Presentation Formatting
//!
//! Stateless formatting helpers for the (external) presentation layer.
//!
//! The admin frontend shows rules as "5%" or "Rp15.000 + Rp10.000/bracket";
//! those strings are derived display data, not part of the decision engine,
//! so they live here as pure functions the presentation layer calls. Nothing
//! in the resolver, evaluator, or aggregator depends on this module.

use crate::money::{group_thousands, FeeRate, Money};
use crate::rule::{RateTier, TierRate};

/// Formats a monetary value for display: `Rp1.000.000`.
pub fn format_money(money: Money) -> String {
    money.to_string()
}

/// Formats a percentage rate: whole percentages as `5%`, fractional ones
/// with two decimals as `2.50%`.
pub fn format_fee_rate(rate: FeeRate) -> String {
    if rate.bps() % 100 == 0 {
        format!("{}%", rate.bps() / 100)
    } else {
        format!("{:.2}%", rate.percentage())
    }
}

/// Formats a tier rate: `5%` or `Rp2.500`.
pub fn format_rate(rate: &TierRate) -> String {
    match rate {
        TierRate::Percentage(rate) => format_fee_rate(*rate),
        TierRate::Fixed(fee) => format_money(*fee),
    }
}

/// Formats an amount tier as a range with its rate:
/// `Rp0 - Rp500.000: 5%` or `Rp500.000+: 3%`.
pub fn format_tier(tier: &RateTier) -> String {
    match tier.max {
        Some(max) => format!(
            "{} - {}: {}",
            format_money(tier.min),
            format_money(max),
            format_rate(&tier.rate)
        ),
        None => format!("{}+: {}", format_money(tier.min), format_rate(&tier.rate)),
    }
}

/// Formats a weight in grams as kilograms: `5000` → `5 kg`, `2500` → `2.5 kg`.
pub fn format_weight(grams: i64) -> String {
    if grams % 1000 == 0 {
        format!("{} kg", group_thousands(grams / 1000))
    } else {
        format!("{:.1} kg", grams as f64 / 1000.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Money::new(1_000_000)), "Rp1.000.000");
        assert_eq!(format_money(Money::new(0)), "Rp0");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_fee_rate(FeeRate::from_bps(500)), "5%");
        assert_eq!(format_fee_rate(FeeRate::from_bps(250)), "2.50%");
        assert_eq!(
            format_rate(&TierRate::Fixed(Money::new(2_500))),
            "Rp2.500"
        );
    }

    #[test]
    fn test_format_tier() {
        let bounded = RateTier {
            min: Money::zero(),
            max: Some(Money::new(500_000)),
            rate: TierRate::Percentage(FeeRate::from_bps(500)),
        };
        assert_eq!(format_tier(&bounded), "Rp0 - Rp500.000: 5%");

        let open = RateTier {
            min: Money::new(500_000),
            max: None,
            rate: TierRate::Percentage(FeeRate::from_bps(300)),
        };
        assert_eq!(format_tier(&open), "Rp500.000+: 3%");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(5_000), "5 kg");
        assert_eq!(format_weight(2_500), "2.5 kg");
        assert_eq!(format_weight(0), "0 kg");
    }
}
