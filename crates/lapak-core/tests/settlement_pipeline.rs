//! End-to-end tests of the resolve → evaluate → aggregate pipeline,
//! driving the public API the same way the order service does.

use chrono::{DateTime, TimeZone, Utc};
use lapak_core::{
    CodFeeRule, FeeKind, FeeRate, Money, OrderContext, RateTier, RuleScope, Settlement,
    SettlementEngine, ShippingTariff, TierRate, TieredRule, WeightBracket,
};

fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap()
}

fn standard_tariff(scope: RuleScope) -> ShippingTariff {
    let mut tariff = ShippingTariff::new(
        scope,
        Money::new(15_000),
        vec![
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
        ],
    );
    tariff.cod_fee = Some(CodFeeRule {
        rate: TierRate::Percentage(FeeRate::from_bps(200)), // 2%
        min_fee: Money::new(5_000),
    });
    tariff
}

/// An engine resembling a production catalog: global defaults plus a
/// negotiated shop override and a category override.
fn marketplace_engine() -> SettlementEngine {
    let mut engine = SettlementEngine::new();

    engine
        .commissions
        .insert(TieredRule::flat_percentage(
            RuleScope::Global,
            FeeRate::from_bps(500), // 5%
        ))
        .unwrap();
    engine
        .commissions
        .insert(TieredRule::flat_percentage(
            RuleScope::Category("fashion".into()),
            FeeRate::from_bps(800), // 8%
        ))
        .unwrap();
    engine
        .commissions
        .insert(TieredRule::flat_percentage(
            RuleScope::Shop("mega-store".into()),
            FeeRate::from_bps(250), // negotiated 2.5%
        ))
        .unwrap();

    engine
        .marketplace_fees
        .insert(TieredRule::new(
            RuleScope::Global,
            vec![
                RateTier {
                    min: Money::zero(),
                    max: Some(Money::new(500_000)),
                    rate: TierRate::Percentage(FeeRate::from_bps(100)), // 1%
                },
                RateTier {
                    min: Money::new(500_000),
                    max: None,
                    rate: TierRate::Fixed(Money::new(5_000)),
                },
            ],
        ))
        .unwrap();

    engine
        .shipping
        .insert(standard_tariff(RuleScope::Global))
        .unwrap();

    engine
}

fn line(settlement: &Settlement, kind: FeeKind) -> &lapak_core::SettlementLine {
    settlement
        .lines
        .iter()
        .find(|line| line.kind == kind)
        .expect("line present")
}

#[test]
fn global_commission_scenario() {
    // GLOBAL commission 5%, order amount Rp1.000.000, no overrides for
    // this shop/category pair → commission line item Rp50.000.
    let engine = marketplace_engine();
    let order = OrderContext {
        shop_id: Some("small-shop".into()),
        category_id: Some("electronics".into()),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(1_000_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();
    let commission = line(&settlement, FeeKind::Commission);

    assert_eq!(commission.amount.amount(), 50_000);
    assert!(commission.rule_matched);
    assert!(commission.rule_id.is_some());
}

#[test]
fn shop_override_wins_over_category_and_global() {
    let engine = marketplace_engine();
    let order = OrderContext {
        shop_id: Some("mega-store".into()),
        category_id: Some("fashion".into()),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(1_000_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();
    assert_eq!(line(&settlement, FeeKind::Commission).amount.amount(), 25_000);
}

#[test]
fn expired_shop_override_falls_back_to_category() {
    let mut engine = marketplace_engine();

    // Retire the shop override as of March 5th
    let shop_rule_id = engine
        .commissions
        .iter()
        .find(|rule| matches!(rule.scope, RuleScope::Shop(_)))
        .unwrap()
        .id
        .clone();
    assert!(engine.commissions.retire(&shop_rule_id, march(5)));

    let order = OrderContext {
        shop_id: Some("mega-store".into()),
        category_id: Some("fashion".into()),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(1_000_000))
    };

    // The expired 2.5% rule must not block the 8% category rule
    let settlement = engine.compute_settlement(&order).unwrap();
    assert_eq!(line(&settlement, FeeKind::Commission).amount.amount(), 80_000);
}

#[test]
fn marketplace_fee_crosses_into_fixed_tier() {
    let engine = marketplace_engine();

    // Below the tier boundary: 1% percentage tier
    let below = engine
        .compute_settlement(&OrderContext {
            as_of: Some(march(10)),
            ..OrderContext::new(Money::new(400_000))
        })
        .unwrap();
    assert_eq!(line(&below, FeeKind::MarketplaceFee).amount.amount(), 4_000);

    // On the boundary: the upper, fixed tier (half-open lower bound)
    let on_boundary = engine
        .compute_settlement(&OrderContext {
            as_of: Some(march(10)),
            ..OrderContext::new(Money::new(500_000))
        })
        .unwrap();
    assert_eq!(
        line(&on_boundary, FeeKind::MarketplaceFee).amount.amount(),
        5_000
    );
}

#[test]
fn shipping_boundary_weight_scenario() {
    // Brackets [0-5kg: +0], (5kg-∞: +10.000], base Rp15.000, weight 5.0 kg
    // → Rp15.000: the boundary weight stays in the lower bracket.
    let engine = marketplace_engine();
    let order = OrderContext {
        weight_grams: Some(5_000),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(100_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();
    assert_eq!(line(&settlement, FeeKind::Shipping).amount.amount(), 15_000);
}

#[test]
fn free_shipping_threshold_overrides_weight() {
    let mut engine = marketplace_engine();
    engine.shipping = lapak_core::RuleCatalog::new();
    let mut tariff = standard_tariff(RuleScope::Global);
    tariff.free_shipping_threshold = Some(Money::new(250_000));
    engine.shipping.insert(tariff).unwrap();

    let order = OrderContext {
        weight_grams: Some(30_000), // 30 kg
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(250_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();
    let shipping = line(&settlement, FeeKind::Shipping);
    assert!(shipping.amount.is_zero());
    assert!(shipping.rule_matched); // priced by a rule, not a degradation
}

#[test]
fn cod_fee_floor_scenario() {
    // COD 2% with min Rp5.000 on a Rp100.000 COD amount → max(2.000, 5.000)
    let engine = marketplace_engine();
    let order = OrderContext {
        weight_grams: Some(1_000),
        cod_amount: Some(Money::new(100_000)),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(100_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();
    assert_eq!(line(&settlement, FeeKind::CodFee).amount.amount(), 5_000);
}

#[test]
fn rounding_scenario_round_half_up_once() {
    // 10% of Rp333 is 33.3 → Rp33, rounded once at the end
    let mut engine = SettlementEngine::new();
    engine
        .commissions
        .insert(TieredRule::flat_percentage(
            RuleScope::Global,
            FeeRate::from_bps(1_000),
        ))
        .unwrap();

    let settlement = engine
        .compute_settlement(&OrderContext {
            as_of: Some(march(10)),
            ..OrderContext::new(Money::new(333))
        })
        .unwrap();
    assert_eq!(line(&settlement, FeeKind::Commission).amount.amount(), 33);
}

#[test]
fn empty_catalogs_settle_to_flagged_zero_lines() {
    let engine = SettlementEngine::new();
    let order = OrderContext {
        weight_grams: Some(2_000),
        cod_amount: Some(Money::new(50_000)),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(750_000))
    };

    let settlement = engine.compute_settlement(&order).unwrap();

    assert_eq!(settlement.lines.len(), 4);
    assert!(settlement.lines.iter().all(|line| !line.rule_matched));
    assert!(settlement.total_fees.is_zero());
    assert_eq!(settlement.net_payable.amount(), 750_000);
}

#[test]
fn settlement_is_idempotent_under_repeated_calls() {
    let engine = marketplace_engine();
    let order = OrderContext {
        shop_id: Some("mega-store".into()),
        category_id: Some("fashion".into()),
        weight_grams: Some(5_000),
        cod_amount: Some(Money::new(1_000_000)),
        as_of: Some(march(10)),
        ..OrderContext::new(Money::new(1_000_000))
    };

    let first = engine.compute_settlement(&order).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.compute_settlement(&order).unwrap(), first);
    }
}
