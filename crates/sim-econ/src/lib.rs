#![deny(warnings)]

//! Economic models: production, click power, pricing and prestige for
//! Nation Incremental.
//!
//! Every function here is a pure read of [`GameState`] plus the static
//! catalogs. They are used both for display and for validating purchases,
//! so none of them mutate state. Numeric degeneracy never escapes: a
//! non-finite rate collapses to 0 and a non-finite click to 1.

use sim_core::catalog::{self, UpgradeDef};
use sim_core::{
    GameState, Premium, ACHIEVEMENT_BONUS, CLICK_GPS_SHARE, EVENT_SHIELD_FLOOR,
    EXECUTIVE_DRIVE_FACTOR, INDUSTRIAL_POLICY_DISCOUNT, PERMANENT_GROWTH_FACTOR, PRESTIGE_BONUS,
    PRESTIGE_DIVISOR,
};

pub mod achievements;
pub mod view;

pub use view::{format_amount, EconomyView};

/// Country production multiplier for an industry: per-industry boost times
/// the global boost, each defaulting to 1.
pub fn production_multiplier(state: &GameState, industry: &str) -> f64 {
    let Some(c) = state.country() else {
        return 1.0;
    };
    c.boosts.production_for(industry).unwrap_or(1.0) * c.boosts.global.unwrap_or(1.0)
}

/// Country cost multiplier for an industry, defaulting to 1.
pub fn cost_multiplier(state: &GameState, industry: &str) -> f64 {
    state
        .country()
        .and_then(|c| c.boosts.cost_for(industry))
        .unwrap_or(1.0)
}

/// Output of a single unit of an industry per second.
pub fn unit_output(state: &GameState, industry: &str) -> f64 {
    match (catalog::industry(industry), state.industry(industry)) {
        (Some(def), Some(s)) => def.base_gps * s.mult * production_multiplier(state, industry),
        _ => 0.0,
    }
}

/// Production of everything owned in one industry per second.
///
/// Unknown ids produce nothing.
pub fn industry_rate(state: &GameState, industry: &str) -> f64 {
    let count = state.industry(industry).map_or(0, |s| s.count);
    unit_output(state, industry) * f64::from(count)
}

/// Event multiplier after the crisis-management floor; 1 when no event runs.
pub fn effective_event_multiplier(state: &GameState) -> f64 {
    let Some(ev) = &state.active_event else {
        return 1.0;
    };
    if ev.mult < 1.0 && state.has_premium(Premium::CrisisManagement) {
        ev.mult.max(EVENT_SHIELD_FLOOR)
    } else {
        ev.mult
    }
}

/// 1 + 5% per prestige point.
pub fn prestige_multiplier(state: &GameState) -> f64 {
    1.0 + state.prestige_points as f64 * PRESTIGE_BONUS
}

/// Total GDP per second with every multiplier applied.
pub fn total_production_rate(state: &GameState) -> f64 {
    let mut sum: f64 = catalog::INDUSTRIES
        .iter()
        .map(|d| industry_rate(state, d.id))
        .sum();
    sum *= 1.0 + state.achievements.len() as f64 * ACHIEVEMENT_BONUS;
    sum *= effective_event_multiplier(state);
    if state.has_premium(Premium::PermanentGrowth) {
        sum *= PERMANENT_GROWTH_FACTOR;
    }
    sum *= prestige_multiplier(state);
    if sum.is_finite() && sum >= 0.0 {
        sum
    } else {
        0.0
    }
}

/// GDP granted by one manual develop action.
pub fn click_power(state: &GameState) -> f64 {
    let mut v = state.click_base.max(1.0) + total_production_rate(state) * CLICK_GPS_SHARE;
    if state.has_premium(Premium::ExecutiveDrive) {
        v *= EXECUTIVE_DRIVE_FACTOR;
    }
    if v.is_finite() {
        v
    } else {
        1.0
    }
}

/// Price of the next unit of an industry, or `None` for an unknown id.
pub fn next_cost(state: &GameState, industry: &str) -> Option<f64> {
    let def = catalog::industry(industry)?;
    let owned = state.industry(industry).map_or(0, |s| s.count);
    let mut cost = def.base_cost * def.cost_growth.powf(f64::from(owned));
    cost *= cost_multiplier(state, industry);
    if state.has_premium(Premium::IndustrialPolicy) {
        cost *= INDUSTRIAL_POLICY_DISCOUNT;
    }
    Some(cost.ceil())
}

/// Influence a prestige would grant for a given lifetime total.
pub fn prestige_gain_for(lifetime: f64) -> u64 {
    (lifetime.max(0.0) / PRESTIGE_DIVISOR).sqrt().floor() as u64
}

/// Influence a prestige would grant right now.
pub fn prestige_gain(state: &GameState) -> u64 {
    prestige_gain_for(state.total_gained)
}

pub fn can_afford_industry(state: &GameState, industry: &str) -> bool {
    next_cost(state, industry).is_some_and(|c| state.gdp >= c)
}

/// Whether an upgrade is offered: not yet bought and its visibility gate holds.
pub fn upgrade_visible(state: &GameState, u: &UpgradeDef) -> bool {
    !state.upgrades_bought.contains(&u.id) && state.requirement_met(&u.visible)
}

/// Whether an upgrade can be bought right now.
pub fn upgrade_purchasable(state: &GameState, u: &UpgradeDef) -> bool {
    !state.upgrades_bought.contains(&u.id)
        && state.gdp >= u.cost
        && state.requirement_met(&u.purchasable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::ActiveEvent;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    fn with_event(state: &mut GameState, mult: f64) {
        state.active_event = Some(ActiveEvent {
            id: "test".into(),
            name: "Test".into(),
            desc: String::new(),
            mult,
            end_time: 0,
        });
    }

    #[test]
    fn usa_farm_rate() {
        let mut s = GameState::new(0);
        s.country_id = Some("usa".into());
        s.industries.get_mut("farm").unwrap().count = 1;
        assert!(approx(industry_rate(&s, "farm"), 0.105));
        assert!(approx(production_multiplier(&s, "tech"), 1.15 * 1.05));
    }

    #[test]
    fn unknown_industry_produces_nothing() {
        let s = GameState::new(0);
        assert_eq!(industry_rate(&s, "mining"), 0.0);
        assert_eq!(next_cost(&s, "mining"), None);
    }

    #[test]
    fn prestige_multiplier_and_gain() {
        let mut s = GameState::new(0);
        s.prestige_points = 4;
        assert!(approx(prestige_multiplier(&s), 1.20));
        s.total_gained = 16_000_000.0;
        assert_eq!(prestige_gain(&s), 4);
        assert_eq!(prestige_gain_for(0.0), 0);
        assert_eq!(prestige_gain_for(999_999.0), 0);
        assert_eq!(prestige_gain_for(1_000_000.0), 1);
        assert_eq!(prestige_gain_for(4_000_000.0), 2);
        assert_eq!(prestige_gain_for(-5.0), 0);
    }

    #[test]
    fn crisis_management_softens_negative_events() {
        let mut s = GameState::new(0);
        with_event(&mut s, 0.65);
        assert_eq!(effective_event_multiplier(&s), 0.65);
        s.premium_bought.insert(Premium::CrisisManagement.id().into());
        assert_eq!(effective_event_multiplier(&s), 0.85);
        with_event(&mut s, 1.30);
        assert_eq!(effective_event_multiplier(&s), 1.30);
    }

    #[test]
    fn total_rate_stacks_all_multipliers() {
        let mut s = GameState::new(0);
        s.industries.get_mut("factory").unwrap().count = 10;
        s.achievements.insert("a_first_buy".into());
        s.achievements.insert("a_country".into());
        s.premium_bought.insert(Premium::PermanentGrowth.id().into());
        s.prestige_points = 2;
        with_event(&mut s, 1.20);
        let expected = 10.0 * 1.02 * 1.20 * 1.10 * 1.10;
        assert!(approx(total_production_rate(&s), expected));
    }

    #[test]
    fn non_finite_rate_collapses_to_zero() {
        let mut s = GameState::new(0);
        s.industries.get_mut("farm").unwrap().count = 1;
        s.industries.get_mut("farm").unwrap().mult = f64::INFINITY;
        assert_eq!(total_production_rate(&s), 0.0);
        assert_eq!(click_power(&s), 1.0);
    }

    #[test]
    fn click_power_uses_base_floor_and_gps_share() {
        let mut s = GameState::new(0);
        s.click_base = 0.5;
        assert_eq!(click_power(&s), 1.0);
        s.click_base = 2.0;
        s.industries.get_mut("factory").unwrap().count = 100;
        assert!(approx(click_power(&s), 3.0));
        s.premium_bought.insert(Premium::ExecutiveDrive.id().into());
        assert!(approx(click_power(&s), 4.5));
    }

    #[test]
    fn costs_apply_country_and_policy_discounts() {
        let mut s = GameState::new(0);
        assert_eq!(next_cost(&s, "farm"), Some(10.0));
        s.industries.get_mut("farm").unwrap().count = 1;
        assert_eq!(next_cost(&s, "farm"), Some(12.0));
        s.country_id = Some("chn".into());
        assert_eq!(next_cost(&s, "factory"), Some(95.0));
        s.premium_bought.insert(Premium::IndustrialPolicy.id().into());
        assert_eq!(next_cost(&s, "factory"), Some((100.0f64 * 0.95 * 0.95).ceil()));
    }

    #[test]
    fn costs_follow_real_exponent() {
        let mut s = GameState::new(0);
        s.industries.get_mut("research").unwrap().count = 111;
        assert_eq!(next_cost(&s, "research"), Some(386_470_290_673_737.0));
        s.industries.get_mut("farm").unwrap().count = 193;
        assert_eq!(next_cost(&s, "farm"), Some(5_184_217_195_598.0));
    }

    #[test]
    fn huge_counts_never_become_free() {
        let mut s = GameState::new(0);
        s.gdp = f64::MAX;
        s.industries.get_mut("farm").unwrap().count = 3_000_000_000;
        let cost = next_cost(&s, "farm").unwrap();
        assert!(cost > 1e300);
        assert!(!can_afford_industry(&s, "farm"));
    }

    #[test]
    fn upgrade_gates() {
        let mut s = GameState::new(0);
        let u = catalog::upgrade("u_farm_10").unwrap();
        assert!(!upgrade_visible(&s, u));
        s.industries.get_mut("farm").unwrap().count = 7;
        assert!(upgrade_visible(&s, u));
        s.gdp = 1e9;
        assert!(!upgrade_purchasable(&s, u));
        s.industries.get_mut("farm").unwrap().count = 10;
        assert!(upgrade_purchasable(&s, u));
        s.upgrades_bought.insert(u.id.clone());
        assert!(!upgrade_visible(&s, u));
        assert!(!upgrade_purchasable(&s, u));
    }

    proptest! {
        #[test]
        fn next_cost_strictly_increases(idx in 0usize..6, owned in 0u32..400,
                                        country in 0usize..11, discount in any::<bool>()) {
            let def = &catalog::INDUSTRIES[idx];
            let mut s = GameState::new(0);
            s.country_id = catalog::COUNTRIES.get(country).map(|c| c.id.to_string());
            if discount {
                s.premium_bought.insert(Premium::IndustrialPolicy.id().into());
            }
            s.industries.get_mut(def.id).unwrap().count = owned;
            let a = next_cost(&s, def.id).unwrap();
            s.industries.get_mut(def.id).unwrap().count = owned + 1;
            let b = next_cost(&s, def.id).unwrap();
            prop_assert!(b > a);
        }

        #[test]
        fn rate_is_finite_and_non_negative(counts in proptest::collection::vec(0u32..2_000, 6),
                                           achievements in 0usize..6,
                                           event in proptest::option::of(0usize..5),
                                           points in 0u64..10_000,
                                           shield in any::<bool>()) {
            let mut s = GameState::new(0);
            for (def, n) in catalog::INDUSTRIES.iter().zip(counts) {
                s.industries.get_mut(def.id).unwrap().count = n;
            }
            for a in catalog::ACHIEVEMENTS.iter().take(achievements) {
                s.achievements.insert(a.id.to_string());
            }
            if let Some(i) = event {
                s.active_event = Some(ActiveEvent::from_def(&catalog::EVENTS[i], 0));
            }
            if shield {
                s.premium_bought.insert(Premium::CrisisManagement.id().into());
            }
            s.prestige_points = points;
            let r = total_production_rate(&s);
            prop_assert!(r.is_finite());
            prop_assert!(r >= 0.0);
        }

        #[test]
        fn prestige_gain_is_monotonic(a in 0.0f64..1e15, b in 0.0f64..1e15) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(prestige_gain_for(lo) <= prestige_gain_for(hi));
        }
    }
}
