//! Read-only projection of the economy for a presentation layer.

use serde::Serialize;
use sim_core::catalog::{ACHIEVEMENTS, INDUSTRIES, PREMIUMS, UPGRADES};
use sim_core::{GameState, Millis};

use crate::{
    can_afford_industry, click_power, next_cost, prestige_gain, prestige_multiplier,
    total_production_rate, unit_output, upgrade_purchasable, upgrade_visible,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndustryView {
    pub id: &'static str,
    pub name: &'static str,
    pub count: u32,
    pub output_each: f64,
    pub next_cost: f64,
    pub affordable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpgradeView {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub cost: f64,
    pub affordable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PremiumView {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u64,
    pub owned: bool,
    pub affordable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AchievementView {
    pub id: &'static str,
    pub name: &'static str,
    pub unlocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventView {
    pub name: String,
    pub desc: String,
    pub mult: f64,
    pub remaining_secs: u64,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EconomyView {
    pub gdp: f64,
    pub total_gained: f64,
    pub gps: f64,
    pub click_power: f64,
    pub country: Option<&'static str>,
    pub year: u32,
    pub ended: bool,
    pub prestige_points: u64,
    pub prestige_multiplier: f64,
    pub prestige_gain: u64,
    pub industries: Vec<IndustryView>,
    /// Visible, not yet bought upgrades.
    pub upgrades: Vec<UpgradeView>,
    pub premiums: Vec<PremiumView>,
    pub achievements: Vec<AchievementView>,
    pub event: Option<EventView>,
}

impl EconomyView {
    pub fn build(state: &GameState, now: Millis) -> Self {
        let industries = INDUSTRIES
            .iter()
            .map(|d| IndustryView {
                id: d.id,
                name: d.name,
                count: state.industry(d.id).map_or(0, |s| s.count),
                output_each: unit_output(state, d.id),
                next_cost: next_cost(state, d.id).unwrap_or(f64::INFINITY),
                affordable: can_afford_industry(state, d.id),
            })
            .collect();
        let upgrades = UPGRADES
            .iter()
            .filter(|u| upgrade_visible(state, u))
            .map(|u| UpgradeView {
                id: u.id.as_str(),
                name: u.name.as_str(),
                desc: u.desc.as_str(),
                cost: u.cost,
                affordable: upgrade_purchasable(state, u),
            })
            .collect();
        let premiums = PREMIUMS
            .iter()
            .map(|p| {
                let owned = state.has_premium(p.kind);
                PremiumView {
                    id: p.id(),
                    name: p.name,
                    cost: p.cost,
                    owned,
                    affordable: !owned && state.prestige_points >= p.cost,
                }
            })
            .collect();
        let achievements = ACHIEVEMENTS
            .iter()
            .map(|a| AchievementView {
                id: a.id,
                name: a.name,
                unlocked: state.achievements.contains(a.id),
            })
            .collect();
        let event = state.active_event.as_ref().map(|ev| EventView {
            name: ev.name.clone(),
            desc: ev.desc.clone(),
            mult: ev.mult,
            remaining_secs: ev.remaining_secs(now),
        });
        Self {
            gdp: state.gdp,
            total_gained: state.total_gained,
            gps: total_production_rate(state),
            click_power: click_power(state),
            country: state.country().map(|c| c.id),
            year: state.current_year.floor() as u32,
            ended: state.end_game,
            prestige_points: state.prestige_points,
            prestige_multiplier: prestige_multiplier(state),
            prestige_gain: prestige_gain(state),
            industries,
            upgrades,
            premiums,
            achievements,
            event,
        }
    }
}

const UNITS: [&str; 6] = ["K", "M", "B", "T", "Qa", "Qi"];

/// Compact display of a GDP amount, e.g. `1.23M`.
pub fn format_amount(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let sign = if n < 0.0 { "-" } else { "" };
    let mut v = n.abs();
    if v < 1_000.0 {
        return if v < 10.0 {
            format!("{sign}{v:.2}")
        } else if v < 100.0 {
            format!("{sign}{v:.1}")
        } else {
            format!("{sign}{v:.0}")
        };
    }
    v /= 1_000.0;
    let mut unit = 0;
    while v >= 1_000.0 && unit < UNITS.len() - 1 {
        v /= 1_000.0;
        unit += 1;
    }
    format!("{sign}{v:.2}{}", UNITS[unit])
}
