//! The mutable run state and the mutations that keep its invariants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CountryDef, EventDef, Premium, Requirement, UpgradeEffect, INDUSTRIES};
use crate::{END_YEAR, SAVE_VERSION, START_YEAR, YEARS_PER_SECOND};

/// Wall-clock milliseconds since the Unix epoch.
pub type Millis = i64;

/// Ownership of one industry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustryState {
    /// Units owned.
    pub count: u32,
    /// Local multiplier from upgrades (>= 1).
    pub mult: f64,
}

impl Default for IndustryState {
    fn default() -> Self {
        Self {
            count: 0,
            mult: 1.0,
        }
    }
}

/// The event currently modulating production.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEvent {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub mult: f64,
    /// Absolute expiry.
    pub end_time: Millis,
}

impl ActiveEvent {
    pub fn from_def(def: &EventDef, now: Millis) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            desc: def.desc.to_string(),
            mult: def.mult,
            end_time: now.saturating_add(i64::from(def.duration_secs) * 1_000),
        }
    }

    /// Whole seconds until expiry, rounded up.
    pub fn remaining_secs(&self, now: Millis) -> u64 {
        let ms = self.end_time.saturating_sub(now).max(0) as u64;
        ms.div_ceil(1_000)
    }
}

/// Full state of a player's economy.
///
/// Field names serialize in camelCase; this is the persisted record shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub version: u32,
    /// Spendable GDP.
    pub gdp: f64,
    /// GDP gained this run; drives achievements and prestige gain.
    pub total_gained: f64,
    pub country_id: Option<String>,
    /// Wall-clock time of the last accrual.
    pub last_tick: Millis,
    pub click_base: f64,
    pub industries: BTreeMap<String, IndustryState>,
    pub upgrades_bought: BTreeSet<String>,
    pub achievements: BTreeSet<String>,
    /// Influence.
    pub prestige_points: u64,
    pub premium_bought: BTreeSet<String>,
    pub current_year: f64,
    pub end_game: bool,
    pub active_event: Option<ActiveEvent>,
    pub next_event_at: Option<Millis>,
    pub debug: bool,
}

impl GameState {
    /// Factory-fresh state.
    pub fn new(now: Millis) -> Self {
        Self {
            version: SAVE_VERSION,
            gdp: 0.0,
            total_gained: 0.0,
            country_id: None,
            last_tick: now,
            click_base: 1.0,
            industries: fresh_industries(),
            upgrades_bought: BTreeSet::new(),
            achievements: BTreeSet::new(),
            prestige_points: 0,
            premium_bought: BTreeSet::new(),
            current_year: START_YEAR,
            end_game: false,
            active_event: None,
            next_event_at: None,
            debug: false,
        }
    }

    pub fn country(&self) -> Option<&'static CountryDef> {
        self.country_id.as_deref().and_then(catalog::country)
    }

    pub fn industry(&self, id: &str) -> Option<&IndustryState> {
        self.industries.get(id)
    }

    pub fn has_premium(&self, premium: Premium) -> bool {
        self.premium_bought.contains(premium.id())
    }

    /// Adds produced GDP to both the balance and the lifetime total.
    pub fn credit(&mut self, amount: f64) {
        self.gdp += amount;
        self.total_gained += amount;
    }

    pub fn requirement_met(&self, req: &Requirement) -> bool {
        match req {
            Requirement::Always => true,
            Requirement::IndustryCount { industry, at_least } => self
                .industry(industry)
                .is_some_and(|s| f64::from(s.count) >= *at_least),
            Requirement::LifetimeGained(min) => self.total_gained >= *min,
        }
    }

    pub fn apply_effect(&mut self, effect: &UpgradeEffect) {
        match effect {
            UpgradeEffect::IndustryMultiplier { industry, factor } => {
                if let Some(s) = self.industries.get_mut(*industry) {
                    s.mult *= factor;
                }
            }
            UpgradeEffect::AllIndustriesMultiplier(factor) => {
                for s in self.industries.values_mut() {
                    s.mult *= factor;
                }
            }
            UpgradeEffect::ClickBaseMultiplier(factor) => self.click_base *= factor,
        }
    }

    /// Moves the calendar forward by `secs` of real time.
    ///
    /// Returns true only on the call that latches the end of the run; once
    /// ended, the calendar no longer moves.
    pub fn advance_calendar(&mut self, secs: f64) -> bool {
        if self.end_game {
            return false;
        }
        self.current_year += YEARS_PER_SECOND * secs.max(0.0);
        if self.current_year >= END_YEAR {
            self.current_year = END_YEAR;
            self.end_game = true;
            return true;
        }
        false
    }

    /// Clears run progress while keeping country, achievements, premiums
    /// and influence.
    pub fn reset_run(&mut self) {
        self.industries = fresh_industries();
        self.gdp = 0.0;
        self.total_gained = 0.0;
        self.click_base = 1.0;
        self.upgrades_bought.clear();
        self.end_game = false;
        self.current_year = START_YEAR;
        self.active_event = None;
        self.next_event_at = None;
    }
}

/// One zeroed entry per catalog industry.
pub fn fresh_industries() -> BTreeMap<String, IndustryState> {
    INDUSTRIES
        .iter()
        .map(|d| (d.id.to_string(), IndustryState::default()))
        .collect()
}
