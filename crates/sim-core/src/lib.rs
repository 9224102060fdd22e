#![deny(warnings)]

//! Core domain models and invariants for Nation Incremental.
//!
//! This crate holds the static catalogs, the serializable run state and the
//! fixed numeric rules of the economy, with validation helpers that check
//! the catalog invariants the formulas rely on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

pub mod catalog;
pub mod state;

pub use catalog::{
    AchievementDef, AchievementRule, CountryBoosts, CountryDef, EventDef, IndustryDef, Premium,
    PremiumDef, Requirement, UpgradeDef, UpgradeEffect,
};
pub use state::{fresh_industries, ActiveEvent, GameState, IndustryState, Millis};

/// Version tag written into every saved record.
pub const SAVE_VERSION: u32 = 3;

/// Calendar year a run starts in.
pub const START_YEAR: f64 = 1970.0;
/// Calendar year that ends a run.
pub const END_YEAR: f64 = 2020.0;
/// In-game years per real second.
pub const YEARS_PER_SECOND: f64 = 0.5;

/// Ceiling on real seconds accrued by a single live tick.
pub const MAX_TICK_SECS: f64 = 1.0;

/// Production bonus per unlocked achievement.
pub const ACHIEVEMENT_BONUS: f64 = 0.01;
/// Production bonus per prestige point.
pub const PRESTIGE_BONUS: f64 = 0.05;
/// Lifetime GDP that yields the first prestige point.
pub const PRESTIGE_DIVISOR: f64 = 1_000_000.0;
/// Share of production added to each click.
pub const CLICK_GPS_SHARE: f64 = 0.01;

/// Lowest multiplier a negative event can apply under crisis management.
pub const EVENT_SHIELD_FLOOR: f64 = 0.85;
pub const PERMANENT_GROWTH_FACTOR: f64 = 1.10;
pub const EXECUTIVE_DRIVE_FACTOR: f64 = 1.5;
pub const INDUSTRIAL_POLICY_DISCOUNT: f64 = 0.95;
/// Starting GDP of a run with the sovereign wealth fund.
pub const SOVEREIGN_FUND_GDP: f64 = 50_000.0;

/// Delay window between an event slot opening and the next trigger.
pub const EVENT_DELAY_MIN_MS: Millis = 20_000;
pub const EVENT_DELAY_MAX_MS: Millis = 40_000;

/// Runtime knobs. Economy constants are not configurable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Live tick cadence in milliseconds.
    pub tick_ms: u64,
    /// Seconds between autosaves.
    pub autosave_secs: u64,
    /// Seed for the event RNG; entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            autosave_secs: 10,
            rng_seed: None,
        }
    }
}

/// Validation errors for catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Two entries of one table share an id.
    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),
    /// A boost or upgrade names an industry that does not exist.
    #[error("unknown industry referenced: {0}")]
    UnknownIndustry(String),
    /// Cost growth must be strictly greater than one.
    #[error("cost growth of {0} must be > 1")]
    CostGrowthTooLow(String),
    /// Costs, rates, multipliers and durations must be > 0.
    #[error("non-positive value in {0}")]
    NonPositive(String),
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
}

fn check_positive(value: f64, what: &str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositive(what.to_string()));
    }
    Ok(())
}

fn check_industry_ref(id: &str) -> Result<(), ValidationError> {
    catalog::industry(id)
        .map(|_| ())
        .ok_or_else(|| ValidationError::UnknownIndustry(id.to_string()))
}

/// Validate an industry definition.
pub fn validate_industry(d: &IndustryDef) -> Result<(), ValidationError> {
    check_positive(d.base_cost, d.id)?;
    check_positive(d.base_gps, d.id)?;
    if !d.cost_growth.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    if d.cost_growth <= 1.0 {
        return Err(ValidationError::CostGrowthTooLow(d.id.to_string()));
    }
    Ok(())
}

/// Validate a country's boosts against the industry table.
pub fn validate_country(c: &CountryDef) -> Result<(), ValidationError> {
    if let Some(g) = c.boosts.global {
        check_positive(g, c.id)?;
    }
    for (id, m) in c.boosts.production.iter().chain(c.boosts.cost) {
        check_industry_ref(id)?;
        check_positive(*m, c.id)?;
    }
    Ok(())
}

/// Validate an event definition.
pub fn validate_event(e: &EventDef) -> Result<(), ValidationError> {
    check_positive(e.mult, e.id)?;
    if e.duration_secs == 0 {
        return Err(ValidationError::NonPositive(e.id.to_string()));
    }
    Ok(())
}

/// Validate an upgrade's price, gates and effect.
pub fn validate_upgrade(u: &UpgradeDef) -> Result<(), ValidationError> {
    check_positive(u.cost, &u.id)?;
    for req in [&u.visible, &u.purchasable] {
        if let Requirement::IndustryCount { industry, .. } = req {
            check_industry_ref(industry)?;
        }
    }
    match &u.effect {
        UpgradeEffect::IndustryMultiplier { industry, factor } => {
            check_industry_ref(industry)?;
            check_positive(*factor, &u.id)
        }
        UpgradeEffect::AllIndustriesMultiplier(f) | UpgradeEffect::ClickBaseMultiplier(f) => {
            check_positive(*f, &u.id)
        }
    }
}

fn check_unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), ValidationError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Validate every catalog, including cross-references and unique ids.
pub fn validate_catalog() -> Result<(), ValidationError> {
    for d in catalog::INDUSTRIES {
        validate_industry(d)?;
    }
    for c in catalog::COUNTRIES {
        validate_country(c)?;
    }
    for e in catalog::EVENTS {
        validate_event(e)?;
    }
    for u in catalog::UPGRADES.iter() {
        validate_upgrade(u)?;
    }
    for p in catalog::PREMIUMS {
        if p.cost == 0 {
            return Err(ValidationError::NonPositive(p.id().to_string()));
        }
    }
    check_unique(catalog::INDUSTRIES.iter().map(|d| d.id))?;
    check_unique(catalog::COUNTRIES.iter().map(|d| d.id))?;
    check_unique(catalog::ACHIEVEMENTS.iter().map(|d| d.id))?;
    check_unique(catalog::PREMIUMS.iter().map(|d| d.id()))?;
    check_unique(catalog::EVENTS.iter().map(|d| d.id))?;
    check_unique(catalog::UPGRADES.iter().map(|d| d.id.as_str()))?;
    debug!(
        industries = catalog::INDUSTRIES.len(),
        upgrades = catalog::UPGRADES.len(),
        "catalog validated"
    );
    Ok(())
}
