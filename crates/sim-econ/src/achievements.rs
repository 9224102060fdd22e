//! Achievement predicates and unlocking.

use sim_core::catalog::{AchievementDef, AchievementRule, ACHIEVEMENTS};
use sim_core::GameState;
use tracing::info;

use crate::total_production_rate;

pub fn rule_met(state: &GameState, rule: &AchievementRule) -> bool {
    match rule {
        AchievementRule::CountryChosen => state.country_id.is_some(),
        AchievementRule::AnyIndustryOwned => state.industries.values().any(|s| s.count > 0),
        AchievementRule::ProductionAtLeast(min) => total_production_rate(state) >= *min,
        AchievementRule::LifetimeGainedAtLeast(min) => state.total_gained >= *min,
        AchievementRule::AnyIndustryCountAtLeast(min) => {
            state.industries.values().any(|s| s.count >= *min)
        }
    }
}

/// Unlocks every locked achievement whose rule now holds and returns the
/// newly unlocked definitions in catalog order.
///
/// Rules are evaluated against the state as it was on entry, so one unlock
/// cannot cascade into another within the same call.
pub fn unlock_new(state: &mut GameState) -> Vec<&'static AchievementDef> {
    let fresh: Vec<&'static AchievementDef> = ACHIEVEMENTS
        .iter()
        .filter(|a| !state.achievements.contains(a.id) && rule_met(state, &a.rule))
        .collect();
    for a in &fresh {
        state.achievements.insert(a.id.to_string());
        info!(id = a.id, name = a.name, "achievement unlocked");
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_unlocks_nothing() {
        let mut s = GameState::new(0);
        assert!(unlock_new(&mut s).is_empty());
        assert!(s.achievements.is_empty());
    }

    #[test]
    fn country_and_first_buy_unlock_once() {
        let mut s = GameState::new(0);
        s.country_id = Some("deu".into());
        s.industries.get_mut("farm").unwrap().count = 1;
        let ids: Vec<_> = unlock_new(&mut s).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a_country", "a_first_buy"]);
        assert!(unlock_new(&mut s).is_empty());
        assert_eq!(s.achievements.len(), 2);
    }

    #[test]
    fn production_and_lifetime_thresholds() {
        let mut s = GameState::new(0);
        s.industries.get_mut("factory").unwrap().count = 10;
        s.total_gained = 1_000_000.0;
        let ids: Vec<_> = unlock_new(&mut s).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a_first_buy", "a_10_gps", "a_1m_gdp"]);
    }

    #[test]
    fn hundred_of_anything() {
        let mut s = GameState::new(0);
        s.achievements.insert("a_first_buy".into());
        s.industries.get_mut("research").unwrap().count = 100;
        let ids: Vec<_> = unlock_new(&mut s).iter().map(|a| a.id).collect();
        assert!(ids.contains(&"a_100_any"));
    }
}
