//! Static reference data for the economy.
//!
//! Every table here is immutable. Behavior attached to an entry (achievement
//! predicates, upgrade gates and effects) is described as data and interpreted
//! by [`crate::GameState`] and the derivation engine.

use once_cell::sync::Lazy;

/// A purchasable production source.
#[derive(Clone, Debug, PartialEq)]
pub struct IndustryDef {
    /// Stable identifier used as the key in saved state.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub desc: &'static str,
    /// Price of the first unit.
    pub base_cost: f64,
    /// Geometric cost growth per owned unit (> 1).
    pub cost_growth: f64,
    /// Production per unit per second before multipliers.
    pub base_gps: f64,
}

pub const INDUSTRIES: &[IndustryDef] = &[
    IndustryDef {
        id: "farm",
        name: "Agriculture",
        desc: "Basic food production",
        base_cost: 10.0,
        cost_growth: 1.15,
        base_gps: 0.10,
    },
    IndustryDef {
        id: "factory",
        name: "Manufacturing",
        desc: "Mass production of goods",
        base_cost: 100.0,
        cost_growth: 1.17,
        base_gps: 1.0,
    },
    IndustryDef {
        id: "tech",
        name: "Technology",
        desc: "Software and innovation",
        base_cost: 1_000.0,
        cost_growth: 1.18,
        base_gps: 8.0,
    },
    IndustryDef {
        id: "finance",
        name: "Finance",
        desc: "Capital and markets",
        base_cost: 10_000.0,
        cost_growth: 1.19,
        base_gps: 50.0,
    },
    IndustryDef {
        id: "energy",
        name: "Energy",
        desc: "Power generation",
        base_cost: 50_000.0,
        cost_growth: 1.20,
        base_gps: 200.0,
    },
    IndustryDef {
        id: "research",
        name: "R&D",
        desc: "Long-term breakthroughs",
        base_cost: 250_000.0,
        cost_growth: 1.21,
        base_gps: 900.0,
    },
];

/// Multipliers granted by a nation.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryBoosts {
    /// Applies to every industry's production.
    pub global: Option<f64>,
    /// Per-industry production multipliers.
    pub production: &'static [(&'static str, f64)],
    /// Per-industry cost multipliers.
    pub cost: &'static [(&'static str, f64)],
}

impl CountryBoosts {
    pub fn production_for(&self, industry: &str) -> Option<f64> {
        lookup(self.production, industry)
    }

    pub fn cost_for(&self, industry: &str) -> Option<f64> {
        lookup(self.cost, industry)
    }
}

fn lookup(table: &[(&'static str, f64)], key: &str) -> Option<f64> {
    table.iter().find(|(id, _)| *id == key).map(|(_, v)| *v)
}

/// A selectable nation.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Short flag label, e.g. "US".
    pub flag: &'static str,
    pub boosts: CountryBoosts,
}

pub const COUNTRIES: &[CountryDef] = &[
    CountryDef {
        id: "usa",
        name: "United States",
        flag: "US",
        boosts: CountryBoosts {
            global: Some(1.05),
            production: &[("tech", 1.15), ("finance", 1.10)],
            cost: &[],
        },
    },
    CountryDef {
        id: "chn",
        name: "China",
        flag: "CN",
        boosts: CountryBoosts {
            global: None,
            production: &[("factory", 1.20)],
            cost: &[("factory", 0.95)],
        },
    },
    CountryDef {
        id: "jpn",
        name: "Japan",
        flag: "JP",
        boosts: CountryBoosts {
            global: None,
            production: &[("tech", 1.15), ("energy", 1.05)],
            cost: &[],
        },
    },
    CountryDef {
        id: "deu",
        name: "Germany",
        flag: "DE",
        boosts: CountryBoosts {
            global: None,
            production: &[("factory", 1.15)],
            cost: &[],
        },
    },
    CountryDef {
        id: "ind",
        name: "India",
        flag: "IN",
        boosts: CountryBoosts {
            global: None,
            production: &[("farm", 1.25), ("tech", 1.05)],
            cost: &[],
        },
    },
    CountryDef {
        id: "gbr",
        name: "United Kingdom",
        flag: "UK",
        boosts: CountryBoosts {
            global: Some(1.05),
            production: &[("finance", 1.15)],
            cost: &[],
        },
    },
    CountryDef {
        id: "fra",
        name: "France",
        flag: "FR",
        boosts: CountryBoosts {
            global: None,
            production: &[("finance", 1.10), ("farm", 1.10)],
            cost: &[],
        },
    },
    CountryDef {
        id: "ita",
        name: "Italy",
        flag: "IT",
        boosts: CountryBoosts {
            global: None,
            production: &[("farm", 1.10)],
            cost: &[],
        },
    },
    CountryDef {
        id: "can",
        name: "Canada",
        flag: "CA",
        boosts: CountryBoosts {
            global: None,
            production: &[("energy", 1.15), ("farm", 1.10)],
            cost: &[],
        },
    },
    CountryDef {
        id: "kor",
        name: "South Korea",
        flag: "KR",
        boosts: CountryBoosts {
            global: None,
            production: &[("tech", 1.20), ("factory", 1.05)],
            cost: &[],
        },
    },
];

/// Unlock condition for an achievement.
#[derive(Clone, Debug, PartialEq)]
pub enum AchievementRule {
    CountryChosen,
    AnyIndustryOwned,
    /// Total production rate at or above the threshold.
    ProductionAtLeast(f64),
    /// Lifetime GDP gained at or above the threshold.
    LifetimeGainedAtLeast(f64),
    AnyIndustryCountAtLeast(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub rule: AchievementRule,
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "a_country",
        name: "Nation Chosen",
        desc: "Select a country",
        rule: AchievementRule::CountryChosen,
    },
    AchievementDef {
        id: "a_first_buy",
        name: "First Investment",
        desc: "Buy your first industry",
        rule: AchievementRule::AnyIndustryOwned,
    },
    AchievementDef {
        id: "a_10_gps",
        name: "Humming Economy",
        desc: "Reach 10 GPS",
        rule: AchievementRule::ProductionAtLeast(10.0),
    },
    AchievementDef {
        id: "a_1m_gdp",
        name: "Millionaire Nation",
        desc: "Earn 1,000,000 total GDP",
        rule: AchievementRule::LifetimeGainedAtLeast(1_000_000.0),
    },
    AchievementDef {
        id: "a_100_any",
        name: "Industrialist",
        desc: "Own 100 of any industry",
        rule: AchievementRule::AnyIndustryCountAtLeast(100),
    },
];

/// Permanent upgrades bought with influence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Premium {
    PermanentGrowth,
    ExecutiveDrive,
    CrisisManagement,
    IndustrialPolicy,
    SovereignWealthFund,
}

impl Premium {
    /// Identifier stored in saved state.
    pub const fn id(self) -> &'static str {
        match self {
            Premium::PermanentGrowth => "p_global1",
            Premium::ExecutiveDrive => "p_click1",
            Premium::CrisisManagement => "p_eventShield",
            Premium::IndustrialPolicy => "p_discount",
            Premium::SovereignWealthFund => "p_start1",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PremiumDef {
    pub kind: Premium,
    pub name: &'static str,
    pub desc: &'static str,
    /// Price in influence.
    pub cost: u64,
}

impl PremiumDef {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

pub const PREMIUMS: &[PremiumDef] = &[
    PremiumDef {
        kind: Premium::PermanentGrowth,
        name: "Permanent Growth",
        desc: "+10% global production (permanent)",
        cost: 5,
    },
    PremiumDef {
        kind: Premium::ExecutiveDrive,
        name: "Executive Drive",
        desc: "+50% click power (permanent)",
        cost: 3,
    },
    PremiumDef {
        kind: Premium::CrisisManagement,
        name: "Crisis Management",
        desc: "Negative events softened (min 0.85x)",
        cost: 4,
    },
    PremiumDef {
        kind: Premium::IndustrialPolicy,
        name: "Industrial Policy",
        desc: "-5% industry costs (permanent)",
        cost: 5,
    },
    PremiumDef {
        kind: Premium::SovereignWealthFund,
        name: "Sovereign Wealth Fund",
        desc: "Start each run with $50,000",
        cost: 2,
    },
];

/// A temporary global production multiplier.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDef {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub mult: f64,
    pub duration_secs: u32,
}

pub const EVENTS: &[EventDef] = &[
    EventDef {
        id: "pandemic",
        name: "Pandemic",
        desc: "Public health crisis reduces output temporarily (-25%).",
        mult: 0.75,
        duration_secs: 15,
    },
    EventDef {
        id: "war",
        name: "Regional Conflict",
        desc: "Instability reduces output (-35%).",
        mult: 0.65,
        duration_secs: 12,
    },
    EventDef {
        id: "tech_boom",
        name: "Tech Boom",
        desc: "Innovation surge increases output (+30%).",
        mult: 1.30,
        duration_secs: 12,
    },
    EventDef {
        id: "resource_boom",
        name: "Commodity Windfall",
        desc: "Resource prices spike (+20%).",
        mult: 1.20,
        duration_secs: 10,
    },
    EventDef {
        id: "financial_crisis",
        name: "Financial Crisis",
        desc: "Markets tumble (-30%).",
        mult: 0.70,
        duration_secs: 10,
    },
];

/// Gate evaluated against the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum Requirement {
    Always,
    IndustryCount {
        industry: &'static str,
        at_least: f64,
    },
    LifetimeGained(f64),
}

/// What buying an upgrade does.
#[derive(Clone, Debug, PartialEq)]
pub enum UpgradeEffect {
    IndustryMultiplier {
        industry: &'static str,
        factor: f64,
    },
    AllIndustriesMultiplier(f64),
    ClickBaseMultiplier(f64),
}

/// A one-shot GDP-priced upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub cost: f64,
    /// When the upgrade is offered.
    pub visible: Requirement,
    /// When the offered upgrade may be bought.
    pub purchasable: Requirement,
    pub effect: UpgradeEffect,
}

/// Owned counts that unlock a doubling upgrade for each industry.
pub const MILESTONES: [u32; 4] = [10, 25, 50, 100];

const MILESTONE_COST_FACTOR: f64 = 5.0;
const MILESTONE_VISIBLE_SHARE: f64 = 0.7;

pub static UPGRADES: Lazy<Vec<UpgradeDef>> = Lazy::new(build_upgrades);

fn build_upgrades() -> Vec<UpgradeDef> {
    let mut out = Vec::with_capacity(INDUSTRIES.len() * MILESTONES.len() + 3);
    for ind in INDUSTRIES {
        for milestone in MILESTONES {
            out.push(UpgradeDef {
                id: format!("u_{}_{}", ind.id, milestone),
                name: format!("{} x2 @ {}", ind.name, milestone),
                desc: format!("Double {} output once you own {}.", ind.name, milestone),
                cost: (ind.base_cost
                    * ind.cost_growth.powf(f64::from(milestone))
                    * MILESTONE_COST_FACTOR)
                    .floor(),
                visible: Requirement::IndustryCount {
                    industry: ind.id,
                    at_least: f64::from(milestone) * MILESTONE_VISIBLE_SHARE,
                },
                purchasable: Requirement::IndustryCount {
                    industry: ind.id,
                    at_least: f64::from(milestone),
                },
                effect: UpgradeEffect::IndustryMultiplier {
                    industry: ind.id,
                    factor: 2.0,
                },
            });
        }
    }
    out.push(global_upgrade(
        "u_global_1",
        "Economic Reforms",
        "All production +10%",
        50_000.0,
        10_000.0,
        UpgradeEffect::AllIndustriesMultiplier(1.10),
    ));
    out.push(global_upgrade(
        "u_click_1",
        "Digitalization Drive",
        "Click power +100%",
        30_000.0,
        5_000.0,
        UpgradeEffect::ClickBaseMultiplier(2.0),
    ));
    out.push(global_upgrade(
        "u_global_2",
        "Free Trade Network",
        "All production +20%",
        1_000_000.0,
        250_000.0,
        UpgradeEffect::AllIndustriesMultiplier(1.20),
    ));
    out
}

fn global_upgrade(
    id: &str,
    name: &str,
    desc: &str,
    cost: f64,
    visible_at: f64,
    effect: UpgradeEffect,
) -> UpgradeDef {
    UpgradeDef {
        id: id.to_string(),
        name: name.to_string(),
        desc: desc.to_string(),
        cost,
        visible: Requirement::LifetimeGained(visible_at),
        purchasable: Requirement::Always,
        effect,
    }
}

pub fn industry(id: &str) -> Option<&'static IndustryDef> {
    INDUSTRIES.iter().find(|d| d.id == id)
}

pub fn country(id: &str) -> Option<&'static CountryDef> {
    COUNTRIES.iter().find(|d| d.id == id)
}

pub fn achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|d| d.id == id)
}

pub fn premium(id: &str) -> Option<&'static PremiumDef> {
    PREMIUMS.iter().find(|d| d.id() == id)
}

pub fn event(id: &str) -> Option<&'static EventDef> {
    EVENTS.iter().find(|d| d.id == id)
}

pub fn upgrade(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|d| d.id == id)
}
