//! Player intents.
//!
//! Every handler checks all of its preconditions before touching state, so a
//! rejected command leaves the state exactly as it was.

use persistence::{import_text, CodecError, OfflineReport};
use rand::Rng;
use sim_core::catalog::{self, UPGRADES};
use sim_core::{GameState, Millis, Premium, END_YEAR, SOVEREIGN_FUND_GDP};
use sim_econ::{click_power, next_cost, prestige_gain, prestige_multiplier, total_production_rate};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::start_random;
use crate::notice::{Notice, NoticeSink};
use crate::tick::{check_achievements, run_complete_notice};

const DEBUG_GRANT: f64 = 1_000_000.0;
const DEBUG_FAST_FORWARD_SECS: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    BuyIndustry(String),
    BuyUpgrade(String),
    BuyPremium(String),
    ChooseCountry(String),
    /// Manual click.
    Develop,
    Prestige,
    /// Exported save text.
    ImportState(String),
    HardReset,
    Debug(DebugCommand),
}

/// Tools gated behind the debug flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugCommand {
    /// Always allowed.
    SetEnabled(bool),
    AddMoney,
    AdvanceYear,
    TriggerEvent,
    UnlockUpgrades,
    FastForward,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Receipt {
    IndustryBought { id: String, cost: f64, count: u32 },
    UpgradeBought { id: String, cost: f64 },
    PremiumBought { id: String, cost: u64 },
    CountryChosen { id: &'static str },
    Developed { gained: f64 },
    Prestiged { gained_points: u64, multiplier: f64 },
    Imported(OfflineReport),
    Reset,
    Debug(DebugCommand),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown id: {0}")]
    UnknownId(String),
    #[error("cannot afford: costs {cost}, have {have}")]
    Unaffordable { cost: f64, have: f64 },
    #[error("already owned: {0}")]
    AlreadyOwned(String),
    #[error("requirement not met for {0}")]
    RequirementUnmet(String),
    #[error("nothing to prestige yet")]
    NothingToPrestige,
    #[error("country already chosen: {0}")]
    CountryLocked(String),
    #[error("debug tools are disabled")]
    DebugDisabled,
    #[error("import failed: {0}")]
    Import(#[from] CodecError),
}

/// Applies one command, then unlocks any achievements it made reachable.
pub fn execute<R, S>(
    state: &mut GameState,
    cmd: Command,
    now: Millis,
    rng: &mut R,
    sink: &mut S,
) -> Result<Receipt, CommandError>
where
    R: Rng + ?Sized,
    S: NoticeSink + ?Sized,
{
    let label = format!("{cmd:?}");
    let result = match cmd {
        Command::BuyIndustry(id) => buy_industry(state, id),
        Command::BuyUpgrade(id) => buy_upgrade(state, id, sink),
        Command::BuyPremium(id) => buy_premium(state, id, sink),
        Command::ChooseCountry(id) => choose_country(state, &id),
        Command::Develop => {
            let gained = click_power(state);
            state.credit(gained);
            Ok(Receipt::Developed { gained })
        }
        Command::Prestige => prestige(state, sink),
        Command::ImportState(text) => import(state, &text, now, sink),
        Command::HardReset => {
            *state = GameState::new(now);
            info!("progress wiped");
            sink.push(Notice::flash("Progress wiped. Choose a new country."));
            Ok(Receipt::Reset)
        }
        Command::Debug(d) => debug_command(state, d, now, rng, sink),
    };
    match &result {
        Ok(_) => {
            debug!(command = %label, "command applied");
            check_achievements(state, sink);
        }
        Err(e) => debug!(command = %label, error = %e, "command rejected"),
    }
    result
}

fn buy_industry(state: &mut GameState, id: String) -> Result<Receipt, CommandError> {
    let cost = next_cost(state, &id).ok_or_else(|| CommandError::UnknownId(id.clone()))?;
    if state.gdp < cost {
        return Err(CommandError::Unaffordable {
            cost,
            have: state.gdp,
        });
    }
    let entry = state
        .industries
        .get_mut(&id)
        .ok_or_else(|| CommandError::UnknownId(id.clone()))?;
    entry.count = entry.count.saturating_add(1);
    let count = entry.count;
    state.gdp -= cost;
    Ok(Receipt::IndustryBought { id, cost, count })
}

fn buy_upgrade<S: NoticeSink + ?Sized>(
    state: &mut GameState,
    id: String,
    sink: &mut S,
) -> Result<Receipt, CommandError> {
    let u = catalog::upgrade(&id).ok_or_else(|| CommandError::UnknownId(id.clone()))?;
    if state.upgrades_bought.contains(&u.id) {
        return Err(CommandError::AlreadyOwned(id));
    }
    if !state.requirement_met(&u.purchasable) {
        return Err(CommandError::RequirementUnmet(id));
    }
    if state.gdp < u.cost {
        return Err(CommandError::Unaffordable {
            cost: u.cost,
            have: state.gdp,
        });
    }
    state.gdp -= u.cost;
    state.apply_effect(&u.effect);
    state.upgrades_bought.insert(u.id.clone());
    sink.push(Notice::flash(format!("Purchased: {}", u.name)));
    Ok(Receipt::UpgradeBought { id, cost: u.cost })
}

fn buy_premium<S: NoticeSink + ?Sized>(
    state: &mut GameState,
    id: String,
    sink: &mut S,
) -> Result<Receipt, CommandError> {
    let p = catalog::premium(&id).ok_or_else(|| CommandError::UnknownId(id.clone()))?;
    if state.has_premium(p.kind) {
        return Err(CommandError::AlreadyOwned(id));
    }
    if state.prestige_points < p.cost {
        return Err(CommandError::Unaffordable {
            cost: p.cost as f64,
            have: state.prestige_points as f64,
        });
    }
    state.prestige_points -= p.cost;
    state.premium_bought.insert(p.id().to_string());
    sink.push(Notice::flash(format!("Purchased: {}", p.name)));
    Ok(Receipt::PremiumBought { id, cost: p.cost })
}

/// The first choice sticks until a hard reset; repeating it is harmless.
fn choose_country(state: &mut GameState, id: &str) -> Result<Receipt, CommandError> {
    let c = catalog::country(id).ok_or_else(|| CommandError::UnknownId(id.to_string()))?;
    match state.country_id.as_deref() {
        Some(current) if current == c.id => {}
        Some(current) => return Err(CommandError::CountryLocked(current.to_string())),
        None => {
            state.country_id = Some(c.id.to_string());
            info!(country = c.id, "country chosen");
        }
    }
    Ok(Receipt::CountryChosen { id: c.id })
}

fn prestige<S: NoticeSink + ?Sized>(
    state: &mut GameState,
    sink: &mut S,
) -> Result<Receipt, CommandError> {
    let gained_points = prestige_gain(state);
    if gained_points == 0 {
        sink.push(Notice::flash("Earn more GDP to prestige."));
        return Err(CommandError::NothingToPrestige);
    }
    state.prestige_points += gained_points;
    state.reset_run();
    if state.has_premium(Premium::SovereignWealthFund) {
        state.gdp = SOVEREIGN_FUND_GDP;
    }
    let multiplier = prestige_multiplier(state);
    info!(gained_points, total = state.prestige_points, multiplier, "prestiged");
    sink.push(Notice::flash(format!("Prestiged. New multiplier: x{multiplier:.2}")));
    Ok(Receipt::Prestiged {
        gained_points,
        multiplier,
    })
}

fn import<S: NoticeSink + ?Sized>(
    state: &mut GameState,
    text: &str,
    now: Millis,
    sink: &mut S,
) -> Result<Receipt, CommandError> {
    match import_text(text, now) {
        Ok((loaded, report)) => {
            *state = loaded;
            info!(gained = report.gained, "save imported");
            sink.push(Notice::flash("Save imported."));
            if report.run_completed {
                sink.push(run_complete_notice(state));
            }
            Ok(Receipt::Imported(report))
        }
        Err(e) => {
            warn!(error = %e, "import rejected");
            sink.push(Notice::flash("Import failed."));
            Err(e.into())
        }
    }
}

fn debug_command<R, S>(
    state: &mut GameState,
    cmd: DebugCommand,
    now: Millis,
    rng: &mut R,
    sink: &mut S,
) -> Result<Receipt, CommandError>
where
    R: Rng + ?Sized,
    S: NoticeSink + ?Sized,
{
    if !state.debug && !matches!(cmd, DebugCommand::SetEnabled(_)) {
        return Err(CommandError::DebugDisabled);
    }
    match cmd {
        DebugCommand::SetEnabled(on) => state.debug = on,
        DebugCommand::AddMoney => state.credit(DEBUG_GRANT),
        // Capped without latching; the next tick ends the run.
        DebugCommand::AdvanceYear => {
            if !state.end_game {
                state.current_year = (state.current_year + 1.0).min(END_YEAR);
            }
        }
        DebugCommand::TriggerEvent => {
            start_random(state, now, rng, sink);
        }
        DebugCommand::UnlockUpgrades => {
            for u in UPGRADES.iter() {
                if state.upgrades_bought.insert(u.id.clone()) {
                    state.apply_effect(&u.effect);
                }
            }
        }
        DebugCommand::FastForward => {
            let gained = total_production_rate(state) * DEBUG_FAST_FORWARD_SECS;
            state.credit(gained);
        }
    }
    Ok(Receipt::Debug(cmd))
}
