#![deny(warnings)]

//! Headless driver: restores a save slot, runs the live tick loop and
//! autosaves until the time limit or Ctrl-C.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use persistence::{default_sqlite_url, delete_slot, init_db, read_slot, write_slot, SqlitePool};
use serde::Deserialize;
use sim_core::{validate_catalog, SimConfig};
use sim_econ::format_amount;
use sim_runtime::{Command, Simulation, SystemClock};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: nation [--config FILE] [--seconds N] [--country ID] [--db URL] \
[--slot NAME] [--autobuy] [--export] [--import FILE] [--reset] [--json]";

/// Optional YAML file; every field may be omitted.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct CliConfig {
    sim: SimConfig,
    db_url: Option<String>,
    slot: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    seconds: Option<u64>,
    country: Option<String>,
    db: Option<String>,
    slot: Option<String>,
    autobuy: bool,
    export: bool,
    import: Option<PathBuf>,
    reset: bool,
    json: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = it.next().map(PathBuf::from),
            "--seconds" => out.seconds = it.next().and_then(|s| s.parse().ok()),
            "--country" => out.country = it.next(),
            "--db" => out.db = it.next(),
            "--slot" => out.slot = it.next(),
            "--autobuy" => out.autobuy = true,
            "--export" => out.export = true,
            "--import" => out.import = it.next().map(PathBuf::from),
            "--reset" => out.reset = true,
            "--json" => out.json = true,
            "-h" | "--help" => out.help = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    out
}

fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_notices(sim: &mut Simulation, json: bool) {
    for notice in sim.drain_notices() {
        if json {
            match serde_json::to_string(&notice) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "cannot encode notice"),
            }
        } else {
            println!("* {notice}");
        }
    }
}

/// One click, then the best purchase on offer: an affordable upgrade, else
/// the cheapest affordable industry.
fn autobuy(sim: &mut Simulation) {
    if let Err(e) = sim.apply(Command::Develop) {
        debug!(error = %e, "autobuy click skipped");
    }
    let view = sim.view();
    let cmd = match view.upgrades.iter().find(|u| u.affordable) {
        Some(u) => Command::BuyUpgrade(u.id.to_string()),
        None => match view
            .industries
            .iter()
            .filter(|i| i.affordable)
            .min_by(|a, b| a.next_cost.total_cmp(&b.next_cost))
        {
            Some(i) => Command::BuyIndustry(i.id.to_string()),
            None => return,
        },
    };
    if let Err(e) = sim.apply(cmd) {
        debug!(error = %e, "autobuy skipped");
    }
}

async fn save(pool: &SqlitePool, slot: &str, sim: &mut Simulation) -> Result<()> {
    let json = sim.snapshot_json()?;
    write_slot(pool, slot, &json, sim.now()).await?;
    info!(slot, "saved");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args(std::env::args().skip(1));
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    validate_catalog()?;
    let cfg = load_config(args.config.as_deref())?;
    let db_url = args
        .db
        .clone()
        .or(cfg.db_url)
        .unwrap_or_else(|| default_sqlite_url().to_string());
    let slot = args
        .slot
        .clone()
        .or(cfg.slot)
        .unwrap_or_else(|| "default".to_string());
    info!(db = %db_url, slot = %slot, seconds = ?args.seconds, "starting");

    let pool = init_db(&db_url).await?;
    let mut sim = Simulation::fresh(&cfg.sim, Box::new(SystemClock));
    if args.reset {
        sim.apply(Command::HardReset)?;
        delete_slot(&pool, &slot).await?;
    } else if let Some(payload) = read_slot(&pool, &slot).await? {
        if let Err(e) = sim.load_json(&payload) {
            warn!(error = %e, slot = %slot, "stored save unreadable; starting fresh");
        }
    }
    if let Some(path) = &args.import {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if let Err(e) = sim.apply(Command::ImportState(text)) {
            warn!(error = %e, "import rejected; keeping current progress");
        }
    }
    if let Some(country) = &args.country {
        if let Err(e) = sim.apply(Command::ChooseCountry(country.clone())) {
            warn!(error = %e, country = %country, "country not chosen");
        }
    }
    print_notices(&mut sim, args.json);

    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.sim.tick_ms.max(1)));
    let mut autosave = tokio::time::interval(Duration::from_secs(cfg.sim.autosave_secs.max(1)));
    // The first interval tick completes immediately.
    autosave.tick().await;
    let run_for = async {
        match args.seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(run_for);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sim.tick();
                if args.autobuy {
                    autobuy(&mut sim);
                }
                print_notices(&mut sim, args.json);
            }
            _ = autosave.tick() => {
                if let Err(e) = save(&pool, &slot, &mut sim).await {
                    warn!(error = %e, "autosave failed");
                }
            }
            _ = &mut run_for => break,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    save(&pool, &slot, &mut sim).await?;

    let view = sim.view();
    if args.json {
        println!("{}", serde_json::to_string(&view)?);
    } else {
        let owned: u32 = view.industries.iter().map(|i| i.count).sum();
        println!(
            "KPI | year: {} | GDP: {} | GPS: {} | click: {} | industries: {} | influence: {} (x{:.2}, +{} on prestige){}",
            view.year,
            format_amount(view.gdp),
            format_amount(view.gps),
            format_amount(view.click_power),
            owned,
            view.prestige_points,
            view.prestige_multiplier,
            view.prestige_gain,
            if view.ended { " | run complete" } else { "" },
        );
    }
    if args.export {
        println!("{}", sim.export_text()?);
    }
    Ok(())
}
