//! Scorer CLI
//!
//! Operator console for a live innings: every command loads the snapshot,
//! applies one change through a versioned session and writes it back only
//! if nobody else wrote in between.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use scoring_core::config::CONFIG_PATH_ENV;
use scoring_core::{
    BallOutcome, InningsState, InningsStore, PlayerId, Role, SaveError, Scorecard, ScoringConfig,
    ScoringSession,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scorer")]
#[command(about = "Ball-by-ball innings scoring", long_about = None)]
struct Cli {
    /// YAML config file (default: $SCORING_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot directory (overrides store.dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Print the result without writing the snapshot
    #[arg(long, global = true, default_value = "false")]
    dry_run: bool,

    /// Version the change was prepared against, as printed by `show`
    #[arg(long, global = true)]
    expect: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new innings
    New {
        innings_id: String,

        #[arg(long)]
        batting_team: String,

        #[arg(long)]
        bowling_team: String,

        /// Replace an existing snapshot with the same id
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Fill the striker, non-striker or bowler slot
    Nominate {
        innings_id: String,

        #[arg(value_enum)]
        role: RoleArg,

        player_id: String,

        /// Display name, kept from the first nomination
        name: String,
    },

    /// Record one delivery
    Ball {
        innings_id: String,

        /// Runs off the bat (or byes/leg-byes run)
        #[arg(long, default_value = "0")]
        runs: u32,

        #[arg(long)]
        wide: bool,

        #[arg(long)]
        no_ball: bool,

        #[arg(long)]
        bye: bool,

        #[arg(long)]
        leg_bye: bool,

        #[arg(long)]
        wicket: bool,
    },

    /// Withdraw the last delivery
    Undo { innings_id: String },

    /// Print the scorecard
    Show {
        innings_id: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List saved innings
    List,

    /// Check a snapshot's checksum and counters
    Verify { innings_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Striker,
    NonStriker,
    Bowler,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Striker => Role::Striker,
            RoleArg::NonStriker => Role::NonStriker,
            RoleArg::Bowler => Role::Bowler,
        }
    }
}

/// What a command needs besides its own arguments.
struct Console {
    store: InningsStore,
    persist: bool,
    expect: Option<u64>,
    recent_balls: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScoringConfig::from_env()
            .with_context(|| format!("loading config named by {CONFIG_PATH_ENV}"))?,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("invalid logging.filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let console = Console {
        store: InningsStore::new(cli.dir.clone().unwrap_or_else(|| config.store.dir.clone())),
        persist: config.store.auto_save && !cli.dry_run,
        expect: cli.expect,
        recent_balls: config.display.recent_balls,
    };

    let result = run(&console, cli.command);
    if let Err(err) = &result {
        if err.downcast_ref::<SaveError>().is_some_and(SaveError::is_recoverable) {
            eprintln!("⚠️  Nothing was written; check `scorer show` and retry.");
        }
    }
    result
}

fn run(console: &Console, command: Commands) -> Result<()> {
    match command {
        Commands::New { innings_id, batting_team, bowling_team, force } => {
            let session =
                ScoringSession::new(innings_id, InningsState::new(batting_team, bowling_team));
            println!("🏏 New innings {}", session.innings_id());
            print_prompts(session.state());
            if !console.persist {
                println!("   (not saved)");
                return Ok(());
            }
            let save = session.to_save();
            if force {
                console.store.save(&save)?;
                return Ok(());
            }
            match console.store.create(&save) {
                Err(SaveError::AlreadyExists { innings_id }) => {
                    bail!("innings {innings_id} already exists (use --force to replace it)")
                }
                other => Ok(other?),
            }
        }

        Commands::Nominate { innings_id, role, player_id, name } => {
            let (mut session, loaded) = open(console, &innings_id)?;
            let role = Role::from(role);
            session
                .nominate(expected(console, loaded), role, PlayerId::new(player_id), &name)
                .with_context(|| format!("nominating {role}"))?;
            print_prompts(session.state());
            persist(console, &session, loaded)
        }

        Commands::Ball { innings_id, runs, wide, no_ball, bye, leg_bye, wicket } => {
            let outcome = BallOutcome {
                runs_off_bat: runs,
                is_wide: wide,
                is_no_ball: no_ball,
                is_bye: bye,
                is_leg_bye: leg_bye,
                is_wicket: wicket,
            };
            let (mut session, loaded) = open(console, &innings_id)?;
            let token = session.record(expected(console, loaded), &outcome)?.display_token();
            println!("{token}  {}", summary_line(session.state()));
            print_recent(session.state(), console.recent_balls);
            print_prompts(session.state());
            persist(console, &session, loaded)
        }

        Commands::Undo { innings_id } => {
            let (mut session, loaded) = open(console, &innings_id)?;
            let removed = session.undo(expected(console, loaded))?;
            let summary = summary_line(session.state());
            println!("↩️  Withdrew {}  {summary}", removed.display_token());
            print_recent(session.state(), console.recent_balls);
            persist(console, &session, loaded)
        }

        Commands::Show { innings_id, json } => {
            let (session, loaded) = open(console, &innings_id)?;
            let card = Scorecard::from_state(session.state());
            if json {
                println!("{}", serde_json::to_string_pretty(&card)?);
            } else {
                print_scorecard(&card);
                println!();
                println!("Version {loaded}");
            }
            Ok(())
        }

        Commands::List => {
            let infos = console.store.list().context("listing snapshots")?;
            if infos.is_empty() {
                println!("No saved innings in {}", console.store.dir().display());
            }
            for info in infos {
                println!("{}  (saved {})", info.get_display_text(), local_time(info.timestamp));
            }
            Ok(())
        }

        Commands::Verify { innings_id } => {
            println!("🔍 Verifying {innings_id}...");
            let save = console
                .store
                .load(&innings_id)
                .with_context(|| format!("loading {innings_id}"))?;
            save.state.check_invariants().context("counter check failed")?;
            let checksum = console.store.checksum(&innings_id)?;
            println!("✅ Snapshot is consistent");
            println!("   Version:   {}", save.session_version);
            println!("   Deliveries: {}", save.state.recent_balls.len());
            println!("   Checksum:  {checksum}");
            Ok(())
        }
    }
}

/// Load a session along with the version it was loaded at.
fn open(console: &Console, innings_id: &str) -> Result<(ScoringSession, u64)> {
    let save = console
        .store
        .load(innings_id)
        .with_context(|| format!("loading innings {innings_id}"))?;
    let session = ScoringSession::from_save(save);
    let loaded = session.version();
    Ok((session, loaded))
}

fn expected(console: &Console, loaded: u64) -> u64 {
    console.expect.unwrap_or(loaded)
}

/// Write the session back, refusing if the snapshot moved past `loaded`.
fn persist(console: &Console, session: &ScoringSession, loaded: u64) -> Result<()> {
    if !console.persist {
        println!("   (not saved)");
        return Ok(());
    }
    console
        .store
        .update(&session.to_save(), loaded)
        .with_context(|| format!("saving innings {}", session.innings_id()))?;
    tracing::debug!(innings = session.innings_id(), version = session.version(), "saved");
    Ok(())
}

fn summary_line(state: &InningsState) -> String {
    format!("{} {}/{} ({} ov)", state.batting_team, state.total_runs, state.wickets, state.overs)
}

fn print_recent(state: &InningsState, window: usize) {
    let skip = state.recent_balls.len().saturating_sub(window);
    let tokens: Vec<String> =
        state.recent_balls.iter().skip(skip).map(|b| b.display_token()).collect();
    if !tokens.is_empty() {
        println!("   Recent: {}", tokens.join(" "));
    }
}

fn print_prompts(state: &InningsState) {
    for role in state.pending_nominations() {
        println!("   ⚠️  No {role} selected");
    }
}

fn print_scorecard(card: &Scorecard) {
    println!(
        "{} v {}: {} ({} ov, RR {:.2}, extras {})",
        card.batting_team, card.bowling_team, card.score, card.overs, card.run_rate, card.extras
    );
    println!();
    for line in &card.batting {
        let marker = if line.on_strike { "*" } else { " " };
        println!(
            "{marker} {:<20} {:<16} {:>4} ({:>3}) 4s {:>2} 6s {:>2} SR {:>6.2}",
            line.name, line.status, line.runs, line.balls, line.fours, line.sixes, line.strike_rate
        );
    }
    println!();
    for line in &card.bowling {
        println!(
            "  {:<20} {:>5}-{}-{}-{} Econ {:.2}",
            line.name, line.overs, line.maidens, line.runs, line.wickets, line.economy
        );
    }
    if !card.this_over.is_empty() {
        println!();
        println!("This over: {}", card.this_over.join(" "));
    }
}

fn local_time(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn console(dir: &TempDir) -> Console {
        let store = InningsStore::new(dir.path());
        Console { store, persist: true, expect: None, recent_balls: 6 }
    }

    fn nominate(console: &Console, role: RoleArg, id: &str) {
        run(
            console,
            Commands::Nominate {
                innings_id: "t20".into(),
                role,
                player_id: id.into(),
                name: id.to_uppercase(),
            },
        )
        .unwrap();
    }

    fn ball(runs: u32, wicket: bool) -> Commands {
        Commands::Ball {
            innings_id: "t20".into(),
            runs,
            wide: false,
            no_ball: false,
            bye: false,
            leg_bye: false,
            wicket,
        }
    }

    fn started(dir: &TempDir) -> Console {
        let console = console(dir);
        run(
            &console,
            Commands::New {
                innings_id: "t20".into(),
                batting_team: "home".into(),
                bowling_team: "away".into(),
                force: false,
            },
        )
        .unwrap();
        nominate(&console, RoleArg::Striker, "a");
        nominate(&console, RoleArg::NonStriker, "b");
        nominate(&console, RoleArg::Bowler, "c");
        console
    }

    #[test]
    fn test_ball_and_undo_persist_between_commands() {
        let dir = TempDir::new().unwrap();
        let console = started(&dir);

        run(&console, ball(4, false)).unwrap();
        run(&console, ball(1, false)).unwrap();
        let save = console.store.load("t20").unwrap();
        assert_eq!(save.state.total_runs, 5);
        assert_eq!(save.session_version, 5);

        run(&console, Commands::Undo { innings_id: "t20".into() }).unwrap();
        let save = console.store.load("t20").unwrap();
        assert_eq!(save.state.total_runs, 4);
        assert_eq!(save.session_version, 6);
    }

    #[test]
    fn test_ball_without_striker_is_refused() {
        let dir = TempDir::new().unwrap();
        let console = started(&dir);
        run(&console, ball(0, true)).unwrap();

        let err = run(&console, ball(1, false)).unwrap_err();
        assert!(err.to_string().contains("No striker selected"), "{err}");
        assert_eq!(console.store.load("t20").unwrap().state.recent_balls.len(), 1);
    }

    #[test]
    fn test_new_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let console = started(&dir);
        let again = Commands::New {
            innings_id: "t20".into(),
            batting_team: "x".into(),
            bowling_team: "y".into(),
            force: false,
        };
        assert!(run(&console, again).is_err());
    }

    #[test]
    fn test_concurrent_consoles_cannot_both_write() {
        let dir = TempDir::new().unwrap();
        let console = started(&dir);

        // Both operators load version 3 before either writes.
        let (mut first, loaded_first) = open(&console, "t20").unwrap();
        let (mut second, loaded_second) = open(&console, "t20").unwrap();
        first.record(loaded_first, &BallOutcome::runs(4)).unwrap();
        second.record(loaded_second, &BallOutcome::runs(1)).unwrap();

        persist(&console, &first, loaded_first).unwrap();
        let err = persist(&console, &second, loaded_second).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SaveError>(),
            Some(SaveError::StaleVersion { expected: 3, actual: 4 })
        ));

        let save = console.store.load("t20").unwrap();
        assert_eq!(save.state.total_runs, 4);
        assert_eq!(save.state.recent_balls.len(), 1);
    }

    #[test]
    fn test_expect_flag_rejects_outdated_version() {
        let dir = TempDir::new().unwrap();
        let mut console = started(&dir);
        run(&console, ball(1, false)).unwrap();

        console.expect = Some(3);
        let err = run(&console, ball(2, false)).unwrap_err();
        assert!(err.to_string().contains("Stale state version"), "{err}");

        console.expect = Some(4);
        run(&console, ball(2, false)).unwrap();
        assert_eq!(console.store.load("t20").unwrap().state.total_runs, 3);
    }

    #[test]
    fn test_dry_run_leaves_snapshot_alone() {
        let dir = TempDir::new().unwrap();
        let mut console = started(&dir);
        console.persist = false;
        run(&console, ball(6, false)).unwrap();
        assert_eq!(console.store.load("t20").unwrap().state.total_runs, 0);
    }

    #[test]
    fn test_verify_and_list() {
        let dir = TempDir::new().unwrap();
        let console = started(&dir);
        run(&console, ball(2, false)).unwrap();
        run(&console, Commands::Verify { innings_id: "t20".into() }).unwrap();
        run(&console, Commands::List).unwrap();
        assert!(run(&console, Commands::Verify { innings_id: "missing".into() }).is_err());
    }
}
