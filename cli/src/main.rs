//! dashdeck: command-line entry point for the dashboard data store.
//!
//! # Usage
//!
//! ```text
//! dashdeck                              # open the terminal dashboard
//! dashdeck --variant financial tui
//! dashdeck get page1.metrics.sellSide
//! dashdeck set page1.metrics.sellSide 70
//! dashdeck set page1.closedDeal.value 72M --text
//! dashdeck export --dir ~/backups
//! dashdeck import dashboard-data-2024-03-15.json
//! dashdeck reset --yes
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dashdeck_core::config::{resolve_config_dir, Settings};
use dashdeck_core::persist::{DirStore, MemoryStore};
use dashdeck_core::{DataPath, DataStore, Outcome, TreeValue, Variant};
use dashdeck_tui::{App, Tui};


const LOG_FILE: &str = "dashdeck.log";
const LOG_ENV: &str = "DASHDECK_LOG";


#[derive(Parser, Debug)]
#[command(name = "dashdeck")]
#[command(about = "Editable dashboard data with local persistence")]
struct Cli {
    /// Configuration directory (default: $DASHDECK_CONFIG_DIR or ~/.config/dashdeck)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Dashboard variant: brokerage or financial
    #[arg(long, global = true, value_name = "NAME")]
    variant: Option<Variant>,

    /// Keep everything in memory; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Cmd {
    /// Open the terminal dashboard (default)
    Tui,
    /// Print the value at a dotted path as JSON
    Get { path: String },
    /// Write a value at a dotted path and save
    Set {
        path: String,
        /// JSON literal; anything that does not parse is stored as text
        value: String,
        /// Store the value as text even if it looks like a number
        #[arg(long)]
        text: bool,
    },
    /// Print the whole data tree as JSON
    Show,
    /// Save the current tree
    Save,
    /// Write a dated JSON export
    Export {
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Replace the tree with the contents of a JSON file
    Import { file: PathBuf },
    /// Restore default values and clear saved data
    Reset {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
}


fn main() {
    let cli = Cli::parse();
    let config_dir = resolve_config_dir(cli.config_dir.as_deref());

    let settings = match Settings::load(&config_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("dashdeck: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = init_logging(&config_dir, cli.verbose) {
        eprintln!("dashdeck: logging disabled ({})", e);
    }

    let variant = cli.variant.unwrap_or(settings.variant);
    let mut store = open_store(variant, &settings, &config_dir, cli.ephemeral);
    let command = cli.command.unwrap_or(Cmd::Tui);

    if command == Cmd::Tui {
        if let Err(e) = run_tui(store, variant, &settings) {
            error!(error = %e, "dashboard failed");
            eprintln!("dashdeck tui: {}", e);
            process::exit(1);
        }
        return;
    }

    match execute(command, &mut store, &settings) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(message) => {
            eprintln!("dashdeck error: {}", message);
            process::exit(1);
        }
    }
}


/// Log to `<config_dir>/dashdeck.log`; the terminal belongs to the dashboard.
fn init_logging(config_dir: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fs::create_dir_all(config_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_dir.join(LOG_FILE))?;
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()?;
    Ok(())
}


fn open_store(variant: Variant, settings: &Settings, config_dir: &Path, ephemeral: bool) -> DataStore {
    if ephemeral {
        info!(%variant, "opening in-memory store");
        return DataStore::open(variant.profile(), MemoryStore::new());
    }
    let data_dir = settings.data_dir(config_dir);
    info!(%variant, dir = %data_dir.display(), "opening store");
    DataStore::open(variant.profile(), DirStore::new(data_dir))
}


fn run_tui(store: DataStore, variant: Variant, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::new(store, variant, settings.export_dir(), settings.banner_ttl_ms)?;
    let mut tui = Tui::new(app, Duration::from_millis(settings.tick_ms))?;
    tui.run()?;
    Ok(())
}


/// Run a non-interactive command. `Ok` carries the text to print.
fn execute(command: Cmd, store: &mut DataStore, settings: &Settings) -> Result<String, String> {
    match command {
        Cmd::Tui => Err("the dashboard needs a terminal".into()),
        Cmd::Get { path } => {
            let path = DataPath::parse(&path).map_err(|e| e.to_string())?;
            match store.lookup(&path) {
                Some(value) => Ok(pretty(value)),
                None => Err(format!("no value at {}", path)),
            }
        }
        Cmd::Set { path, value, text } => {
            let value = if text { TreeValue::Text(value) } else { parse_value(&value) };
            store.update(&path, value).map_err(|e| e.to_string())?;
            finish(store.save())
        }
        Cmd::Show => Ok(pretty(store.tree())),
        Cmd::Save => finish(store.save()),
        Cmd::Export { dir } => {
            let dir = dir.unwrap_or_else(|| settings.export_dir());
            finish(store.export_json(&dir))
        }
        Cmd::Import { file } => finish(store.import_json(&file)),
        Cmd::Reset { yes } => {
            if !yes {
                return Err("reset discards all data; pass --yes to confirm".into());
            }
            finish(store.reset())
        }
    }
}

fn finish(outcome: Outcome) -> Result<String, String> {
    if outcome.success {
        Ok(outcome.message)
    } else {
        Err(outcome.message)
    }
}

/// A JSON literal (`70`, `true`, `{"a":1}`), or plain text when it is not one.
fn parse_value(raw: &str) -> TreeValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => TreeValue::from(json),
        Err(_) => TreeValue::Text(raw.to_string()),
    }
}

fn pretty(value: &TreeValue) -> String {
    serde_json::to_string_pretty(&value.to_json()).unwrap_or_else(|_| value.display_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn store() -> DataStore {
        DataStore::open(Variant::Brokerage.profile(), MemoryStore::new())
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["dashdeck"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.ephemeral);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["dashdeck", "get", "a.b", "--variant", "financial", "--ephemeral"]).unwrap();
        assert_eq!(cli.variant, Some(Variant::Financial));
        assert!(cli.ephemeral);
        assert_eq!(cli.command, Some(Cmd::Get { path: "a.b".into() }));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["dashdeck", "--variant", "retail"]).is_err());
    }

    #[test]
    fn logging_goes_to_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("conf");
        // Another test may have installed the global subscriber first.
        let _ = init_logging(&dir, false);
        assert!(dir.join(LOG_FILE).exists());
    }

    #[test]
    fn value_parsing() {
        assert_eq!(parse_value("70"), TreeValue::Number(70.0));
        assert_eq!(parse_value("72M"), TreeValue::Text("72M".into()));
        assert_eq!(parse_value("true"), TreeValue::Flag(true));
        assert_eq!(parse_value("\"quoted\""), TreeValue::Text("quoted".into()));
    }

    #[test]
    fn set_then_get() {
        let mut s = store();
        let settings = Settings::default();
        let out = execute(
            Cmd::Set { path: "page1.metrics.sellSide".into(), value: "70".into(), text: false },
            &mut s,
            &settings,
        )
        .unwrap();
        assert_eq!(out, "Data saved successfully!");
        let got = execute(Cmd::Get { path: "page1.metrics.sellSide".into() }, &mut s, &settings).unwrap();
        assert_eq!(got, "70");
    }

    #[test]
    fn set_text_flag_keeps_digits_as_text() {
        let mut s = store();
        execute(
            Cmd::Set { path: "page2.marketRank".into(), value: "3".into(), text: true },
            &mut s,
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(s.get("page2.marketRank", 0), TreeValue::Text("3".into()));
    }

    #[test]
    fn get_missing_and_malformed() {
        let mut s = store();
        let settings = Settings::default();
        let err = execute(Cmd::Get { path: "page9.x".into() }, &mut s, &settings).unwrap_err();
        assert_eq!(err, "no value at page9.x");
        assert!(execute(Cmd::Get { path: "a..b".into() }, &mut s, &settings).is_err());
    }

    #[test]
    fn reset_needs_yes() {
        let mut s = store();
        let settings = Settings::default();
        s.update("page1.metrics.sellSide", 1).unwrap();
        assert!(execute(Cmd::Reset { yes: false }, &mut s, &settings).is_err());
        assert_eq!(s.number("page1.metrics.sellSide", 0.0), 1.0);
        let out = execute(Cmd::Reset { yes: true }, &mut s, &settings).unwrap();
        assert_eq!(out, "Data reset to default values!");
        assert_eq!(s.number("page1.metrics.sellSide", 0.0), 67.0);
    }

    #[test]
    fn export_then_import() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let mut s = store();
        s.update("page1.closedDeal.value", "80M").unwrap();
        let out = execute(Cmd::Export { dir: Some(tmp.path().to_path_buf()) }, &mut s, &settings).unwrap();
        assert_eq!(out, "Data exported successfully!");

        let file = fs::read_dir(tmp.path()).unwrap().next().unwrap().unwrap().path();
        let mut fresh = store();
        let out = execute(Cmd::Import { file }, &mut fresh, &settings).unwrap();
        assert_eq!(out, "Data imported successfully!");
        assert_eq!(fresh.text("page1.closedDeal.value", ""), "80M");
    }

    #[test]
    fn import_failure_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("data.csv");
        fs::write(&file, "a,b").unwrap();
        let err = execute(Cmd::Import { file }, &mut store(), &Settings::default()).unwrap_err();
        assert_eq!(err, "Please select a valid JSON file.");
    }

    #[test]
    fn show_prints_tree() {
        let out = execute(Cmd::Show, &mut store(), &Settings::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["page1"]["metrics"]["sellSide"], 67);
    }
}
