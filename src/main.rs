//! # Universal Data Connector CLI (`udc`)
//!
//! ## Usage
//!
//! ```bash
//! udc --config ./config/udc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `udc serve` | Start the HTTP server |
//! | `udc sources` | List sources with availability and record counts |
//! | `udc query <source>` | Query a source and print the response envelope |
//! | `udc schema` | Print the function-calling schemas |
//! | `udc generate` | Write mock data into the data directory |
//!
//! ## Examples
//!
//! ```bash
//! # Seed a data directory
//! udc generate --count 50 --days 30 --seed 7
//!
//! # Open high-priority tickets, two per page
//! udc query support --param status=open --param priority=high --page-size 2
//!
//! # One customer, no voice context
//! udc query crm --param customer_id=3 --no-voice
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use data_connector::config::{self, Config};
use data_connector::mockdata::{self, MockOptions};
use data_connector::params::coerce_pairs;
use data_connector::query::{DataService, PageRequest};
use data_connector::{logging, server, sources};

const DEFAULT_CONFIG_PATH: &str = "./config/udc.toml";

/// Universal Data Connector: voice-friendly access to CRM, support and
/// analytics data for assistants and LLM function calls.
#[derive(Parser)]
#[command(name = "udc", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/udc.toml`; built-in defaults are used when that
    /// file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// List sources with availability and record counts.
    Sources,

    /// Query a source and print the response envelope as JSON.
    Query {
        /// Source name: `crm`, `support` or `analytics`.
        source: String,

        /// Filter or sort parameter as `key=value`. Repeatable.
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        #[arg(long)]
        page: Option<usize>,

        #[arg(long)]
        page_size: Option<usize>,

        /// Omit the voice context.
        #[arg(long)]
        no_voice: bool,
    },

    /// Print the function-calling schemas as JSON.
    Schema,

    /// Write mock `customers.json`, `support_tickets.json` and `analytics.json`.
    Generate {
        /// Number of customers, and of tickets.
        #[arg(long, default_value_t = 50)]
        count: usize,

        /// Number of daily analytics points, ending today.
        #[arg(long, default_value_t = 30)]
        days: usize,

        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory. Defaults to `[data].dir`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Parse a `key=value` pair for `--param` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Types `--param` values by the source's declared parameters
/// (`customer_id=3` becomes a number, `search=12` stays a string).
fn cli_params(service: &DataService, source: &str, pairs: Vec<(String, String)>) -> Value {
    let specs = service
        .registry()
        .find(source)
        .map(|s| s.parameters())
        .unwrap_or_default();
    coerce_pairs(specs, pairs)
}

fn load(cli_config: Option<PathBuf>) -> Result<Config> {
    match cli_config {
        Some(path) => config::load_or_default(&path, false),
        None => config::load_or_default(&PathBuf::from(DEFAULT_CONFIG_PATH), true),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load(cli.config)?;
    logging::init(&cfg.logging);

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Sources => {
            sources::list_sources(&DataService::from_config(&cfg))?;
        }
        Commands::Query {
            source,
            params,
            page,
            page_size,
            no_voice,
        } => {
            let service = DataService::from_config(&cfg);
            let page = PageRequest {
                page,
                page_size,
                voice_mode: no_voice.then_some(false),
            };
            let params = cli_params(&service, &source, params);
            let response = service.query(&source, &params, &page)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Schema => {
            let service = DataService::from_config(&cfg);
            let schemas = serde_json::json!({ "functions": service.function_schemas() });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Commands::Generate {
            count,
            days,
            seed,
            out,
        } => {
            let dir = out.unwrap_or_else(|| cfg.data.dir.clone());
            let options = MockOptions { count, days, seed };
            for path in mockdata::write_mock_data(&dir, &options)? {
                println!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}
