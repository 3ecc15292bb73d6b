//! Command-line interface for modlink.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modlink_core::config::env_vars;
use modlink_core::{platform, LibraryResolver, LoaderConfig, NativeModule};
use serde::Serialize;

/// modlink - Load native libraries and resolve their symbols.
#[derive(Parser, Debug)]
#[command(name = "modlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Loader configuration file (TOML). Always validated; its aliases and
    /// search paths apply to `candidates` and `probe --resolve`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Load a library, resolve symbols, then unload it.
    Probe {
        /// Library name or path.
        #[arg(required = true)]
        library: String,
        /// Symbols to resolve.
        symbols: Vec<String>,
        /// Try configured aliases and search paths instead of loading the
        /// name verbatim.
        #[arg(short, long)]
        resolve: bool,
        /// Print a JSON report.
        #[arg(long)]
        json: bool,
    },
    /// Show the names the resolver would try for a library.
    Candidates {
        /// Library name.
        #[arg(required = true)]
        name: String,
    },
    /// Print the platform file name for a base library name.
    MapName {
        /// Base name, e.g. `m` for the math library.
        #[arg(required = true)]
        base: String,
    },
}

/// JSON report for `probe`.
#[derive(Debug, Serialize)]
struct ProbeReport {
    library: String,
    handle: String,
    symbols: Vec<SymbolReport>,
}

#[derive(Debug, Serialize)]
struct SymbolReport {
    name: String,
    address: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Probe {
            library,
            symbols,
            resolve,
            json,
        } => run_probe(args.config, &library, &symbols, resolve, json),
        Command::Candidates { name } => run_candidates(args.config, &name),
        Command::MapName { base } => {
            println!("{}", platform::map_library_name(&base));
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "modlink_cli={level},modlink_core={level},warn",
            level = default_level
        ))
    });

    // Logs go to stderr so probe output stays machine-readable.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_resolver(config: Option<PathBuf>) -> Result<LibraryResolver> {
    let config = LoaderConfig::load(config.as_deref()).context("Failed to load configuration")?;
    Ok(LibraryResolver::with_config(config))
}

fn run_probe(
    config: Option<PathBuf>,
    library: &str,
    symbols: &[String],
    resolve: bool,
    json: bool,
) -> Result<()> {
    tracing::debug!("Probing {} for {} symbol(s)", library, symbols.len());

    let resolver = load_resolver(config)?;
    let mut module = if resolve {
        resolver.load(library)?
    } else {
        NativeModule::load(library)?
    };

    let mut report = ProbeReport {
        library: module.name().to_string(),
        handle: format!("{:#x}", module.handle()),
        symbols: Vec::with_capacity(symbols.len()),
    };

    for symbol in symbols {
        let address = module.resolve_symbol(symbol)?;
        report.symbols.push(SymbolReport {
            name: symbol.clone(),
            address: address.non_null().map(|a| a.to_string()),
        });
    }

    module.unload();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Loaded {} (handle {})", report.library, report.handle);
        for symbol in &report.symbols {
            match &symbol.address {
                Some(address) => println!("  {}  {}", symbol.name, address),
                None => println!("  {}  <not found>", symbol.name),
            }
        }
    }

    Ok(())
}

fn run_candidates(config: Option<PathBuf>, name: &str) -> Result<()> {
    let resolver = load_resolver(config)?;
    for candidate in resolver.candidates(name) {
        println!("{}", candidate);
    }
    Ok(())
}
