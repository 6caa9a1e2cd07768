//! Suite Inspector - test suite tree tooling
//!
//! A CLI over suite definitions and run results loaded from YAML or JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Export leaf tests with inherited properties
//! suite-inspector export suite.yaml -k Category -k Owner -o out/tests.csv
//!
//! # Build a retry query from a failed run
//! suite-inspector retry results.json -o retry-query.txt
//!
//! # List located fixtures
//! suite-inspector fixtures suite.yaml --format json
//!
//! # Check whether a test may run in parallel
//! suite-inspector parallel suite.yaml Suite.Login.Valid --snapshot dispatch.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

mod cli;

use cli::Args;
use suite_inspector::config::{print_env_help, AppConfig, ConfigFile, EnvConfig};
use suite_inspector::discovery::locate_fixtures;
use suite_inspector::models::{load_definition, load_suite_tree, RunSummary};
use suite_inspector::output::{FixtureEntry, OutputFormat, ParallelDecision, ResultFormatter};
use suite_inspector::parallel::{DispatchSnapshot, LiveScheduler, ParallelResolver};
use suite_inspector::utils::{init_logger, LogLevel};
use suite_inspector::SuiteError;

fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    let config_path = args.config.clone().or_else(|| env.config_file.clone());
    let config = load_config(config_path.as_deref(), &env, &args.command)?;

    init_logger(log_level(&args, &config));

    let name = command_name(&args.command);
    let started = Instant::now();
    match args.command {
        cli::Command::Export(export_args) => run_export(export_args, &config)?,
        cli::Command::Retry(retry_args) => run_retry(retry_args, &config)?,
        cli::Command::Fixtures(fixtures_args) => list_fixtures(fixtures_args)?,
        cli::Command::Parallel(parallel_args) => check_parallel(parallel_args)?,
        cli::Command::Config(config_args) => {
            manage_config(config_args, config_path.as_deref(), &config, &env)?
        }
    }
    debug!("{}: {}ms", name, started.elapsed().as_millis());

    Ok(())
}

/// File values layered under environment overrides.
///
/// `config validate` reports problems itself, so a broken file does not
/// abort it here.
fn load_config(path: Option<&Path>, env: &EnvConfig, command: &cli::Command) -> Result<AppConfig> {
    let file = match ConfigFile::load_or_default(path) {
        Ok(file) => file,
        Err(_) if matches!(command, cli::Command::Config(_)) => ConfigFile::default(),
        Err(e) => return Err(e),
    };
    Ok(file.app.with_env(env))
}

fn log_level(args: &Args, config: &AppConfig) -> LogLevel {
    if args.verbose {
        return LogLevel::Debug;
    }
    args.log_level
        .as_deref()
        .and_then(LogLevel::from_str)
        .or_else(|| LogLevel::from_str(&config.log_level))
        .unwrap_or_default()
}

fn command_name(command: &cli::Command) -> &'static str {
    match command {
        cli::Command::Export(_) => "export",
        cli::Command::Retry(_) => "retry",
        cli::Command::Fixtures(_) => "fixtures",
        cli::Command::Parallel(_) => "parallel",
        cli::Command::Config(_) => "config",
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(format).ok_or_else(|| anyhow::anyhow!("Unknown output format: {format}"))
}

fn run_export(args: cli::ExportArgs, config: &AppConfig) -> Result<()> {
    let tree = load_suite_tree(&args.suite)
        .with_context(|| format!("Failed to load suite {}", args.suite.display()))?;

    let exporter = config.exporter(&args.keys);
    let table = exporter.build(&tree);

    if args.stdout {
        print!("{}", table.to_tsv()?);
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    table.write_file(&path)?;
    println!("✓ Exported {} test(s) to {}", table.len(), path.display());
    Ok(())
}

fn run_retry(args: cli::RetryArgs, config: &AppConfig) -> Result<()> {
    let run = load_definition(&args.results)
        .and_then(|def| def.into_result_tree())
        .with_context(|| format!("Failed to load results {}", args.results.display()))?;

    if args.summary {
        let summary = RunSummary::from_tree(&run);
        eprintln!("{}", ResultFormatter::default().format_summary(&summary));
    }

    let builder = config.retry_builder(args.escape_quotes);
    match args.output {
        Some(path) => {
            if builder.write_to_file(&run, &path)? {
                println!("✓ Retry query written to {}", path.display());
            } else {
                println!("✓ Nothing to retry");
            }
        }
        None => {
            let query = builder.build(&run);
            if query.is_empty() {
                info!("Nothing to retry");
            } else {
                println!("{query}");
            }
        }
    }
    Ok(())
}

fn list_fixtures(args: cli::FixturesArgs) -> Result<()> {
    let formatter = ResultFormatter::new(parse_format(&args.format)?);
    let def = load_definition(&args.tree)
        .with_context(|| format!("Failed to load {}", args.tree.display()))?;

    let entries: Vec<FixtureEntry> = if def.has_outcomes() {
        let run = def.into_result_tree()?;
        locate_fixtures(&run)
            .into_iter()
            .map(|id| FixtureEntry::from_results(&run, id))
            .collect()
    } else {
        let tree = def.into_suite_tree()?;
        locate_fixtures(&tree)
            .into_iter()
            .map(|id| FixtureEntry::from_tree(&tree, id))
            .collect()
    };

    println!("{}", formatter.format_fixtures(&entries));
    Ok(())
}

fn check_parallel(args: cli::ParallelArgs) -> Result<()> {
    let formatter = ResultFormatter::new(parse_format(&args.format)?);
    let tree = load_suite_tree(&args.suite)
        .with_context(|| format!("Failed to load suite {}", args.suite.display()))?;

    let scheduler = match &args.snapshot {
        Some(path) => LiveScheduler::with_snapshot(load_snapshot(path)?),
        None => LiveScheduler::new(),
    };

    let test = tree
        .find(&args.test)
        .ok_or_else(|| SuiteError::UnknownTest(args.test.clone()))?;
    let parallel = ParallelResolver::new(&scheduler).is_parallel(&tree, test)?;

    let decision = ParallelDecision {
        test: args.test,
        parallel,
    };
    println!("{}", formatter.format_decision(&decision));
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<DispatchSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let is_json = path.extension().map(|e| e == "json").unwrap_or(false);

    let snapshot = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON snapshot: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML snapshot: {}", path.display()))?
    };
    Ok(snapshot)
}

fn manage_config(
    args: cli::ConfigArgs,
    path: Option<&Path>,
    config: &AppConfig,
    env: &EnvConfig,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            ConfigFile::example().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                if !env.has_any() {
                    println!();
                    print_env_help();
                }
            } else {
                let effective = ConfigFile {
                    app: config.clone(),
                    ..Default::default()
                };
                let output = if format == "json" {
                    serde_json::to_string_pretty(&effective)?
                } else {
                    serde_yaml::to_string(&effective)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let Some(path) = file
                .or_else(|| path.map(Path::to_path_buf))
                .or_else(ConfigFile::find)
            else {
                println!("No configuration file found; defaults apply.");
                return Ok(());
            };

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
