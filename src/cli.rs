//! Command-line interface for mappcheck.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::advisory::{CategorizedFindings, ChatCompletionsClient};
use crate::config::{self, Config};
use crate::report;
use crate::rules::{self, Technology, TechnologyRuleSet};
use crate::runner::{FsStore, Runner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Mapp SDK integration compliance checker.
///
/// Checks that a mobile project initializes the Mapp SDK with every required
/// parameter, calls SDK methods with the documented number of arguments and
/// wraps them in error handling. Flutter, React Native, Android (Kotlin and
/// Java) and iOS (Swift and Objective-C) are supported.
#[derive(Parser)]
#[command(name = "mappcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by MAPPCHECK_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check SDK integration compliance
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Show the SDK rules for one or all technologies
    Rules(RulesArgs),
    /// Create a mappcheck config file from the bundled template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, sarif, or host
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Treat every file as this technology
    #[arg(short, long)]
    pub technology: Option<Technology>,

    /// Run the advisory analysis even if disabled in the config
    #[arg(long)]
    pub advisory: bool,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Technology to show (default: all)
    pub technology: Option<Technology>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "mappcheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

const TEMPLATE: &str = include_str!("templates/mappcheck.yaml");

/// Config file to use: explicit, else discovered in the working directory,
/// else discovered in the checked directory.
fn resolve_config_path(args: &CheckArgs) -> Option<PathBuf> {
    args.config
        .clone()
        .or_else(|| config::discover(Path::new(".")))
        .or_else(|| {
            if args.path.is_dir() {
                config::discover(&args.path)
            } else {
                None
            }
        })
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if !report::FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of: {}",
            args.format,
            report::FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    if let Err(e) = rules::validate_all() {
        eprintln!("Error: invalid rule data: {}", e);
        return Ok(EXIT_ERROR);
    }

    let config_path = resolve_config_path(args);
    let config = match Config::load(config_path.as_deref(), Path::new(".")) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let store = FsStore::new(&args.path, &config.excluded_paths)?;
    let mut runner = Runner::new(&config).technology(args.technology);

    let mut advisory_failure = None;
    if args.advisory || config.advisory.enabled {
        match ChatCompletionsClient::new(&config.advisory) {
            Ok(client) => runner = runner.advisory(Box::new(client)),
            Err(e) => {
                warn!(error = %e, "advisory analysis unavailable");
                advisory_failure = Some(CategorizedFindings::critical(format!(
                    "Analysis failed: {}",
                    e
                )));
            }
        }
    }

    let mut result = runner.run(&store)?;
    if advisory_failure.is_some() {
        result.advisory = advisory_failure;
    }

    if result.scanned == 0 {
        eprintln!("Warning: no files to scan");
    }

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result)?,
        "sarif" => report::write_sarif(&path_str, &result)?,
        "host" => report::write_host(&path_str, &result)?,
        _ => {
            let config_str = config_path.map(|p| p.to_string_lossy().to_string());
            report::write_pretty(&path_str, config_str.as_deref(), &result);
        }
    }

    if result.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    let selected: Vec<&TechnologyRuleSet> = match args.technology {
        Some(tech) => vec![rules::lookup(tech)],
        None => Technology::ALL.iter().map(|t| rules::lookup(*t)).collect(),
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&selected)?),
        "pretty" => {
            for rules in selected {
                write_rules(rules);
            }
        }
        other => {
            eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", other);
            return Ok(EXIT_ERROR);
        }
    }

    Ok(EXIT_SUCCESS)
}

fn write_rules(rules: &TechnologyRuleSet) {
    println!();
    print!("  {}", rules.name.cyan().bold());
    println!("  {}", format!("[{}]", rules.technology).dimmed());
    println!(
        "  {}{}",
        "Extensions: ".dimmed(),
        rules.file_extensions.join(", ")
    );
    println!();

    let init = &rules.initialization;
    println!("  {}", "Initialization:".bold());
    println!(
        "    {}({})",
        rules.qualified_initializer(),
        init.required_parameters().join(", ")
    );
    println!();

    println!("  {}", "Methods:".bold());
    for m in rules.methods {
        let params: Vec<_> = m.parameters.iter().map(|p| p.name).collect();
        let marker = if rules.required_methods.contains(&m.name) {
            "required".red().to_string()
        } else {
            "optional".dimmed().to_string()
        };
        println!("    {:<40} {}", format!("{}({})", m.name, params.join(", ")), marker);
    }
    println!();

    println!("  {}", "Best practices:".bold());
    for practice in rules.best_practices {
        println!("    - {}", practice);
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite or --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: mappcheck check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "mappcheck",
            "check",
            "app",
            "--format",
            "json",
            "--technology",
            "react-native",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.path, PathBuf::from("app"));
                assert_eq!(args.format, "json");
                assert_eq!(args.technology, Some(Technology::ReactNative));
                assert!(!args.advisory);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_technology() {
        assert!(Cli::try_parse_from(["mappcheck", "rules", "cobol"]).is_err());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("mappcheck.yaml");

        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(Config::parse_file(&output).is_ok());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);

        let forced = InitArgs {
            output,
            force: true,
        };
        assert_eq!(run_init(&forced).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_check_rejects_bad_format() {
        let args = CheckArgs {
            path: PathBuf::from("."),
            config: None,
            format: "xml".to_string(),
            technology: None,
            advisory: false,
        };
        assert_eq!(run_check(&args).unwrap(), EXIT_ERROR);
    }
}
