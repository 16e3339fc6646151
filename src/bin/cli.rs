use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use mobscan::config::{starter_toml, CONFIG_FILE_NAME};
use mobscan::rules::Registry;
use mobscan::{render_report, scan, OutputFormat, Result, ScanError, ScanOptions, Severity};

#[derive(Parser)]
#[command(
    name = "mobscan",
    version,
    about = "Static security scanner for mobile app source trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Console,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Console => OutputFormat::Console,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FailOn {
    Low,
    Medium,
    High,
}

impl From<FailOn> for Severity {
    fn from(f: FailOn) -> Self {
        match f {
            FailOn::Low => Severity::Low,
            FailOn::Medium => Severity::Medium,
            FailOn::High => Severity::High,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Scan a source tree and report findings
    Scan {
        /// Target directory (or single file's parent) to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file; defaults to .mobscan.toml at the target root
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "console")]
        format: Format,

        /// Severity that fails the scan (overrides config)
        #[arg(long, value_enum)]
        fail_on: Option<FailOn>,

        /// Rule ids to skip (repeatable)
        #[arg(long = "ignore-rule", value_name = "RULE_ID")]
        ignore_rules: Vec<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the built-in rules
    ListRules {
        #[arg(short, long, value_enum, default_value = "console")]
        format: Format,
    },

    /// Write a starter .mobscan.toml to the current directory
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn run_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format: Format,
    fail_on: Option<FailOn>,
    ignore_rules: Vec<String>,
    output: Option<PathBuf>,
) -> Result<bool> {
    let options = ScanOptions {
        config_path: config,
        fail_on: fail_on.map(Into::into),
        ignore_rules,
    };
    let report = scan(&path, &options)?;
    let rendered = render_report(&report, format.into())?;
    match output {
        Some(dest) => fs::write(&dest, rendered)
            .map_err(|e| ScanError::Output(format!("cannot write {}: {e}", dest.display())))?,
        None => print!("{rendered}"),
    }
    Ok(report.passed)
}

fn run_list_rules(format: Format) -> Result<()> {
    let registry = Registry::with_builtin_rules();
    match format {
        Format::Json => {
            let metas = registry.list_rules();
            println!("{}", serde_json::to_string_pretty(&metas)?);
        }
        Format::Console => {
            for meta in registry.list_rules() {
                println!(
                    "{:<30} {:<8} [{}] {}",
                    meta.id, meta.severity, meta.group, meta.description
                );
            }
        }
    }
    Ok(())
}

fn run_init(force: bool) -> Result<()> {
    let dest = PathBuf::from(CONFIG_FILE_NAME);
    if dest.exists() && !force {
        return Err(ScanError::Config(format!(
            "{CONFIG_FILE_NAME} already exists (use --force to overwrite)"
        )));
    }
    fs::write(&dest, starter_toml())?;
    println!("wrote {CONFIG_FILE_NAME}");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Scan {
            path,
            config,
            format,
            fail_on,
            ignore_rules,
            output,
        } => run_scan(path, config, format, fail_on, ignore_rules, output),
        Command::ListRules { format } => run_list_rules(format).map(|_| true),
        Command::Init { force } => run_init(force).map(|_| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
