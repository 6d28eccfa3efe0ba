//! innostat - InnoDB status metrics extractor.
//!
//! Reads a captured `SHOW ENGINE INNODB STATUS` report from a file or stdin,
//! runs the selected check and prints the result as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use innostat_core::collector::innodb::ParseOptions;
use innostat_core::collector::{Check, CheckError, CheckOutput, DumpSource, SourceError};

/// InnoDB status metrics extractor.
#[derive(Parser)]
#[command(name = "innostat", about = "InnoDB status metrics extractor", version)]
struct Args {
    /// Status report to parse. Reads stdin when absent or "-".
    path: Option<PathBuf>,

    /// `innodb_page_size` in bytes; enables buffer pool byte metrics.
    #[arg(long, env = "INNOSTAT_PAGE_SIZE", value_parser = clap::value_parser!(i64).range(1..))]
    page_size: Option<i64>,

    /// Check to run (innodb or mysql).
    #[arg(long, default_value = "innodb")]
    check: Check,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Check result with its collection time.
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    output: CheckOutput,
    collected_at: i64,
}

/// Initializes the tracing subscriber on stderr; stdout carries only JSON.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["innostat", "innostat_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_source(path: Option<&PathBuf>) -> Result<DumpSource, SourceError> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            debug!("Reading status report from {}", path.display());
            DumpSource::from_path(path)
        }
        _ => {
            debug!("Reading status report from stdin");
            DumpSource::from_reader(std::io::stdin().lock())
        }
    }
}

/// Output for a check that does not apply to this server.
fn empty_output(check: Check) -> CheckOutput {
    match check {
        Check::Innodb => CheckOutput::Innodb(Vec::new()),
        Check::Mysql => CheckOutput::Tables(Vec::new()),
    }
}

fn run(args: &Args) -> Result<CheckOutput, CheckError> {
    let mut source = open_source(args.path.as_ref())?;
    let options = ParseOptions {
        page_size: args.page_size,
    };

    match args.check.run(&mut source, &options) {
        Err(CheckError::Ignored) => {
            info!("{} check skipped: storage engine not available", args.check);
            Ok(empty_output(args.check))
        }
        result => result,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let output = match run(&args) {
        Ok(output) => output,
        Err(e) => {
            error!("{} check failed: {}", args.check, e);
            return ExitCode::FAILURE;
        }
    };

    let report = Report {
        output,
        collected_at: Utc::now().timestamp(),
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize {} output: {}", args.check, e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["innostat"]).unwrap();
        assert!(args.path.is_none());
        assert_eq!(args.check, Check::Innodb);
        assert!(!args.pretty);
    }

    #[test]
    fn test_args_check_and_page_size() {
        let args =
            Args::try_parse_from(["innostat", "--check", "mysql", "--page-size", "16384", "status.txt"])
                .unwrap();
        assert_eq!(args.check, Check::Mysql);
        assert_eq!(args.page_size, Some(16384));
        assert_eq!(args.path, Some(PathBuf::from("status.txt")));
    }

    #[test]
    fn test_args_reject_bad_values() {
        assert!(Args::try_parse_from(["innostat", "--check", "system"]).is_err());
        assert!(Args::try_parse_from(["innostat", "--page-size", "0"]).is_err());
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report {
            output: empty_output(Check::Innodb),
            collected_at: 1700000000,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"innodb": [], "collected_at": 1700000000}));
    }

    #[test]
    fn test_empty_output_per_check() {
        assert_eq!(empty_output(Check::Mysql), CheckOutput::Tables(Vec::new()));
    }
}
