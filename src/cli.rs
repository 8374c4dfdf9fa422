//! Command-line flag parsing for the `bess-quote` binary.

use std::env;
use std::path::PathBuf;

use bess_quote::sizing::Objective;

/// Parsed CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub objective: Option<Objective>,
    pub duration_hours: Option<f64>,
    pub cashflow_out: Option<PathBuf>,
    pub line_items_out: Option<PathBuf>,
    pub list_verticals: bool,
    pub help: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            preset: None,
            objective: None,
            duration_hours: None,
            cashflow_out: None,
            line_items_out: None,
            list_verticals: false,
            help: false,
            #[cfg(feature = "api")]
            serve: false,
            #[cfg(feature = "api")]
            port: 3000,
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1).collect())
}

/// Parses flags, excluding the program name.
///
/// `--help` short-circuits with `help` set; the caller prints usage.
pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut cli = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                cli.help = true;
                return Ok(cli);
            }
            "--scenario" => {
                let path = next_value(&args, &mut i, "--scenario", "a path")?;
                if cli.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                let name = next_value(&args, &mut i, "--preset", "a name")?;
                if cli.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--objective" => {
                let v = next_value(&args, &mut i, "--objective", "a name")?;
                let objective =
                    Objective::from_key(v).ok_or_else(|| format!("unknown objective \"{v}\""))?;
                cli.objective = Some(objective);
            }
            "--duration" => {
                let v = next_value(&args, &mut i, "--duration", "a number of hours")?;
                let hours = v
                    .parse::<f64>()
                    .map_err(|_| format!("--duration value \"{v}\" is not a number"))?;
                cli.duration_hours = Some(hours);
            }
            "--cashflow-out" => {
                let path = next_value(&args, &mut i, "--cashflow-out", "a path")?;
                cli.cashflow_out = Some(PathBuf::from(path));
            }
            "--line-items-out" => {
                let path = next_value(&args, &mut i, "--line-items-out", "a path")?;
                cli.line_items_out = Some(PathBuf::from(path));
            }
            "--list-verticals" => cli.list_verticals = true,
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                let v = next_value(&args, &mut i, "--port", "a u16 argument")?;
                cli.port = v
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{v}\" is not a valid u16"))?;
            }
            other => return Err(format!("unknown argument \"{other}\"")),
        }
        i += 1;
    }

    Ok(cli)
}

fn next_value<'a>(
    args: &'a [String],
    i: &mut usize,
    flag: &str,
    what: &str,
) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires {what}"))
}

pub fn print_usage() {
    eprintln!("bess-quote: battery storage load-to-financial quotation engine");
    eprintln!();
    eprintln!("Usage: bess-quote [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>         Load quote inputs from a TOML file");
    eprintln!("  --preset <name>           Use a built-in preset (hotel_midscale)");
    eprintln!("  --objective <name>        Override objective");
    eprintln!("                            (peak_shaving, resilience, arbitrage, microgrid)");
    eprintln!("  --duration <hours>        Override battery duration");
    eprintln!("  --cashflow-out <path>     Export the cash-flow schedule to CSV");
    eprintln!("  --line-items-out <path>   Export cost line items to CSV");
    eprintln!("  --list-verticals          List supported verticals and exit");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                   Start the REST API server instead of quoting");
        eprintln!("  --port <u16>              API server port (default: 3000)");
    }
    eprintln!("  --help                    Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the hotel_midscale preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: bess_quote=info).");
}
