//! `just-weather` command-line entry point

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use just_weather::{
    DEFAULT_PORT, EXIT_INVALID_ARGS, WeatherClient, WeatherClientConfig, WeatherError,
};

const USAGE: &str = "\
Just Weather Client

Usage:
  just-weather [options] current <lat> <lon>
  just-weather [options] weather <city> [country] [region]
  just-weather [options] cities <query>
  just-weather [options] homepage
  just-weather [options] echo
  just-weather [options] clear-cache

Options:
  --host <host>        Server host (default: localhost)
  --port <port>        Server port (default: 10680)
  --timeout-ms <ms>    Connect and receive timeout (default: 5000)
  --cache-dir <dir>    Cache directory (default: $JUST_WEATHER_CACHE_DIR,
                       else <tmp>/just-weather/cache)
  --no-cache           Neither read nor write the response cache
  -h, --help           Show this help

Examples:
  just-weather current 59.33 18.07
  just-weather weather Stockholm SE
  just-weather cities Stock

Set RUST_LOG=debug for diagnostics on stderr.";

#[derive(Debug, PartialEq)]
enum Command {
    Current { lat: f64, lon: f64 },
    Weather {
        city: String,
        country: Option<String>,
        region: Option<String>,
    },
    Cities { query: String },
    Homepage,
    Echo,
    ClearCache,
    Help,
}

#[derive(Debug)]
struct Cli {
    config: WeatherClientConfig,
    command: Command,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = match parse_args(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("Error: {msg}\n\n{USAGE}");
            return ExitCode::from(EXIT_INVALID_ARGS as u8);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), WeatherError> {
    if cli.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut client = WeatherClient::new(cli.config);
    let result = match cli.command {
        Command::Current { lat, lon } => client.current(lat, lon)?,
        Command::Weather {
            city,
            country,
            region,
        } => client.weather_by_city(&city, country.as_deref(), region.as_deref())?,
        Command::Cities { query } => client.search_cities(&query)?,
        Command::Homepage => client.homepage()?,
        Command::Echo => client.echo()?,
        Command::ClearCache => {
            client.clear_cache();
            println!("Cache cleared");
            return Ok(());
        }
        Command::Help => return Ok(()),
    };

    print_json(&result)
}

fn print_json(value: &Value) -> Result<(), WeatherError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut config = WeatherClientConfig::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(Cli {
                    config,
                    command: Command::Help,
                });
            }
            "--host" => {
                let host = value_for(&arg, args.next())?;
                if host.is_empty() {
                    return Err("--host must not be empty".to_string());
                }
                config.host = host;
            }
            "--port" => {
                let port = value_for(&arg, args.next())?;
                config.port = match port.parse::<u16>() {
                    Ok(p) if p != 0 => p,
                    _ => {
                        return Err(format!(
                            "invalid port {port:?} (1-65535, default {DEFAULT_PORT})"
                        ));
                    }
                };
            }
            "--timeout-ms" => {
                let ms = value_for(&arg, args.next())?;
                config.timeout = match ms.parse::<u64>() {
                    Ok(ms) if ms > 0 => Duration::from_millis(ms),
                    _ => return Err(format!("invalid timeout {ms:?}")),
                };
            }
            "--cache-dir" => {
                config.cache.directory = PathBuf::from(value_for(&arg, args.next())?);
            }
            "--no-cache" => config.use_cache = false,
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => positional.push(arg),
        }
    }

    let command = parse_command(&positional)?;
    Ok(Cli { config, command })
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some((name, rest)) = args.split_first() else {
        return Err("missing command".to_string());
    };

    let command = match (name.as_str(), rest) {
        ("current", [lat, lon]) => Command::Current {
            lat: parse_coordinate(lat)?,
            lon: parse_coordinate(lon)?,
        },
        ("current", _) => return Err("usage: current <lat> <lon>".to_string()),
        ("weather", [city, extra @ ..]) if extra.len() <= 2 => Command::Weather {
            city: city.clone(),
            country: extra.first().cloned(),
            region: extra.get(1).cloned(),
        },
        ("weather", _) => return Err("usage: weather <city> [country] [region]".to_string()),
        ("cities", [query]) => Command::Cities {
            query: query.clone(),
        },
        ("cities", _) => return Err("usage: cities <query>".to_string()),
        ("homepage", []) => Command::Homepage,
        ("echo", []) => Command::Echo,
        ("clear-cache", []) => Command::ClearCache,
        ("homepage" | "echo" | "clear-cache", _) => {
            return Err(format!("{name} takes no arguments"));
        }
        ("help", []) => Command::Help,
        (other, _) => return Err(format!("unknown command {other:?}")),
    };
    Ok(command)
}

/// Whole-string decimal parse; rejects trailing garbage and non-finite values
fn parse_coordinate(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid coordinate {s:?}"))
}
