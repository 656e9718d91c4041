use clap::{Parser, Subcommand};
use serde::Serialize;
use toolbelt_core::logging::{self, LogFormat};
use toolbelt_proto::{PasswordRequest, UsernameRequest};

mod client;

use client::{ApiClient, ClientError, Table};

/// Toolbelt command-line interface
#[derive(Parser)]
#[command(name = "toolbelt", author, version, about = "Client for the toolbelt API", long_about = None)]
struct Cli {
    /// Base URL of the toolbelt server
    #[arg(
        long,
        global = true,
        env = "TOOLBELT_API_BASE_URL",
        default_value = "http://localhost:5000"
    )]
    api_url: String,

    /// Print the raw JSON envelope
    #[arg(long, global = true)]
    json: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommands for the CLI
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add two numbers
    Add {
        #[arg(allow_hyphen_values = true)]
        num1: f64,
        #[arg(allow_hyphen_values = true)]
        num2: f64,
    },
    /// Subtract NUM2 from NUM1
    Subtract {
        #[arg(allow_hyphen_values = true)]
        num1: f64,
        #[arg(allow_hyphen_values = true)]
        num2: f64,
    },
    /// Expand an abbreviation
    Expand {
        abbreviation: String,
        /// Table to look the abbreviation up in
        #[arg(long, value_enum, default_value = "time-zones")]
        table: Table,
    },
    /// Generate a random username
    Username {
        #[arg(long, default_value_t = 8)]
        length: i64,
        #[arg(long, default_value = "")]
        prefix: String,
        /// Leave digits out of the character pool
        #[arg(long)]
        no_numbers: bool,
        /// Add `_` and `-` to the character pool
        #[arg(long)]
        special: bool,
    },
    /// Generate a random password
    Password {
        #[arg(long, default_value_t = 12)]
        length: i64,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_numbers: bool,
        #[arg(long)]
        no_special: bool,
    },
    /// Check that the server is up
    Health,
    /// Run local diagnostic checks (`--json` for a JSON report)
    Doctor,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize response: {}", e),
    }
}

fn report<T: Serialize>(
    json: bool,
    result: Result<T, ClientError>,
    human: impl FnOnce(&T),
) -> i32 {
    match result {
        Ok(value) => {
            if json {
                print_json(&value);
            } else {
                human(&value);
            }
            0
        }
        Err(err) => {
            match (json, err.to_response()) {
                (true, Some(envelope)) => print_json(&envelope),
                (false, Some(envelope)) => {
                    eprintln!("error: {}", envelope.error);
                    if let Some(codes) = envelope.available {
                        eprintln!("available: {}", codes.join(", "));
                    }
                }
                (_, None) => eprintln!("error: {}", err),
            }
            1
        }
    }
}

fn doctor(json: bool) -> i32 {
    let report = toolbelt_core::doctor::doctor_check();
    if json {
        print_json(&report);
    } else {
        println!("doctor: {}", report.overall);
        println!("version: {}", report.version);
        for check in &report.checks {
            println!("- [{}] {}: {}", check.status, check.id, check.summary);
        }
    }
    if report.overall == "fail" {
        1
    } else {
        0
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        logging::init(LogFormat::Compact, "toolbelt=debug,toolbelt_core=debug");
    }

    let client = ApiClient::new(cli.api_url);
    let json = cli.json;
    let code = match cli.command {
        Some(Commands::Add { num1, num2 }) => report(json, client.add(num1, num2).await, |r| {
            println!("{}", r.result)
        }),
        Some(Commands::Subtract { num1, num2 }) => {
            report(json, client.subtract(num1, num2).await, |r| {
                println!("{}", r.result)
            })
        }
        Some(Commands::Expand {
            abbreviation,
            table,
        }) => report(json, client.expand(table, &abbreviation).await, |r| {
            println!("{}: {}", r.abbreviation, r.expansion)
        }),
        Some(Commands::Username {
            length,
            prefix,
            no_numbers,
            special,
        }) => {
            let req = UsernameRequest {
                length: length.into(),
                include_numbers: !no_numbers,
                include_special: special,
                prefix,
            };
            report(json, client.username(&req).await, |r| {
                println!("{}", r.username)
            })
        }
        Some(Commands::Password {
            length,
            no_uppercase,
            no_lowercase,
            no_numbers,
            no_special,
        }) => {
            let req = PasswordRequest {
                length: length.into(),
                include_uppercase: !no_uppercase,
                include_lowercase: !no_lowercase,
                include_numbers: !no_numbers,
                include_special: !no_special,
            };
            report(json, client.password(&req).await, |r| {
                println!("{}", r.password)
            })
        }
        Some(Commands::Health) => report(json, client.health().await, |r| {
            println!("{} ({}) at {}", r.status, r.service, client.base_url())
        }),
        Some(Commands::Doctor) => doctor(json),
        None => {
            println!("No subcommand provided. Try `toolbelt health`.");
            0
        }
    };
    std::process::exit(code);
}
