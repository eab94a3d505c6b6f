//! CLI tool to issue API keys for lab machines and admins.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --name "Lab PC 3" --role tester --expires-in 365d

use std::process::ExitCode;

use test_panel_lib::config::Config;
use test_panel_lib::db::DbPool;
use test_panel_lib::models::ApiKeyRole;
use test_panel_lib::services::api_key;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    name: String,
    role: ApiKeyRole,
    expires_in: Option<String>,
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut name: Option<String> = None;
    let mut role = ApiKeyRole::default();
    let mut expires_in: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--name" | "-n" => {
                name = Some(iter.next().ok_or("--name needs a value")?.clone());
            }
            "--role" | "-r" => {
                let value = iter.next().ok_or("--role needs a value")?;
                role = ApiKeyRole::parse(value).ok_or_else(|| {
                    format!(
                        "Invalid role '{}'. Must be: admin, tester, viewer",
                        value
                    )
                })?;
            }
            "--expires-in" | "-e" => {
                expires_in = Some(iter.next().ok_or("--expires-in needs a value")?.clone());
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or("--name is required")?;

    Ok(Some(Args {
        name,
        role,
        expires_in,
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        return ExitCode::FAILURE;
    }

    let (full_key, api_key) =
        match api_key::create_key(&pool, &args.name, args.role, args.expires_in.as_deref()).await
        {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error generating key: {}", e);
                return ExitCode::FAILURE;
            }
        };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  ID:      {}", api_key.id);
    println!("  Name:    {}", api_key.name);
    println!("  Role:    {}", api_key.role);
    println!("  Prefix:  {}", api_key.key_prefix);
    match api_key.expires_at {
        Some(expires) => println!("  Expires: {}", expires.to_rfc3339()),
        None => println!("  Expires: Never"),
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("  Save this key! It cannot be retrieved later.");
    println!("════════════════════════════════════════════════════════════════");
    println!();

    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: generate-api-key --name <name> [--role <role>] [--expires-in <duration>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --name, -n        Name for the API key (required)");
    eprintln!("  --role, -r        Role: admin, tester, viewer (default: tester)");
    eprintln!("  --expires-in, -e  Expiration: 30d, 2w, 6m, 1y (default: never)");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  generate-api-key --name \"Lab PC 3\" --expires-in 365d");
    eprintln!("  generate-api-key --name \"Release lead\" --role admin");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_to_tester() {
        let parsed = parse_args(&args(&["-n", "Lab PC"])).unwrap().unwrap();
        assert_eq!(parsed.role, ApiKeyRole::Tester);
        assert_eq!(parsed.expires_in, None);
    }

    #[test]
    fn test_full_arguments() {
        let parsed = parse_args(&args(&["--name", "Lead", "--role", "admin", "-e", "1y"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.role, ApiKeyRole::Admin);
        assert_eq!(parsed.expires_in.as_deref(), Some("1y"));
    }

    #[test]
    fn test_errors_and_help() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--name"])).is_err());
        assert!(parse_args(&args(&["-n", "x", "--role", "contributor"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), None);
    }
}
