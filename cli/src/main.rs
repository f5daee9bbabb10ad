//! Ordo command-line front end.
//!
//! Runs queries through the full privacy pipeline (policy filter, mock tools,
//! audit trail) and exposes the policy scanner and tool catalog.
//!
//! Usage:
//!   cargo run -p ordo-cli -- query "What is my wallet balance?" --grant READ_WALLET --offline
//!   cargo run -p ordo-cli -- scan "Your code is 123456" --surface gmail
//!   cargo run -p ordo-cli -- tools

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ordo_audit::InMemoryAuditTrail;
use ordo_contracts::{
    agent::{QueryContext, QueryResponse},
    error::OrdoResult,
    permission::{Permission, Surface},
};
use ordo_core::{
    config::{LogFormat, LoggingSettings},
    prompts, OrdoAgent, OrdoConfig,
};
use ordo_policy::PolicyEngine;
use ordo_tools::MockToolInvoker;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Ordo: privacy-first assistant core.
#[derive(Parser, Debug)]
#[command(
    name = "ordo",
    about = "Ordo privacy-aware assistant core",
    long_about = "Answers questions over email, social and wallet data while withholding\n\
                  one-time codes, recovery phrases and financial documents."
)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a query through the full pipeline.
    Query(QueryArgs),
    /// Scan text for sensitive content.
    Scan(ScanArgs),
    /// List the available tools.
    Tools,
}

#[derive(Args, Debug)]
struct QueryArgs {
    text: String,

    /// Grant a permission (e.g. READ_WALLET). Repeatable.
    #[arg(long = "grant", value_name = "PERMISSION")]
    grants: Vec<Permission>,

    #[arg(long)]
    user_id: Option<String>,

    /// Surface credential as SURFACE=VALUE. Repeatable.
    #[arg(long = "token", value_name = "SURFACE=VALUE", value_parser = parse_token)]
    tokens: Vec<(String, String)>,

    /// Use the deterministic offline model instead of the hosted API.
    #[arg(long)]
    offline: bool,

    /// Print the response as JSON.
    #[arg(long)]
    json: bool,

    /// Print the audit trail recorded while answering.
    #[arg(long)]
    show_audit: bool,
}

#[derive(Args, Debug)]
struct ScanArgs {
    text: String,

    #[arg(long, default_value = "web")]
    surface: Surface,
}

fn parse_token(s: &str) -> Result<(String, String), String> {
    let (surface, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SURFACE=VALUE, got '{}'", s))?;
    let surface: Surface = surface.parse().map_err(|e| format!("{}", e))?;
    Ok((surface.as_str().to_string(), value.to_string()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);
    debug!(agent = ?config.agent, "configuration loaded");

    let result = match cli.command {
        Command::Query(args) => run_query(args, config).await,
        Command::Scan(args) => run_scan(args, &config),
        Command::Tools => {
            print_tools();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ordo error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> OrdoResult<OrdoConfig> {
    let config = match path {
        Some(path) => OrdoConfig::from_file(path)?,
        None => OrdoConfig::default(),
    };
    config.apply_env()
}

/// Structured logging to stderr. `RUST_LOG` overrides the configured level.
fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match settings.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run_query(args: QueryArgs, config: OrdoConfig) -> OrdoResult<()> {
    let trail = Arc::new(InMemoryAuditTrail::new());
    let policy = PolicyEngine::from_settings(&config.policy)?.with_audit(trail.clone());
    let tools = MockToolInvoker::with_sample_data();

    let llm = config.llm.clone();
    let offline = args.offline;
    let agent = OrdoAgent::new(Arc::new(policy), Arc::new(tools))
        .with_settings(config.agent.clone())
        .with_audit(trail.clone())
        .with_model_factory(move || ordo_llm::model_from_settings(&llm, offline));

    let context = build_context(&args);
    let response = agent.process_query(&args.text, context).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response, &args.grants);
    }

    if args.show_audit {
        print_audit(&trail)?;
    }

    Ok(())
}

fn build_context(args: &QueryArgs) -> QueryContext {
    let mut context = QueryContext {
        user_id: args.user_id.clone(),
        ..QueryContext::default()
    };
    for permission in &args.grants {
        context = context.with_permission(*permission, true);
    }
    for (surface, token) in &args.tokens {
        context = context.with_token(surface.clone(), token.clone());
    }
    context
}

fn run_scan(args: ScanArgs, config: &OrdoConfig) -> OrdoResult<()> {
    let engine = PolicyEngine::from_settings(&config.policy)?;
    let result = engine.scan_content(&args.text, args.surface);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_response(response: &QueryResponse, granted: &[Permission]) {
    println!("{}", response.response);

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            println!("  [{}:{}] {}", source.surface, source.tool, source.preview);
        }
    }

    if !response.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &response.errors {
            println!("  - {}", error);
        }
    }

    let missing = missing_permissions(&response.errors, granted);
    if !missing.is_empty() {
        println!();
        println!("To continue, grant:");
        for permission in missing {
            println!("  --grant {:<22} {}", permission.as_str(), permission.description());
        }
    }
}

/// Ungranted permissions named by a "Missing permissions" error.
fn missing_permissions(errors: &[String], granted: &[Permission]) -> Vec<Permission> {
    let Some(error) = errors.iter().find(|e| e.starts_with(prompts::MISSING_PERMISSIONS)) else {
        return Vec::new();
    };
    let named: Vec<&str> = error
        .split_once(':')
        .map(|(_, list)| list.split(',').map(str::trim).collect())
        .unwrap_or_default();

    Permission::ALL
        .into_iter()
        .filter(|p| named.contains(&p.as_str()) && !granted.contains(p))
        .collect()
}

fn print_audit(trail: &InMemoryAuditTrail) -> OrdoResult<()> {
    let log = trail.export_log();

    println!();
    println!("Audit trail ({} events):", log.events.len());
    for event in &log.events {
        println!("  #{} {}", event.sequence, serde_json::to_string(&event.entry)?);
    }
    println!("  chain intact: {}", trail.verify_integrity());
    if !log.terminal_hash.is_empty() {
        println!("  terminal hash: {}", log.terminal_hash);
    }
    Ok(())
}

fn print_tools() {
    println!("{:<28} {:<9} {:<22} DESCRIPTION", "TOOL", "SURFACE", "PERMISSION");
    for spec in ordo_tools::catalog() {
        let permission = spec.permission.map(|p| p.as_str()).unwrap_or("-");
        println!(
            "{:<28} {:<9} {:<22} {}",
            spec.name,
            spec.surface.as_str(),
            permission,
            spec.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ordo",
            "query",
            "What is my wallet balance?",
            "--grant",
            "read_wallet",
            "--token",
            "wallet=7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "--offline",
        ])
        .unwrap();

        let Command::Query(args) = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(args.grants, vec![Permission::ReadWallet]);
        assert_eq!(args.tokens[0].0, "WALLET");
        assert!(args.offline);

        let context = build_context(&args);
        assert!(context.permissions.has(Permission::ReadWallet));
        assert!(context.user_id.is_none());
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Cli::try_parse_from(["ordo", "query", "hi", "--grant", "READ_DIARY"]).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(parse_token("no-equals-sign").is_err());
        assert!(parse_token("fax=123").is_err());
    }

    #[test]
    fn missing_permissions_are_listed_once() {
        let errors = vec!["Missing permissions: READ_SOCIAL_X, READ_GMAIL".to_string()];

        let missing = missing_permissions(&errors, &[Permission::ReadGmail]);

        assert_eq!(missing, vec![Permission::ReadSocialX]);
    }

    #[test]
    fn no_permission_hint_for_other_errors() {
        let errors = vec!["Tool get_x_dms failed: timeout".to_string()];
        assert!(missing_permissions(&errors, &[]).is_empty());
    }
}
