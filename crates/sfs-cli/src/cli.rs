//! Argument parsing and command dispatch.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sfs_config::load_config;
use sfs_credentials::TerminalPrompt;
use sfs_telemetry::{
    GlobalContextGuard, LogFormat, LoggingConfig, init_logging, log_format_from_env,
};
use tracing::error;

use crate::commands::auth::{handle_add, handle_list, handle_remove, handle_update};
use crate::commands::serve::{config_error, handle_serve};
use crate::error::{CliError, CliResult};

const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_cli_logging() {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }
    let _context = GlobalContextGuard::new(command_label(cli.command.as_ref()));

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            error!(exit_code = err.exit_code(), "command failed");
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn init_cli_logging() -> CliResult<()> {
    let format = log_format_from_env(env::var(ENV_LOG_FORMAT).ok().as_deref())
        .unwrap_or_else(LogFormat::infer);
    let config = LoggingConfig {
        format,
        ..LoggingConfig::default()
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.as_deref();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => handle_serve(config_path).await,
        Command::Auth(auth) => {
            let credentials = resolve_credentials(cli.credentials, config_path)?;
            dispatch_auth(auth, &credentials)
        }
    }
}

fn dispatch_auth(command: AuthCommand, credentials: &Path) -> CliResult<()> {
    let prompt = TerminalPrompt;
    let mut out = io::stdout().lock();
    match command {
        AuthCommand::Add(args) => handle_add(
            credentials,
            &args.username,
            args.password.as_deref(),
            &prompt,
            &mut out,
        ),
        AuthCommand::Update(args) => handle_update(
            credentials,
            &args.username,
            args.password.as_deref(),
            &prompt,
            &mut out,
        ),
        AuthCommand::Remove(args) => handle_remove(credentials, &args.username, &mut out),
        AuthCommand::List => handle_list(credentials, &mut out),
    }
}

/// `--credentials` wins; otherwise the configuration file and `CREDENTIALS` apply.
fn resolve_credentials(flag: Option<PathBuf>, config_path: Option<&Path>) -> CliResult<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    let config = load_config(config_path).map_err(config_error)?;
    if config.credentials.is_empty() {
        return Err(CliError::validation(
            "credential file name not set but is required: pass --credentials or set CREDENTIALS",
        ));
    }
    Ok(PathBuf::from(config.credentials))
}

const fn command_label(command: Option<&Command>) -> &'static str {
    match command {
        None | Some(Command::Serve) => "serve",
        Some(Command::Auth(AuthCommand::Add(_))) => "auth_add",
        Some(Command::Auth(AuthCommand::Update(_))) => "auth_update",
        Some(Command::Auth(AuthCommand::Remove(_))) => "auth_remove",
        Some(Command::Auth(AuthCommand::List)) => "auth_list",
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "static-file-server",
    version,
    about = "Serve a folder over HTTP or HTTPS behind configurable access guards"
)]
struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "YAML configuration file; environment variables override its values"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Credential file used by the auth subcommands (defaults to CREDENTIALS)"
    )]
    credentials: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the file server (default).
    Serve,
    /// Manage basic-authentication users.
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Add a user; prompts for the password when omitted.
    Add(AuthUserArgs),
    /// Change a user's password; prompts when omitted.
    Update(AuthUserArgs),
    /// Remove a user.
    Remove(AuthRemoveArgs),
    /// Print every username, one per line.
    List,
}

#[derive(Args, Debug)]
struct AuthUserArgs {
    #[arg(help = "Username")]
    username: String,
    #[arg(help = "Password; prompted with confirmation when omitted")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct AuthRemoveArgs {
    #[arg(help = "Username")]
    username: String,
}
