use std::io::BufRead;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use authcore::{state::AppState, telemetry, AuthError, LoginRequest, RegisterRequest, Role};

/// Register users and check credentials against the configured database.
/// The password comes from AUTHCORE_PASSWORD, or the first line of stdin.
#[derive(Parser)]
#[command(name = "authcore", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a user
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// Check a user's credentials
    Login {
        #[arg(long)]
        email: String,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

fn read_password() -> anyhow::Result<String> {
    if let Ok(p) = std::env::var("AUTHCORE_PASSWORD") {
        return Ok(p);
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn exit_code(err: &AuthError) -> ExitCode {
    match err {
        AuthError::DuplicateUser => ExitCode::from(2),
        AuthError::InvalidCredentials => ExitCode::from(3),
        _ => ExitCode::from(1),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cli = Cli::parse();
    let state = AppState::init().await?;
    let password = read_password()?;

    let result = match cli.command {
        Command::Register { name, email, role } => {
            let mut req = RegisterRequest::new(name, email, password);
            req.role = role;
            state.registrar().register(req).await
        }
        Command::Login { email } => {
            state
                .authenticator()
                .authenticate(LoginRequest::new(email, password))
                .await
        }
    };

    match result {
        Ok(user) => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if e.is_internal() {
                tracing::error!(error = %e, "request failed");
            }
            eprintln!("{}", e);
            Ok(exit_code(&e))
        }
    }
}
