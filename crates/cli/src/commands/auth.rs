//! auth command - Authorize drb against a Dropbox app
//!
//! Runs the three-legged OAuth 1.0 flow: obtain a request token, let the user
//! approve it in a browser, exchange it for an access token and store both the
//! app credentials and the access token in the configuration file.

use anyhow::Context;
use clap::Args;
use drb_core::{ConfigManager, Token, authorize_url};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

use super::{GlobalOptions, report};

/// Authorize drb to access a Dropbox account
#[derive(Args, Debug)]
pub struct AuthArgs {
    /// App key from the Dropbox developer console
    #[arg(long, env = "DRB_APP_KEY")]
    pub key: Option<String>,

    /// App secret from the Dropbox developer console
    #[arg(long, env = "DRB_APP_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Forget the stored access token, keeping the app credentials
    #[arg(long)]
    pub logout: bool,
}

pub async fn execute(args: AuthArgs, global: &GlobalOptions) -> ExitCode {
    let formatter = Formatter::new(global.output);

    let manager = match ConfigManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to locate configuration: {e}"));
            return ExitCode::GeneralError;
        }
    };
    let mut config = match manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::GeneralError;
        }
    };

    if args.logout {
        config.token = None;
        if let Err(e) = manager.save(&config) {
            formatter.error(&format!("Failed to save configuration: {e}"));
            return ExitCode::GeneralError;
        }
        formatter.success("Access token removed");
        return ExitCode::Success;
    }

    let app = match (args.key, args.secret, config.app.clone()) {
        (Some(key), Some(secret), _) => Token::new(key, secret),
        (None, None, Some(app)) => app,
        _ => {
            formatter.error("Both --key and --secret are required for the first authorization");
            return ExitCode::UsageError;
        }
    };

    let mut client = match drb_http::connect(app.clone(), None) {
        Ok(c) => c,
        Err(e) => return report(&formatter, "Failed to create client", &e),
    };

    let request_token = match client.obtain_request_token().await {
        Ok(t) => t,
        Err(e) => return report(&formatter, "Failed to obtain request token", &e),
    };

    let url = authorize_url(&request_token);
    eprintln!("Open this URL in a browser and allow access:");
    eprintln!();
    eprintln!("  {}", formatter.style_url(&url));
    eprintln!();
    eprint!("Press Enter once access is granted...");
    if let Err(e) = wait_for_enter().await {
        formatter.error(&format!("{e:#}"));
        return ExitCode::GeneralError;
    }

    let access_token = match client.obtain_access_token().await {
        Ok(t) => t,
        Err(e) => return report(&formatter, "Failed to obtain access token", &e),
    };
    tracing::debug!(token = ?access_token, "Access token obtained");

    config.app = Some(app);
    config.token = Some(access_token);
    if let Err(e) = manager.save(&config) {
        formatter.error(&format!("Failed to save configuration: {e}"));
        return ExitCode::GeneralError;
    }

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "authorized": true,
            "config": manager.config_path(),
        }));
    } else {
        formatter.success(&format!(
            "Authorized. Credentials saved to {}",
            manager.config_path().display()
        ));
    }
    ExitCode::Success
}

async fn wait_for_enter() -> anyhow::Result<()> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read confirmation from stdin")?;
    Ok(())
}
