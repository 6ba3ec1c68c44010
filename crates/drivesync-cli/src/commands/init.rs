//! `init` — set up a working copy and authorize the account.

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use drivesync_core::Context;

/// Compiled-in fallback API credentials, overridable through the
/// environment.
const DEFAULT_CLIENT_ID: &str = "354790962074-7rrlnuanmamgg1i4feed12dpuq871bvd.apps.googleusercontent.com";
const DEFAULT_CLIENT_SECRET: &str = "RHjKdah8RrHFwu6fcc0uEVCw";

const CLIENT_ID_ENV: &str = "GOOGLE_API_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "GOOGLE_API_CLIENT_SECRET";

#[derive(Debug, Args)]
pub struct InitCommand {}

impl InitCommand {
    pub async fn execute(self) -> Result<()> {
        let root = std::env::current_dir().context("cannot determine current directory")?;

        let client_id = std::env::var(CLIENT_ID_ENV).unwrap_or_default();
        let client_secret = std::env::var(CLIENT_SECRET_ENV).unwrap_or_default();
        let (client_id, client_secret) = if client_id.is_empty() || client_secret.is_empty() {
            (
                DEFAULT_CLIENT_ID.to_string(),
                DEFAULT_CLIENT_SECRET.to_string(),
            )
        } else {
            (client_id, client_secret)
        };

        let url = drivesync_remote::auth::authorize_url(&client_id, &client_secret)?;
        println!("Visit this URL to get an authorization code");
        println!("{url}");

        let code: String = dialoguer::Input::new()
            .with_prompt("Paste the authorization code")
            .interact_text()
            .context("failed to read authorization code")?;

        let refresh_token =
            drivesync_remote::auth::exchange_code(&client_id, &client_secret, code.trim()).await?;

        let context = Context::initialize(&root, client_id, client_secret, refresh_token)?;
        info!(root = %context.abs_path.display(), "working copy initialized");
        println!("Initialized working copy at {}", context.abs_path.display());
        Ok(())
    }
}
