//! OAuth2 flows for the Drive API
//!
//! Two flows back the CLI: the authorization-code exchange used once by
//! `init` (print the consent URL, paste the code back, keep the refresh
//! token), and the refresh-token exchange every other command runs at
//! startup to obtain a short-lived access token.

use anyhow::{anyhow, Context, Result};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use tracing::debug;

/// OAuth2 authorization endpoint.
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// OAuth2 token endpoint.
const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Out-of-band redirect: the provider displays the code for pasting.
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Full Drive scope.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Builds the consent URL the user must visit during `init`.
pub fn authorize_url(client_id: &str, client_secret: &str) -> Result<String> {
    let client = BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("invalid auth URL")?)
        .set_redirect_uri(
            RedirectUrl::new(REDIRECT_URI.to_string()).context("invalid redirect URL")?,
        );

    let (url, _csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .url();
    Ok(url.to_string())
}

/// Trades the pasted authorization code for a refresh token.
pub async fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<String> {
    let client = BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("invalid auth URL")?)
        .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).context("invalid token URL")?)
        .set_redirect_uri(
            RedirectUrl::new(REDIRECT_URI.to_string()).context("invalid redirect URL")?,
        );

    let token = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request_async(&http_client()?)
        .await
        .context("authorization code exchange failed")?;

    debug!("authorization code exchanged");
    token
        .refresh_token()
        .map(|t| t.secret().clone())
        .ok_or_else(|| anyhow!("token response carried no refresh token"))
}

/// Trades the stored refresh token for an access token.
pub async fn access_token(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<String> {
    let client = BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).context("invalid auth URL")?)
        .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).context("invalid token URL")?);

    let token = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(&http_client()?)
        .await
        .context("refresh token exchange failed")?;

    Ok(token.access_token().secret().clone())
}

fn http_client() -> Result<reqwest::Client> {
    // Disable redirects: the token endpoint must answer directly.
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("failed to build OAuth HTTP client")
}
