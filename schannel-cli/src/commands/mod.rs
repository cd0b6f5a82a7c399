//! CLI command implementations.

pub mod account;
pub mod config;
pub mod history;
pub mod invoices;
pub mod nodes;
pub mod services;
pub mod usage;

use anyhow::{Context, Result};
use schannel_fetch::LoginFlow;
use schannel_store::{
    AccountList, CredentialStore, DataBridge, SavedSession, SessionStore, StoreError,
    SystemKeychain, UserConfig,
};
use tracing::{debug, info};

use crate::Cli;

/// Account named by `--user`, else the most recently used one.
pub async fn resolve_user(cli: &Cli) -> Result<String> {
    if let Some(user) = &cli.user {
        return Ok(user.clone());
    }
    let accounts = AccountList::load().await.context("loading account list")?;
    accounts
        .last_used()
        .map(str::to_string)
        .ok_or_else(|| StoreError::NotLoggedIn("no account".to_string()))
        .context("run `schannel login <user>` first")
}

/// Saved session of `user`, logging in again with a remembered password
/// when the saved one is missing or expired.
pub async fn session_for(user: &str, config: &UserConfig) -> Result<SavedSession> {
    let store = SessionStore::default();
    match store.load(user).await {
        Ok(session) => Ok(session),
        Err(StoreError::NotLoggedIn(_)) => {
            let Some(password) = SystemKeychain::new().recall(user)? else {
                return Err(StoreError::NotLoggedIn(user.to_string()))
                    .with_context(|| format!("run `schannel login {user}` first"));
            };
            debug!(user, "Session expired, logging in with remembered password");
            let session = login(user, &password, config).await?;
            store.save(&session).await?;
            Ok(session)
        }
        Err(e) => Err(e.into()),
    }
}

/// Runs the login flow for `user`.
pub async fn login(user: &str, password: &str, config: &UserConfig) -> Result<SavedSession> {
    let flow = LoginFlow::new(config.site()?, config.proxy_url.as_str());
    let cookies = flow
        .authenticate(user, password)
        .await
        .with_context(|| format!("logging in as {user}"))?;
    info!(user, cookies = cookies.len(), "Logged in");
    Ok(SavedSession::new(user, cookies))
}

/// Builds a data bridge for the resolved account.
pub async fn connect(cli: &Cli, config: &UserConfig) -> Result<(String, DataBridge)> {
    let user = resolve_user(cli).await?;
    let session = session_for(&user, config).await?;
    let bridge = DataBridge::new(session.cookies, config.proxy_url.as_str(), config.site()?)?;
    Ok((user, bridge))
}
