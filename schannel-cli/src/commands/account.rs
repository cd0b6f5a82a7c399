//! Login and logout commands.

use anyhow::{Context, Result, bail};
use clap::Args;
use schannel_store::{AccountList, CredentialStore, HistoryStore, SessionStore, SystemKeychain, UserConfig};
use std::io::{BufRead, Write};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account name; defaults to --user or the last account.
    pub name: Option<String>,

    /// Password; read from the keychain or stdin when omitted.
    #[arg(long, env = "SCHANNEL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Keep the password in the system keychain.
    #[arg(long)]
    pub remember: bool,
}

/// Arguments for the logout command.
#[derive(Args)]
pub struct LogoutArgs {
    /// Also delete the remembered password and recorded history.
    #[arg(long)]
    pub forget: bool,
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli, config: &UserConfig) -> Result<()> {
    let mut accounts = AccountList::load().await.context("loading account list")?;
    let Some(user) = args
        .name
        .clone()
        .or_else(|| cli.user.clone())
        .or_else(|| accounts.last_used().map(str::to_string))
    else {
        bail!("no account given, run `schannel login <user>`");
    };

    let keychain = SystemKeychain::new();
    let password = match &args.password {
        Some(p) => p.clone(),
        None => match keychain.recall(&user)? {
            Some(p) => p,
            None => prompt_password(&user)?,
        },
    };

    let session = super::login(&user, &password, config).await?;
    SessionStore::default().save(&session).await?;

    accounts.touch(&user);
    accounts.save().await.context("saving account list")?;

    if args.remember {
        keychain
            .remember(&user, &password)
            .context("storing password in keychain")?;
    }

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Logged in as {user}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "user": user,
                "loggedInAt": session.logged_in_at.to_rfc3339(),
                "cookies": session.cookies.len(),
                "remembered": args.remember,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

/// Runs the logout command.
pub async fn logout(args: &LogoutArgs, cli: &Cli) -> Result<()> {
    let user = super::resolve_user(cli).await?;

    SessionStore::default().remove(&user).await?;

    if args.forget {
        SystemKeychain::new()
            .forget(&user)
            .context("deleting password from keychain")?;

        let mut accounts = AccountList::load().await?;
        accounts.remove(&user);
        accounts.save().await?;

        let removed = HistoryStore::open_default().await?.remove_user(&user).await?;
        info!(user = %user, records = removed, "Account forgotten");
    }

    if !cli.quiet {
        println!("Logged out {user}");
    }

    Ok(())
}

fn prompt_password(user: &str) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "Password for {user}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("empty password");
    }
    Ok(password.to_string())
}
