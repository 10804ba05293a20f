use crate::api::Client;
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::router::{self, Access, GuardDecision};
use crate::session::{store::CredentialStore, Session};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::Arc;

/// Handle the requested action: restore the session, run it through the
/// navigation guard for the action's route, then perform the operation.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let store = CredentialStore::new(&globals.data_dir);
    let session = Arc::new(Session::load(store));
    let client = Client::new(&globals.api_url, Arc::clone(&session))?;

    if let Some(path) = action.route() {
        let route = router::resolve(path);
        match router::evaluate(&route, &session.snapshot()) {
            GuardDecision::Allow => {}
            GuardDecision::ToLogin { entry, return_to } => {
                return Err(anyhow!(
                    "not signed in: use `relayctl login` ({entry}), then retry {return_to}"
                ));
            }
            GuardDecision::Redirect { .. } if route.access == Access::GuestOnly => {
                return Err(anyhow!("already signed in, run `relayctl logout` first"));
            }
            GuardDecision::Redirect { .. } => {
                return Err(anyhow!("admin privileges required"));
            }
        }
    }

    match action {
        Action::Login { username, password } => {
            session.login(&client, &username, &password).await?;
            println!("Signed in as {username}");
            if let Some(profile) = session.snapshot().profile {
                print_json(&profile)?;
            }
        }
        Action::Register {
            username,
            password,
            invite_code,
        } => {
            session
                .register(&client, &username, &password, &invite_code)
                .await?;
            println!("Registered {username}, sign in with `relayctl login`");
        }
        Action::Logout => {
            session.logout();
            println!("Signed out");
        }
        Action::Profile => {
            if !session.fetch_profile(&client).await {
                return Err(anyhow!("session expired, sign in again"));
            }
            if let Some(profile) = session.snapshot().profile {
                print_json(&profile)?;
            }
        }
        Action::Refresh => {
            if !session.refresh_token(&client).await {
                return Err(anyhow!("session expired, sign in again"));
            }
            println!("Session refreshed");
        }
        Action::Nodes => print_json(&client.nodes().await?)?,
        Action::Rules => print_json(&client.rules().await?)?,
        Action::Packages => print_json(&client.packages().await?)?,
        Action::Orders => print_json(&client.orders().await?)?,
        Action::AdminUsers => print_json(&client.admin_users().await?)?,
        Action::AdminOrders => print_json(&client.admin_orders().await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
