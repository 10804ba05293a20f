use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;

fn credentials(matches: &clap::ArgMatches) -> Result<(String, SecretString)> {
    let username = matches
        .get_one::<String>("username")
        .map(String::to_string)
        .context("missing required argument: --username")?;

    let password = matches
        .get_one::<String>("password")
        .map(|password| SecretString::from(password.to_string()))
        .context("missing required argument: --password")?;

    Ok((username, password))
}

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("login", sub)) => {
            let (username, password) = credentials(sub)?;
            Ok(Action::Login { username, password })
        }
        Some(("register", sub)) => {
            let (username, password) = credentials(sub)?;
            let invite_code = sub
                .get_one::<String>("invite-code")
                .map(String::to_string)
                .unwrap_or_default();
            Ok(Action::Register {
                username,
                password,
                invite_code,
            })
        }
        Some(("logout", _)) => Ok(Action::Logout),
        Some(("profile", _)) => Ok(Action::Profile),
        Some(("refresh", _)) => Ok(Action::Refresh),
        Some(("nodes", _)) => Ok(Action::Nodes),
        Some(("rules", _)) => Ok(Action::Rules),
        Some(("packages", _)) => Ok(Action::Packages),
        Some(("orders", _)) => Ok(Action::Orders),
        Some(("admin", sub)) => match sub.subcommand_name() {
            Some("users") => Ok(Action::AdminUsers),
            Some("orders") => Ok(Action::AdminOrders),
            _ => Err(anyhow::anyhow!("unknown admin subcommand")),
        },
        _ => Err(anyhow::anyhow!("unknown subcommand")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn dispatch_login() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "relayctl", "login", "-u", "alice", "-p", "hunter2",
        ])?;
        match handler(&matches)? {
            Action::Login { username, password } => {
                assert_eq!(username, "alice");
                assert_eq!(password.expose_secret(), "hunter2");
            }
            other => return Err(anyhow::anyhow!("unexpected action: {other:?}")),
        }
        Ok(())
    }

    #[test]
    fn dispatch_register_defaults_invite_code() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "relayctl", "register", "-u", "bob", "-p", "hunter2",
        ])?;
        match handler(&matches)? {
            Action::Register { invite_code, .. } => assert_eq!(invite_code, ""),
            other => return Err(anyhow::anyhow!("unexpected action: {other:?}")),
        }
        Ok(())
    }

    #[test]
    fn dispatch_admin_orders() -> Result<()> {
        let matches =
            commands::new().try_get_matches_from(vec!["relayctl", "admin", "orders"])?;
        assert!(matches!(handler(&matches)?, Action::AdminOrders));
        Ok(())
    }
}
