//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes: serving the
//! account API or purging the account store.

use crate::cli::actions::{Action, delete_users, server};
use crate::cli::commands::{self, store::ARG_DSN};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((commands::server::NAME, sub)) => {
            let dsn = dsn(matches, sub)?;
            let options = commands::server::Options::parse(sub)?;

            Ok(Action::Server(server::Args {
                port: options.port,
                dsn,
                jwt_secret: options.jwt_secret,
                access_token_ttl_seconds: options.access_token_ttl_seconds,
                refresh_token_ttl_seconds: options.refresh_token_ttl_seconds,
                route_prefix: options.route_prefix,
            }))
        }
        Some((commands::delete_users::NAME, sub)) => {
            let dsn = dsn(matches, sub)?;
            Ok(Action::DeleteUsers(delete_users::Args { dsn }))
        }
        Some((name, _)) => bail!("unknown subcommand: {name}"),
        None => bail!("missing subcommand"),
    }
}

// `--dsn` is global, so it may be given before or after the subcommand.
fn dsn(matches: &ArgMatches, sub: &ArgMatches) -> Result<String> {
    sub.get_one::<String>(ARG_DSN)
        .or_else(|| matches.get_one::<String>(ARG_DSN))
        .cloned()
        .context("missing required argument: --dsn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action() -> Result<()> {
        temp_env::with_vars(
            [
                ("CORE_SERVICE_PORT", None::<&str>),
                ("CORE_SERVICE_ROUTE_PREFIX", None::<&str>),
            ],
            || {
                let matches = commands::new().try_get_matches_from(vec![
                    "core-service",
                    "server",
                    "--dsn",
                    "memory://",
                    "--jwt-secret",
                    "signing-key",
                ])?;

                let action = handler(&matches)?;
                let Action::Server(args) = action else {
                    bail!("expected server action, got {action:?}");
                };
                assert_eq!(args.dsn, "memory://");
                assert_eq!(args.port, 8080);
                assert_eq!(args.route_prefix, "/api/users");
                Ok(())
            },
        )
    }

    #[test]
    fn delete_users_action() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "core-service",
            "--dsn",
            "postgres://localhost/accounts",
            "delete-users",
        ])?;

        let action = handler(&matches)?;
        let Action::DeleteUsers(args) = action else {
            bail!("expected delete-users action, got {action:?}");
        };
        assert_eq!(args.dsn, "postgres://localhost/accounts");
        Ok(())
    }

    #[test]
    fn dsn_required() -> Result<()> {
        temp_env::with_vars([("CORE_SERVICE_DSN", None::<&str>)], || {
            let matches =
                commands::new().try_get_matches_from(vec!["core-service", "delete-users"])?;
            let err = handler(&matches)
                .err()
                .map(|err| err.to_string())
                .unwrap_or_default();
            assert!(err.contains("--dsn"));
            Ok(())
        })
    }
}
