use crate::api::DEFAULT_ROUTE_PREFIX;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const NAME: &str = "server";

pub const ARG_PORT: &str = "port";
pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl";
pub const ARG_REFRESH_TOKEN_TTL: &str = "refresh-token-ttl";
pub const ARG_ROUTE_PREFIX: &str = "route-prefix";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(NAME)
        .about("Serve the account API")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("CORE_SERVICE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long("jwt-secret")
                .help("HMAC secret used to sign access and refresh tokens")
                .env("CORE_SERVICE_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long("access-token-ttl")
                .help("Access token lifetime in seconds")
                .env("CORE_SERVICE_ACCESS_TOKEN_TTL")
                .default_value("300")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL)
                .long("refresh-token-ttl")
                .help("Refresh token lifetime in seconds")
                .env("CORE_SERVICE_REFRESH_TOKEN_TTL")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ROUTE_PREFIX)
                .long("route-prefix")
                .help("Path prefix the account routes are mounted under (`/` for the root)")
                .env("CORE_SERVICE_ROUTE_PREFIX")
                .default_value(DEFAULT_ROUTE_PREFIX),
        )
}

#[derive(Debug)]
pub struct Options {
    pub port: u16,
    pub jwt_secret: SecretString,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub route_prefix: String,
}

impl Options {
    /// Read the server options from the `server` subcommand matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
            jwt_secret: SecretString::from(jwt_secret),
            access_token_ttl_seconds: matches
                .get_one::<u64>(ARG_ACCESS_TOKEN_TTL)
                .copied()
                .unwrap_or(300),
            refresh_token_ttl_seconds: matches
                .get_one::<u64>(ARG_REFRESH_TOKEN_TTL)
                .copied()
                .unwrap_or(86_400),
            route_prefix: matches
                .get_one::<String>(ARG_ROUTE_PREFIX)
                .cloned()
                .unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string()),
        })
    }
}
