//! # core-service
//!
//! `core-service` is a small account backend. It owns the user-account table
//! and exposes two surfaces over it:
//!
//! - **HTTP:** an account routing table (`register/`, `profile/`, `token/`,
//!   `token/refresh/`) served by axum under a configurable prefix.
//! - **CLI:** the `delete-users` administrative command, which removes every
//!   account record and reports completion on stdout.
//!
//! ## Tokens
//!
//! Authentication uses HS256 JWT pairs: a short-lived access token sent as
//! `Authorization: Bearer <token>` and a long-lived refresh token exchanged at
//! `token/refresh/` for a new access token. Refresh tokens are not rotated.
//!
//! ## Store
//!
//! The account store is selected by DSN (`postgres://...` or `memory://`) and
//! handed explicitly to whichever action needs it.

pub mod api;
pub mod cli;
pub mod password;
pub mod store;
pub mod tokens;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
