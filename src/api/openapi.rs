use super::handlers::{health, profile, register, token};
use utoipa::openapi::{
    Contact, InfoBuilder, License, OpenApiBuilder, Tag,
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Prefix the account routes are mounted under unless configured otherwise.
pub const DEFAULT_ROUTE_PREFIX: &str = "/api/users";

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI document.
    let (_router, openapi) = api_router(DEFAULT_ROUTE_PREFIX).split_for_parts();
    openapi
}

/// The account routing table, relative to its mount point.
fn accounts_router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register::register))
        .routes(routes!(
            profile::get_profile,
            profile::replace_profile,
            profile::update_profile
        ))
        .routes(routes!(token::obtain_token_pair))
        .routes(routes!(token::refresh_token))
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` document.
pub(crate) fn api_router(route_prefix: &str) -> OpenApiRouter {
    let router = OpenApiRouter::with_openapi(cargo_openapi()).routes(routes!(health::health));

    let mut router = match normalize_prefix(route_prefix) {
        Some(prefix) => router.nest(&prefix, accounts_router()),
        None => router.merge(accounts_router()),
    };

    let mut accounts_tag = Tag::new("accounts");
    accounts_tag.description = Some("Registration and profile".to_string());

    let mut tokens_tag = Tag::new("tokens");
    tokens_tag.description = Some("JWT access/refresh pairs".to_string());

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service health".to_string());

    let openapi = router.get_openapi_mut();
    openapi.tags = Some(vec![accounts_tag, tokens_tag, health_tag]);
    openapi
        .components
        .get_or_insert_with(Default::default)
        .add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    router
}

/// `None` means "mount at the root"; otherwise a `/`-led prefix without a trailing slash.
fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let contact = doc.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Core Service Team"));
            assert_eq!(contact.email.as_deref(), Some("team@core-service.dev"));
        }

        let license = doc.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
        }
    }

    #[test]
    fn openapi_lists_account_routes_under_prefix() {
        let doc = openapi();
        for path in [
            "/api/users/register/",
            "/api/users/profile/",
            "/api/users/token/",
            "/api/users/token/refresh/",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(!doc.paths.paths.contains_key("/api/users/logout/"));
    }

    #[test]
    fn openapi_tags_and_security() {
        let doc = openapi();
        let tags = doc.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "accounts"));
        assert!(tags.iter().any(|tag| tag.name == "tokens"));
        assert!(
            doc.components
                .is_some_and(|components| components.security_schemes.contains_key("bearer"))
        );
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix("/api/users"), Some("/api/users".to_string()));
        assert_eq!(normalize_prefix("api/users/"), Some("/api/users".to_string()));
        assert_eq!(normalize_prefix("/"), None);
        assert_eq!(normalize_prefix(""), None);
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Jane Doe <jane@example.com>"),
            (Some("Jane Doe"), Some("jane@example.com"))
        );
        assert_eq!(parse_author("Jane Doe"), (Some("Jane Doe"), None));
        assert_eq!(parse_author("<jane@example.com>"), (None, Some("jane@example.com")));
    }
}
