//! Source address validation
//!
//! Both source addresses are checked once, before the scheduler spawns and
//! before any connection attempt.

use url::{ParseError, Url};

use super::SyncError;

/// The only scheme the document-store client accepts
pub const DOCUMENT_STORE_SCHEME: &str = "mongodb";

/// Validate that `address` targets the document store.
///
/// - scheme present and equal to `mongodb` (any case) -> ok
/// - no scheme (bare host, relative form) -> ok
/// - any other scheme -> `UnsupportedScheme`
/// - blank, or an unterminated IPv6 literal -> `InvalidAddress`
///
/// Multi-host connection strings (`mongodb://h1:27017,h2:27017/db`) are not
/// valid URLs; for those the scheme is read from the text before the first
/// `:` and the rest is left to the driver.
pub fn validate_scheme(address: &str) -> Result<(), SyncError> {
    if address.trim().is_empty() {
        return Err(SyncError::InvalidAddress {
            address: address.to_string(),
            reason: "address is empty".to_string(),
        });
    }

    match Url::parse(address) {
        Ok(url) => check_scheme(address, url.scheme()),
        Err(ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e @ ParseError::InvalidIpv6Address) => Err(SyncError::InvalidAddress {
            address: redact_address(address),
            reason: e.to_string(),
        }),
        Err(e) => match leading_scheme(address) {
            Some(scheme) => check_scheme(address, scheme),
            None => Err(SyncError::InvalidAddress {
                address: redact_address(address),
                reason: e.to_string(),
            }),
        },
    }
}

fn check_scheme(address: &str, scheme: &str) -> Result<(), SyncError> {
    if scheme.eq_ignore_ascii_case(DOCUMENT_STORE_SCHEME) {
        Ok(())
    } else {
        Err(SyncError::UnsupportedScheme {
            address: redact_address(address),
            scheme: scheme.to_ascii_lowercase(),
            expected: DOCUMENT_STORE_SCHEME,
        })
    }
}

/// Scheme prefix per RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`
fn leading_scheme(address: &str) -> Option<&str> {
    let (scheme, _) = address.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Mask the password of a connection string so it can be logged
pub fn redact_address(address: &str) -> String {
    match Url::parse(address) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_ok() {
                url.to_string()
            } else {
                address.to_string()
            }
        }
        Ok(_) => address.to_string(),
        Err(_) => redact_authority_text(address),
    }
}

/// Textual fallback for addresses `Url` cannot parse (multi-host form)
fn redact_authority_text(address: &str) -> String {
    let Some(authority_start) = address.find("://").map(|i| i + 3) else {
        return address.to_string();
    };
    let authority_end = address[authority_start..]
        .find(|c| c == '/' || c == '?')
        .map_or(address.len(), |i| authority_start + i);
    let authority = &address[authority_start..authority_end];

    let Some(at) = authority.rfind('@') else {
        return address.to_string();
    };
    let Some(colon) = authority[..at].find(':') else {
        return address.to_string();
    };

    let password_start = authority_start + colon + 1;
    let password_end = authority_start + at;
    format!(
        "{}***{}",
        &address[..password_start],
        &address[password_end..]
    )
}
