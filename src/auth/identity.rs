//! Caller identity carried in trusted request headers.

use axum::http::HeaderMap;
use std::collections::BTreeSet;

use crate::config::AuthConfig;
use crate::error::ApiError;

/// Resolved caller, attached to the request by the privilege gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Option<String>,
    pub privileges: BTreeSet<String>,
}

impl Identity {
    pub fn has_privilege(&self, capability: &str) -> bool {
        self.privileges.contains(capability)
    }
}

/// Split a privilege string into its capability tokens.
///
/// Tokens are trimmed; empty tokens and duplicates are dropped.
pub fn parse_privileges(raw: &str, delimiter: &str) -> BTreeSet<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one header value. More than one value, or a value that is not
/// visible ASCII, is malformed. Blank values count as absent.
fn single_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    let mut values = headers.get_all(name).iter();
    let Some(value) = values.next() else {
        return Ok(None);
    };
    if values.next().is_some() {
        return Err(ApiError::InvalidAuthData);
    }

    let value = value.to_str().map_err(|_| ApiError::InvalidAuthData)?.trim();
    Ok((!value.is_empty()).then_some(value))
}

/// Build the caller's identity from request headers.
pub fn identity_from_headers(headers: &HeaderMap, settings: &AuthConfig) -> Result<Identity, ApiError> {
    let user_id = single_header(headers, &settings.user_id_header)?;
    let privileges = single_header(headers, &settings.privilege_header)?;

    let (Some(user_id), Some(privileges)) = (user_id, privileges) else {
        return Err(ApiError::InvalidAuthData);
    };

    let privileges = parse_privileges(privileges, &settings.privilege_delimiter);
    if privileges.is_empty() {
        return Err(ApiError::InvalidAuthData);
    }

    let role = single_header(headers, &settings.role_header)?.map(str::to_string);

    Ok(Identity {
        user_id: user_id.to_string(),
        role,
        privileges,
    })
}
