use crate::{
    AppState,
    errors::{Error, Result},
    types::UserId,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::{instrument, trace};
use uuid::Uuid;

/// The caller, identified by the user ID header injected upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

/// Read the caller's user ID from `header_name`.
///
/// Returns:
/// - Err(Unauthenticated): header absent
/// - Err(BadRequest): header present but not a UUID
/// - Ok(user): header holds a UUID
pub fn user_from_headers(headers: &HeaderMap, header_name: &str) -> Result<CurrentUser> {
    let Some(value) = headers.get(header_name) else {
        return Err(Error::Unauthenticated {
            message: Some(format!("Missing {header_name} header")),
        });
    };

    let id = value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| Error::BadRequest {
            message: format!("Invalid {header_name} header: expected a user UUID"),
        })?;

    Ok(CurrentUser { id })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = user_from_headers(&parts.headers, &state.config.auth.user_header)?;
        trace!("Identified caller {}", user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let err = user_from_headers(&HeaderMap::new(), "x-user-id").unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
        assert_eq!(err.status_code().as_u16(), 401);
    }

    #[test]
    fn test_malformed_header_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        let err = user_from_headers(&headers, "x-user-id").unwrap_err();
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[test]
    fn test_valid_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-advertiser-id", HeaderValue::from_str(&id.to_string()).unwrap());
        let user = user_from_headers(&headers, "x-advertiser-id").unwrap();
        assert_eq!(user.id, id);
    }
}
