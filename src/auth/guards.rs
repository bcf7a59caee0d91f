//! Access-control gate.
//!
//! Each guard takes the request's [`Principal`] as an explicit argument and
//! either passes or denies; no guard reads ambient request state and no
//! guard touches storage. Authorization is decided against path-level
//! metadata, so an unauthorized request for a nonexistent resource is
//! denied rather than reported missing.

use actix_web::HttpRequest;

use crate::auth::service::AuthService;
use crate::error::AppError;

/// The authenticated identity attached to a request, or anonymous when no
/// valid bearer token was presented.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            username: None,
            is_admin: false,
        }
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: true,
        }
    }

    /// Resolve the principal from the Authorization header. A missing or
    /// invalid token yields the anonymous principal; the guards then deny.
    pub fn from_request(req: &HttpRequest, auth: &AuthService) -> Self {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        match token.map(|t| auth.verify_token(t)) {
            Some(Ok(claims)) => Self {
                username: Some(claims.sub),
                is_admin: claims.is_admin,
            },
            _ => Self::anonymous(),
        }
    }
}

/// Pass for any authenticated caller.
pub fn ensure_logged_in(principal: &Principal) -> Result<(), AppError> {
    if principal.username.is_some() {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Pass only for admins.
pub fn ensure_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.username.is_some() && principal.is_admin {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Pass for admins, or for the caller whose username exactly matches the
/// target owner from the request path.
pub fn ensure_correct_user_or_admin(
    principal: &Principal,
    target_username: &str,
) -> Result<(), AppError> {
    match &principal.username {
        Some(_) if principal.is_admin => Ok(()),
        Some(username) if username == target_username => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_in_allows_any_authenticated_user() {
        assert!(ensure_logged_in(&Principal::user("u1")).is_ok());
        assert!(ensure_logged_in(&Principal::admin("admin")).is_ok());
    }

    #[test]
    fn test_logged_in_denies_anonymous() {
        assert!(matches!(
            ensure_logged_in(&Principal::anonymous()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_admin_only() {
        assert!(ensure_admin(&Principal::admin("admin")).is_ok());
        assert!(matches!(
            ensure_admin(&Principal::user("u1")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            ensure_admin(&Principal::anonymous()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let admin = Principal::admin("admin");
        assert!(ensure_correct_user_or_admin(&admin, "anyoneElse").is_ok());
        assert!(ensure_correct_user_or_admin(&admin, "admin").is_ok());
        assert!(ensure_correct_user_or_admin(&admin, "").is_ok());
    }

    #[test]
    fn test_same_user_match_is_exact() {
        let u1 = Principal::user("u1");
        assert!(ensure_correct_user_or_admin(&u1, "u1").is_ok());
        assert!(matches!(
            ensure_correct_user_or_admin(&u1, "u2"),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            ensure_correct_user_or_admin(&u1, "U1"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_anonymous_denied_everywhere() {
        let anon = Principal::anonymous();
        assert!(matches!(
            ensure_logged_in(&anon),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(ensure_admin(&anon), Err(AppError::Unauthorized)));
        assert!(matches!(
            ensure_correct_user_or_admin(&anon, "u1"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_anonymous_admin_flag_is_not_trusted() {
        // An is_admin flag without a username never passes
        let broken = Principal {
            username: None,
            is_admin: true,
        };
        assert!(matches!(ensure_admin(&broken), Err(AppError::Unauthorized)));
        assert!(matches!(
            ensure_correct_user_or_admin(&broken, "u1"),
            Err(AppError::Unauthorized)
        ));
    }
}
