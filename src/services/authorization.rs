//! Ownership rules for mutating matches.
//!
//! Ownership is absolute: the owner may edit or delete, nobody else may, and there is no
//! role that overrides it. Existence is decided before ownership, but callers report both
//! refusals with the same message so a non-owner learns nothing about which one applied.

use tracing::warn;

use crate::web::error::AppError;

pub const MATCH_NOT_FOUND: &str = "Match not found";

/// Outcome of checking an actor against a resource that may not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    NotFound,
    Denied,
    Granted,
}

pub fn can_modify(actor_id: i64, resource_owner_id: i64) -> bool {
    actor_id == resource_owner_id
}

pub fn check_access(actor_id: i64, resource_owner_id: Option<i64>) -> Access {
    match resource_owner_id {
        None => Access::NotFound,
        Some(owner_id) if can_modify(actor_id, owner_id) => Access::Granted,
        Some(_) => Access::Denied,
    }
}

/// Turns an access decision on a match into a handler-level result.
pub fn authorize_match(
    actor_id: i64,
    match_id: i64,
    owner_id: Option<i64>,
) -> Result<(), AppError> {
    match check_access(actor_id, owner_id) {
        Access::Granted => Ok(()),
        Access::NotFound => Err(AppError::NotFound(MATCH_NOT_FOUND.to_string())),
        Access::Denied => {
            warn!(match_id, actor_id, "Rejected modification of a match by a non-owner.");
            Err(AppError::NotFound(MATCH_NOT_FOUND.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_can_modify() {
        assert!(can_modify(7, 7));
        assert!(!can_modify(7, 8));
    }

    #[test]
    fn test_existence_is_checked_before_ownership() {
        assert_eq!(check_access(1, None), Access::NotFound);
        assert_eq!(check_access(1, Some(2)), Access::Denied);
        assert_eq!(check_access(2, Some(2)), Access::Granted);
    }

    #[test]
    fn test_denied_and_missing_look_the_same() {
        let missing = authorize_match(1, 10, None).unwrap_err();
        let denied = authorize_match(1, 10, Some(2)).unwrap_err();
        assert_eq!(missing.to_string(), denied.to_string());
        assert!(authorize_match(2, 10, Some(2)).is_ok());
    }
}
