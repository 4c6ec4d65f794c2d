use chrono::NaiveDate;

use crate::db::models::MatchFields;
use crate::web::error::AppError;
use crate::web::models::{MatchRequest, RegisterRequest};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Blank optional text is stored as NULL.
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_match_request(req: &MatchRequest) -> Result<MatchFields, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    let date = match optional_text(req.date.as_deref()) {
        Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            AppError::InvalidInput(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
        })?),
        None => None,
    };

    Ok(MatchFields {
        title: title.to_string(),
        description: req.description.trim().to_string(),
        date,
        opponent: optional_text(req.opponent.as_deref()),
        result: optional_text(req.result.as_deref()),
        location: optional_text(req.location.as_deref()),
        custom_category: optional_text(req.custom_category.as_deref()),
    })
}

pub fn validate_comment(content: &str) -> Result<String, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::InvalidInput("Comment cannot be empty".to_string()));
    }
    Ok(content.to_string())
}

/// Returns the trimmed username on success.
pub fn validate_registration(req: &RegisterRequest) -> Result<String, AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password required".to_string(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    // A missing confirmation counts as a mismatch.
    if req.password2.as_deref() != Some(req.password.as_str()) {
        return Err(AppError::InvalidInput("Passwords do not match".to_string()));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_request(title: &str) -> MatchRequest {
        MatchRequest {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_is_required() {
        assert!(validate_match_request(&match_request("   ")).is_err());
        let fields = validate_match_request(&match_request("  HJK - KuPS ")).unwrap();
        assert_eq!(fields.title, "HJK - KuPS");
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let req = MatchRequest {
            title: "HJK - Ilves".to_string(),
            description: "  Kotipeli ".to_string(),
            date: Some("".to_string()),
            opponent: Some("  ".to_string()),
            location: Some(" Bolt Arena ".to_string()),
            ..Default::default()
        };
        let fields = validate_match_request(&req).unwrap();
        assert_eq!(fields.description, "Kotipeli");
        assert_eq!(fields.date, None);
        assert_eq!(fields.opponent, None);
        assert_eq!(fields.location.as_deref(), Some("Bolt Arena"));
    }

    #[test]
    fn test_date_must_be_iso() {
        let mut req = match_request("HJK - SJK");
        req.date = Some("2024-07-15".to_string());
        assert_eq!(
            validate_match_request(&req).unwrap().date,
            NaiveDate::from_ymd_opt(2024, 7, 15)
        );

        req.date = Some("15.7.2024".to_string());
        assert!(matches!(
            validate_match_request(&req),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_comment_content() {
        assert!(validate_comment(" \n ").is_err());
        assert_eq!(validate_comment(" Hieno ottelu! ").unwrap(), "Hieno ottelu!");
    }

    #[test]
    fn test_registration_rules() {
        let mut req = RegisterRequest {
            username: " anna ".to_string(),
            password: "password123".to_string(),
            password2: Some("password123".to_string()),
        };
        assert_eq!(validate_registration(&req).unwrap(), "anna");

        req.password2 = Some("password124".to_string());
        assert!(validate_registration(&req).is_err());

        req.password2 = None;
        match validate_registration(&req) {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "Passwords do not match"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        req.password = "short".to_string();
        req.password2 = Some("short".to_string());
        assert!(validate_registration(&req).is_err());

        req.password = "password123".to_string();
        req.username = "  ".to_string();
        assert!(validate_registration(&req).is_err());
    }
}
