//! Scraped user profile

use crate::error::ProfileError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile as returned by the users API. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    id: Option<i64>,
    name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    created: Option<String>,
    is_banned: Option<bool>,
    has_verified_badge: Option<bool>,
    external_app_display_name: Option<String>,
}

/// A scraped user profile, keyed by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub is_banned: Option<bool>,
    pub has_verified_badge: Option<bool>,
    pub external_app_display_name: Option<String>,
}

impl Profile {
    /// Create a profile with only its id set
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: None,
            display_name: None,
            description: None,
            created: None,
            is_banned: None,
            has_verified_badge: None,
            external_app_display_name: None,
        }
    }

    /// Parse a users API JSON body
    pub fn from_json(body: &str) -> Result<Self, ProfileError> {
        let response: ProfileResponse = serde_json::from_str(body)?;
        let id = response.id.ok_or(ProfileError::MissingId)?;
        let created = response.created.as_deref().map(parse_created).transpose()?;

        Ok(Self {
            id,
            name: response.name,
            display_name: response.display_name,
            description: response.description,
            created,
            is_banned: response.is_banned,
            has_verified_badge: response.has_verified_badge,
            external_app_display_name: response.external_app_display_name,
        })
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_created(value: &str) -> Result<DateTime<Utc>, ProfileError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ProfileError::InvalidCreated {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_profile_from_full_body() {
        let body = r#"{"id":42,"name":"x","displayName":"X","description":null,"created":"2020-01-01T00:00:00Z","isBanned":false,"hasVerifiedBadge":false,"externalAppDisplayName":null}"#;
        let profile = Profile::from_json(body).unwrap();

        assert_eq!(profile.id, 42);
        assert_eq!(profile.name.as_deref(), Some("x"));
        assert_eq!(profile.display_name.as_deref(), Some("X"));
        assert!(profile.description.is_none());
        assert_eq!(
            profile.created,
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(profile.is_banned, Some(false));
        assert_eq!(profile.has_verified_badge, Some(false));
        assert!(profile.external_app_display_name.is_none());
    }

    #[test]
    fn test_profile_missing_fields_are_none() {
        let profile = Profile::from_json(r#"{"id":7}"#).unwrap();
        assert_eq!(profile, Profile::new(7));
    }

    #[test]
    fn test_profile_without_id() {
        assert!(matches!(
            Profile::from_json(r#"{"errors":[{"code":3,"message":"The user id is invalid."}]}"#),
            Err(ProfileError::MissingId)
        ));
    }

    #[test]
    fn test_profile_invalid_json() {
        assert!(matches!(
            Profile::from_json("<html>bad gateway</html>"),
            Err(ProfileError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_created_variants() {
        let fractional = parse_created("2006-02-27T21:06:40.3Z").unwrap();
        assert_eq!(fractional.timestamp(), 1141074400);

        let offset = parse_created("2020-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let naive = parse_created("2020-01-01T00:00:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        assert!(matches!(
            parse_created("yesterday"),
            Err(ProfileError::InvalidCreated { .. })
        ));
    }
}
