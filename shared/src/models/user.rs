//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile document stored by the identity backend under the user's uid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_document_shape() {
        let json = r#"{"uid":"u1","username":"nino","email":"nino@example.com","createdAt":"2026-01-05T08:00:00.000Z"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.uid, "u1");
        assert_eq!(profile.created_at.timestamp(), 1_767_600_000);
    }
}
