//! User Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile (public information).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: Uuid,
    /// Username (unique).
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Full user data (for the authenticated user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Username (unique).
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_serde_roundtrip() {
        let profile = UserProfile {
            id: Uuid::now_v7(),
            username: "mika".into(),
            display_name: "Mika".into(),
            avatar_url: None,
        };

        let json = serde_json::to_string(&profile).unwrap();
        let restored: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile.id, restored.id);
        assert_eq!(profile.username, restored.username);
    }
}
