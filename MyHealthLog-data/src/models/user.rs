use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Storage model for an account holder
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    /// Argon2 PHC string; absent for accounts created through OAuth
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_admin: bool,
    pub show_womens_health: bool,
    pub height_cm: Option<f64>,
    pub linuxdo_id: Option<String>,
    pub google_id: Option<String>,
    pub github_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the user can sign in with a password
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Provider identity linked to this user, if any
    pub fn provider_id(&self, provider: OAuthProvider) -> Option<&str> {
        match provider {
            OAuthProvider::LinuxDo => self.linuxdo_id.as_deref(),
            OAuthProvider::Google => self.google_id.as_deref(),
            OAuthProvider::Github => self.github_id.as_deref(),
        }
    }
}

/// Input for inserting a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    /// Provider identity to link at creation time
    pub provider: Option<(OAuthProvider, String)>,
}

/// Third-party identity providers a user can sign in with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    #[serde(rename = "linuxdo")]
    LinuxDo,
    Google,
    Github,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 3] = [OAuthProvider::LinuxDo, OAuthProvider::Google, OAuthProvider::Github];

    /// Path segment and username prefix for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::LinuxDo => "linuxdo",
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }

    /// Column on `users` holding this provider's subject id
    pub fn id_column(&self) -> &'static str {
        match self {
            OAuthProvider::LinuxDo => "linuxdo_id",
            OAuthProvider::Google => "google_id",
            OAuthProvider::Github => "github_id",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linuxdo" => Ok(OAuthProvider::LinuxDo),
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(format!("Unknown OAuth provider: {}", other)),
        }
    }
}

/// Row totals reported on the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UsageStats {
    pub users: i64,
    pub admins: i64,
    pub medications: i64,
    pub medication_logs: i64,
    pub daily_logs: i64,
    pub exercise_logs: i64,
    pub transactions: i64,
    pub loans: i64,
    pub memos: i64,
    pub menstrual_records: i64,
    pub sex_logs: i64,
    pub stool_logs: i64,
    pub weight_logs: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_path_segment() {
        for provider in OAuthProvider::ALL {
            assert_eq!(provider.as_str().parse::<OAuthProvider>(), Ok(provider));
        }
        assert!("facebook".parse::<OAuthProvider>().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: None,
            password_hash: Some("$argon2id$v=19$secret".to_string()),
            is_admin: false,
            show_womens_health: false,
            height_cm: None,
            linuxdo_id: None,
            google_id: None,
            github_id: None,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(user.has_password());
    }
}
