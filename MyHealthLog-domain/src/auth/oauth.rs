//! OAuth2 authorization-code login through Linux.do, Google and GitHub
//!
//! Each configured provider gets a `BasicClient`. Authorization redirects carry
//! a random `state` that is remembered for ten minutes and must come back on
//! the callback exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use my_health_log_data::models::user::OAuthProvider;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::ProviderConfig;

/// How long an authorization redirect stays valid
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Most outstanding states kept at once; the oldest is dropped past this
pub const MAX_PENDING_STATES: usize = 1024;

const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

/// OAuth failures
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth provider {0} is not configured")]
    ProviderDisabled(OAuthProvider),

    #[error("Invalid provider configuration: {0}")]
    Configuration(String),

    #[error("Unknown or expired OAuth state")]
    InvalidState,

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Profile request failed: {0}")]
    Profile(String),
}

/// Identity returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: OAuthProvider,
    /// Provider subject id, always stored as text
    pub provider_id: String,
    /// Preferred username (Linux.do username, Google name, GitHub login)
    pub username: Option<String>,
    pub email: Option<String>,
}

impl ProviderProfile {
    /// Username for a new account: the provider's name or `{provider}_{id}`
    pub fn fallback_username(&self) -> String {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("{}_{}", self.provider, self.provider_id))
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read the identity fields out of a provider's user-info document
pub fn parse_profile(provider: OAuthProvider, body: &Value) -> Option<ProviderProfile> {
    let provider_id = body.get("id").and_then(json_text)?;
    let name_field = match provider {
        OAuthProvider::LinuxDo => "username",
        OAuthProvider::Google => "name",
        OAuthProvider::Github => "login",
    };
    Some(ProviderProfile {
        provider,
        provider_id,
        username: body.get(name_field).and_then(json_text),
        email: body.get("email").and_then(json_text),
    })
}

/// The primary, verified address from GitHub's `/user/emails` listing
pub fn primary_verified_email(body: &Value) -> Option<String> {
    body.as_array()?
        .iter()
        .find(|entry| {
            entry.get("primary").and_then(Value::as_bool).unwrap_or(false)
                && entry.get("verified").and_then(Value::as_bool).unwrap_or(false)
        })
        .and_then(|entry| entry.get("email"))
        .and_then(json_text)
}

/// States handed out with authorization redirects, pruned by age and capped in number
#[derive(Debug)]
pub struct PendingStates {
    /// state -> (provider, issued at, issue sequence)
    states: Mutex<HashMap<String, (OAuthProvider, Instant, u64)>>,
    issued: AtomicU64,
    ttl: Duration,
    capacity: usize,
}

impl Default for PendingStates {
    fn default() -> Self {
        Self::new(STATE_TTL)
    }
}

impl PendingStates {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_PENDING_STATES)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            issued: AtomicU64::new(0),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Remember a state issued for `provider`, evicting the oldest when full
    pub fn insert(&self, state: String, provider: OAuthProvider) {
        let sequence = self.issued.fetch_add(1, Ordering::Relaxed);
        match self.states.lock() {
            Ok(mut states) => {
                let ttl = self.ttl;
                states.retain(|_, (_, issued, _)| issued.elapsed() < ttl);
                while states.len() >= self.capacity && !states.contains_key(&state) {
                    let oldest = states
                        .iter()
                        .min_by_key(|(_, (_, _, issued_as))| *issued_as)
                        .map(|(key, _)| key.clone());
                    match oldest {
                        Some(key) => {
                            debug!("Evicting oldest pending OAuth state");
                            states.remove(&key);
                        }
                        None => break,
                    }
                }
                states.insert(state, (provider, Instant::now(), sequence));
            }
            Err(e) => error!("OAuth state store lock poisoned: {}", e),
        }
    }

    /// Consume a state; true only if it was issued for `provider` and is still fresh
    pub fn take(&self, state: &str, provider: OAuthProvider) -> bool {
        match self.states.lock() {
            Ok(mut states) => match states.remove(state) {
                Some((issued_for, issued, _)) => issued_for == provider && issued.elapsed() < self.ttl,
                None => false,
            },
            Err(e) => {
                error!("OAuth state store lock poisoned: {}", e);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.states.lock().map(|states| states.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ProviderClient {
    client: BasicClient,
    scopes: Vec<String>,
    user_info_url: String,
}

impl ProviderClient {
    fn new(config: &ProviderConfig) -> Result<Self, OAuthError> {
        let auth_url =
            AuthUrl::new(config.authorize_url.clone()).map_err(|e| OAuthError::Configuration(e.to_string()))?;
        let token_url =
            TokenUrl::new(config.token_url.clone()).map_err(|e| OAuthError::Configuration(e.to_string()))?;
        let redirect_url =
            RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| OAuthError::Configuration(e.to_string()))?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
            user_info_url: config.user_info_url.clone(),
        })
    }
}

/// Configured OAuth providers plus the pending state store
pub struct OAuthProviders {
    clients: HashMap<OAuthProvider, ProviderClient>,
    pending: PendingStates,
    http: reqwest::Client,
}

impl std::fmt::Debug for OAuthProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthProviders")
            .field("enabled", &self.clients.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl OAuthProviders {
    /// Build clients for every configured provider; invalid URLs disable that provider
    pub fn new(configs: &HashMap<OAuthProvider, ProviderConfig>) -> Self {
        let mut clients = HashMap::new();
        for (provider, config) in configs {
            match ProviderClient::new(config) {
                Ok(client) => {
                    clients.insert(*provider, client);
                }
                Err(e) => warn!("Disabling OAuth provider {}: {}", provider, e),
            }
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("MyHealthLog-api/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            clients,
            pending: PendingStates::default(),
            http,
        }
    }

    pub fn is_enabled(&self, provider: OAuthProvider) -> bool {
        self.clients.contains_key(&provider)
    }

    fn client(&self, provider: OAuthProvider) -> Result<&ProviderClient, OAuthError> {
        self.clients.get(&provider).ok_or(OAuthError::ProviderDisabled(provider))
    }

    /// Authorization URL for `provider` with a freshly registered state
    pub fn authorize_url(&self, provider: OAuthProvider) -> Result<String, OAuthError> {
        let client = self.client(provider)?;
        let (url, state) = client
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(client.scopes.iter().cloned().map(Scope::new))
            .url();
        self.pending.insert(state.secret().clone(), provider);
        debug!("Issued OAuth state for {}", provider);
        Ok(url.to_string())
    }

    /// Consume the state returned on a callback
    pub fn verify_state(&self, provider: OAuthProvider, state: Option<&str>) -> Result<(), OAuthError> {
        match state {
            Some(state) if self.pending.take(state, provider) => Ok(()),
            _ => Err(OAuthError::InvalidState),
        }
    }

    /// Exchange an authorization code and fetch the caller's profile
    pub async fn fetch_profile(&self, provider: OAuthProvider, code: &str) -> Result<ProviderProfile, OAuthError> {
        let client = self.client(provider)?;

        let token = client
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;
        let access_token = token.access_token().secret();

        let body = self.get_json(&client.user_info_url, access_token).await?;
        let mut profile = parse_profile(provider, &body)
            .ok_or_else(|| OAuthError::Profile(format!("{} profile has no id", provider)))?;

        // GitHub hides private addresses from /user
        if provider == OAuthProvider::Github && profile.email.is_none() {
            match self.get_json(GITHUB_EMAILS_URL, access_token).await {
                Ok(emails) => profile.email = primary_verified_email(&emails),
                Err(e) => warn!("Could not read GitHub email list: {}", e),
            }
        }

        Ok(profile)
    }

    async fn get_json(&self, url: &str, access_token: &str) -> Result<Value, OAuthError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Profile(format!("{} returned {}", url, response.status())));
        }

        response.json().await.map_err(|e| OAuthError::Profile(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configs() -> HashMap<OAuthProvider, ProviderConfig> {
        let mut github = ProviderConfig::defaults(OAuthProvider::Github);
        github.client_id = "gh-client".to_string();
        github.client_secret = "gh-secret".to_string();
        github.redirect_uri = "http://localhost:3000/api/auth/github/callback".to_string();
        HashMap::from([(OAuthProvider::Github, github)])
    }

    #[test]
    fn test_authorize_url_carries_client_scope_and_state() {
        let providers = OAuthProviders::new(&configs());
        let url = providers.authorize_url(OAuthProvider::Github).unwrap();

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=gh-client"));
        assert!(url.contains("scope=user%3Aemail"));
        assert!(url.contains("response_type=code"));

        let state = oauth2::url::Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(providers.verify_state(OAuthProvider::Github, Some(&state)).is_ok());
        assert!(matches!(
            providers.verify_state(OAuthProvider::Github, Some(&state)),
            Err(OAuthError::InvalidState)
        ));
    }

    #[test]
    fn test_unconfigured_provider_is_disabled() {
        let providers = OAuthProviders::new(&configs());
        assert!(!providers.is_enabled(OAuthProvider::Google));
        assert!(matches!(
            providers.authorize_url(OAuthProvider::Google),
            Err(OAuthError::ProviderDisabled(OAuthProvider::Google))
        ));
    }

    #[test]
    fn test_state_is_bound_to_provider_and_age() {
        let pending = PendingStates::new(Duration::from_secs(600));
        pending.insert("abc".to_string(), OAuthProvider::Google);
        assert!(!pending.take("abc", OAuthProvider::Github));
        assert!(!pending.take("abc", OAuthProvider::Google));

        let expired = PendingStates::new(Duration::ZERO);
        expired.insert("old".to_string(), OAuthProvider::Google);
        assert!(!expired.take("old", OAuthProvider::Google));
    }

    #[test]
    fn test_full_store_drops_oldest_state() {
        let pending = PendingStates::with_capacity(Duration::from_secs(600), 2);
        pending.insert("first".to_string(), OAuthProvider::Google);
        pending.insert("second".to_string(), OAuthProvider::Google);
        pending.insert("third".to_string(), OAuthProvider::Github);
        assert_eq!(pending.len(), 2);

        assert!(!pending.take("first", OAuthProvider::Google));
        assert!(pending.take("second", OAuthProvider::Google));
        assert!(pending.take("third", OAuthProvider::Github));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_default_store_is_capped() {
        let pending = PendingStates::default();
        for n in 0..MAX_PENDING_STATES + 10 {
            pending.insert(format!("state-{}", n), OAuthProvider::LinuxDo);
        }
        assert_eq!(pending.len(), MAX_PENDING_STATES);
        assert!(!pending.take("state-0", OAuthProvider::LinuxDo));
        assert!(pending.take(&format!("state-{}", MAX_PENDING_STATES + 9), OAuthProvider::LinuxDo));
    }

    #[test]
    fn test_parse_profiles_per_provider() {
        let linuxdo = parse_profile(
            OAuthProvider::LinuxDo,
            &json!({"id": 1234, "username": "neo", "email": "neo@example.com"}),
        )
        .unwrap();
        assert_eq!(linuxdo.provider_id, "1234");
        assert_eq!(linuxdo.username.as_deref(), Some("neo"));

        let google = parse_profile(OAuthProvider::Google, &json!({"id": "1099", "name": "", "email": "g@example.com"}))
            .unwrap();
        assert_eq!(google.username, None);
        assert_eq!(google.fallback_username(), "google_1099");

        let github = parse_profile(OAuthProvider::Github, &json!({"id": 77, "login": "octo", "email": null})).unwrap();
        assert_eq!(github.email, None);
        assert_eq!(github.fallback_username(), "octo");

        assert!(parse_profile(OAuthProvider::Github, &json!({"login": "no-id"})).is_none());
    }

    #[test]
    fn test_primary_verified_email_is_chosen() {
        let emails = json!([
            {"email": "old@example.com", "primary": false, "verified": true},
            {"email": "unverified@example.com", "primary": true, "verified": false},
        ]);
        assert_eq!(primary_verified_email(&emails), None);

        let emails = json!([
            {"email": "old@example.com", "primary": false, "verified": true},
            {"email": "main@example.com", "primary": true, "verified": true},
        ]);
        assert_eq!(primary_verified_email(&emails).as_deref(), Some("main@example.com"));
    }
}
