//! Authentication service
//!
//! Implements the session module over a mock user directory:
//! - Login with rate limiting and verification checks
//! - Signup with domain-derived roles and automatic club registration
//! - Administrative bootstrap path provisioned via environment config
//!
//! Sessions are issued here and held by the client; the service keeps no
//! session state. Passwords are plaintext demo data (see DESIGN notes).

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{Contact, CreateClubInput, Session, User, UserRole};
use crate::persist::{JsonStore, USERS_KEY};
use crate::services::rate_limiter::LoginRateLimiter;
use crate::store::ClubStore;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account under the given email
    #[error("Account not found. Please check your email or sign up.")]
    AccountNotFound,

    /// Password mismatch
    #[error("Incorrect password. Please try again.")]
    InvalidCredentials,

    /// Account exists but has not been verified
    #[error("Please verify your email address before logging in.")]
    NotVerified,

    /// Too many failed attempts inside the rolling window
    #[error("Too many failed attempts. Please try again later.")]
    RateLimited,

    /// Malformed or missing input
    #[error("{0}")]
    InvalidInput(String),

    /// Email already registered
    #[error("An account with this email already exists")]
    DuplicateAccount,
}

/// Input for signup
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Required for club-manager signups, ignored for admin domains
    #[serde(default)]
    pub club_name: Option<String>,
}

/// Authentication service over the mock user directory.
pub struct AuthService {
    users: Arc<RwLock<Vec<User>>>,
    config: AuthConfig,
    club_store: Arc<ClubStore>,
    rate_limiter: Arc<LoginRateLimiter>,
    persist: Option<Arc<JsonStore>>,
}

impl AuthService {
    pub fn new(
        config: AuthConfig,
        club_store: Arc<ClubStore>,
        rate_limiter: Arc<LoginRateLimiter>,
        persist: Option<Arc<JsonStore>>,
    ) -> Self {
        let users: Vec<User> = persist
            .as_ref()
            .and_then(|p| p.get(USERS_KEY))
            .unwrap_or_default();

        Self {
            users: Arc::new(RwLock::new(users)),
            config,
            club_store,
            rate_limiter,
            persist,
        }
    }

    /// Seed the directory with the default admin and demo club manager
    /// accounts if it is empty.
    pub async fn seed_demo_accounts(&self) {
        let mut users = self.users.write().await;
        if users.is_empty() {
            *users = demo_accounts();
            self.mirror(&users);
        }
    }

    fn mirror(&self, users: &[User]) {
        if let Some(persist) = &self.persist {
            if let Err(e) = persist.set(USERS_KEY, &users.to_vec()) {
                tracing::warn!("Failed to mirror user directory: {}", e);
            }
        }
    }

    /// Check an email against the allowed domain patterns.
    fn is_allowed_email(&self, email: &str) -> bool {
        let Some((local, domain)) = email.rsplit_once('@') else {
            return false;
        };
        !local.is_empty()
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
            && self
                .config
                .allowed_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(domain))
    }

    fn is_admin_domain(&self, email: &str) -> bool {
        email
            .rsplit_once('@')
            .map(|(_, domain)| domain.eq_ignore_ascii_case(&self.config.admin_domain))
            .unwrap_or(false)
    }

    /// Validate credentials and issue a session.
    ///
    /// Every failed attempt is recorded against the identifier; a
    /// success clears the counter. The bootstrap path sits behind the
    /// same rate limit as everything else.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Please fill in all fields".to_string(),
            ));
        }

        if self.rate_limiter.is_limited(email).await {
            return Err(AuthError::RateLimited);
        }

        // Administrative bootstrap: an explicitly provisioned credential
        // pair from the environment. Issues an elevated 7-day session
        // and leaves an audit trail.
        if let Some(bootstrap) = &self.config.bootstrap {
            if bootstrap.email.eq_ignore_ascii_case(email) {
                if bootstrap.password == password {
                    self.rate_limiter.clear(email).await;
                    tracing::warn!(
                        email = %email,
                        "Administrative bootstrap login: issuing superadmin session"
                    );
                    return Ok(Session::issue_bootstrap(email, Utc::now()));
                }
                self.rate_limiter.record_failure(email).await;
                return Err(AuthError::InvalidCredentials);
            }
        }

        if !self.is_allowed_email(email) {
            return Err(AuthError::InvalidInput(
                "Please use a valid Gmail address or college email".to_string(),
            ));
        }

        let users = self.users.read().await;
        let user = match users.iter().find(|u| u.email.eq_ignore_ascii_case(email)) {
            Some(user) => user,
            None => {
                drop(users);
                self.rate_limiter.record_failure(email).await;
                return Err(AuthError::AccountNotFound);
            }
        };

        if user.password != password {
            drop(users);
            self.rate_limiter.record_failure(email).await;
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            drop(users);
            self.rate_limiter.record_failure(email).await;
            return Err(AuthError::NotVerified);
        }

        let session = Session::issue(user);
        drop(users);
        self.rate_limiter.clear(email).await;
        Ok(session)
    }

    /// Register a new account and log it in.
    ///
    /// Institutional-domain emails receive the admin role; everything
    /// else becomes a club manager bound to a freshly created pending
    /// club. Accounts auto-verify (demo behavior).
    pub async fn signup(&self, input: SignupInput) -> Result<Session, AuthError> {
        let email = input.email.trim().to_lowercase();
        let name = input.name.trim().to_string();

        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Please fill in all required fields".to_string(),
            ));
        }

        if !self.is_allowed_email(&email) {
            return Err(AuthError::InvalidInput(
                "Please use a valid Gmail address or college email".to_string(),
            ));
        }

        if input.password.len() < self.config.min_password_len {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {} characters long",
                self.config.min_password_len
            )));
        }

        if input.password != input.confirm_password {
            return Err(AuthError::InvalidInput(
                "Passwords do not match".to_string(),
            ));
        }

        let role = if self.is_admin_domain(&email) {
            UserRole::Admin
        } else {
            UserRole::Club
        };

        let club_name = match role {
            UserRole::Club => {
                let club_name = input
                    .club_name
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default();
                if club_name.is_empty() {
                    return Err(AuthError::InvalidInput(
                        "Please enter your club name".to_string(),
                    ));
                }
                Some(club_name.to_string())
            }
            _ => None,
        };

        {
            let users = self.users.read().await;
            if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
                return Err(AuthError::DuplicateAccount);
            }
        }

        // Club managers get their pending club registered up front
        let club = match &club_name {
            Some(club_name) => Some(
                self.club_store
                    .create(CreateClubInput {
                        name: club_name.clone(),
                        description: format!(
                            "Welcome to {}! Update your description in the dashboard.",
                            club_name
                        ),
                        category: "Other".to_string(),
                        members: 1,
                        founded: Utc::now().format("%Y").to_string(),
                        logo: "🏛".to_string(),
                        contact: Contact {
                            email: email.clone(),
                            meeting_time: "To be announced".to_string(),
                            location: "To be announced".to_string(),
                        },
                    })
                    .await,
            ),
            None => None,
        };

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password: input.password,
            role,
            club_id: club.as_ref().map(|c| c.id.clone()),
            club_name,
            created_at: Utc::now(),
            is_verified: true, // Auto-verify for demo
        };

        let session = {
            let mut users = self.users.write().await;
            users.push(user.clone());
            self.mirror(&users);
            Session::issue(&user)
        };

        Ok(session)
    }

    /// Look up a directory account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// Number of directory accounts.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

/// Default admin plus demo club manager accounts.
fn demo_accounts() -> Vec<User> {
    let now = Utc::now();
    let account = |name: &str, email: &str, password: &str, role, club: Option<(&str, &str)>| User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
        club_id: club.map(|(id, _)| id.to_string()),
        club_name: club.map(|(_, name)| name.to_string()),
        created_at: now,
        is_verified: true,
    };

    vec![
        account(
            "System Administrator",
            "admin@college.edu",
            "admin123",
            UserRole::Admin,
            None,
        ),
        account(
            "Tech Club Manager",
            "tech.club@gmail.com",
            "TechClub2024!",
            UserRole::Club,
            Some(("tech-club", "Technology Club")),
        ),
        account(
            "Drama Society Manager",
            "drama.society@gmail.com",
            "Drama2024!",
            UserRole::Club,
            Some(("drama-club", "Drama Society")),
        ),
        account(
            "Sports Club Manager",
            "sports.club@gmail.com",
            "Sports2024!",
            UserRole::Club,
            Some(("sports-club", "Sports Club")),
        ),
        account(
            "Music Society Manager",
            "music.society@gmail.com",
            "Music2024!",
            UserRole::Club,
            Some(("music-club", "Music Society")),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapCredentials;

    fn service() -> AuthService {
        service_with(AuthConfig::default())
    }

    fn service_with(config: AuthConfig) -> AuthService {
        AuthService::new(
            config,
            Arc::new(ClubStore::new()),
            Arc::new(LoginRateLimiter::new()),
            None,
        )
    }

    fn signup_input(email: &str, club_name: Option<&str>) -> SignupInput {
        SignupInput {
            name: "Sam Tester".to_string(),
            email: email.to_string(),
            password: "secret99".to_string(),
            confirm_password: "secret99".to_string(),
            club_name: club_name.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_login_with_seeded_admin() {
        let service = service();
        service.seed_demo_accounts().await;

        let session = service.login("admin@college.edu", "admin123").await.unwrap();
        assert_eq!(session.role, UserRole::Admin);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_is_case_insensitive_on_email() {
        let service = service();
        service.seed_demo_accounts().await;

        let session = service.login("Admin@College.EDU", "admin123").await.unwrap();
        assert_eq!(session.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_login_unknown_account() {
        let service = service();
        service.seed_demo_accounts().await;

        let result = service.login("nobody@gmail.com", "whatever1").await;
        assert!(matches!(result, Err(AuthError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service();
        service.seed_demo_accounts().await;

        let result = service.login("admin@college.edu", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_foreign_domain() {
        let service = service();
        service.seed_demo_accounts().await;

        let result = service.login("user@hotmail.com", "whatever1").await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_sixth_attempt_rate_limited_even_with_correct_password() {
        let service = service();
        service.seed_demo_accounts().await;

        for _ in 0..5 {
            let result = service.login("admin@college.edu", "wrong").await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        let result = service.login("admin@college.edu", "admin123").await;
        assert!(matches!(result, Err(AuthError::RateLimited)));
    }

    #[tokio::test]
    async fn test_successful_login_resets_rate_counter() {
        let service = service();
        service.seed_demo_accounts().await;

        for _ in 0..4 {
            let _ = service.login("admin@college.edu", "wrong").await;
        }
        assert!(service.login("admin@college.edu", "admin123").await.is_ok());

        // Counter cleared: four more failures do not trip the limit
        for _ in 0..4 {
            let _ = service.login("admin@college.edu", "wrong").await;
        }
        assert!(service.login("admin@college.edu", "admin123").await.is_ok());
    }

    #[tokio::test]
    async fn test_signup_club_manager_creates_pending_club() {
        let club_store = Arc::new(ClubStore::new());
        let service = AuthService::new(
            AuthConfig::default(),
            club_store.clone(),
            Arc::new(LoginRateLimiter::new()),
            None,
        );

        let session = service
            .signup(signup_input("sam@gmail.com", Some("Robotics Club")))
            .await
            .unwrap();

        assert_eq!(session.role, UserRole::Club);
        let club_id = session.club_id.expect("club linked");
        let club = club_store.get_by_id(&club_id).await.unwrap();
        assert_eq!(club.name, "Robotics Club");
        assert_eq!(club.status, crate::models::ClubStatus::Pending);
        assert_eq!(club.contact.email, "sam@gmail.com");
    }

    #[tokio::test]
    async fn test_signup_admin_domain_yields_admin_role() {
        let service = service();

        let session = service
            .signup(signup_input("dean@college.edu", None))
            .await
            .unwrap();

        assert_eq!(session.role, UserRole::Admin);
        assert!(session.club_id.is_none());
    }

    #[tokio::test]
    async fn test_signup_club_without_club_name_fails() {
        let service = service();
        let result = service.signup(signup_input("sam@gmail.com", None)).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_signup_short_password_fails() {
        let service = service();
        let mut input = signup_input("sam@gmail.com", Some("Robotics Club"));
        input.password = "abc".to_string();
        input.confirm_password = "abc".to_string();

        let result = service.signup(input).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_signup_password_mismatch_fails() {
        let service = service();
        let mut input = signup_input("sam@gmail.com", Some("Robotics Club"));
        input.confirm_password = "different99".to_string();

        let result = service.signup(input).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_fails() {
        let service = service();
        service.seed_demo_accounts().await;

        let result = service
            .signup(signup_input("tech.club@gmail.com", Some("Another Club")))
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateAccount)));
    }

    #[tokio::test]
    async fn test_signup_then_login_roundtrip() {
        let service = service();

        service
            .signup(signup_input("sam@gmail.com", Some("Robotics Club")))
            .await
            .unwrap();

        let session = service.login("sam@gmail.com", "secret99").await.unwrap();
        assert_eq!(session.role, UserRole::Club);
        assert_eq!(session.club_name.as_deref(), Some("Robotics Club"));
    }

    #[tokio::test]
    async fn test_bootstrap_login_issues_superadmin_session() {
        let mut config = AuthConfig::default();
        config.bootstrap = Some(BootstrapCredentials {
            email: "ops@college.edu".to_string(),
            password: "long-random-secret".to_string(),
        });
        let service = service_with(config);

        let session = service
            .login("ops@college.edu", "long-random-secret")
            .await
            .unwrap();

        assert_eq!(session.role, UserRole::Superadmin);
        assert!(session.is_admin());
        // 7-day expiry, well beyond the normal 24 hours
        assert!(session.expires - session.login_time > chrono::Duration::days(6));
    }

    #[tokio::test]
    async fn test_bootstrap_path_honors_rate_limit() {
        let mut config = AuthConfig::default();
        config.bootstrap = Some(BootstrapCredentials {
            email: "ops@college.edu".to_string(),
            password: "long-random-secret".to_string(),
        });
        let service = service_with(config);

        for _ in 0..5 {
            let result = service.login("ops@college.edu", "guess").await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        let result = service.login("ops@college.edu", "long-random-secret").await;
        assert!(matches!(result, Err(AuthError::RateLimited)));
    }

    #[tokio::test]
    async fn test_bootstrap_disabled_when_unconfigured() {
        let service = service();
        service.seed_demo_accounts().await;

        let result = service.login("ops@college.edu", "long-random-secret").await;
        assert!(matches!(result, Err(AuthError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_persisted_users_survive_restart() {
        let dir = tempfile::TempDir::new().unwrap();
        let persist = Arc::new(JsonStore::open(dir.path()).unwrap());

        let service = AuthService::new(
            AuthConfig::default(),
            Arc::new(ClubStore::new()),
            Arc::new(LoginRateLimiter::new()),
            Some(persist.clone()),
        );
        service
            .signup(signup_input("sam@gmail.com", Some("Robotics Club")))
            .await
            .unwrap();

        let reopened = AuthService::new(
            AuthConfig::default(),
            Arc::new(ClubStore::new()),
            Arc::new(LoginRateLimiter::new()),
            Some(persist),
        );
        assert!(reopened.find_by_email("sam@gmail.com").await.is_some());
        assert!(reopened.login("sam@gmail.com", "secret99").await.is_ok());
    }
}
