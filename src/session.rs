//! Authenticated-user state shared by every view.
//!
//! [`SessionManager`] is the only writer of the session: `restore`, `login` and
//! `logout` update the durable store first and the in-memory copy second, and
//! configure the shared [`BearerAuth`] interceptor to match.
use anyhow::{anyhow, Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::api::{AuthApi, BearerAuth, RegisterRequest};
use crate::form::{validate_login, validate_signup};
use crate::model::{Role, Session, User};
use crate::store::SessionStore;

pub const USER_KEY: &str = "fxstreampro_user";
pub const TOKEN_KEY: &str = "fxstreampro_token";

pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    auth: BearerAuth,
    user: RwLock<Option<User>>,
    loading: AtomicBool,
    mutation: Mutex<()>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>, auth: BearerAuth) -> Self {
        Self {
            api,
            store,
            auth,
            user: RwLock::new(None),
            loading: AtomicBool::new(true),
            mutation: Mutex::new(()),
        }
    }

    /// Load the persisted session, if both entries are present. Returns whether
    /// a session is now active.
    #[instrument(skip_all)]
    pub async fn restore(&self) -> bool {
        let _guard = self.mutation.lock().await;
        let restored = match load_persisted(self.store.as_ref()).await {
            Ok(session) => session,
            Err(err) => {
                warn!(?err, "failed to read persisted session; starting signed out");
                None
            }
        };

        let active = match restored {
            Some(session) => {
                info!(user_id = %session.user.id, role = session.user.role.as_str(), "restored session");
                self.auth.set(&session.token);
                self.set_user(Some(session.user));
                true
            }
            None => {
                self.auth.clear();
                self.set_user(None);
                false
            }
        };
        self.loading.store(false, Ordering::SeqCst);
        active
    }

    /// Authenticate and persist the session. Failures are logged and reported
    /// as `false`; the previous session, if any, stays in place.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> bool {
        if let Err(err) = validate_login(email, password) {
            warn!(%err, "login rejected before sending");
            return false;
        }

        let _guard = self.mutation.lock().await;
        self.loading.store(true, Ordering::SeqCst);
        let result = self.try_login(email.trim(), password).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(user) => {
                info!(user_id = %user.id, role = user.role.as_str(), "logged in");
                true
            }
            Err(err) => {
                warn!(?err, "login failed");
                false
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<User> {
        let response = self.api.login(email, password).await?;
        if response.token.trim().is_empty() {
            return Err(anyhow!("backend returned an empty token"));
        }
        let user_json = serde_json::to_string(&response.user)?;
        self.store
            .put_all(&[(USER_KEY, user_json.as_str()), (TOKEN_KEY, response.token.as_str())])
            .await
            .context("failed to persist session")?;

        self.auth.set(&response.token);
        self.set_user(Some(response.user.clone()));
        Ok(response.user)
    }

    /// Register a new account with the default role. Does not sign in.
    #[instrument(skip_all)]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> bool {
        if let Err(err) = validate_signup(name, email, password) {
            warn!(%err, "signup rejected before sending");
            return false;
        }

        let request = RegisterRequest {
            full_name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            phone: phone
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            role: Role::User,
        };
        match self.api.register(&request).await {
            Ok(()) => {
                info!("registered account");
                true
            }
            Err(err) => {
                warn!(?err, "signup failed");
                false
            }
        }
    }

    /// Forget the session everywhere. Safe to call when signed out. If the
    /// store cannot be cleared the session is left as it was.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        self.store
            .remove_all(&[USER_KEY, TOKEN_KEY])
            .await
            .context("failed to clear persisted session")?;
        self.auth.clear();
        if self.current_user().is_some() {
            info!("logged out");
        }
        self.set_user(None);
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user()
            .map(|u| u.role == Role::Admin)
            .unwrap_or(false)
    }

    /// True until the first `restore` finishes and while a login is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn auth(&self) -> &BearerAuth {
        &self.auth
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = user;
    }
}

/// Read the persisted session. Both entries must be present and the user
/// record must parse; anything else counts as signed out.
pub async fn load_persisted(store: &dyn SessionStore) -> Result<Option<Session>> {
    let user_json = store.get(USER_KEY).await?;
    let token = store.get(TOKEN_KEY).await?;
    let (Some(user_json), Some(token)) = (user_json, token) else {
        return Ok(None);
    };
    if token.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<User>(&user_json) {
        Ok(user) => Ok(Some(Session { user, token })),
        Err(err) => {
            warn!(?err, "persisted user record is unreadable");
            Ok(None)
        }
    }
}
