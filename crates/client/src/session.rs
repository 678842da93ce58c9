//! Session store: the auth token and user profile, persisted through
//! [`Storage`].
//!
//! Shipping addresses saved at checkout live under a per-user key
//! (`user-address-<id>`) so they survive logout and are re-attached to the
//! profile on the next login.

use denfit_core::{ShippingAddress, UserId, UserProfile};

use crate::storage::Storage;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

fn address_key(user_id: UserId) -> String {
    format!("user-address-{user_id}")
}

/// Holds the authenticated session, if any, and keeps it in sync with the
/// backing storage.
pub struct SessionStore {
    storage: Box<dyn Storage>,
    token: Option<String>,
    user: Option<UserProfile>,
}

impl SessionStore {
    /// Create a session store, restoring any persisted session from storage.
    ///
    /// A persisted token without a decodable profile (or vice versa) is
    /// discarded and the store starts unauthenticated.
    #[must_use]
    pub fn restore(storage: Box<dyn Storage>) -> Self {
        let token = storage.get(TOKEN_KEY);
        let user = storage
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (Some(token), Some(user)),
            _ => (None, None),
        };

        Self {
            storage,
            token,
            user,
        }
    }

    /// Whether a user is currently logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The logged-in profile, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Install a session after a successful login.
    ///
    /// If the profile carries no address but one was saved locally for this
    /// user, the saved address is merged in before persisting.
    pub fn apply_login(&mut self, token: String, mut user: UserProfile) {
        if user.address.is_none() {
            user.address = self
                .storage
                .get(&address_key(user.id))
                .and_then(|raw| serde_json::from_str(&raw).ok());
        }
        self.persist(&token, &user);
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Install a session after a successful signup. New accounts have no
    /// saved address to merge.
    pub fn apply_signup(&mut self, token: String, user: UserProfile) {
        self.persist(&token, &user);
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Clear the session. The per-user saved address is left in storage so it
    /// can be restored on the next login.
    pub fn logout(&mut self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.token = None;
        self.user = None;
    }

    /// Save the shipping address used at checkout, both on the profile and
    /// under the per-user storage key.
    pub fn save_address(&mut self, address: ShippingAddress) {
        let Some(user) = self.user.as_mut() else {
            return;
        };

        if let Ok(raw) = serde_json::to_string(&address) {
            self.storage.set(&address_key(user.id), &raw);
        }
        user.address = Some(address);

        if let Ok(raw) = serde_json::to_string(user) {
            self.storage.set(USER_KEY, &raw);
        }
    }

    fn persist(&mut self, token: &str, user: &UserProfile) {
        self.storage.set(TOKEN_KEY, token);
        if let Ok(raw) = serde_json::to_string(user) {
            self.storage.set(USER_KEY, &raw);
        }
    }
}
