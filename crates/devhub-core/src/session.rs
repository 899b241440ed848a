//! Persisted client sessions: authentication and theme.

use std::fmt;

use devhub_proto::entities::User;

use crate::storage::{KeyValueStorage, SafeStorage};

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Storage key of the JSON-encoded signed-in user.
pub const AUTH_USER_KEY: &str = "auth_user";
/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// Signed-in user and bearer token, mirrored to storage.
#[derive(Debug)]
pub struct AuthSession<S> {
    storage: SafeStorage<S>,
    user: Option<User>,
    token: Option<String>,
}

impl<S: KeyValueStorage> AuthSession<S> {
    /// Signed-out session over `storage`. Call [`Self::load_from_storage`] to
    /// restore a previous login.
    pub fn new(storage: SafeStorage<S>) -> Self {
        Self { storage, user: None, token: None }
    }

    /// Record a successful login.
    pub fn set_auth(&mut self, user: User, token: &str) {
        self.storage.set(AUTH_TOKEN_KEY, token);
        self.store_user(&user);
        self.user = Some(user);
        self.token = Some(token.to_string());
    }

    /// Replace the profile, keeping the token.
    pub fn update_user(&mut self, user: User) {
        self.store_user(&user);
        self.user = Some(user);
    }

    fn store_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.set(AUTH_USER_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to encode user for storage"),
        }
    }

    /// Forget the login and its stored copy.
    pub fn logout(&mut self) {
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(AUTH_USER_KEY);
        self.user = None;
        self.token = None;
    }

    /// Token rejected by the server (401): drop it everywhere.
    pub fn evict_token(&mut self) {
        tracing::info!("evicting rejected auth token");
        self.logout();
    }

    /// Restore a stored login.
    ///
    /// Needs both keys. A stored user that does not decode evicts both keys.
    /// Returns whether the session is now authenticated.
    pub fn load_from_storage(&mut self) -> bool {
        let (Some(token), Some(user_json)) =
            (self.storage.get(AUTH_TOKEN_KEY), self.storage.get(AUTH_USER_KEY))
        else {
            return self.is_authenticated();
        };

        match serde_json::from_str::<User>(&user_json) {
            Ok(user) => {
                self.user = Some(user);
                self.token = Some(token);
            },
            Err(error) => {
                tracing::error!(%error, "failed to parse stored user");
                self.storage.remove(AUTH_TOKEN_KEY);
                self.storage.remove(AUTH_USER_KEY);
            },
        }
        self.is_authenticated()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// Signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Bearer token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    #[default]
    Dark,
}

impl Theme {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value. `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme preference, mirrored to storage.
#[derive(Debug)]
pub struct ThemePreference<S> {
    storage: SafeStorage<S>,
    theme: Theme,
}

impl<S: KeyValueStorage> ThemePreference<S> {
    /// Preference initialised from storage (dark when unset or invalid).
    pub fn new(storage: SafeStorage<S>) -> Self {
        let mut preference = Self { storage, theme: Theme::default() };
        preference.load_from_storage();
        preference
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch to `theme` and persist it.
    pub fn set(&mut self, theme: Theme) {
        self.storage.set(THEME_KEY, theme.as_str());
        self.theme = theme;
    }

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled());
        self.theme
    }

    /// Re-read the stored value; invalid values are ignored.
    pub fn load_from_storage(&mut self) {
        if let Some(theme) = self.storage.get(THEME_KEY).as_deref().and_then(Theme::parse) {
            self.theme = theme;
        }
    }
}
