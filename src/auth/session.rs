use std::sync::{PoisonError, RwLock};

use crate::model::user::UserProfile;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
}

/// Auth token and cached profile of the signed-in user.
///
/// Handed to a form explicitly when it is opened. Cleared when the upstream
/// backend rejects the token, after which every upstream call fails fast.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn load(token: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                token: Some(token.into()),
                user: None,
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    pub fn store_user(&self, user: UserProfile) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    /// Replace the token (e.g. after the client refreshed it), keeping the profile.
    pub fn renew(&self, token: impl Into<String>) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).token = Some(token.into());
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = None;
        state.user = None;
    }

    pub fn is_active(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).token.is_some()
    }
}
