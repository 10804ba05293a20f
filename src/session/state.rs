use crate::api::types::{Profile, Role};
use secrecy::SecretString;

/// In-memory authentication state. Rebuilt from the credential store once at
/// startup; afterwards mutated only through [`super::Session`] operations.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub token: Option<SecretString>,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// Presence of the access token is the sole authority.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// False whenever the profile is absent, regardless of any previously
    /// cached role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|profile| profile.role == Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Role;

    fn profile(role: Role) -> Profile {
        Profile {
            id: 1,
            username: "alice".to_string(),
            role,
            balance: 0,
            user_group_id: 0,
            created_at: String::new(),
        }
    }

    #[test]
    fn pristine_state_is_unauthenticated() {
        let state = SessionState::default();
        assert!(!state.is_authenticated());
        assert!(!state.is_admin());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn authenticated_follows_token_presence() {
        let mut state = SessionState::default();
        state.token = Some(SecretString::from("t".to_string()));
        assert!(state.is_authenticated());
        state.token = None;
        assert!(!state.is_authenticated());
    }

    #[test]
    fn admin_requires_profile_with_admin_role() {
        let mut state = SessionState {
            token: Some(SecretString::from("t".to_string())),
            ..SessionState::default()
        };
        assert!(!state.is_admin());
        state.profile = Some(profile(Role::User));
        assert!(!state.is_admin());
        state.profile = Some(profile(Role::Admin));
        assert!(state.is_admin());
        state.profile = None;
        assert!(!state.is_admin());
    }
}
