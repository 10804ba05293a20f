//! Route table and navigation guard. The guard is a pure function over a
//! route and a session snapshot: it returns a [`GuardDecision`] and performs
//! no redirect itself, so callers stay in charge of navigation.

use crate::session::state::SessionState;

/// Access policy attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable regardless of session state.
    Public,
    /// Reachable only while signed out; authenticated visitors are sent home.
    GuestOnly,
    /// Requires a credential.
    AuthRequired,
    /// Requires a credential and an admin profile.
    AdminRequired,
}

/// One entry in the static route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub access: Access,
}

/// Catch-all for paths the table does not know.
pub const NOT_FOUND: RouteDescriptor = RouteDescriptor {
    path: "/not-found",
    access: Access::Public,
};

/// The console's route table. `/admin/login` is deliberately public so an
/// operator signed in as a regular user can still reach the admin entry.
pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: "/login",
        access: Access::GuestOnly,
    },
    RouteDescriptor {
        path: "/register",
        access: Access::GuestOnly,
    },
    RouteDescriptor {
        path: "/",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/nodes",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/rules",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/packages",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/orders",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/deposit",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/profile",
        access: Access::AuthRequired,
    },
    RouteDescriptor {
        path: "/admin/login",
        access: Access::Public,
    },
    RouteDescriptor {
        path: "/admin",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/nodes",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/users",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/packages",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/orders",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/node-groups",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/user-groups",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/payments",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/admin/settings",
        access: Access::AdminRequired,
    },
    RouteDescriptor {
        path: "/deposit/callback",
        access: Access::Public,
    },
];

/// Outcome of evaluating the guard. Redirects are values, not actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Missing or insufficient credential: go sign in at `entry`, then come
    /// back to `return_to`.
    ToLogin {
        entry: &'static str,
        return_to: String,
    },
    /// Signed in but not allowed here: go to the landing page instead.
    Redirect { to: &'static str },
}

/// Looks up a path in the route table; unknown paths land on the catch-all.
#[must_use]
pub fn resolve(path: &str) -> RouteDescriptor {
    ROUTES
        .iter()
        .copied()
        .find(|route| route.path == path)
        .unwrap_or(NOT_FOUND)
}

fn login_entry(path: &str) -> &'static str {
    if path == "/admin" || path.starts_with("/admin/") {
        "/admin/login"
    } else {
        "/login"
    }
}

/// Decides whether the session may enter `route`.
///
/// An admin route seen without a credential asks for the admin login entry;
/// seen with a credential but no admin role it redirects to the landing page
/// rather than bouncing through login again.
#[must_use]
pub fn evaluate(route: &RouteDescriptor, state: &SessionState) -> GuardDecision {
    match route.access {
        Access::Public => GuardDecision::Allow,
        Access::GuestOnly => {
            if state.is_authenticated() {
                GuardDecision::Redirect { to: "/" }
            } else {
                GuardDecision::Allow
            }
        }
        Access::AuthRequired => {
            if state.is_authenticated() {
                GuardDecision::Allow
            } else {
                GuardDecision::ToLogin {
                    entry: login_entry(route.path),
                    return_to: route.path.to_string(),
                }
            }
        }
        Access::AdminRequired => {
            if !state.is_authenticated() {
                GuardDecision::ToLogin {
                    entry: login_entry(route.path),
                    return_to: route.path.to_string(),
                }
            } else if state.is_admin() {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect { to: "/" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Profile, Role};
    use secrecy::SecretString;

    fn guest() -> SessionState {
        SessionState::default()
    }

    fn user() -> SessionState {
        SessionState {
            token: Some(SecretString::from("t".to_string())),
            profile: Some(Profile {
                id: 1,
                username: "alice".to_string(),
                role: Role::User,
                balance: 0,
                user_group_id: 0,
                created_at: String::new(),
            }),
            ..SessionState::default()
        }
    }

    fn admin() -> SessionState {
        let mut state = user();
        if let Some(profile) = &mut state.profile {
            profile.role = Role::Admin;
        }
        state
    }

    #[test]
    fn unknown_paths_resolve_to_public_catch_all() {
        let route = resolve("/no/such/path");
        assert_eq!(route.path, NOT_FOUND.path);
        assert_eq!(evaluate(&route, &guest()), GuardDecision::Allow);
    }

    #[test]
    fn guest_only_routes_bounce_authenticated_sessions() {
        let route = resolve("/login");
        assert_eq!(evaluate(&route, &guest()), GuardDecision::Allow);
        assert_eq!(
            evaluate(&route, &user()),
            GuardDecision::Redirect { to: "/" }
        );
    }

    #[test]
    fn auth_routes_preserve_the_return_target() {
        let route = resolve("/rules");
        assert_eq!(
            evaluate(&route, &guest()),
            GuardDecision::ToLogin {
                entry: "/login",
                return_to: "/rules".to_string(),
            }
        );
        assert_eq!(evaluate(&route, &user()), GuardDecision::Allow);
    }

    #[test]
    fn admin_routes_use_the_admin_login_entry() {
        let route = resolve("/admin/users");
        assert_eq!(
            evaluate(&route, &guest()),
            GuardDecision::ToLogin {
                entry: "/admin/login",
                return_to: "/admin/users".to_string(),
            }
        );
    }

    #[test]
    fn authenticated_non_admin_is_sent_home_not_to_login() {
        let route = resolve("/admin");
        assert_eq!(
            evaluate(&route, &user()),
            GuardDecision::Redirect { to: "/" }
        );
        assert_eq!(evaluate(&route, &admin()), GuardDecision::Allow);
    }

    #[test]
    fn admin_login_is_reachable_while_signed_in() {
        let route = resolve("/admin/login");
        assert_eq!(evaluate(&route, &user()), GuardDecision::Allow);
        assert_eq!(evaluate(&route, &guest()), GuardDecision::Allow);
    }

    #[test]
    fn token_without_profile_is_not_admin() {
        let state = SessionState {
            token: Some(SecretString::from("t".to_string())),
            ..SessionState::default()
        };
        let route = resolve("/admin/orders");
        assert_eq!(
            evaluate(&route, &state),
            GuardDecision::Redirect { to: "/" }
        );
    }
}
