pub mod run;

use secrecy::SecretString;

/// What the user asked the console to do.
#[derive(Debug)]
pub enum Action {
    Login {
        username: String,
        password: SecretString,
    },
    Register {
        username: String,
        password: SecretString,
        invite_code: String,
    },
    Logout,
    Profile,
    Refresh,
    Nodes,
    Rules,
    Packages,
    Orders,
    AdminUsers,
    AdminOrders,
}

impl Action {
    /// Route each action maps to, for the navigation guard. `Logout` is
    /// always allowed and maps to no route.
    #[must_use]
    pub fn route(&self) -> Option<&'static str> {
        match self {
            Self::Login { .. } => Some("/login"),
            Self::Register { .. } => Some("/register"),
            Self::Logout => None,
            Self::Profile => Some("/profile"),
            Self::Refresh => Some("/"),
            Self::Nodes => Some("/nodes"),
            Self::Rules => Some("/rules"),
            Self::Packages => Some("/packages"),
            Self::Orders => Some("/orders"),
            Self::AdminUsers => Some("/admin/users"),
            Self::AdminOrders => Some("/admin/orders"),
        }
    }
}
