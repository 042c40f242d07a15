//! Route guard consulted before any view is shown.

use std::fmt::Display;

use log::info;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Register => f.write_str("register"),
            Self::Dashboard => f.write_str("dashboard"),
        }
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// The route that should actually be shown for `requested`.
    ///
    /// Protected routes need a token; a signed-in admin asking for the login screen is
    /// sent to the dashboard instead. Registration is always reachable.
    pub fn resolve(requested: Route, session: &Session) -> Route {
        let resolved = match requested {
            route if route.requires_auth() && !session.is_authenticated() => Route::Login,
            Route::Login if session.is_authenticated() => Route::Dashboard,
            other => other,
        };
        if resolved != requested {
            info!("RouteGuard: redirecting {requested} -> {resolved}");
        }
        resolved
    }
}
