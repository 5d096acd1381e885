//! Routes
//!
//! The application's protected views and the requirement guarding each one.

use std::fmt;

use crate::access::{Access, Denial, Requirement, Role, UserIdentity, evaluate};

/// Sign-in page
pub const LOGIN_PATH: &str = "/login";

/// Landing page for signed-in users
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Overview
    Dashboard,
    /// Point of sale
    Sales,
    /// Client accounts
    Clients,
    /// Product catalogue
    Products,
    /// Stock management
    Inventory,
    /// Reports
    Reports,
    /// Business settings
    Settings,
    /// The user's own profile
    Profile,
}

impl Route {
    /// Every protected route.
    pub const ALL: [Route; 8] = [
        Route::Dashboard,
        Route::Sales,
        Route::Clients,
        Route::Products,
        Route::Inventory,
        Route::Reports,
        Route::Settings,
        Route::Profile,
    ];

    /// Path the route is mounted at.
    pub const fn path(self) -> &'static str {
        match self {
            Route::Dashboard => DASHBOARD_PATH,
            Route::Sales => "/ventas",
            Route::Clients => "/clientes",
            Route::Products => "/productos",
            Route::Inventory => "/inventario",
            Route::Reports => "/reportes",
            Route::Settings => "/configuracion",
            Route::Profile => "/perfil",
        }
    }

    /// Find the route mounted at `path`. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');

        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    /// Requirement guarding the route.
    pub fn requirement(self) -> Requirement {
        match self {
            Route::Dashboard
            | Route::Sales
            | Route::Clients
            | Route::Products
            | Route::Profile => Requirement::authenticated(),
            Route::Inventory => Requirement::authenticated().with_permissions(["inventario"]),
            Route::Reports => Requirement::authenticated().with_roles([
                Role::Admin,
                Role::Supervisor,
                Role::Contador,
            ]),
            Route::Settings => Requirement::authenticated().with_roles([Role::Admin]),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to show for a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the route
    Render(Route),
    /// Send the user to another path
    Redirect(&'static str),
    /// Show the access-denied view for the route
    Denied(Route, Denial),
}

/// Resolve `path` for `user`.
///
/// Unauthenticated access to a protected route redirects to the sign-in page; unknown paths
/// redirect to the dashboard for signed-in users and to the sign-in page otherwise.
pub fn resolve(path: &str, user: Option<&UserIdentity>) -> Navigation {
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        return Navigation::Redirect(DASHBOARD_PATH);
    }

    if trimmed == LOGIN_PATH {
        return match user {
            Some(_) => Navigation::Redirect(DASHBOARD_PATH),
            None => Navigation::Redirect(LOGIN_PATH),
        };
    }

    let Some(route) = Route::from_path(trimmed) else {
        return Navigation::Redirect(if user.is_some() {
            DASHBOARD_PATH
        } else {
            LOGIN_PATH
        });
    };

    match evaluate(user, &route.requirement()) {
        Access::Allowed => Navigation::Render(route),
        Access::Denied(Denial::Unauthenticated) => Navigation::Redirect(LOGIN_PATH),
        Access::Denied(denial) => Navigation::Denied(route, denial),
    }
}
