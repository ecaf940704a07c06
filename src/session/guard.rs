use std::sync::Arc;

use super::manager::SessionManager;
use crate::routes::Route;

/// Source of the "may this tab see private pages" answer.
pub trait AuthCheck {
    fn is_authenticated(&self) -> bool;
}

impl<A> AuthCheck for SessionManager<A> {
    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the requested page.
    Render(Route),
    /// Go to this route instead. The requested location is dropped.
    Redirect(Route),
    NotFound,
}

/// Gate in front of the private routes.
///
/// Holds no state of its own: every navigation asks the session again, so a
/// logout or an expiry takes effect on the next page change.
pub struct RouteGuard<C> {
    auth: Arc<C>,
}

impl<C> Clone for RouteGuard<C> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
        }
    }
}

impl<C: AuthCheck> RouteGuard<C> {
    #[must_use]
    pub fn new(auth: Arc<C>) -> Self {
        Self { auth }
    }

    /// Decide what to show for a browser location.
    pub fn navigate(&self, location: &str) -> Navigation {
        match Route::parse(location) {
            Some(route) => self.check(route),
            None => {
                tracing::debug!(location, "No route matches location");
                Navigation::NotFound
            }
        }
    }

    /// Decide whether `route` may be rendered.
    pub fn check(&self, route: Route) -> Navigation {
        if !route.is_private() || self.auth.is_authenticated() {
            return Navigation::Render(route);
        }
        tracing::debug!(route = %route, "Unauthenticated access to private route, redirecting to login");
        Navigation::Redirect(Route::Login)
    }
}
