//! Application route table.
//!
//! | Path | Route | Access |
//! |---|---|---|
//! | `/` | [`Route::Home`] | public |
//! | `/login` | [`Route::Login`] | public |
//! | `/dashboard` | [`Route::Dashboard`] | private |
//! | `/basket/:id` | [`Route::BasketDetails`] | private |
//! | `/subscribe/:basketId` | [`Route::Subscribe`] | private |
//! | `/mandate` | [`Route::Mandate`] | private |

use crate::types::BasketId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    BasketDetails { id: BasketId },
    Subscribe { basket_id: BasketId },
    Mandate,
}

impl Route {
    /// Match a location against the route table.
    ///
    /// Query string, fragment and a single trailing slash are ignored.
    /// Returns `None` for anything the table does not know.
    #[must_use]
    pub fn parse(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
        match segments.as_slice() {
            [""] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["dashboard"] => Some(Self::Dashboard),
            ["mandate"] => Some(Self::Mandate),
            ["basket", id] => id.parse().ok().map(|id| Self::BasketDetails { id }),
            ["subscribe", id] => id.parse().ok().map(|basket_id| Self::Subscribe { basket_id }),
            _ => None,
        }
    }

    /// Whether rendering this route requires an authenticated session.
    #[must_use]
    pub fn is_private(&self) -> bool {
        !matches!(self, Self::Home | Self::Login)
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::BasketDetails { id } => format!("/basket/{id}"),
            Self::Subscribe { basket_id } => format!("/subscribe/{basket_id}"),
            Self::Mandate => "/mandate".into(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
