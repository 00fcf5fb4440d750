//! Thin per-resource wrappers over [`ApiClient`].
//!
//! Each method maps one logical operation to a path, verb and params. No
//! retries, caching or validation happen here; errors come back exactly as
//! the pipeline normalized them.

/// `/categories`
pub mod categories;
/// `/favorites` and `/likes`
pub mod reactions;
/// `/users`
pub mod users;
/// `/webseries`
pub mod webseries;

pub use categories::CategoriesApi;
pub use reactions::{ReactionKind, ReactionsApi};
pub use users::UsersApi;
pub use webseries::WebseriesApi;

use crate::ApiClient;

impl ApiClient {
    /// Categories client sharing this client's transport and store.
    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.clone())
    }

    /// Webseries client.
    pub fn webseries(&self) -> WebseriesApi {
        WebseriesApi::new(self.clone())
    }

    /// Favorites client.
    pub fn favorites(&self) -> ReactionsApi {
        ReactionsApi::favorites(self.clone())
    }

    /// Likes client.
    pub fn likes(&self) -> ReactionsApi {
        ReactionsApi::likes(self.clone())
    }

    /// Users client, also what [`crate::Session`] is built on.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }
}
