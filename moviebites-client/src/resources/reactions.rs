use moviebites_model::{ReactionQuery, ReactionRequest, routes};
use serde_json::Value;

use crate::{ApiClient, ApiResult};

/// Which per-webseries reaction a [`ReactionsApi`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    /// `/favorites/{id}/favorite`
    Favorite,
    /// `/likes/{id}/like`
    Like,
}

impl ReactionKind {
    fn item_route(self) -> &'static str {
        match self {
            ReactionKind::Favorite => routes::favorites::ITEM,
            ReactionKind::Like => routes::likes::ITEM,
        }
    }

    fn count_route(self) -> &'static str {
        match self {
            ReactionKind::Favorite => routes::favorites::COUNT,
            ReactionKind::Like => routes::likes::COUNT,
        }
    }
}

/// Favorites and likes share one shape: check, add, remove, count.
#[derive(Debug, Clone)]
pub struct ReactionsApi {
    client: ApiClient,
    kind: ReactionKind,
}

impl ReactionsApi {
    /// Client for one reaction kind.
    pub fn new(client: ApiClient, kind: ReactionKind) -> Self {
        Self { client, kind }
    }

    /// Shorthand for [`ReactionKind::Favorite`].
    pub fn favorites(client: ApiClient) -> Self {
        Self::new(client, ReactionKind::Favorite)
    }

    /// Shorthand for [`ReactionKind::Like`].
    pub fn likes(client: ApiClient) -> Self {
        Self::new(client, ReactionKind::Like)
    }

    /// Reaction this client talks to.
    pub fn kind(&self) -> ReactionKind {
        self.kind
    }

    /// Whether the current user reacted to a webseries (or one episode).
    pub async fn check(
        &self,
        webseries_id: &str,
        query: &ReactionQuery,
    ) -> ApiResult<Value> {
        let path = routes::fill(self.kind.item_route(), webseries_id);
        self.client.get(&path, query).await
    }

    /// Record the reaction described by `body`.
    pub async fn add(
        &self,
        webseries_id: &str,
        body: &ReactionRequest,
    ) -> ApiResult<Value> {
        let path = routes::fill(self.kind.item_route(), webseries_id);
        self.client.post(&path, body).await
    }

    /// Removal carries its payload in the DELETE body.
    pub async fn remove(
        &self,
        webseries_id: &str,
        body: &ReactionRequest,
    ) -> ApiResult<Value> {
        let path = routes::fill(self.kind.item_route(), webseries_id);
        self.client.delete_with_body(&path, body).await
    }

    /// Total reactions on one webseries.
    pub async fn count(&self, webseries_id: &str) -> ApiResult<Value> {
        let path = routes::fill(self.kind.count_route(), webseries_id);
        self.client.get_path(&path).await
    }
}
