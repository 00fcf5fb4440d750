use moviebites_model::{ListParams, SearchParams, routes};
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiResult};

/// Webseries catalogue.
#[derive(Debug, Clone)]
pub struct WebseriesApi {
    client: ApiClient,
}

impl WebseriesApi {
    /// Usually obtained through [`ApiClient::webseries`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /webseries` with paging and filters.
    pub async fn get_all(&self, params: &ListParams) -> ApiResult<Value> {
        self.client.get(routes::webseries::COLLECTION, params).await
    }

    /// `GET /webseries/{id}`.
    pub async fn get_by_id(&self, id: &str) -> ApiResult<Value> {
        self.client
            .get_path(&routes::fill(routes::webseries::ITEM, id))
            .await
    }

    /// The server resolves ids and slugs on the same route.
    pub async fn get_by_slug(&self, slug: &str) -> ApiResult<Value> {
        self.client
            .get_path(&routes::fill(routes::webseries::ITEM, slug))
            .await
    }

    /// `GET /webseries/search?q=&limit=`.
    pub async fn search(&self, params: &SearchParams) -> ApiResult<Value> {
        self.client.get(routes::webseries::SEARCH, params).await
    }

    /// `POST /webseries`.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> ApiResult<Value> {
        self.client.post(routes::webseries::COLLECTION, data).await
    }

    /// `PUT /webseries/{id}`.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &T,
    ) -> ApiResult<Value> {
        self.client
            .put(&routes::fill(routes::webseries::ITEM, id), data)
            .await
    }

    /// `DELETE /webseries/{id}`.
    pub async fn remove(&self, id: &str) -> ApiResult<Value> {
        self.client
            .delete(&routes::fill(routes::webseries::ITEM, id))
            .await
    }
}
