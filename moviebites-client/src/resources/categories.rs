use moviebites_model::{ListParams, routes};
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiResult};

/// Category listing, search and administration.
#[derive(Debug, Clone)]
pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    /// Usually obtained through [`ApiClient::categories`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /categories` with paging and filters.
    pub async fn get_all(&self, params: &ListParams) -> ApiResult<Value> {
        self.client.get(routes::categories::COLLECTION, params).await
    }

    /// Search is the collection listing filtered by `q`.
    pub async fn search(
        &self,
        q: &str,
        params: &ListParams,
    ) -> ApiResult<Value> {
        let params = params.clone().filter("q", q);
        self.client.get(routes::categories::COLLECTION, &params).await
    }

    /// `GET /categories/{id}`.
    pub async fn get_by_id(&self, id: &str) -> ApiResult<Value> {
        self.client
            .get_path(&routes::fill(routes::categories::ITEM, id))
            .await
    }

    /// `POST /categories`.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> ApiResult<Value> {
        self.client.post(routes::categories::COLLECTION, data).await
    }

    /// `PUT /categories/{id}`.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &T,
    ) -> ApiResult<Value> {
        self.client
            .put(&routes::fill(routes::categories::ITEM, id), data)
            .await
    }

    /// `DELETE /categories/{id}`.
    pub async fn remove(&self, id: &str) -> ApiResult<Value> {
        self.client
            .delete(&routes::fill(routes::categories::ITEM, id))
            .await
    }
}
