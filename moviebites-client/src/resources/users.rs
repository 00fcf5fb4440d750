use moviebites_model::{
    LoginRequest, MobileUserPayload, UserClaim, UserLikesQuery, routes,
};
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiResult, identity};

/// Mobile user endpoints.
#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    /// Usually obtained through [`ApiClient::users`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create or update the mobile user behind `claim`.
    pub async fn upsert(&self, claim: &UserClaim) -> ApiResult<Value> {
        self.post_mobile(routes::users::MOBILE_UPSERT, claim).await
    }

    /// Sign in an existing user.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Value> {
        self.post_mobile(routes::users::LOGIN, credentials).await
    }

    /// Webseries (and optionally episodes) the user liked.
    pub async fn likes(&self, query: &UserLikesQuery) -> ApiResult<Value> {
        self.client.get(routes::users::LIKES, query).await
    }

    /// Mobile user endpoints also expect the stored device id and the
    /// `mobile` user type in the body.
    async fn post_mobile<T: Serialize>(
        &self,
        path: &str,
        fields: &T,
    ) -> ApiResult<Value> {
        let store = self.client.store();
        let udid = identity::stored_udid(store.as_ref()).await?;
        let payload = MobileUserPayload::new(fields, udid.as_deref());
        self.client.post(path, &payload).await
    }
}
