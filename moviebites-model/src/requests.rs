//! Request bodies and query parameter sets sent to the API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `user_type` sent with every user upsert/login.
pub const MOBILE_USER_TYPE: &str = "mobile";
/// Result limit used by webseries search when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Identity claim sent to `/users/mobile/upsert`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Credentials sent to `/users/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_id: Option<String>,
}

/// Wire payload for mobile user endpoints: the caller's fields plus the
/// device identifier and the fixed user type.
#[derive(Debug, Serialize)]
pub struct MobileUserPayload<'a, T: Serialize> {
    #[serde(flatten)]
    pub fields: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udid: Option<&'a str>,
    pub user_type: &'static str,
}

impl<'a, T: Serialize> MobileUserPayload<'a, T> {
    pub fn new(fields: &'a T, udid: Option<&'a str>) -> Self {
        Self {
            fields,
            udid,
            user_type: MOBILE_USER_TYPE,
        }
    }
}

/// Body of favorite/like add and remove calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRequest {
    pub social_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl ReactionRequest {
    pub fn new(social_id: impl Into<String>) -> Self {
        Self {
            social_id: social_id.into(),
            episode_number: None,
        }
    }

    pub fn for_episode(mut self, episode_number: u32) -> Self {
        self.episode_number = Some(episode_number);
        self
    }
}

/// Query of favorite/like checks.
///
/// The user is identified by the request identity, so only the episode
/// filter lives here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl ReactionQuery {
    pub fn for_episode(episode_number: u32) -> Self {
        Self {
            episode_number: Some(episode_number),
        }
    }
}

/// Paging and free-form filters for collection listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// Query of `/webseries/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: u32,
}

impl SearchParams {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Query of `/users/likes`. The user comes from the request identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLikesQuery {
    #[serde(
        rename = "includeEpisodes",
        skip_serializing_if = "Option::is_none"
    )]
    pub include_episodes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl UserLikesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_episodes(mut self) -> Self {
        self.include_episodes = Some(true);
        self
    }
}
