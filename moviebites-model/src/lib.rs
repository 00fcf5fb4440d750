//! Wire-level data model shared by the MovieBites client crates.
#![allow(missing_docs)]

pub mod identity;
pub mod requests;
pub mod routes;

// Intentionally curated re-exports for downstream consumers.
pub use identity::{
    Identity, SOCIAL_ID_KEY, UDID_KEY, UDID_PREFIX, extract_social_id,
};
pub use requests::{
    ListParams, LoginRequest, MOBILE_USER_TYPE, MobileUserPayload,
    ReactionQuery, ReactionRequest, SearchParams, UserClaim, UserLikesQuery,
};
