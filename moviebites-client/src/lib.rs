//! Identity-aware REST client for the MovieBites web-series API.
//!
//! Every request is tagged with exactly one identity query parameter
//! (`social_id` once a user has signed in, a persisted device `udid`
//! otherwise) plus the optional `X-API-KEY` header, and every failure is
//! normalized into a single [`ApiError`] shape.
//!
//! ```no_run
//! use std::sync::Arc;
//! use moviebites_client::{ApiClient, MemoryIdentityStore, Session};
//! use moviebites_config::ClientConfig;
//! use moviebites_model::{ListParams, UserClaim};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(
//!     &ClientConfig::default(),
//!     Arc::new(MemoryIdentityStore::new()),
//! )?;
//! let page = client
//!     .webseries()
//!     .get_all(&ListParams::new().page(1).limit(20))
//!     .await?;
//!
//! let session = Session::from_client(&client);
//! session
//!     .upsert(&UserClaim {
//!         email: Some("viewer@example.com".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```

/// Request pipeline: identity and API key injection, normalization.
pub mod api_client;
/// Normalized request errors and store errors.
pub mod error;
/// Device and user identity resolution.
pub mod identity;
/// Per-resource clients.
pub mod resources;
/// Signed-in user state.
pub mod session;

pub use api_client::{API_KEY_HEADER, ApiClient, RequestDescriptor};
pub use error::{
    ApiError, ApiResult, ClientBuildError, ErrorOrigin, StoreError,
    StoreResult,
};
pub use identity::{
    FileIdentityStore, IdentityStore, MemoryIdentityStore, ensure_identity,
    generate_udid,
};
pub use resources::{
    CategoriesApi, ReactionKind, ReactionsApi, UsersApi, WebseriesApi,
};
pub use session::{Session, SessionSnapshot};
