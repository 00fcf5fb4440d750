//! Shared configuration library for the MovieBites client.
//!
//! Resolves the API base URL, the optional mobile API key, the transport
//! timeout and the identity-store location from built-in defaults, an
//! optional `moviebites.toml`, a `.env` file and the process environment (in
//! increasing order of precedence). Both the library consumers and the
//! `moviebites` binary go through [`ConfigLoader`] so defaults live in one
//! place.

#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{
    ClientConfig, ConfigMetadata,
    sources::{EnvConfig, FileConfig},
};
