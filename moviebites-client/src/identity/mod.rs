//! Identity resolution for outgoing requests.
//!
//! [`ensure_identity`] is the only place a device identifier is created.
//! It runs once per request, so login and logout take effect on the very
//! next call without rebuilding the client.

/// Store trait and its memory and file implementations.
pub mod store;

use chrono::Utc;
use log::info;
use moviebites_model::{Identity, SOCIAL_ID_KEY, UDID_KEY, UDID_PREFIX};
use rand::Rng;

use crate::error::StoreResult;
pub use store::{FileIdentityStore, IdentityStore, MemoryIdentityStore};

const UDID_RANDOM_RANGE: u32 = 1_000_000;

/// Create a fresh device identifier: `udid_<unix millis>_<0..1_000_000>`.
pub fn generate_udid() -> String {
    let suffix = rand::rng().random_range(0..UDID_RANDOM_RANGE);
    format!("{}{}_{}", UDID_PREFIX, Utc::now().timestamp_millis(), suffix)
}

async fn read_non_empty(
    store: &dyn IdentityStore,
    key: &str,
) -> StoreResult<Option<String>> {
    Ok(store.get(key).await?.filter(|value| !value.is_empty()))
}

/// Stored device identifier, if one was ever created. Never generates.
pub async fn stored_udid(
    store: &dyn IdentityStore,
) -> StoreResult<Option<String>> {
    read_non_empty(store, UDID_KEY).await
}

/// Resolve the identity for the next request.
///
/// A stored `social_id` wins. Otherwise the stored `udid` is used, and when
/// there is none a new one is generated and persisted before returning.
/// Concurrent first calls may each generate an identifier; the last write
/// to the store wins.
pub async fn ensure_identity(store: &dyn IdentityStore) -> StoreResult<Identity> {
    if let Some(social_id) = read_non_empty(store, SOCIAL_ID_KEY).await? {
        return Ok(Identity::Authenticated { social_id });
    }

    if let Some(udid) = stored_udid(store).await? {
        return Ok(Identity::Anonymous { udid });
    }

    let udid = generate_udid();
    store.set(UDID_KEY, &udid).await?;
    info!("[Identity] Generated device identifier {}", udid);
    Ok(Identity::Anonymous { udid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_udid_has_timestamp_and_suffix() {
        let udid = generate_udid();
        let rest = udid.strip_prefix(UDID_PREFIX).expect("prefix");
        let (millis, suffix) = rest.split_once('_').expect("separator");
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert!(suffix.parse::<u32>().unwrap() < UDID_RANDOM_RANGE);
    }

    #[tokio::test]
    async fn social_id_takes_precedence_over_udid() {
        let store = MemoryIdentityStore::with_entries([
            (UDID_KEY, "udid_1_1"),
            (SOCIAL_ID_KEY, "u1"),
        ]);
        assert_eq!(
            ensure_identity(&store).await.unwrap(),
            Identity::Authenticated {
                social_id: "u1".into()
            }
        );
    }

    #[tokio::test]
    async fn existing_udid_is_reused() {
        let store = MemoryIdentityStore::with_entries([(UDID_KEY, "udid_9_9")]);
        for _ in 0..3 {
            assert_eq!(
                ensure_identity(&store).await.unwrap(),
                Identity::Anonymous {
                    udid: "udid_9_9".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn missing_udid_is_generated_once_and_persisted() {
        let store = MemoryIdentityStore::new();

        let first = ensure_identity(&store).await.unwrap();
        let second = ensure_identity(&store).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.peek(UDID_KEY).as_deref(), Some(first.value()));
    }

    #[tokio::test]
    async fn empty_values_count_as_absent() {
        let store = MemoryIdentityStore::with_entries([
            (SOCIAL_ID_KEY, ""),
            (UDID_KEY, ""),
        ]);
        let identity = ensure_identity(&store).await.unwrap();
        assert!(!identity.is_authenticated());
        assert!(identity.value().starts_with(UDID_PREFIX));
    }
}
