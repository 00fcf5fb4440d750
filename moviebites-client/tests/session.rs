use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moviebites_client::{
    ApiClient, ErrorOrigin, IdentityStore, MemoryIdentityStore, Session,
    StoreError, StoreResult,
};
use moviebites_config::ClientConfig;
use moviebites_model::{LoginRequest, SOCIAL_ID_KEY, UDID_KEY, UserClaim};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    server: MockServer,
    store: Arc<MemoryIdentityStore>,
    session: Session,
}

async fn fixture(store: MemoryIdentityStore) -> Fixture {
    let server = MockServer::start().await;
    let store = Arc::new(store);
    let client =
        ApiClient::new(&ClientConfig::new(server.uri()), store.clone())
            .unwrap();
    let session = Session::from_client(&client);
    Fixture {
        server,
        store,
        session,
    }
}

/// Reads work, every write fails.
#[derive(Debug, Default)]
struct ReadOnlyStore {
    inner: MemoryIdentityStore,
}

#[async_trait]
impl IdentityStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("read-only volume".into()))
    }

    async fn remove(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("read-only volume".into()))
    }
}

fn claim() -> UserClaim {
    UserClaim {
        email: Some("viewer@example.com".into()),
        name: Some("Viewer".into()),
        ..Default::default()
    }
}

async fn mount_upsert(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/users/mobile/upsert"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn upsert_persists_and_adopts_social_id() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    mount_upsert(
        &fx.server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "social_id": "abc123", "name": "Viewer" })),
    )
    .await;

    let response = fx.session.upsert(&claim()).await.unwrap();

    assert_eq!(response, json!({ "social_id": "abc123", "name": "Viewer" }));
    assert_eq!(fx.store.get(SOCIAL_ID_KEY).await.unwrap().as_deref(), Some("abc123"));
    assert_eq!(fx.session.social_id().as_deref(), Some("abc123"));
    assert!(fx.session.snapshot().is_authenticated());
}

#[tokio::test]
async fn login_reads_nested_identifier() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "id": "row-1", "social_id": "abc123" } })),
        )
        .mount(&fx.server)
        .await;

    let credentials = LoginRequest {
        email: Some("viewer@example.com".into()),
        password: Some("hunter2".into()),
        social_id: None,
    };
    fx.session.login(&credentials).await.unwrap();

    assert_eq!(fx.store.peek(SOCIAL_ID_KEY).as_deref(), Some("abc123"));
    assert_eq!(fx.session.social_id().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn upsert_body_carries_udid_and_user_type() {
    let fx = fixture(MemoryIdentityStore::with_entries([(UDID_KEY, "udid_1_42")])).await;
    Mock::given(method("POST"))
        .and(path("/users/mobile/upsert"))
        .and(body_partial_json(json!({
            "email": "viewer@example.com",
            "udid": "udid_1_42",
            "user_type": "mobile"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9 })))
        .expect(1)
        .mount(&fx.server)
        .await;

    fx.session.upsert(&claim()).await.unwrap();

    assert_eq!(fx.session.social_id().as_deref(), Some("9"));
}

#[tokio::test]
async fn repeated_upsert_is_idempotent() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    mount_upsert(
        &fx.server,
        ResponseTemplate::new(200).set_body_json(json!({ "social_id": "abc123" })),
    )
    .await;

    fx.session.upsert(&claim()).await.unwrap();
    let after_first = (fx.store.peek(SOCIAL_ID_KEY), fx.store.peek(UDID_KEY), fx.session.snapshot());
    fx.session.upsert(&claim()).await.unwrap();
    let after_second = (fx.store.peek(SOCIAL_ID_KEY), fx.store.peek(UDID_KEY), fx.session.snapshot());

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn failed_upsert_propagates_error_and_keeps_identity() {
    let fx = fixture(MemoryIdentityStore::with_entries([(SOCIAL_ID_KEY, "u0")])).await;
    fx.session.load_from_storage().await.unwrap();
    mount_upsert(
        &fx.server,
        ResponseTemplate::new(422).set_body_json(json!({ "error": "bad input" })),
    )
    .await;

    let err = fx.session.upsert(&claim()).await.unwrap_err();

    assert_eq!(err.to_value(), json!({ "error": "bad input" }));
    assert_eq!(err.origin(), ErrorOrigin::Server { status: 422 });
    assert_eq!(fx.session.social_id().as_deref(), Some("u0"));
    assert_eq!(fx.store.peek(SOCIAL_ID_KEY).as_deref(), Some("u0"));
    assert!(!fx.session.is_busy());
}

#[tokio::test]
async fn response_without_identifier_leaves_identity_untouched() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    mount_upsert(&fx.server, ResponseTemplate::new(200).set_body_json(json!({ "ok": true }))).await;

    let response = fx.session.upsert(&claim()).await.unwrap();

    assert_eq!(response, json!({ "ok": true }));
    assert_eq!(fx.session.social_id(), None);
    assert_eq!(fx.store.peek(SOCIAL_ID_KEY), None);
}

#[tokio::test]
async fn busy_flag_spans_a_successful_call() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    mount_upsert(
        &fx.server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "social_id": "abc123" }))
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    assert!(!fx.session.is_busy());
    let claim = claim();
    let (result, busy_during) = tokio::join!(fx.session.upsert(&claim), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        fx.session.is_busy()
    });

    result.unwrap();
    assert!(busy_during);
    assert!(!fx.session.is_busy());
}

#[tokio::test]
async fn busy_flag_spans_a_failed_call() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "down" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&fx.server)
        .await;

    let credentials = LoginRequest::default();
    let (result, busy_during) = tokio::join!(fx.session.login(&credentials), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        fx.session.is_busy()
    });

    assert_eq!(result.unwrap_err().message(), "down");
    assert!(busy_during);
    assert!(!fx.session.is_busy());
}

#[tokio::test]
async fn abandoned_call_releases_busy_flag() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    mount_upsert(
        &fx.server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "social_id": "late" }))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let outcome = tokio::time::timeout(Duration::from_millis(100), fx.session.upsert(&claim())).await;

    assert!(outcome.is_err(), "call should have been abandoned");
    assert!(!fx.session.is_busy());
    assert_eq!(fx.session.social_id(), None);
}

#[tokio::test]
async fn overlapping_calls_stay_busy_until_the_last_finishes() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/users/mobile/upsert"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "social_id": "fast" }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "social_id": "slow" }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&fx.server)
        .await;

    let claim = claim();
    let credentials = LoginRequest::default();
    let (fast, slow, busy_between) = tokio::join!(
        fx.session.upsert(&claim),
        fx.session.login(&credentials),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            fx.session.is_busy()
        }
    );

    fast.unwrap();
    slow.unwrap();
    assert!(busy_between);
    assert!(!fx.session.is_busy());
    assert_eq!(fx.session.social_id().as_deref(), Some("slow"));
}

#[tokio::test]
async fn logout_clears_identity_but_keeps_device_id() {
    let fx = fixture(MemoryIdentityStore::with_entries([
        (SOCIAL_ID_KEY, "u1"),
        (UDID_KEY, "udid_3_3"),
    ]))
    .await;
    assert_eq!(fx.session.load_from_storage().await.unwrap().as_deref(), Some("u1"));

    let mut changes = fx.session.subscribe();
    fx.session.logout().await.unwrap();

    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow_and_update().social_id, None);
    assert_eq!(fx.session.social_id(), None);
    assert_eq!(fx.store.peek(SOCIAL_ID_KEY), None);
    assert_eq!(fx.store.peek(UDID_KEY).as_deref(), Some("udid_3_3"));
}

#[tokio::test]
async fn load_from_empty_storage_stays_anonymous() {
    let fx = fixture(MemoryIdentityStore::new()).await;
    assert_eq!(fx.session.load_from_storage().await.unwrap(), None);
    assert!(!fx.session.snapshot().is_authenticated());
}

#[tokio::test]
async fn store_write_failure_surfaces_as_storage_error() {
    let server = MockServer::start().await;
    mount_upsert(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "social_id": "abc123" })),
    )
    .await;
    let client = ApiClient::new(
        &ClientConfig::new(server.uri()),
        Arc::new(ReadOnlyStore::default()),
    )
    .unwrap();
    let session = Session::from_client(&client);

    let err = session.upsert(&claim()).await.unwrap_err();

    assert_eq!(err.origin(), ErrorOrigin::Storage);
    assert!(err.message().contains("read-only volume"));
    assert_eq!(session.social_id(), None);
    assert!(!session.is_busy());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let identity: Vec<_> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == UDID_KEY || k == SOCIAL_ID_KEY)
        .map(|(k, _)| k.into_owned())
        .collect();
    assert_eq!(identity, vec![UDID_KEY.to_string()]);
}

#[tokio::test]
async fn logout_failure_keeps_identity() {
    let server = MockServer::start().await;
    let client = ApiClient::new(
        &ClientConfig::new(server.uri()),
        Arc::new(ReadOnlyStore::default()),
    )
    .unwrap();
    let session = Session::from_client(&client);
    session.set_social_id(Some("u1".into()));

    assert!(session.logout().await.is_err());
    assert_eq!(session.social_id().as_deref(), Some("u1"));
}
