use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use moviebites_config::ClientConfig;
use moviebites_model::{Identity, SOCIAL_ID_KEY, UDID_KEY};
use reqwest::{
    Client, Method, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ApiError, ApiResult, ClientBuildError};
use crate::identity::{self, IdentityStore};

/// Header carrying the mobile API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A request before (or after) identity and API key injection.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP verb.
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL.
    pub path: String,
    /// Extra headers; `X-API-KEY` is added by [`ApiClient::prepare`].
    pub headers: HeaderMap,
    /// Query params. Identity params are owned by the pipeline.
    pub params: BTreeMap<String, String>,
    /// JSON body, sent as-is.
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Descriptor with no params, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            params: BTreeMap::new(),
            body: None,
        }
    }

    /// `GET` descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT` descriptor.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE` descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add or replace one query param.
    pub fn param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge the fields of a serializable struct into the query params.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> ApiResult<Self> {
        self.params.extend(query_params(query)?);
        Ok(self)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::encode(err.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// The identity this descriptor is tagged with, if any.
    pub fn identity(&self) -> Option<Identity> {
        if let Some(social_id) = self.params.get(SOCIAL_ID_KEY) {
            return Some(Identity::Authenticated {
                social_id: social_id.clone(),
            });
        }
        self.params.get(UDID_KEY).map(|udid| Identity::Anonymous {
            udid: udid.clone(),
        })
    }
}

/// Flatten a serializable struct into string query params.
///
/// Strings are taken verbatim, numbers and booleans are rendered, `null`
/// fields are dropped and nested values are sent as JSON text.
pub fn query_params<T: Serialize + ?Sized>(
    query: &T,
) -> ApiResult<BTreeMap<String, String>> {
    let value = serde_json::to_value(query)
        .map_err(|err| ApiError::encode(err.to_string()))?;
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            return Err(ApiError::encode(format!(
                "query parameters must serialize to an object, got {}",
                other
            )));
        }
    };

    Ok(fields
        .into_iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            Some((key, rendered))
        })
        .collect())
}

/// Identity-aware API client.
///
/// Every request goes through [`ApiClient::prepare`], which attaches the API
/// key and exactly one identity query parameter, and every response through
/// a single normalization step: successes yield the JSON payload, failures
/// an [`ApiError`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<HeaderValue>,
    store: Arc<dyn IdentityStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("store", &self.store)
            .finish()
    }
}

impl ApiClient {
    /// Create a client from configuration and a shared identity store.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn IdentityStore>,
    ) -> Result<Self, ClientBuildError> {
        let mut default_headers = HeaderMap::new();
        default_headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()?;

        let api_key = match config.api_key.as_deref() {
            Some(key) => {
                let mut value = HeaderValue::from_str(key)?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        let base_url = config.base_url.trim_end_matches('/').to_string();
        log::info!(
            "[ApiClient] Creating API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            api_key,
            store,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The identity store shared with sessions built on this client.
    pub fn store(&self) -> Arc<dyn IdentityStore> {
        Arc::clone(&self.store)
    }

    /// Build an absolute URL for an API path
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    /// Resolve the identity for one request.
    ///
    /// Store failures never block a request: the failure is logged and a
    /// throwaway device identifier is used instead.
    pub async fn resolve_identity(&self) -> Identity {
        match identity::ensure_identity(self.store.as_ref()).await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(
                    "[ApiClient] Identity store failed ({}); sending an unsaved device id",
                    err
                );
                Identity::Anonymous {
                    udid: identity::generate_udid(),
                }
            }
        }
    }

    /// Attach the API key and the resolved identity.
    ///
    /// Caller-supplied `social_id`/`udid` params are replaced so the result
    /// always carries exactly one of them. Method, path and body are left
    /// untouched.
    pub async fn prepare(
        &self,
        mut request: RequestDescriptor,
    ) -> RequestDescriptor {
        if let Some(key) = &self.api_key {
            request
                .headers
                .insert(HeaderName::from_static(API_KEY_HEADER), key.clone());
        }

        let identity = self.resolve_identity().await;
        request.params.remove(SOCIAL_ID_KEY);
        request.params.remove(UDID_KEY);
        let (name, value) = identity.query_pair();
        request.params.insert(name.to_string(), value.to_string());

        request
    }

    /// Prepare, send and normalize a request.
    pub async fn send(&self, request: RequestDescriptor) -> ApiResult<Value> {
        let request = self.prepare(request).await;
        let url = self.build_url(&request.path);

        debug!(
            "[ApiClient] {} {} params={:?} body={:?}",
            request.method, url, request.params, request.body
        );

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers)
            .query(&request.params);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let (status, result) = match builder.send().await {
            Ok(response) => {
                let status = Some(response.status().as_u16());
                (status, Self::normalize_response(response).await)
            }
            Err(err) => (None, Err(ApiError::transport(err.to_string()))),
        };

        if let Err(normalized) = &result {
            error!(
                "[ApiClient] API error: status={:?} method={} url={} normalized={}",
                status,
                request.method,
                url,
                normalized.to_value()
            );
        }
        result
    }

    /// Send a request and deserialize the payload.
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> ApiResult<T> {
        let payload = self.send(request).await?;
        serde_json::from_value(payload)
            .map_err(|err| ApiError::decode(err.to_string()))
    }

    async fn normalize_response(response: Response) -> ApiResult<Value> {
        let status = response.status();
        let raw = match response.bytes().await {
            Ok(raw) => raw,
            Err(err) if status.is_success() => {
                return Err(ApiError::transport(err.to_string()));
            }
            Err(err) => {
                debug!("[ApiClient] Failed to read error body: {}", err);
                Default::default()
            }
        };

        if status.is_success() {
            Ok(payload_from_bytes(&raw))
        } else {
            Err(ApiError::from_server_body(status, &raw))
        }
    }

    /// GET request with query params
    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<Value> {
        self.send(RequestDescriptor::get(path).query(query)?).await
    }

    /// GET request without extra params
    pub async fn get_path(&self, path: &str) -> ApiResult<Value> {
        self.send(RequestDescriptor::get(path)).await
    }

    /// POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Value> {
        self.send(RequestDescriptor::post(path).json(body)?).await
    }

    /// PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Value> {
        self.send(RequestDescriptor::put(path).json(body)?).await
    }

    /// DELETE request
    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// DELETE request with a JSON body
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Value> {
        self.send(RequestDescriptor::delete(path).json(body)?).await
    }
}

/// Successful bodies: empty is `null`, JSON is parsed, anything else is
/// returned as text.
fn payload_from_bytes(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(raw).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(raw).into_owned())
    })
}
