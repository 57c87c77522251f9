// ONTAP REST API HTTP client
//
// Wraps `reqwest::Client` with ONTAP-specific URL construction, status
// classification, error-envelope parsing, and `_links.next` pagination.
// The SAN endpoint modules (luns, igroups, lun-maps) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::time::Duration;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::TryStreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error envelope ───────────────────────────────────────────────────

/// ONTAP wraps failures as `{"error": {"message": "...", "code": "..."}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Request / response ───────────────────────────────────────────────

/// One API call: method, path relative to `/api`, ordered query pairs,
/// and an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Validation {
            field: "request body".into(),
            reason: e.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A classified 2xx response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    /// `_links.next.href`, when the server has more pages.
    pub next: Option<String>,
}

impl ApiResponse {
    pub fn into_records(self) -> Vec<Value> {
        match self.body {
            Value::Object(mut map) => match map.remove("records") {
                Some(Value::Array(records)) => records,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// The record a `return_records=true` POST created.
    ///
    /// Takes the first element of `records`, or the body itself when the
    /// server answers with a bare object. An empty response yields `{}` so
    /// the caller can complete it from the request it sent.
    pub fn into_created_record(self) -> Value {
        if self.body.get("records").is_some() {
            return self
                .into_records()
                .into_iter()
                .next()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        }
        match self.body {
            Value::Object(_) => self.body,
            _ => Value::Object(serde_json::Map::new()),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the ONTAP REST API.
///
/// All paths are relative to `<base>/api/`. Every request carries the
/// `Authorization` header derived from [`Credentials`].
pub struct OntapClient {
    http: reqwest::Client,
    base_url: Url,
    origin: Url,
    timeout: Option<Duration>,
}

impl OntapClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a host, resolved credentials, and transport config.
    ///
    /// `host` may be a bare address (`10.0.0.5`, `cluster1:8443`), which
    /// is reached over HTTPS, or a full `http(s)://` URL.
    pub fn new(
        host: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credentials.header_value()?);
        debug!(strategy = ?credentials.strategy(), "building ONTAP client");

        let http = transport.build_client(headers)?;
        let (base_url, origin) = Self::normalize_base_url(host)?;

        Ok(Self {
            http,
            base_url,
            origin,
            timeout: Some(transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(host: &str, http: reqwest::Client) -> Result<Self, Error> {
        let (base_url, origin) = Self::normalize_base_url(host)?;
        Ok(Self {
            http,
            base_url,
            origin,
            timeout: None,
        })
    }

    /// Build `<scheme>://<host>/api/` plus the bare origin used to resolve
    /// pagination links.
    fn normalize_base_url(raw: &str) -> Result<(Url, Url), Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Configuration {
                message: "no cluster host configured (set HOST)".into(),
            });
        }

        let with_scheme = if raw.contains("://") {
            raw.to_owned()
        } else {
            format!("https://{raw}")
        };
        let mut url = Url::parse(&with_scheme)?;
        url.set_query(None);
        url.set_fragment(None);

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        let mut origin = url.clone();
        origin.set_path("/");

        Ok((url, origin))
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an API path (e.g. `"/storage/luns"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Issue one request and classify the response. Never retries.
    pub async fn request(&self, req: ApiRequest) -> Result<ApiResponse, Error> {
        let url = self.url(&req.path)?;
        self.send(req.method, url, &req.query, req.body.as_ref())
            .await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        debug!("{method} {url} params={query:?}");

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<ApiResponse, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let raw = resp.text().await.map_err(|e| self.transport_error(e))?;
        let body = if raw.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&raw).map_err(|e| Error::parse(e.to_string(), &raw))?
        };

        let next = body
            .pointer("/_links/next/href")
            .and_then(Value::as_str)
            .filter(|href| !href.is_empty())
            .map(str::to_owned);

        Ok(ApiResponse { status, body, next })
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let (message, code) = match serde_json::from_str::<ErrorEnvelope>(&raw) {
            Ok(ErrorEnvelope {
                error: Some(ErrorBody { message, code }),
            }) => (message.unwrap_or_else(|| status.to_string()), code),
            _ if raw.trim().is_empty() => (status.to_string(), None),
            _ => (raw, None),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Error::NotFound { message },
            StatusCode::CONFLICT => Error::Conflict { message },
            _ => Error::Api {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Lazily stream every record of a collection, following
    /// `_links.next.href` until a page carries no link.
    ///
    /// The stream is finite and cannot be restarted; a failed page ends it
    /// after yielding the error.
    pub fn list_all<'a>(
        &'a self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> impl Stream<Item = Result<Value, Error>> + use<'a> {
        let first = self.url(path);

        try_stream! {
            let mut url = first?;
            let mut query = query;

            loop {
                let page = self.send(Method::GET, url.clone(), &query, None).await?;
                let next = page.next.clone();

                for record in page.into_records() {
                    yield record;
                }

                let Some(href) = next else { break };
                let next_url = self.origin.join(&href)?;
                if next_url == url && query.is_empty() {
                    warn!(%href, "pagination link points at the current page, stopping");
                    break;
                }

                trace!(%href, "following pagination link");
                url = next_url;
                // The link already carries the full query string.
                query.clear();
            }
        }
    }

    /// Collect every page of a collection and parse each record.
    pub(crate) async fn collect_records<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Vec<T>, Error> {
        let raw: Vec<Value> = self.list_all(path, query).try_collect().await?;
        raw.iter().map(parse_record::<T>).collect()
    }
}

/// Deserialize one JSON record into a typed wire struct.
pub(crate) fn parse_record<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|e| Error::parse(e.to_string(), &value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_host_gets_https_and_api_prefix() {
        let (base, origin) = OntapClient::normalize_base_url("10.0.0.5").unwrap();
        assert_eq!(base.as_str(), "https://10.0.0.5/api/");
        assert_eq!(origin.as_str(), "https://10.0.0.5/");
    }

    #[test]
    fn explicit_scheme_and_api_suffix_are_kept() {
        let (base, _) = OntapClient::normalize_base_url("http://127.0.0.1:8080/api/").unwrap();
        assert_eq!(base.as_str(), "http://127.0.0.1:8080/api/");

        let (base, _) = OntapClient::normalize_base_url("https://cluster1:8443").unwrap();
        assert_eq!(base.as_str(), "https://cluster1:8443/api/");
    }

    #[test]
    fn empty_host_is_configuration_error() {
        let err = OntapClient::normalize_base_url("  ").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }), "got {err:?}");
    }

    #[test]
    fn paths_join_under_api() {
        let client = OntapClient::with_client("cluster1", reqwest::Client::new()).unwrap();
        assert_eq!(
            client.url("/storage/luns").unwrap().as_str(),
            "https://cluster1/api/storage/luns"
        );
        assert_eq!(
            client
                .url("protocols/san/lun-maps?return_records=true")
                .unwrap()
                .as_str(),
            "https://cluster1/api/protocols/san/lun-maps?return_records=true"
        );
    }

    #[test]
    fn created_record_accepts_collection_and_bare_shapes() {
        let resp = ApiResponse {
            status: StatusCode::CREATED,
            body: json!({"num_records": 1, "records": [{"uuid": "u-1"}]}),
            next: None,
        };
        assert_eq!(resp.into_created_record()["uuid"], "u-1");

        let resp = ApiResponse {
            status: StatusCode::CREATED,
            body: json!({"uuid": "u-2"}),
            next: None,
        };
        assert_eq!(resp.into_created_record()["uuid"], "u-2");

        let resp = ApiResponse {
            status: StatusCode::CREATED,
            body: json!({"num_records": 0, "records": []}),
            next: None,
        };
        assert_eq!(resp.into_created_record(), json!({}));
    }
}
