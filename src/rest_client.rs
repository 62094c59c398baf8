//! Authenticated HTTP plumbing shared by every Platform API resource.

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::ordered_values::OrderedValues;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Client, Method, Request, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, trace, Level};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type sent with raw byte payloads.
pub const CONTENT_TYPE_BINARY: &str = "binary/octet-stream";

/// Version probe endpoint.
pub const VERSION_PATH: &str = "/platform/latest";

/// Oldest Platform API major version this client accepts (OneFS 8.0).
pub const MIN_API_VERSION: u8 = 3;

/// Major version assumed when the appliance does not report one.
const FALLBACK_API_VERSION: u8 = 2;

/// Request body.
pub enum Payload {
    Empty,
    /// Pre-encoded JSON, sent as `application/json` unless overridden.
    Json(Vec<u8>),
    /// Raw bytes or a byte stream, sent as `binary/octet-stream` unless overridden.
    Stream(Body),
}

impl Payload {
    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_vec(value)?))
    }

    /// Raw bytes or a byte stream.
    pub fn stream(body: impl Into<Body>) -> Self {
        Payload::Stream(body.into())
    }

    fn default_content_type(&self) -> Option<&'static str> {
        match self {
            Payload::Empty => None,
            Payload::Json(_) => Some(CONTENT_TYPE_JSON),
            Payload::Stream(_) => Some(CONTENT_TYPE_BINARY),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::Json(b) => write!(f, "Json({})", String::from_utf8_lossy(b)),
            Payload::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    latest: Option<String>,
}

/// Platform API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RestClient {
    hostname: String,
    username: String,
    password: String,
    group: Option<String>,
    volumes_path: String,
    debug: bool,
    api_version: u8,
    api_minor_version: u8,
    client: Client,
}

impl RestClient {
    /// Build a client and probe the appliance's Platform API version.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let mut client = Self::without_probe(config)?;

        let latest = match client
            .get::<VersionResponse>(VERSION_PATH, "", None, &[])
            .await
        {
            Ok(resp) => resp.and_then(|r| r.latest),
            Err(Error::Serialization(err)) => {
                debug!(error = %err, "undecodable version response");
                None
            }
            Err(err) => return Err(err),
        };

        let (major, minor) = match latest {
            Some(v) => parse_api_version(&v)?,
            None => (FALLBACK_API_VERSION, 0),
        };
        client.api_version = major;
        client.api_minor_version = minor;

        if major < MIN_API_VERSION {
            return Err(Error::UnsupportedVersion { major, minor });
        }

        debug!(endpoint = %client.hostname, major, minor, "connected to platform API");
        Ok(client)
    }

    /// Build a client without contacting the appliance.
    ///
    /// The API version accessors report 0 until a probe has run.
    pub fn without_probe(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.options.timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(timeout);
        }
        if config.options.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            volumes_path: config.volumes_path().to_string(),
            hostname: config.endpoint,
            username: config.username,
            password: config.password,
            group: config.group.filter(|g| !g.is_empty()),
            debug: config.options.debug,
            api_version: 0,
            api_minor_version: 0,
            client,
        })
    }

    /// Appliance URL the client talks to.
    pub fn endpoint(&self) -> &str {
        &self.hostname
    }

    /// Major Platform API version reported by the appliance.
    pub fn api_version(&self) -> u8 {
        self.api_version
    }

    /// Minor Platform API version reported by the appliance.
    pub fn api_minor_version(&self) -> u8 {
        self.api_minor_version
    }

    /// User name the client authenticates as.
    pub fn user(&self) -> &str {
        &self.username
    }

    /// Group given ownership of new volumes, if configured.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Directory on the appliance that holds the volumes.
    pub fn volumes_path(&self) -> &str {
        &self.volumes_path
    }

    /// Absolute appliance path of the volume called `name`.
    pub fn volume_path(&self, name: &str) -> String {
        join_path(&self.volumes_path, name)
    }

    /// Send a GET request and decode the response.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
    ) -> Result<Option<R>> {
        self.do_with_headers(Method::GET, path, id, params, headers, Payload::Empty)
            .await
    }

    /// Send a POST request and decode the response.
    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<Option<R>> {
        self.do_with_headers(Method::POST, path, id, params, headers, body)
            .await
    }

    /// Send a PUT request and decode the response.
    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<Option<R>> {
        self.do_with_headers(Method::PUT, path, id, params, headers, body)
            .await
    }

    /// Send a DELETE request and decode the response.
    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
    ) -> Result<Option<R>> {
        self.do_with_headers(Method::DELETE, path, id, params, headers, Payload::Empty)
            .await
    }

    /// Send a request without extra headers.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        body: Payload,
    ) -> Result<Option<R>> {
        self.do_with_headers(method, path, id, params, &[], body)
            .await
    }

    /// Send a request and decode a 2xx JSON body.
    ///
    /// An empty 2xx body yields `Ok(None)`.
    pub async fn do_with_headers<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<Option<R>> {
        let bytes = self
            .execute(method, path, id, params, headers, body)
            .await?;
        decode_body(&bytes)
    }

    /// Send a request and return the raw 2xx body.
    ///
    /// Non-2xx responses are turned into [`Error::Api`].
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        id: &str,
        params: Option<&OrderedValues>,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<Bytes> {
        let url = build_url(&self.hostname, path, id, params)?;
        let json_body = matches!(body, Payload::Json(_));
        let request = self.build_request(method, url, headers, body)?;

        let dump = tracing::enabled!(Level::DEBUG).then(|| self.dump_request(&request, json_body));
        if let Some(dump) = &dump {
            debug!("{dump}");
        }

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, request = dump.as_deref().unwrap_or_default(), "request failed");
                return Err(err.into());
            }
        };

        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if dump.is_some() {
            debug!("{}", self.dump_response(status, &response_headers, &bytes));
        }

        if status.is_success() {
            Ok(bytes)
        } else {
            trace!(%status, "platform API returned an error");
            Err(ApiError::from_body(status, &bytes).into())
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
        body: Payload,
    ) -> Result<Request> {
        let content_type_override = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
            .map(|(_, v)| *v);

        let mut header_map = HeaderMap::new();
        if let Some(content_type) = content_type_override.or(body.default_content_type()) {
            header_map.insert(CONTENT_TYPE, header_value(content_type)?);
        }
        for (name, value) in headers {
            if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Configuration(format!("invalid header name {name:?}: {e}")))?;
            header_map.append(name, header_value(value)?);
        }

        let mut builder = self
            .client
            .request(method, url)
            .headers(header_map)
            .basic_auth(&self.username, Some(&self.password));
        builder = match body {
            Payload::Empty => builder,
            Payload::Json(bytes) => builder.body(bytes),
            Payload::Stream(stream) => builder.body(stream),
        };

        Ok(builder.build()?)
    }

    /// Request line and headers; the body only for JSON payloads with `debug` on.
    fn dump_request(&self, request: &Request, json_body: bool) -> String {
        let mut out = format!("{} {} HTTP/1.1", request.method(), request.url());
        for (name, value) in request.headers() {
            let _ = write!(out, "\n{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        if self.debug && json_body {
            if let Some(bytes) = request.body().and_then(|b| b.as_bytes()) {
                let _ = write!(out, "\n\n{}", String::from_utf8_lossy(bytes));
            }
        }
        out
    }

    fn dump_response(&self, status: reqwest::StatusCode, headers: &HeaderMap, body: &[u8]) -> String {
        let mut out = format!("HTTP/1.1 {status}");
        for (name, value) in headers {
            let _ = write!(out, "\n{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        if self.debug && !body.is_empty() {
            let _ = write!(out, "\n\n{}", String::from_utf8_lossy(body));
        }
        out
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Configuration(format!("invalid header value {value:?}: {e}")))
}

/// Decode a 2xx body; `None` when the body is empty or only whitespace.
pub fn decode_body<R: DeserializeOwned>(body: &[u8]) -> Result<Option<R>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// Assemble `hostname/path/id?params`.
///
/// Exactly one slash separates hostname, path and id no matter how the inputs
/// are slashed. A non-empty path always ends with a slash.
pub fn build_url(
    hostname: &str,
    path: &str,
    id: &str,
    params: Option<&OrderedValues>,
) -> Result<Url> {
    let mut url = hostname.trim_end_matches('/').to_string();
    let path = path.trim_matches('/');
    let id = id.trim_start_matches('/');

    if !path.is_empty() || !id.is_empty() {
        url.push('/');
    }
    if !path.is_empty() {
        url.push_str(path);
        url.push('/');
    }
    url.push_str(id);

    if let Some(params) = params.filter(|p| !p.is_empty()) {
        url.push('?');
        params.encode_to(&mut url);
    }

    Ok(Url::parse(&url)?)
}

/// Join two appliance paths with a single slash.
pub(crate) fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_matches('/');
    if name.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Parse a `"M"` or `"M.m"` version string.
fn parse_api_version(version: &str) -> Result<(u8, u8)> {
    let invalid = |_| Error::InvalidResponse(format!("unparseable API version {version:?}"));
    let (major, minor) = match version.split_once('.') {
        Some((major, minor)) => (major, minor.parse::<u8>().map_err(invalid)?),
        None => (version, 0),
    };
    Ok((major.parse::<u8>().map_err(invalid)?, minor))
}
