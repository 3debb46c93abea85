//! Internal trait abstracting the qBittorrent WebUI transport.
//!
//! This module provides the [`WebApiOps`] trait which abstracts the login exchange and the
//! single request each operation sends, enabling mocking in tests. [`HttpWebApi`] is the
//! `reqwest` implementation.

use std::{fmt, time::Duration};

use qbit_mcp_types::QbitError;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, COOKIE},
    multipart::{Form, Part},
};
use tracing::{debug, warn};
use url::Url;

/// WebUI API paths.
pub(crate) mod endpoint {
    pub(crate) const LOGIN: &str = "/api/v2/auth/login";
    pub(crate) const TORRENTS_ADD: &str = "/api/v2/torrents/add";
    pub(crate) const TORRENTS_DELETE: &str = "/api/v2/torrents/delete";
    pub(crate) const TORRENTS_STOP: &str = "/api/v2/torrents/stop";
    pub(crate) const TORRENTS_START: &str = "/api/v2/torrents/start";
    pub(crate) const TORRENTS_TRACKERS: &str = "/api/v2/torrents/trackers";
    pub(crate) const TRANSFER_DOWNLOAD_LIMIT: &str = "/api/v2/transfer/setDownloadLimit";
    pub(crate) const TRANSFER_UPLOAD_LIMIT: &str = "/api/v2/transfer/setUploadLimit";
    pub(crate) const APP_VERSION: &str = "/api/v2/app/version";
    pub(crate) const TORRENTS_FILE_PRIO: &str = "/api/v2/torrents/filePrio";
    pub(crate) const TORRENTS_DOWNLOAD_LIMIT: &str = "/api/v2/torrents/setDownloadLimit";
    pub(crate) const TORRENTS_UPLOAD_LIMIT: &str = "/api/v2/torrents/setUploadLimit";
    pub(crate) const TORRENTS_ADD_TRACKERS: &str = "/api/v2/torrents/addTrackers";
    pub(crate) const TORRENTS_ADD_TAGS: &str = "/api/v2/torrents/addTags";
    pub(crate) const TORRENTS_INFO: &str = "/api/v2/torrents/info";
}

/// Multipart field the WebUI reads uploaded torrents from.
const TORRENT_FIELD: &str = "torrents";
const TORRENT_MIME: &str = "application/x-bittorrent";

/// Cookie credential returned by a successful login. Lives for one operation.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Session {
    cookie: String,
}

impl Session {
    pub(crate) fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
        }
    }

    /// Value for the `Cookie` request header.
    pub(crate) fn cookie_header(&self) -> &str {
        &self.cookie
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the SID.
        f.write_str("Session(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
}

/// A `.torrent` file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TorrentUpload {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Body {
    Empty,
    Query(Vec<(&'static str, String)>),
    Form(Vec<(&'static str, String)>),
    Multipart(TorrentUpload),
}

/// The one request an operation sends after logging in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: &'static str,
    pub(crate) body: Body,
}

impl ApiRequest {
    pub(crate) fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            body: Body::Empty,
        }
    }

    pub(crate) fn query(path: &'static str, fields: Vec<(&'static str, String)>) -> Self {
        Self {
            method: Method::Get,
            path,
            body: Body::Query(fields),
        }
    }

    pub(crate) fn form(path: &'static str, fields: Vec<(&'static str, String)>) -> Self {
        Self {
            method: Method::Post,
            path,
            body: Body::Form(fields),
        }
    }

    pub(crate) fn upload(path: &'static str, upload: TorrentUpload) -> Self {
        Self {
            method: Method::Post,
            path,
            body: Body::Multipart(upload),
        }
    }

    /// Value of a form or query field, for assertions in tests.
    #[cfg(test)]
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        match &self.body {
            Body::Query(fields) | Body::Form(fields) => fields
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str()),
            Body::Empty | Body::Multipart(_) => None,
        }
    }
}

/// Status and body of a WebUI response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Internal trait that abstracts the WebUI transport.
/// This allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub(crate) trait WebApiOps {
    /// Log in. Any failure, including transport errors, yields `None`.
    async fn login(&self, username: &str, password: &str) -> Option<Session>;
    /// Send one authenticated request. Non-200 statuses are returned, not raised.
    async fn send(&self, session: &Session, request: ApiRequest)
    -> Result<ApiResponse, QbitError>;
}

/// `reqwest` transport for a qBittorrent WebUI.
///
/// The underlying connection pool is shared by every call made through this value; sessions
/// are not.
pub struct HttpWebApi {
    http: Client,
    base: String,
}

impl fmt::Debug for HttpWebApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpWebApi")
            .field("base", &self.base)
            .finish()
    }
}

impl HttpWebApi {
    /// Create a transport for the WebUI at `host`, e.g. `http://127.0.0.1:8080`.
    /// Every request is bounded by `timeout`.
    pub fn try_new(host: &str, timeout: Duration) -> Result<Self, QbitError> {
        let url = Url::parse(host)
            .map_err(|e| QbitError::Config(format!("Invalid WebUI URL {host}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(QbitError::Config(format!(
                "Unsupported WebUI URL scheme: {}",
                url.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QbitError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl WebApiOps for HttpWebApi {
    async fn login(&self, username: &str, password: &str) -> Option<Session> {
        debug!("Logging in to qBittorrent WebUI at {} as {}", self.base, username);
        let response = match self
            .http
            .post(self.url(endpoint::LOGIN))
            .header(ACCEPT, "*/*")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Login request failed: {e}");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!("Login rejected with status {}", response.status());
            return None;
        }

        let cookie = response
            .cookies()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; ");
        if cookie.is_empty() {
            // qBittorrent answers bad credentials with 200 "Fails." and no cookie.
            warn!("Login answered without a session cookie");
            return None;
        }

        debug!("Logged in");
        Some(Session::new(cookie))
    }

    async fn send(
        &self,
        session: &Session,
        request: ApiRequest,
    ) -> Result<ApiResponse, QbitError> {
        let url = self.url(request.path);
        let builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        }
        .header(ACCEPT, "*/*")
        .header(COOKIE, session.cookie_header());

        let builder = match request.body {
            Body::Empty => builder,
            Body::Query(fields) => builder.query(&fields),
            Body::Form(fields) => builder.form(&fields),
            Body::Multipart(upload) => {
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(TORRENT_MIME)
                    .map_err(|e| QbitError::Network(e.to_string()))?;
                builder.multipart(Form::new().part(TORRENT_FIELD, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| QbitError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| QbitError::Network(e.to_string()))?;

        debug!("{} answered {status}", request.path);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_hides_cookie() {
        let session = Session::new("SID=secret");
        assert_eq!(format!("{session:?}"), "Session(<redacted>)");
        assert_eq!(session.cookie_header(), "SID=secret");
    }

    #[test]
    fn base_url_is_normalised() {
        let api = HttpWebApi::try_new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url(endpoint::LOGIN), "http://127.0.0.1:8080/api/v2/auth/login");
    }

    #[test]
    fn base_url_keeps_reverse_proxy_prefix() {
        let api =
            HttpWebApi::try_new("https://nas.local/qbittorrent", Duration::from_secs(1)).unwrap();
        assert_eq!(
            api.url(endpoint::APP_VERSION),
            "https://nas.local/qbittorrent/api/v2/app/version"
        );
    }

    #[test]
    fn invalid_urls_are_rejected() {
        assert!(matches!(
            HttpWebApi::try_new("not a url", Duration::from_secs(1)),
            Err(QbitError::Config(_))
        ));
        assert!(matches!(
            HttpWebApi::try_new("ftp://127.0.0.1", Duration::from_secs(1)),
            Err(QbitError::Config(_))
        ));
    }

    #[test]
    fn request_fields() {
        let request = ApiRequest::form(endpoint::TORRENTS_STOP, vec![("hashes", "abc".into())]);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.field("hashes"), Some("abc"));
        assert_eq!(request.field("missing"), None);
        assert_eq!(ApiRequest::get(endpoint::APP_VERSION).field("hashes"), None);
    }
}
