// Notehub HTTP client
//
// Wraps `reqwest::Client` with project-scoped URL construction and the
// status → error mapping. Endpoint groups (devices, events, node config)
// are implemented as inherent methods in their own files.

use reqwest::Response;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Scope};
use crate::transport::TransportConfig;

/// Async client for the Notehub HTTP API, bound to a single project.
pub struct NotehubClient {
    http: reqwest::Client,
    base_url: Url,
    project_uid: String,
}

impl NotehubClient {
    /// Create a client that authenticates with `token`.
    ///
    /// `base_url` is the API root, e.g. `https://api.notefile.net`.
    pub fn new(
        base_url: Url,
        project_uid: String,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        Ok(Self::with_client(http, base_url, project_uid))
    }

    /// Wrap a pre-built `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url, project_uid: String) -> Self {
        Self {
            http,
            base_url,
            project_uid,
        }
    }

    /// The project every request is scoped to.
    pub fn project_uid(&self) -> &str {
        &self.project_uid
    }

    /// The API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/v1/projects/{project}/{path}`
    pub(crate) fn project_url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!(
            "{}/v1/projects/{}/{path}",
            self.root(),
            self.project_uid
        ))?)
    }

    /// `{base}/v1/projects/{project}/devices/{device}{suffix}`
    pub(crate) fn device_url(&self, device_uid: &str, suffix: &str) -> Result<Url, Error> {
        self.project_url(&format!("devices/{device_uid}{suffix}"))
    }

    /// `{base}/req?project={project}&device={device}`
    pub(crate) fn request_url(&self, device_uid: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}/req", self.root()))?;
        url.query_pairs_mut()
            .append_pair("project", &self.project_uid)
            .append_pair("device", device_uid);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        scope: Scope<'_>,
    ) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp, scope).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        scope: Scope<'_>,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp, scope).await
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        scope: Scope<'_>,
    ) -> Result<(), Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::from_status(status, scope, resp.url().path()))
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        resp: Response,
        scope: Scope<'_>,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::from_status(status, scope, resp.url().path()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}
