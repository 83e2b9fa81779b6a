//! Sync Client: the single point of entry for every call to the portfolio backend.
//!
//! Login, reads, manual saves and resume syncs all go through here. Nothing is
//! retried: a failed call is reported once and the caller decides what the
//! operator sees.

use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::editor::asset::PendingAsset;
use crate::editor::EditSession;
use crate::errors::SyncError;
use crate::models::portfolio::SnapshotEnvelope;
use crate::models::PortfolioDocument;
use crate::session::{Credential, SessionContext};

pub mod payload;

use payload::ManualUpdatePayload;

const LOGIN_PATH: &str = "/auth/login";
const PORTFOLIO_PATH: &str = "/portfolio";
const MANUAL_UPDATE_PATH: &str = "/portfolio/manual-update";
const SYNC_PATH: &str = "/portfolio/sync";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Clone)]
pub struct SyncClient {
    http: Client,
    base_url: String,
    session: Arc<SessionContext>,
    sync_requires_auth: bool,
}

impl SyncClient {
    pub fn new(config: &Config, session: Arc<SessionContext>) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        if !config.uses_tls() {
            warn!(
                "Backend {} is not HTTPS; the admin password will travel unencrypted",
                config.api_url
            );
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            sync_requires_auth: config.sync_requires_auth,
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Exchanges the admin password for a bearer token and persists it.
    ///
    /// The password is sent as typed; hashing is the backend's concern. Any
    /// non-2xx answer, or a 2xx without a token, is `Unauthorized` and leaves
    /// the stored credential untouched.
    pub async fn login(&self, password: &str) -> Result<Credential, SyncError> {
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Login rejected with status {status}");
            return Err(SyncError::Unauthorized);
        }

        let body: LoginResponse = response.json().await?;
        let token = body.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            warn!("Login succeeded without a token in the response");
            SyncError::Unauthorized
        })?;

        Ok(self.session.establish(&token)?)
    }

    /// Clears the stored credential. No backend call is made.
    pub fn logout(&self) -> Result<(), SyncError> {
        Ok(self.session.end()?)
    }

    /// Unauthenticated read of the canonical document.
    pub async fn fetch_portfolio(&self) -> Result<PortfolioDocument, SyncError> {
        let response = self.http.get(self.url(PORTFOLIO_PATH)).send().await?;
        let response = ensure_success(response).await?;
        let document: PortfolioDocument = response.json().await?;
        debug!(
            "Fetched portfolio: {} experience, {} projects, {} skills, {} education",
            document.experience.len(),
            document.projects.len(),
            document.skills.len(),
            document.education.len()
        );
        Ok(document)
    }

    /// [`SyncClient::fetch_portfolio`], substituting the empty document on any failure
    /// so a view always has collections to render.
    pub async fn fetch_portfolio_or_empty(&self) -> PortfolioDocument {
        match self.fetch_portfolio().await {
            Ok(document) => document,
            Err(e) => {
                error!("Error fetching portfolio data: {e}");
                PortfolioDocument::empty()
            }
        }
    }

    /// Uploads every persisted field plus pending binaries.
    ///
    /// Callers re-fetch afterwards instead of trusting the echoed body, so
    /// server-assigned asset URLs replace local previews.
    pub async fn save_manual_update(&self, session: &EditSession) -> Result<(), SyncError> {
        let credential = self.require_credential()?;
        let payload = ManualUpdatePayload::from_session(session)?;
        let binaries = payload.binary_part_names().len();
        let form = payload.into_form()?;

        let response = self
            .authorized(self.http.post(self.url(MANUAL_UPDATE_PATH)), &credential)
            .multipart(form)
            .send()
            .await?;
        ensure_success(response).await?;

        info!("Manual update accepted ({binaries} binary parts)");
        Ok(())
    }

    /// Pushes a resume PDF to the ingestion endpoint and returns the refreshed document.
    ///
    /// The bearer credential is attached only when `sync_requires_auth` is set.
    /// A 2xx body that is not a portfolio document is `SyncError::Json`.
    pub async fn sync_resume(
        &self,
        resume: &PendingAsset,
    ) -> Result<PortfolioDocument, SyncError> {
        resume.ensure_resume()?;

        let part = reqwest::multipart::Part::bytes(resume.bytes().to_vec())
            .file_name(resume.file_name().to_string())
            .mime_str(resume.content_type())?;
        let form = reqwest::multipart::Form::new().part("resume", part);

        let mut request = self.http.post(self.url(SYNC_PATH));
        if self.sync_requires_auth {
            let credential = self.require_credential()?;
            request = self.authorized(request, &credential);
        }

        let response = request.multipart(form).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let envelope: SnapshotEnvelope = serde_json::from_str(&body).map_err(|e| {
            warn!("Resume sync answered without a usable snapshot: {e}");
            SyncError::from(e)
        })?;

        info!("Resume {} synced", resume.file_name());
        Ok(envelope.into_document())
    }

    fn require_credential(&self) -> Result<Credential, SyncError> {
        self.session.credential().ok_or_else(|| {
            warn!("No stored credential for an authenticated call");
            SyncError::Unauthorized
        })
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header(AUTHORIZATION, credential.bearer())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn ensure_success(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Backend returned {status}: {body}");
    Err(SyncError::from_status(status, body))
}
