//! Locally generated preview URLs for files that have not been uploaded yet.
//!
//! Every handle is registered on creation and revoked when dropped, so a
//! superseded selection or a finished edit session releases its previews.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::trace;
use uuid::Uuid;

const PREVIEW_SCHEME: &str = "preview://";

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> PreviewHandle {
        let url = format!("{PREVIEW_SCHEME}{}", Uuid::new_v4());
        if let Ok(mut live) = self.live.lock() {
            live.insert(url.clone());
        }
        trace!("Created preview {url}");
        PreviewHandle {
            url,
            registry: self.clone(),
        }
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().map(|l| l.contains(url)).unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn revoke(&self, url: &str) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(url);
        }
        trace!("Revoked preview {url}");
    }
}

/// Whether `url` was minted by a [`PreviewRegistry`] rather than the backend.
pub fn is_preview_url(url: &str) -> bool {
    url.starts_with(PREVIEW_SCHEME)
}

#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
