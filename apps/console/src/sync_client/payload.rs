//! Multipart body for `POST /portfolio/manual-update`.
//!
//! Built as a plain list of parts first so the exact wire contents can be
//! inspected before they are handed to reqwest.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::editor::EditSession;
use crate::errors::SyncError;

/// Scalar text parts, sent verbatim.
pub const SCALAR_FIELDS: &[&str] = &["fullName", "bio", "aboutMe", "email"];
/// Object and array text parts, sent as JSON text.
pub const JSON_FIELDS: &[&str] = &["socials", "experience", "projects", "skills", "education"];

#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    Binary {
        file_name: String,
        content_type: String,
        bytes: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayloadPart {
    pub name: String,
    pub body: PartBody,
}

#[derive(Debug, Clone, Default)]
pub struct ManualUpdatePayload {
    parts: Vec<PayloadPart>,
}

impl ManualUpdatePayload {
    /// Text parts from the session's persisted fields, then one binary part per pending asset.
    pub fn from_session(session: &EditSession) -> Result<Self, SyncError> {
        let document = session.document();
        let profile = &document.profile;
        let mut payload = Self::default();

        payload.text("fullName", profile.full_name.clone());
        payload.text("bio", profile.bio.clone());
        payload.text("aboutMe", profile.about_me.clone());
        payload.text("email", profile.email.clone());
        payload.json("socials", &profile.socials)?;
        payload.json("experience", &document.experience)?;
        payload.json("projects", &document.projects)?;
        payload.json("skills", &document.skills)?;
        payload.json("education", &document.education)?;

        for (name, asset) in session.pending_assets() {
            payload.parts.push(PayloadPart {
                name,
                body: PartBody::Binary {
                    file_name: asset.file_name().to_string(),
                    content_type: asset.content_type().to_string(),
                    bytes: asset.bytes().clone(),
                },
            });
        }

        Ok(payload)
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn part(&self, name: &str) -> Option<&PayloadPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn binary_part_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|p| matches!(p.body, PartBody::Binary { .. }))
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn into_form(self) -> Result<Form, SyncError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::Binary {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let file = Part::bytes(bytes.to_vec())
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }

    fn text(&mut self, name: &str, value: String) {
        self.parts.push(PayloadPart {
            name: name.to_string(),
            body: PartBody::Text(value),
        });
    }

    fn json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), SyncError> {
        let encoded = serde_json::to_string(value)?;
        self.text(name, encoded);
        Ok(())
    }
}
