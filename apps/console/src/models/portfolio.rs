use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys the browser editor parked on entries for unsent uploads. Never sent back.
const LOCAL_ONLY_FIELDS: &[&str] = &["tempFile", "preview"];

/// Top-level keys that identify a portfolio document.
const DOCUMENT_FIELDS: &[&str] = &[
    "fullName",
    "bio",
    "aboutMe",
    "email",
    "resumeUrl",
    "socials",
    "experience",
    "projects",
    "skills",
    "education",
];

/// Identity fields edited as a block in the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub bio: String,
    pub about_me: String,
    pub email: String,
    pub resume_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub socials: Socials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Socials {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub description: String,
    /// Persisted logo URL; empty until the backend has stored one.
    pub company_logo: String,
    /// Fields not modelled here, such as the backend's `_id`, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    pub github_link: String,
    pub live_link: String,
    pub cover_image: String,
    /// Fields not modelled here, such as the backend's `_id`, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A skill as stored by the backend.
///
/// Older documents carry bare strings in the `skills` array; those are
/// normalized here so nothing downstream has to branch on shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SkillEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSkill {
    Bare(String),
    Object {
        #[serde(default)]
        name: String,
        #[serde(default, rename = "iconUrl")]
        icon_url: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl<'de> Deserialize<'de> for SkillEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSkill::deserialize(deserializer)? {
            RawSkill::Bare(name) => SkillEntry::named(name),
            RawSkill::Object {
                name,
                icon_url,
                extra,
            } => SkillEntry {
                name,
                icon_url: icon_url.filter(|url| !url.is_empty()),
                extra,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub college: String,
    pub year: String,
    pub status: String,
    pub grade: String,
    /// Fields not modelled here, such as the backend's `_id`, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole editable portfolio as `GET /portfolio` returns it.
///
/// Missing collections default to empty so a partial document never leaves a
/// view iterating over nothing. `Default` doubles as the fetch-failure fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioDocument {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<SkillEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
}

impl PortfolioDocument {
    /// Empty-collections document substituted when a fetch fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Drops editor-only keys that a stored entry may still carry.
    pub fn without_local_fields(mut self) -> Self {
        let strip = |extra: &mut Map<String, Value>| {
            for key in LOCAL_ONLY_FIELDS {
                extra.remove(*key);
            }
        };
        self.experience.iter_mut().for_each(|e| strip(&mut e.extra));
        self.projects.iter_mut().for_each(|p| strip(&mut p.extra));
        self.skills.iter_mut().for_each(|s| strip(&mut s.extra));
        self.education.iter_mut().for_each(|e| strip(&mut e.extra));
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a resume sync: `{data: document}` or a bare document.
///
/// Unlike a plain fetch, an object with no portfolio fields is an error
/// rather than an empty document, so an acknowledgement or error body can
/// never be applied as a snapshot.
pub(crate) enum SnapshotEnvelope {
    Wrapped(PortfolioDocument),
    Bare(PortfolioDocument),
}

impl<'de> Deserialize<'de> for SnapshotEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Object(mut body) = Value::deserialize(deserializer)? else {
            return Err(D::Error::custom("snapshot is not a JSON object"));
        };
        match body.remove("data") {
            Some(Value::Object(data)) => document_from(data).map(SnapshotEnvelope::Wrapped),
            Some(_) => Err(D::Error::custom("snapshot `data` is not a portfolio document")),
            None => document_from(body).map(SnapshotEnvelope::Bare),
        }
    }
}

fn document_from<E>(fields: Map<String, Value>) -> Result<PortfolioDocument, E>
where
    E: serde::de::Error,
{
    if !DOCUMENT_FIELDS.iter().any(|f| fields.contains_key(*f)) {
        return Err(E::custom("snapshot has no portfolio fields"));
    }
    serde_json::from_value(Value::Object(fields)).map_err(E::custom)
}

impl SnapshotEnvelope {
    pub(crate) fn into_document(self) -> PortfolioDocument {
        match self {
            SnapshotEnvelope::Wrapped(document) | SnapshotEnvelope::Bare(document) => document,
        }
    }
}
