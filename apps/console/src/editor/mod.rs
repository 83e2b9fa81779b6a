//! Edit session owned by the developer console between a load and a save.
//!
//! Transient data (selected files and their previews) lives in slots aligned
//! with each list, never inside the entries themselves, so a
//! [`PortfolioDocument`] built from the session carries only persisted fields.

pub mod asset;
pub mod preview;

use tracing::debug;

use crate::editor::asset::{AssetKind, PendingAsset};
use crate::models::{
    EducationEntry, ExperienceEntry, PortfolioDocument, Profile, ProjectEntry, SkillEntry,
};

/// A list plus one optional pending upload per element, kept the same length.
#[derive(Debug)]
struct Slotted<T> {
    entries: Vec<T>,
    pending: Vec<Option<PendingAsset>>,
}

impl<T> Slotted<T> {
    fn new(entries: Vec<T>) -> Self {
        let pending = entries.iter().map(|_| None).collect();
        Self { entries, pending }
    }

    fn push(&mut self, entry: T, asset: Option<PendingAsset>) -> usize {
        self.entries.push(entry);
        self.pending.push(asset);
        self.entries.len() - 1
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.entries.len() {
            return None;
        }
        // Dropping the slot revokes its preview.
        self.pending.remove(index);
        Some(self.entries.remove(index))
    }

    /// Replaces the pending asset at `index`. The superseded one is dropped.
    fn attach(&mut self, index: usize, asset: PendingAsset) -> bool {
        match self.pending.get_mut(index) {
            Some(slot) => {
                *slot = Some(asset);
                true
            }
            None => false,
        }
    }

    fn pending_at(&self, index: usize) -> Option<&PendingAsset> {
        self.pending.get(index).and_then(Option::as_ref)
    }

    fn pending_parts(&self, kind: AssetKind) -> impl Iterator<Item = (String, &PendingAsset)> {
        self.pending
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| slot.as_ref().map(|a| (kind.part_name(i), a)))
    }
}

#[derive(Debug)]
pub struct EditSession {
    profile: Profile,
    experience: Slotted<ExperienceEntry>,
    projects: Slotted<ProjectEntry>,
    skills: Slotted<SkillEntry>,
    education: Vec<EducationEntry>,
    resume: Option<PendingAsset>,
}

impl EditSession {
    pub fn from_document(document: PortfolioDocument) -> Self {
        let document = document.without_local_fields();
        Self {
            profile: document.profile,
            experience: Slotted::new(document.experience),
            projects: Slotted::new(document.projects),
            skills: Slotted::new(document.skills),
            education: document.education,
            resume: None,
        }
    }

    /// Snapshot of the persisted fields, in edit order.
    pub fn document(&self) -> PortfolioDocument {
        PortfolioDocument {
            profile: self.profile.clone(),
            experience: self.experience.entries.clone(),
            projects: self.projects.entries.clone(),
            skills: self.skills.entries.clone(),
            education: self.education.clone(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn experience(&self) -> &[ExperienceEntry] {
        &self.experience.entries
    }

    pub fn experience_mut(&mut self, index: usize) -> Option<&mut ExperienceEntry> {
        self.experience.entries.get_mut(index)
    }

    pub fn push_experience(&mut self, entry: ExperienceEntry) -> usize {
        self.experience.push(entry, None)
    }

    pub fn remove_experience(&mut self, index: usize) -> Option<ExperienceEntry> {
        self.experience.remove(index)
    }

    pub fn attach_logo(&mut self, index: usize, asset: PendingAsset) -> bool {
        self.experience.attach(index, asset)
    }

    pub fn projects(&self) -> &[ProjectEntry] {
        &self.projects.entries
    }

    pub fn project_mut(&mut self, index: usize) -> Option<&mut ProjectEntry> {
        self.projects.entries.get_mut(index)
    }

    pub fn push_project(&mut self, entry: ProjectEntry) -> usize {
        self.projects.push(entry, None)
    }

    pub fn remove_project(&mut self, index: usize) -> Option<ProjectEntry> {
        self.projects.remove(index)
    }

    pub fn attach_cover(&mut self, index: usize, asset: PendingAsset) -> bool {
        self.projects.attach(index, asset)
    }

    pub fn skills(&self) -> &[SkillEntry] {
        &self.skills.entries
    }

    /// Appends a skill. A blank name is ignored without error and any icon is released.
    pub fn add_skill(&mut self, name: &str, icon: Option<PendingAsset>) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring skill with empty name");
            return false;
        }
        self.skills.push(SkillEntry::named(name), icon);
        true
    }

    pub fn remove_skill(&mut self, index: usize) -> Option<SkillEntry> {
        self.skills.remove(index)
    }

    pub fn attach_skill_icon(&mut self, index: usize, asset: PendingAsset) -> bool {
        self.skills.attach(index, asset)
    }

    pub fn education(&self) -> &[EducationEntry] {
        &self.education
    }

    pub fn education_mut(&mut self, index: usize) -> Option<&mut EducationEntry> {
        self.education.get_mut(index)
    }

    pub fn push_education(&mut self, entry: EducationEntry) -> usize {
        self.education.push(entry);
        self.education.len() - 1
    }

    pub fn remove_education(&mut self, index: usize) -> Option<EducationEntry> {
        (index < self.education.len()).then(|| self.education.remove(index))
    }

    pub fn attach_resume(&mut self, asset: PendingAsset) {
        self.resume = Some(asset);
    }

    pub fn resume(&self) -> Option<&PendingAsset> {
        self.resume.as_ref()
    }

    /// The pending upload for an element, if one was selected.
    pub fn pending(&self, kind: AssetKind, index: usize) -> Option<&PendingAsset> {
        match kind {
            AssetKind::CompanyLogo => self.experience.pending_at(index),
            AssetKind::ProjectCover => self.projects.pending_at(index),
            AssetKind::SkillIcon => self.skills.pending_at(index),
        }
    }

    /// What a view should show for an element's image: the local preview while
    /// an upload is pending, otherwise the persisted URL.
    pub fn display_image(&self, kind: AssetKind, index: usize) -> Option<&str> {
        if let Some(asset) = self.pending(kind, index) {
            return Some(asset.preview_url());
        }
        let persisted = match kind {
            AssetKind::CompanyLogo => self
                .experience
                .entries
                .get(index)
                .map(|e| e.company_logo.as_str()),
            AssetKind::ProjectCover => self
                .projects
                .entries
                .get(index)
                .map(|p| p.cover_image.as_str()),
            AssetKind::SkillIcon => self
                .skills
                .entries
                .get(index)
                .and_then(|s| s.icon_url.as_deref()),
        };
        persisted.filter(|url| !url.is_empty())
    }

    /// Every pending binary with the multipart part name it uploads under.
    pub fn pending_assets(&self) -> Vec<(String, &PendingAsset)> {
        let mut parts = Vec::new();
        if let Some(resume) = &self.resume {
            parts.push(("resume".to_string(), resume));
        }
        parts.extend(self.experience.pending_parts(AssetKind::CompanyLogo));
        parts.extend(self.projects.pending_parts(AssetKind::ProjectCover));
        parts.extend(self.skills.pending_parts(AssetKind::SkillIcon));
        parts
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_assets().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::preview::PreviewRegistry;

    fn experience(company: &str) -> ExperienceEntry {
        ExperienceEntry {
            company: company.to_string(),
            ..Default::default()
        }
    }

    fn session_with_three() -> EditSession {
        EditSession::from_document(PortfolioDocument {
            experience: vec![experience("E0"), experience("E1"), experience("E2")],
            ..Default::default()
        })
    }

    #[test]
    fn test_document_round_trip_preserves_order() {
        let session = session_with_three();
        let companies: Vec<_> = session
            .document()
            .experience
            .iter()
            .map(|e| e.company.clone())
            .collect();
        assert_eq!(companies, ["E0", "E1", "E2"]);
    }

    #[test]
    fn test_only_selected_slot_is_pending() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        assert!(session.attach_logo(1, PendingAsset::new("logo.png", vec![1u8], &previews)));

        let names: Vec<_> = session
            .pending_assets()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["logo-1"]);
    }

    #[test]
    fn test_attach_out_of_range_is_rejected_and_released() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        assert!(!session.attach_logo(7, PendingAsset::new("logo.png", vec![1u8], &previews)));
        assert_eq!(previews.live_count(), 0);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_superseded_selection_revokes_preview() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();

        let first = PendingAsset::new("a.png", vec![1u8], &previews);
        let first_url = first.preview_url().to_string();
        session.attach_logo(0, first);
        session.attach_logo(0, PendingAsset::new("b.png", vec![2u8], &previews));

        assert!(!previews.is_live(&first_url));
        assert_eq!(previews.live_count(), 1);
        assert_eq!(
            session.pending(AssetKind::CompanyLogo, 0).unwrap().file_name(),
            "b.png"
        );
    }

    #[test]
    fn test_ending_session_revokes_all_previews() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        session.attach_logo(0, PendingAsset::new("a.png", vec![1u8], &previews));
        session.attach_resume(PendingAsset::new("cv.pdf", vec![1u8], &previews));
        session.add_skill("Rust", Some(PendingAsset::new("rust.svg", vec![1u8], &previews)));
        assert_eq!(previews.live_count(), 3);

        drop(session);
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_remove_keeps_slots_aligned() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        session.attach_logo(2, PendingAsset::new("e2.png", vec![1u8], &previews));

        let removed = session.remove_experience(0).unwrap();
        assert_eq!(removed.company, "E0");

        let names: Vec<_> = session
            .pending_assets()
            .into_iter()
            .map(|(name, asset)| (name, asset.file_name().to_string()))
            .collect();
        assert_eq!(names, [("logo-1".to_string(), "e2.png".to_string())]);
        assert_eq!(session.experience()[1].company, "E2");
    }

    #[test]
    fn test_remove_releases_pending_preview() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        session.attach_logo(1, PendingAsset::new("e1.png", vec![1u8], &previews));
        session.remove_experience(1);
        assert_eq!(previews.live_count(), 0);
        assert!(session.remove_experience(9).is_none());
    }

    #[test]
    fn test_blank_skill_name_is_ignored() {
        let previews = PreviewRegistry::new();
        let mut session = EditSession::from_document(PortfolioDocument::empty());
        assert!(!session.add_skill("   ", Some(PendingAsset::new("x.svg", vec![1u8], &previews))));
        assert!(session.skills().is_empty());
        assert_eq!(previews.live_count(), 0);

        assert!(session.add_skill(" Rust ", None));
        assert_eq!(session.skills()[0].name, "Rust");
    }

    #[test]
    fn test_display_image_prefers_preview() {
        let previews = PreviewRegistry::new();
        let mut session = EditSession::from_document(PortfolioDocument {
            projects: vec![ProjectEntry {
                cover_image: "https://cdn/cover.png".into(),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(
            session.display_image(AssetKind::ProjectCover, 0),
            Some("https://cdn/cover.png")
        );

        session.attach_cover(0, PendingAsset::new("new.png", vec![1u8], &previews));
        let shown = session.display_image(AssetKind::ProjectCover, 0).unwrap();
        assert!(crate::editor::preview::is_preview_url(shown));
        assert_eq!(session.display_image(AssetKind::SkillIcon, 0), None);
    }

    #[test]
    fn test_pending_assets_order() {
        let previews = PreviewRegistry::new();
        let mut session = session_with_three();
        session.push_project(ProjectEntry::default());
        session.add_skill("Go", Some(PendingAsset::new("go.svg", vec![1u8], &previews)));
        session.attach_cover(0, PendingAsset::new("c.png", vec![1u8], &previews));
        session.attach_logo(2, PendingAsset::new("l.png", vec![1u8], &previews));
        session.attach_resume(PendingAsset::new("cv.pdf", vec![1u8], &previews));

        let names: Vec<_> = session
            .pending_assets()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["resume", "logo-2", "projectCover-0", "skillIcon-0"]);
    }

    #[test]
    fn test_education_edits() {
        let mut session = EditSession::from_document(PortfolioDocument::empty());
        let i = session.push_education(EducationEntry::default());
        session.education_mut(i).unwrap().grade = "4.0 / 4.0".into();
        assert_eq!(session.document().education[0].grade, "4.0 / 4.0");
        assert!(session.remove_education(3).is_none());
        assert!(session.remove_education(0).is_some());
    }
}
