pub mod portfolio;

pub use portfolio::{
    EducationEntry, ExperienceEntry, PortfolioDocument, Profile, ProjectEntry, SkillEntry, Socials,
};
