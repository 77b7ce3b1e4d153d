//! Portfolio content model.
//!
//! The language-independent facts live in `profile.toml` (who, where, when);
//! everything a visitor reads in prose comes from the per-language
//! translation files, keyed back to these records by slug.

use std::collections::HashMap;

use serde::Deserialize;
use time::{Date, macros::format_description};

use super::error::DomainError;
use super::language::{Language, LanguagePolicy};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub identity: Identity,
    pub site: SiteManifest,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    pub contact: Contact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default)]
    pub location: String,
}

/// Site-wide declarations: which languages the content ships, and the base
/// stylesheet modules linked on every page, in cascade order.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteManifest {
    pub languages: Vec<Language>,
    pub default_language: Language,
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceEntry {
    pub slug: String,
    pub organization: String,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(default, with = "iso_date::option")]
    pub end: Option<Date>,
    #[serde(default)]
    pub stack: Vec<String>,
}

impl ExperienceEntry {
    /// Human period label, e.g. `Mar 2021 – Jan 2023` or `Mar 2021 – Present`.
    pub fn period_label(&self, present: &str) -> String {
        let fmt = format_description!("[month repr:short] [year]");
        let start = self
            .start
            .format(&fmt)
            .unwrap_or_else(|_| self.start.to_string());
        let end = match self.end {
            Some(end) => end.format(&fmt).unwrap_or_else(|_| end.to_string()),
            None => present.to_string(),
        };
        format!("{start} – {end}")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillGroup {
    pub slug: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub url: String,
}

impl Profile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.identity.name.trim().is_empty() {
            return Err(DomainError::validation("identity.name must not be empty"));
        }
        if !self.contact.email.contains('@') {
            return Err(DomainError::validation(format!(
                "contact.email `{}` is not an email address",
                self.contact.email
            )));
        }
        for module in &self.site.styles {
            if !module.ends_with(".css") {
                return Err(DomainError::validation(format!(
                    "site.styles entry `{module}` is not a stylesheet module"
                )));
            }
        }
        ensure_unique_slugs("experience", self.experience.iter().map(|e| e.slug.as_str()))?;
        ensure_unique_slugs("skills", self.skills.iter().map(|g| g.slug.as_str()))?;
        for entry in &self.experience {
            if entry.end.is_some_and(|end| end < entry.start) {
                return Err(DomainError::validation(format!(
                    "experience `{}` ends before it starts",
                    entry.slug
                )));
            }
        }
        Ok(())
    }

    pub fn language_policy(&self) -> Result<LanguagePolicy, DomainError> {
        LanguagePolicy::new(
            self.site.languages.clone(),
            self.site.default_language.clone(),
        )
    }
}

fn ensure_unique_slugs<'a>(
    section: &'static str,
    slugs: impl Iterator<Item = &'a str>,
) -> Result<(), DomainError> {
    let mut seen = std::collections::HashSet::new();
    for slug in slugs {
        if slug.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "{section} entries must carry a slug"
            )));
        }
        if !seen.insert(slug) {
            return Err(DomainError::validation(format!(
                "duplicate {section} slug `{slug}`"
            )));
        }
    }
    Ok(())
}

/// One language's worth of visitor-facing strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Translations {
    pub ui: UiLabels,
    pub hero: HeroStrings,
    pub biography: BiographyStrings,
    #[serde(default)]
    pub experience: HashMap<String, ExperienceStrings>,
    #[serde(default)]
    pub skills: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiLabels {
    pub nav_about: String,
    pub nav_experience: String,
    pub nav_skills: String,
    pub nav_contact: String,
    pub experience_heading: String,
    pub skills_heading: String,
    pub contact_heading: String,
    pub present_label: String,
    pub footer_note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeroStrings {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiographyStrings {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceStrings {
    pub role: String,
    pub summary: String,
}
