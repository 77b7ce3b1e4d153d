//! Language tags and per-request preference resolution.
//!
//! The rendered language is decided once per request from an explicit
//! fallback chain (explicit switch → stored preference → negotiated
//! `Accept-Language` → site default) and threaded into the render call.
//! Nothing here touches process-global state.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::DomainError;

/// A lowercase primary language subtag, e.g. `en` or `pt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Language(String);

impl Language {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tag = raw.trim();
        if tag.len() < 2 || tag.len() > 8 || !tag.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "`{raw}` is not a valid language tag"
            )));
        }
        Ok(Self(tag.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Language {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which link of the fallback chain produced the resolved language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    /// An explicit `?lang=` switch; the dispatcher persists it as the stored
    /// preference.
    Explicit,
    Stored,
    Detected,
    Default,
}

#[derive(Debug, Clone)]
pub struct ResolvedLanguage {
    pub language: Language,
    pub source: LanguageSource,
}

/// The set of languages the site content declares, plus its default.
#[derive(Debug, Clone)]
pub struct LanguagePolicy {
    supported: Vec<Language>,
    default: Language,
}

impl LanguagePolicy {
    pub fn new(supported: Vec<Language>, default: Language) -> Result<Self, DomainError> {
        if supported.is_empty() {
            return Err(DomainError::validation(
                "at least one site language must be declared",
            ));
        }
        if !supported.contains(&default) {
            return Err(DomainError::validation(format!(
                "default language `{default}` is not among the declared languages"
            )));
        }
        Ok(Self { supported, default })
    }

    pub fn supported(&self) -> &[Language] {
        &self.supported
    }

    pub fn default_language(&self) -> &Language {
        &self.default
    }

    fn supports(&self, candidate: &str) -> Option<Language> {
        let parsed: Language = candidate.parse().ok()?;
        self.supported.contains(&parsed).then_some(parsed)
    }

    /// Resolve a request's language: explicit switch, then stored preference,
    /// then `Accept-Language` negotiation, then the site default. Unsupported
    /// or malformed candidates fall through to the next link.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        stored: Option<&str>,
        accept_language: Option<&str>,
    ) -> ResolvedLanguage {
        if let Some(language) = explicit.and_then(|tag| self.supports(tag)) {
            return ResolvedLanguage {
                language,
                source: LanguageSource::Explicit,
            };
        }
        if let Some(language) = stored.and_then(|tag| self.supports(tag)) {
            return ResolvedLanguage {
                language,
                source: LanguageSource::Stored,
            };
        }
        if let Some(language) = accept_language.and_then(|header| self.negotiate(header)) {
            return ResolvedLanguage {
                language,
                source: LanguageSource::Detected,
            };
        }
        ResolvedLanguage {
            language: self.default.clone(),
            source: LanguageSource::Default,
        }
    }

    /// Pick the best supported language from an `Accept-Language` header.
    /// Region subtags are reduced to their primary subtag, so `en-US` matches
    /// a site that declares `en`.
    fn negotiate(&self, header: &str) -> Option<Language> {
        let mut ranked: Vec<(f32, usize, &str)> = Vec::new();
        for (position, part) in header.split(',').enumerate() {
            let mut pieces = part.split(';');
            let tag = pieces.next().unwrap_or("").trim();
            if tag.is_empty() || tag == "*" {
                continue;
            }
            let weight = pieces
                .find_map(|piece| piece.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if weight > 0.0 {
                ranked.push((weight, position, tag));
            }
        }
        ranked.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        ranked.into_iter().find_map(|(_, _, tag)| {
            let primary = tag.split('-').next().unwrap_or(tag);
            self.supports(primary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LanguagePolicy {
        LanguagePolicy::new(
            vec!["en".parse().unwrap(), "it".parse().unwrap()],
            "en".parse().unwrap(),
        )
        .expect("valid policy")
    }

    #[test]
    fn explicit_switch_wins_over_everything() {
        let resolved = policy().resolve(Some("it"), Some("en"), Some("en"));
        assert_eq!(resolved.language.as_str(), "it");
        assert_eq!(resolved.source, LanguageSource::Explicit);
    }

    #[test]
    fn unsupported_explicit_falls_through_to_stored() {
        let resolved = policy().resolve(Some("de"), Some("it"), None);
        assert_eq!(resolved.language.as_str(), "it");
        assert_eq!(resolved.source, LanguageSource::Stored);
    }

    #[test]
    fn accept_language_is_negotiated_by_weight() {
        let resolved = policy().resolve(None, None, Some("de-DE, it;q=0.9, en;q=0.8"));
        assert_eq!(resolved.language.as_str(), "it");
        assert_eq!(resolved.source, LanguageSource::Detected);
    }

    #[test]
    fn region_subtags_match_their_primary_language() {
        let resolved = policy().resolve(None, None, Some("it-IT"));
        assert_eq!(resolved.language.as_str(), "it");
    }

    #[test]
    fn everything_missing_resolves_to_the_default() {
        let resolved = policy().resolve(None, None, None);
        assert_eq!(resolved.language.as_str(), "en");
        assert_eq!(resolved.source, LanguageSource::Default);
    }

    #[test]
    fn zero_weight_entries_are_ignored() {
        let resolved = policy().resolve(None, None, Some("it;q=0, de"));
        assert_eq!(resolved.source, LanguageSource::Default);
    }

    #[test]
    fn default_must_be_declared() {
        let err = LanguagePolicy::new(vec!["it".parse().unwrap()], "en".parse().unwrap());
        assert!(err.is_err());
    }

    #[test]
    fn malformed_tags_are_rejected() {
        assert!("en US".parse::<Language>().is_err());
        assert!("x".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }
}
