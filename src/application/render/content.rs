//! Loading and validating the portfolio content bundle.

use std::{collections::HashMap, path::Path};

use serde::de::DeserializeOwned;
use tokio::fs;

use crate::domain::{
    language::{Language, LanguagePolicy},
    profile::{Profile, Translations},
};

use super::RenderError;

const PROFILE_FILE: &str = "profile.toml";
const I18N_DIR: &str = "i18n";

/// The fully loaded, validated content a renderer works from: the profile
/// plus one `Translations` per declared language.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub profile: Profile,
    pub translations: HashMap<Language, Translations>,
    pub policy: LanguagePolicy,
}

impl ContentBundle {
    /// Read `profile.toml` and every declared language's translation file
    /// from `content_dir`. A declared language without a translation file is
    /// a load failure, not a render-time surprise.
    pub async fn load(content_dir: &Path) -> Result<Self, RenderError> {
        let profile: Profile = read_toml(&content_dir.join(PROFILE_FILE)).await?;
        profile.validate()?;
        let policy = profile.language_policy()?;

        let mut translations = HashMap::new();
        for language in policy.supported() {
            let path = content_dir
                .join(I18N_DIR)
                .join(format!("{language}.toml"));
            let strings: Translations = read_toml(&path).await?;
            translations.insert(language.clone(), strings);
        }

        Ok(Self {
            profile,
            translations,
            policy,
        })
    }
}

async fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, RenderError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| RenderError::ContentRead {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&text).map_err(|source| RenderError::ContentParse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_site(dir: &Path) {
        std::fs::create_dir_all(dir.join("i18n")).expect("i18n dir");
        std::fs::write(
            dir.join("profile.toml"),
            r#"
            [identity]
            name = "Ada Example"

            [site]
            languages = ["en"]
            default_language = "en"

            [contact]
            email = "ada@example.com"
            "#,
        )
        .expect("profile");
        std::fs::write(
            dir.join("i18n/en.toml"),
            r#"
            [ui]
            nav_about = "About"
            nav_experience = "Experience"
            nav_skills = "Skills"
            nav_contact = "Contact"
            experience_heading = "Experience"
            skills_heading = "Skills"
            contact_heading = "Contact"
            present_label = "Present"
            footer_note = "Handmade"

            [hero]
            title = "Engineer"

            [biography]
            heading = "About"
            paragraphs = ["Hi."]
            "#,
        )
        .expect("translations");
    }

    #[tokio::test]
    async fn bundle_loads_profile_and_declared_languages() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_site(dir.path());

        let bundle = ContentBundle::load(dir.path()).await.expect("bundle");
        assert_eq!(bundle.profile.identity.name, "Ada Example");
        assert_eq!(bundle.translations.len(), 1);
    }

    #[tokio::test]
    async fn missing_translation_file_fails_the_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_site(dir.path());
        std::fs::remove_file(dir.path().join("i18n/en.toml")).expect("remove");

        let err = ContentBundle::load(dir.path()).await.expect_err("fails");
        assert!(matches!(err, RenderError::ContentRead { .. }));
    }

    #[tokio::test]
    async fn parse_errors_carry_the_offending_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_site(dir.path());
        std::fs::write(dir.path().join("profile.toml"), "not = [valid").expect("corrupt");

        let err = ContentBundle::load(dir.path()).await.expect_err("fails");
        match err {
            RenderError::ContentParse { path, .. } => {
                assert!(path.ends_with("profile.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
