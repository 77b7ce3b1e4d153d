//! The portfolio renderer: profile + translations in, markup fragment out.

use askama::Template;
use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::domain::language::{Language, LanguagePolicy};
use crate::presentation::views::{
    BiographyView, ContactLinkView, ContactView, ExperienceEntryView, ExperienceView, FooterView,
    HeroView, LanguageOptionView, NavLinkView, PortfolioTemplate, PortfolioView, SkillGroupView,
    SkillsView,
};

use super::{ContentBundle, RenderError, Rendered, Renderer};

const HERO_STYLE: &str = "hero.css";
const ABOUT_STYLE: &str = "about.css";
const EXPERIENCE_STYLE: &str = "experience.css";
const SKILLS_STYLE: &str = "skills.css";
const CONTACT_STYLE: &str = "contact.css";

pub struct PortfolioRenderer {
    bundle: ContentBundle,
    public_url: Url,
}

impl PortfolioRenderer {
    pub fn new(bundle: ContentBundle, public_url: Url) -> Self {
        Self { bundle, public_url }
    }

    pub fn policy(&self) -> &LanguagePolicy {
        &self.bundle.policy
    }

    /// Render the portfolio for one URL path in one language. The fragment
    /// is complete markup; the touched-style list records, in traversal
    /// order, the style modules the rendered sections use.
    pub fn render_fragment(
        &self,
        url_path: &str,
        language: &Language,
    ) -> Result<Rendered, RenderError> {
        let profile = &self.bundle.profile;
        let strings =
            self.bundle
                .translations
                .get(language)
                .ok_or_else(|| RenderError::MissingLanguage {
                    language: language.clone(),
                })?;

        let mut touched_styles = profile.site.styles.clone();
        touched_styles.push(HERO_STYLE.to_string());
        touched_styles.push(ABOUT_STYLE.to_string());

        let mut nav = vec![NavLinkView {
            label: strings.ui.nav_about.clone(),
            href: "#about",
        }];

        let mut experience_entries = Vec::with_capacity(profile.experience.len());
        for entry in &profile.experience {
            let localized = strings.experience.get(&entry.slug).ok_or_else(|| {
                RenderError::MissingTranslation {
                    key: format!("experience.{}", entry.slug),
                    language: language.clone(),
                }
            })?;
            experience_entries.push(ExperienceEntryView {
                role: localized.role.clone(),
                organization: entry.organization.clone(),
                period: entry.period_label(&strings.ui.present_label),
                summary: localized.summary.clone(),
                stack: entry.stack.clone(),
            });
        }
        if !experience_entries.is_empty() {
            touched_styles.push(EXPERIENCE_STYLE.to_string());
            nav.push(NavLinkView {
                label: strings.ui.nav_experience.clone(),
                href: "#experience",
            });
        }

        let mut skill_groups = Vec::with_capacity(profile.skills.len());
        for group in &profile.skills {
            let label = strings.skills.get(&group.slug).ok_or_else(|| {
                RenderError::MissingTranslation {
                    key: format!("skills.{}", group.slug),
                    language: language.clone(),
                }
            })?;
            skill_groups.push(SkillGroupView {
                label: label.clone(),
                items: group.items.clone(),
            });
        }
        if !skill_groups.is_empty() {
            touched_styles.push(SKILLS_STYLE.to_string());
            nav.push(NavLinkView {
                label: strings.ui.nav_skills.clone(),
                href: "#skills",
            });
        }

        touched_styles.push(CONTACT_STYLE.to_string());
        nav.push(NavLinkView {
            label: strings.ui.nav_contact.clone(),
            href: "#contact",
        });

        let languages = self
            .bundle
            .policy
            .supported()
            .iter()
            .map(|tag| LanguageOptionView {
                tag: tag.to_string(),
                href: format!("?lang={tag}"),
                is_active: tag == language,
            })
            .collect();

        let view = PortfolioView {
            language: language.to_string(),
            nav,
            hero: HeroView {
                name: profile.identity.name.clone(),
                title: strings.hero.title.clone(),
                tagline: strings.hero.tagline.clone(),
            },
            biography: BiographyView {
                heading: strings.biography.heading.clone(),
                paragraphs: strings.biography.paragraphs.clone(),
            },
            experience: ExperienceView {
                heading: strings.ui.experience_heading.clone(),
                entries: experience_entries,
            },
            skills: SkillsView {
                heading: strings.ui.skills_heading.clone(),
                groups: skill_groups,
            },
            contact: ContactView {
                heading: strings.ui.contact_heading.clone(),
                email: profile.contact.email.clone(),
                links: profile
                    .contact
                    .links
                    .iter()
                    .map(|link| ContactLinkView {
                        label: link.label.clone(),
                        url: link.url.clone(),
                    })
                    .collect(),
            },
            languages,
            footer: FooterView {
                note: strings.ui.footer_note.clone(),
            },
            person_ld_json: self.person_ld_json(url_path, &strings.hero.title),
        };

        let html = PortfolioTemplate { view }.render()?;
        Ok(Rendered {
            html,
            touched_styles,
        })
    }

    fn person_ld_json(&self, url_path: &str, job_title: &str) -> String {
        let profile = &self.bundle.profile;
        let canonical = self
            .public_url
            .join(url_path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.public_url.to_string());
        let same_as: Vec<&str> = profile
            .contact
            .links
            .iter()
            .map(|link| link.url.as_str())
            .collect();
        let person = json!({
            "@context": "https://schema.org",
            "@type": "Person",
            "name": profile.identity.name,
            "email": format!("mailto:{}", profile.contact.email),
            "jobTitle": job_title,
            "url": canonical,
            "sameAs": same_as,
        });
        serde_json::to_string(&person).unwrap_or_else(|_| "{}".to_string())
    }
}

#[async_trait]
impl Renderer for PortfolioRenderer {
    fn language_policy(&self) -> &LanguagePolicy {
        self.policy()
    }

    async fn render(&self, url_path: &str, language: &Language) -> Result<Rendered, RenderError> {
        self.render_fragment(url_path, language)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::domain::profile::{Profile, Translations};

    use super::*;

    fn bundle() -> ContentBundle {
        let profile: Profile = toml::from_str(
            r#"
            [identity]
            name = "Ada Example"

            [site]
            languages = ["en", "it"]
            default_language = "en"
            styles = ["base.css", "layout.css"]

            [[experience]]
            slug = "acme"
            organization = "Acme"
            start = "2021-03-01"

            [[skills]]
            slug = "languages"
            items = ["Rust"]

            [contact]
            email = "ada@example.com"
            links = [{ label = "GitHub", url = "https://github.com/ada" }]
            "#,
        )
        .expect("profile");

        let en: Translations = toml::from_str(
            r#"
            [ui]
            nav_about = "About"
            nav_experience = "Experience"
            nav_skills = "Skills"
            nav_contact = "Contact"
            experience_heading = "Experience"
            skills_heading = "Skills"
            contact_heading = "Get in touch"
            present_label = "Present"
            footer_note = "Handmade"

            [hero]
            title = "Systems Engineer"
            tagline = "Small tools, sharp edges"

            [biography]
            heading = "About"
            paragraphs = ["First paragraph.", "Second paragraph."]

            [experience.acme]
            role = "Engineer"
            summary = "Built things."

            [skills]
            languages = "Languages"
            "#,
        )
        .expect("en");

        let it: Translations = toml::from_str(
            r#"
            [ui]
            nav_about = "Chi sono"
            nav_experience = "Esperienza"
            nav_skills = "Competenze"
            nav_contact = "Contatti"
            experience_heading = "Esperienza"
            skills_heading = "Competenze"
            contact_heading = "Contatti"
            present_label = "Oggi"
            footer_note = "Fatto a mano"

            [hero]
            title = "Ingegnere"

            [biography]
            heading = "Chi sono"
            paragraphs = ["Primo paragrafo."]

            [experience.acme]
            role = "Ingegnere"
            summary = "Ho costruito cose."

            [skills]
            languages = "Linguaggi"
            "#,
        )
        .expect("it");

        let policy = profile.language_policy().expect("policy");
        let mut translations = HashMap::new();
        translations.insert("en".parse().expect("tag"), en);
        translations.insert("it".parse().expect("tag"), it);
        ContentBundle {
            profile,
            translations,
            policy,
        }
    }

    fn renderer() -> PortfolioRenderer {
        PortfolioRenderer::new(
            bundle(),
            Url::parse("https://ada.example.com/").expect("url"),
        )
    }

    #[test]
    fn fragment_carries_the_localized_content() {
        let rendered = renderer()
            .render_fragment("/", &"en".parse().expect("tag"))
            .expect("render");
        assert!(rendered.html.contains("Ada Example"));
        assert!(rendered.html.contains("Systems Engineer"));
        assert!(rendered.html.contains("Mar 2021 – Present"));
        assert!(rendered.html.contains("Get in touch"));
    }

    #[test]
    fn language_selects_the_translation_set() {
        let rendered = renderer()
            .render_fragment("/", &"it".parse().expect("tag"))
            .expect("render");
        assert!(rendered.html.contains("lang=\"it\""));
        assert!(rendered.html.contains("Chi sono"));
        assert!(rendered.html.contains("Mar 2021 – Oggi"));
        assert!(!rendered.html.contains("Get in touch"));
    }

    #[test]
    fn touched_styles_start_with_the_base_modules_in_declared_order() {
        let rendered = renderer()
            .render_fragment("/", &"en".parse().expect("tag"))
            .expect("render");
        assert_eq!(
            rendered.touched_styles,
            vec![
                "base.css",
                "layout.css",
                "hero.css",
                "about.css",
                "experience.css",
                "skills.css",
                "contact.css",
            ]
        );
    }

    #[test]
    fn person_metadata_points_at_the_request_url() {
        let rendered = renderer()
            .render_fragment("/experience", &"en".parse().expect("tag"))
            .expect("render");
        assert!(
            rendered
                .html
                .contains("https://ada.example.com/experience")
        );
        assert!(rendered.html.contains("schema.org"));
    }

    #[test]
    fn missing_experience_translation_names_the_key() {
        let mut bundle = bundle();
        if let Some(en) = bundle.translations.get_mut(&"en".parse().expect("tag")) {
            en.experience.clear();
        }
        let renderer = PortfolioRenderer::new(
            bundle,
            Url::parse("https://ada.example.com/").expect("url"),
        );
        let err = renderer
            .render_fragment("/", &"en".parse().expect("tag"))
            .expect_err("fails");
        assert!(err.to_string().contains("experience.acme"));
    }
}
