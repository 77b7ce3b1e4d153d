use askama::Template;

/// The fully resolved view behind one render: every string already localized,
/// every period already formatted. The template only lays things out.
pub struct PortfolioView {
    pub language: String,
    pub nav: Vec<NavLinkView>,
    pub hero: HeroView,
    pub biography: BiographyView,
    pub experience: ExperienceView,
    pub skills: SkillsView,
    pub contact: ContactView,
    pub languages: Vec<LanguageOptionView>,
    pub footer: FooterView,
    pub person_ld_json: String,
}

pub struct NavLinkView {
    pub label: String,
    pub href: &'static str,
}

pub struct HeroView {
    pub name: String,
    pub title: String,
    /// Empty when the language has no tagline.
    pub tagline: String,
}

pub struct BiographyView {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

pub struct ExperienceView {
    pub heading: String,
    pub entries: Vec<ExperienceEntryView>,
}

pub struct ExperienceEntryView {
    pub role: String,
    pub organization: String,
    pub period: String,
    pub summary: String,
    pub stack: Vec<String>,
}

pub struct SkillsView {
    pub heading: String,
    pub groups: Vec<SkillGroupView>,
}

pub struct SkillGroupView {
    pub label: String,
    pub items: Vec<String>,
}

pub struct ContactView {
    pub heading: String,
    pub email: String,
    pub links: Vec<ContactLinkView>,
}

pub struct ContactLinkView {
    pub label: String,
    pub url: String,
}

pub struct LanguageOptionView {
    pub tag: String,
    pub href: String,
    pub is_active: bool,
}

pub struct FooterView {
    pub note: String,
}

#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
    pub view: PortfolioView,
}
