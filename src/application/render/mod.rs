//! Render function: URL + language in, portfolio markup out.

mod content;
mod portfolio;
mod provider;

use std::{io, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    error::DomainError,
    language::{Language, LanguagePolicy},
};

pub use content::ContentBundle;
pub use portfolio::PortfolioRenderer;
pub use provider::{CachedProvider, ReloadingProvider};

/// The outcome of one render: the markup fragment plus the ordered list of
/// style modules the render touched (consumed by the development style
/// collector).
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub touched_styles: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Parse failures keep the offending file and the parser's line/column
    /// report, so the boundary log points at the source position.
    #[error("portfolio content `{}` is invalid: {source}", path.display())]
    ContentParse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("portfolio content `{}` could not be read: {source}", path.display())]
    ContentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Content(#[from] DomainError),
    #[error("no translations loaded for `{language}`")]
    MissingLanguage { language: Language },
    #[error("translation `{key}` is missing for `{language}`")]
    MissingTranslation { key: String, language: Language },
    #[error("portfolio markup expansion failed: {0}")]
    Template(#[from] askama::Error),
}

/// Maps a URL path and a resolved language to a rendered fragment.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// The language policy the loaded content declares; the dispatcher
    /// resolves the request language against it before rendering.
    fn language_policy(&self) -> &LanguagePolicy;

    async fn render(&self, url_path: &str, language: &Language) -> Result<Rendered, RenderError>;
}

/// Renderer acquisition strategy: reload-per-call in development, load-once
/// in production.
#[async_trait]
pub trait RendererProvider: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn Renderer>, RenderError>;
}
