//! Renderer acquisition strategies.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use url::Url;

use super::{ContentBundle, PortfolioRenderer, RenderError, Renderer, RendererProvider};

/// Development strategy: rebuild the renderer from the content directory on
/// every acquisition, so content edits appear without a restart.
pub struct ReloadingProvider {
    content_dir: PathBuf,
    public_url: Url,
}

impl ReloadingProvider {
    pub fn new(content_dir: PathBuf, public_url: Url) -> Self {
        Self {
            content_dir,
            public_url,
        }
    }
}

#[async_trait]
impl RendererProvider for ReloadingProvider {
    async fn acquire(&self) -> Result<Arc<dyn Renderer>, RenderError> {
        let bundle = ContentBundle::load(&self.content_dir).await?;
        Ok(Arc::new(PortfolioRenderer::new(
            bundle,
            self.public_url.clone(),
        )))
    }
}

/// Production strategy: the first acquisition pays the load, later ones reuse
/// it. Concurrent first acquisitions coalesce, and a failed load leaves the
/// cell empty so the next request retries.
pub struct CachedProvider {
    content_dir: PathBuf,
    public_url: Url,
    cell: OnceCell<Arc<PortfolioRenderer>>,
}

impl CachedProvider {
    pub fn new(content_dir: PathBuf, public_url: Url) -> Self {
        Self {
            content_dir,
            public_url,
            cell: OnceCell::new(),
        }
    }
}

#[async_trait]
impl RendererProvider for CachedProvider {
    async fn acquire(&self) -> Result<Arc<dyn Renderer>, RenderError> {
        let renderer = self
            .cell
            .get_or_try_init(|| async {
                let bundle = ContentBundle::load(&self.content_dir).await?;
                Ok::<_, RenderError>(Arc::new(PortfolioRenderer::new(
                    bundle,
                    self.public_url.clone(),
                )))
            })
            .await?;
        Ok(renderer.clone())
    }
}
