//! Shell acquisition strategies.
//!
//! Development re-reads the shell on every request so edits show up without
//! a restart; the production strategies read it once and serve the cached
//! copy. A failed first load leaves the cache empty, so the next request
//! retries instead of pinning the failure.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, sync::OnceCell};

#[derive(Debug, Error)]
#[error("page shell `{}` could not be read: {source}", path.display())]
pub struct ShellError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Source of the HTML shell the rendered markup is spliced into.
#[async_trait]
pub trait ShellSource: Send + Sync {
    async fn load(&self) -> Result<Arc<str>, ShellError>;
}

/// Development strategy: read the shell fresh on every call.
pub struct ReloadingShell {
    path: PathBuf,
}

impl ReloadingShell {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ShellSource for ReloadingShell {
    async fn load(&self) -> Result<Arc<str>, ShellError> {
        read_shell(&self.path).await
    }
}

/// Production strategy: read once, then serve the cached copy. Concurrent
/// first loads coalesce on the cell.
pub struct CachedShell {
    path: PathBuf,
    cell: OnceCell<Arc<str>>,
}

impl CachedShell {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cell: OnceCell::new(),
        }
    }
}

#[async_trait]
impl ShellSource for CachedShell {
    async fn load(&self) -> Result<Arc<str>, ShellError> {
        let shell = self
            .cell
            .get_or_try_init(|| read_shell(&self.path))
            .await?;
        Ok(shell.clone())
    }
}

async fn read_shell(path: &Path) -> Result<Arc<str>, ShellError> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Arc::from(text)),
        Err(source) => Err(ShellError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
