//! Aggregate stylesheet collection.
//!
//! Development concatenates the style modules the render touched, in touch
//! order, from the source styles directory; production sweeps the build
//! output's assets directory. Order matters either way: it is CSS cascade
//! order. The production sweep sorts by file name so the aggregate is
//! reproducible across platforms.

use std::{
    collections::HashSet,
    io::{self, ErrorKind},
    path::PathBuf,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("stylesheet `{}` could not be read: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("assets directory `{}` could not be listed: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Produces the aggregate stylesheet injected into the document head.
///
/// `touched` is the ordered list of style modules the render used; only the
/// development collector consults it.
#[async_trait]
pub trait StyleCollector: Send + Sync {
    async fn collect(&self, touched: &[String]) -> Result<String, StyleError>;
}

/// Development strategy: resolve each touched module against the source
/// styles directory. Modules without a file on disk yet contribute nothing.
pub struct DevStyleCollector {
    styles_dir: PathBuf,
}

impl DevStyleCollector {
    pub fn new(styles_dir: PathBuf) -> Self {
        Self { styles_dir }
    }
}

#[async_trait]
impl StyleCollector for DevStyleCollector {
    async fn collect(&self, touched: &[String]) -> Result<String, StyleError> {
        let mut seen = HashSet::new();
        let mut aggregate = String::new();
        for module in touched {
            if !seen.insert(module.as_str()) {
                continue;
            }
            let path = self.styles_dir.join(module);
            match fs::read_to_string(&path).await {
                Ok(css) => push_css(&mut aggregate, &css),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(
                        target = "vetrina::styles",
                        module = %module,
                        "style module has no file yet, skipping"
                    );
                }
                Err(source) => return Err(StyleError::Read { path, source }),
            }
        }
        Ok(aggregate)
    }
}

/// Production strategy: read every `*.css` file in the build output's assets
/// directory, in lexicographic file-name order. A missing directory degrades
/// to an empty aggregate; the dispatcher still serves the page.
pub struct DistStyleCollector {
    assets_dir: PathBuf,
}

impl DistStyleCollector {
    pub fn new(assets_dir: PathBuf) -> Self {
        Self { assets_dir }
    }
}

#[async_trait]
impl StyleCollector for DistStyleCollector {
    async fn collect(&self, _touched: &[String]) -> Result<String, StyleError> {
        let mut reader = match fs::read_dir(&self.assets_dir).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    target = "vetrina::styles",
                    assets_dir = %self.assets_dir.display(),
                    "assets directory is missing, serving without styles"
                );
                return Ok(String::new());
            }
            Err(source) => {
                return Err(StyleError::List {
                    path: self.assets_dir.clone(),
                    source,
                });
            }
        };

        let mut sheets = Vec::new();
        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(StyleError::List {
                        path: self.assets_dir.clone(),
                        source,
                    });
                }
            };
            let path = entry.path();
            let is_css = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
            if is_css {
                sheets.push(path);
            }
        }
        sheets.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

        let mut aggregate = String::new();
        for path in sheets {
            match fs::read_to_string(&path).await {
                Ok(css) => push_css(&mut aggregate, &css),
                Err(source) => return Err(StyleError::Read { path, source }),
            }
        }
        Ok(aggregate)
    }
}

fn push_css(aggregate: &mut String, css: &str) {
    if !aggregate.is_empty() && !aggregate.ends_with('\n') {
        aggregate.push('\n');
    }
    aggregate.push_str(css);
}
