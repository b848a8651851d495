//! Resolver backed by a vault directory on disk

use super::markdown::extract_section;
use super::{ContentResolver, ResolveError, ResolveResult};
use crate::graph::{CanvasNode, NodeContent};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Resolves text nodes inline and file nodes relative to a vault root.
///
/// - `#subpath` references return only that heading's section
/// - images become `data:` URIs
/// - other files are prefixed with a `## <name>` heading
#[derive(Debug, Clone)]
pub struct VaultResolver {
    root: PathBuf,
}

impl VaultResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, file: &str) -> ResolveResult<PathBuf> {
        let rel = Path::new(file);
        let inside = !rel.is_absolute()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(ResolveError::OutsideVault(file.to_string()));
        }
        Ok(self.root.join(rel))
    }

    async fn read_file(&self, file: &str, subpath: Option<&str>) -> ResolveResult<String> {
        let path = self.locate(file)?;
        let io_err = |source| ResolveError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(subpath) = subpath.filter(|s| !s.trim().is_empty()) {
            let body = tokio::fs::read_to_string(&path).await.map_err(io_err)?;
            return Ok(match extract_section(&body, subpath) {
                Some(section) => section.to_string(),
                None => {
                    warn!(file, subpath, "subpath not found, using whole file");
                    body
                }
            });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            let bytes = tokio::fs::read(&path).await.map_err(io_err)?;
            return Ok(format!("data:image/{};base64,{}", ext, STANDARD.encode(bytes)));
        }

        let body = tokio::fs::read_to_string(&path).await.map_err(io_err)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file);
        Ok(format!("## {}\n{}", name, body))
    }
}

#[async_trait]
impl ContentResolver for VaultResolver {
    async fn resolve(&self, node: &CanvasNode) -> ResolveResult<String> {
        match &node.content {
            NodeContent::Text { text } => Ok(text.clone()),
            NodeContent::File { file, subpath } => self.read_file(file, subpath.as_deref()).await,
            NodeContent::Link { url } => {
                debug!(node = %node.id, url = %url, "link nodes carry no text");
                Ok(String::new())
            }
            NodeContent::Group { .. } => Ok(String::new()),
        }
    }
}
