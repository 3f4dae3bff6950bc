use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::GatewayError;

/// Filename stem used when the caller does not pick one.
pub const DEFAULT_GRAPH_NAME: &str = "my_graph";

/// Durable storage for graph documents: one `<name>.json` file per name
/// under a configured root, written atomically. Content is caller-opaque
/// text; it is never parsed here.
pub struct GraphStore {
    root: PathBuf,
    // Per-name write locks; writes to different names run concurrently.
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Caller-supplied names are a single path component: no separators, no
/// dots, so they can never escape the store root.
fn validate_name(name: &str) -> Result<(), GatewayError> {
    if name.is_empty() {
        return Err(GatewayError::invalid_value("graph name must not be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(GatewayError::invalid_value(format!(
            "invalid graph name {name:?}: only letters, digits, '_' and '-' are allowed"
        )));
    }
    Ok(())
}

impl GraphStore {
    pub fn new(root: PathBuf) -> Result<Self, GatewayError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    async fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks.entry(name.to_string()).or_default().clone()
    }

    /// Atomically replace the document: the content lands in a temporary
    /// file in the store root, then renames into place, so a reader never
    /// observes a truncated document.
    pub async fn write(&self, name: &str, content: String) -> Result<(), GatewayError> {
        validate_name(name)?;
        let lock = self.lock_for(name).await;
        let _guard = lock.lock().await;

        let root = self.root.clone();
        let path = self.path_for(name);
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&root)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!(name, "graph document written");
        Ok(())
    }

    /// Read a document back verbatim. A name never written is `NotFound`,
    /// distinct from storage failures.
    pub async fn read(&self, name: &str) -> Result<String, GatewayError> {
        validate_name(name)?;
        match tokio::fs::read_to_string(self.path_for(name)).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(GatewayError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
