use std::path::PathBuf;
use tracing::warn;

pub struct PortablePathManager;

impl PortablePathManager {
    /// Directory holding the executable, falling back to the working directory.
    pub fn root_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!(
                    "Failed to get current exe path: {}. Falling back to current_dir.",
                    e
                );
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Main data directory (./data).
    pub fn data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    /// Model cache directory (./data/models).
    pub fn models_dir() -> PathBuf {
        Self::data_dir().join("models")
    }

    /// Embedding model cache (./data/models/embeddings).
    pub fn embeddings_dir(models_dir: &std::path::Path) -> PathBuf {
        models_dir.join("embeddings")
    }
}
