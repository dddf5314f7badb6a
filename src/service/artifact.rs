use std::path::PathBuf;

#[derive(Debug, serde::Deserialize)]
pub struct ArtifactStoreConfig {
    #[serde(default = "ArtifactStoreConfig::default_root")]
    pub root: PathBuf,
}

impl Default for ArtifactStoreConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
        }
    }
}

impl ArtifactStoreConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("bugs_htmls")
    }

    pub fn build(self) -> ArtifactStore {
        ArtifactStore { root: self.root }
    }
}

/// Keeps every discarded page or fragment inspectable. The source markup is
/// unstable, so the next breakage gets diagnosed from these files rather
/// than from whatever the site serves by then.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Writes `content` verbatim to `error_{kind}_{uuid}.html` and returns
    /// the path. Creates the directory on first use; the random identifier
    /// keeps concurrent writers from colliding.
    pub fn record(&self, kind: &str, content: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self
            .root
            .join(format!("error_{kind}_{}.html", uuid::Uuid::new_v4()));
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
