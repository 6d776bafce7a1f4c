//! Lazy discovery of experiment files.
//!
//! The workspace is walked depth first, one directory read at a time, so the
//! first match is available before the rest of the tree has been scanned.
//! Entries within a directory are visited in name order. Symbolic links are
//! never followed into directories.

use std::path::{Path, PathBuf};

use cognition_core::files::matches_discovery_pattern;
use cognition_core::DeployError;
use futures::stream::{self, Stream};

struct Walker {
    root: PathBuf,
    /// Relative paths waiting to be visited with their is-directory flag, next entry at the back.
    pending: Vec<(PathBuf, bool)>,
}

impl Walker {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            pending: vec![(PathBuf::new(), true)],
        }
    }

    /// Read one directory and push its entries so they pop in name order.
    async fn expand(&mut self, relative: &Path) -> Result<(), DeployError> {
        let absolute = self.root.join(relative);
        let discovery_error = |source| DeployError::Discovery {
            path: absolute.clone(),
            source,
        };

        let mut reader = tokio::fs::read_dir(&absolute)
            .await
            .map_err(discovery_error)?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(discovery_error)? {
            let file_type = entry.file_type().await.map_err(discovery_error)?;
            // `file_type` does not follow links, so a link to a directory is not a directory here.
            entries.push((relative.join(entry.file_name()), file_type.is_dir()));
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        self.pending.extend(entries);
        Ok(())
    }

    async fn next_match(&mut self) -> Option<Result<PathBuf, DeployError>> {
        loop {
            let (path, is_dir) = self.pending.pop()?;
            if is_dir {
                if let Err(e) = self.expand(&path).await {
                    return Some(Err(e));
                }
            } else if matches_discovery_pattern(&path) {
                tracing::trace!(path = %path.display(), "Discovered file");
                return Some(Ok(path));
            }
        }
    }
}

/// Stream the files under `root` that match the discovery patterns, as paths relative to `root`.
///
/// The stream is single pass. A directory that cannot be read yields one
/// [`DeployError::Discovery`] item and the walk continues after it.
pub fn discover(root: impl Into<PathBuf>) -> impl Stream<Item = Result<PathBuf, DeployError>> {
    stream::unfold(Walker::new(root.into()), |mut walker| async move {
        let item = walker.next_match().await?;
        Some((item, walker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    async fn collect(root: &Path) -> Vec<String> {
        discover(root)
            .map(|item| item.unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
            .await
    }

    #[tokio::test]
    async fn walks_depth_first_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "b/z.js");
        touch(dir.path(), "b/a.css");
        touch(dir.path(), "a/img/cat.png");
        touch(dir.path(), "a/main.js");

        assert_eq!(
            collect(dir.path()).await,
            vec!["a/img/cat.png", "a/main.js", "b/a.css", "b/z.js", "index.html"]
        );
    }

    #[tokio::test]
    async fn only_recognized_extensions_are_yielded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "Makefile");
        touch(dir.path(), "stim/tone.WAV");
        touch(dir.path(), "stim/clip.mp4");
        touch(dir.path(), "src/lib.rs");

        assert_eq!(
            collect(dir.path()).await,
            vec!["stim/clip.mp4", "stim/tone.WAV"]
        );
    }

    #[tokio::test]
    async fn hidden_and_dependency_paths_are_still_discovered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".github/config.json");
        touch(dir.path(), "node_modules/jspsych/index.js");
        touch(dir.path(), "package.json");

        assert_eq!(
            collect(dir.path()).await,
            vec![
                ".github/config.json",
                "node_modules/jspsych/index.js",
                "package.json"
            ]
        );
    }

    #[tokio::test]
    async fn empty_workspace_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        assert!(collect(dir.path()).await.is_empty());
    }

    #[tokio::test]
    async fn missing_root_yields_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let items: Vec<_> = discover(missing).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(DeployError::Discovery { .. })));
    }

    #[tokio::test]
    async fn stream_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a/first.js");
        touch(dir.path(), "b/second.js");

        let files = discover(dir.path());
        let mut files = std::pin::pin!(files);
        let first = files.next().await.unwrap().unwrap();
        assert_eq!(first, Path::new("a").join("first.js"));

        // Directories not yet visited can change before they are read.
        touch(dir.path(), "b/added_later.js");

        let rest: Vec<_> = files.map(|f| f.unwrap()).collect().await;
        assert_eq!(
            rest,
            vec![
                Path::new("b").join("added_later.js"),
                Path::new("b").join("second.js")
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "real/a.js");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        assert_eq!(collect(dir.path()).await, vec!["real/a.js"]);
    }
}
