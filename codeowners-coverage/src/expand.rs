use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::{pattern::PatternList, Error, Result};

/// Turns a pattern list into the concrete file paths it selects.
pub trait Expand {
    fn expand(&self, patterns: &PatternList) -> Result<Vec<String>>;
}

/// Expands patterns against the files under a directory. The directory is
/// walked once, on first use, and the listing reused for every expansion.
pub struct FileTree {
    root: PathBuf,
    files: OnceCell<Vec<String>>,
}

impl FileTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: OnceCell::new(),
        }
    }

    /// Every file under the root, relative to it, in walk order.
    pub fn files(&self) -> Result<&[String]> {
        self.files
            .get_or_try_init(|| walk_files(&self.root))
            .map(Vec::as_slice)
    }
}

impl Expand for FileTree {
    fn expand(&self, patterns: &PatternList) -> Result<Vec<String>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        let set = patterns.compile()?;
        Ok(set.expand(self.files()?))
    }
}

/// Expands patterns against a fixed list of paths.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    files: Vec<String>,
}

impl FileList {
    pub fn new<S: Into<String>>(files: impl IntoIterator<Item = S>) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl Expand for FileList {
    fn expand(&self, patterns: &PatternList) -> Result<Vec<String>> {
        Ok(patterns.compile()?.expand(&self.files))
    }
}

fn walk_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(Error::Walk {
                    root: root.to_owned(),
                    source,
                })
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if let Some(path) = relative_path(root, entry.path()) {
            files.push(path);
        }
    }
    debug!(root = %root.display(), files = files.len(), "walked file tree");
    Ok(files)
}

// Paths are matched as `/`-separated strings relative to the root.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>();
    Some(segments.join("/"))
}
