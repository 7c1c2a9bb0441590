use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    pattern::{PatternList, Syntax},
    Error, Result,
};

/// Where a CODEOWNERS file is looked for, relative to the repository root,
/// in order.
pub const MANIFEST_LOCATIONS: [&str; 2] = ["CODEOWNERS", ".github/CODEOWNERS"];

/// Marks a manifest line as intentionally unowned, e.g. `#?build/**`.
pub const UNOWNED_MARKER: &str = "#?";

/// The owner-for-everything pattern.
pub const DEFAULT_PATTERN: &str = "*";

/// A CODEOWNERS file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub source: String,
}

impl Manifest {
    /// Read the first manifest found under `root`. Any read failure moves on
    /// to the next location; running out of locations is an error.
    pub fn locate(root: &Path) -> Result<Manifest> {
        let candidates = MANIFEST_LOCATIONS
            .iter()
            .map(|location| root.join(location))
            .collect::<Vec<_>>();
        Self::read_first(candidates)
    }

    pub fn read_first(candidates: Vec<PathBuf>) -> Result<Manifest> {
        for path in &candidates {
            match fs::read_to_string(path) {
                Ok(source) => {
                    debug!(path = %path.display(), "found CODEOWNERS file");
                    return Ok(Manifest {
                        path: path.clone(),
                        source,
                    });
                }
                Err(err) => debug!(path = %path.display(), error = %err, "no CODEOWNERS file"),
            }
        }
        Err(Error::ManifestNotFound {
            searched: candidates,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat `#?` lines as unowned patterns instead of comments.
    pub parse_unowned: bool,
    /// Drop the `*` catch-all so it can't claim every file.
    pub ignore_default: bool,
}

/// The patterns a manifest contributes to the coverage computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPatterns {
    pub owned: PatternList,
    pub unowned: PatternList,
}

/// Extract patterns from CODEOWNERS source. Only the first whitespace
/// separated token of each line is looked at; owners are ignored. A pattern
/// containing a space therefore can't be expressed.
pub fn parse(source: &str, options: &ParseOptions) -> ManifestPatterns {
    let mut owned = PatternList::new(Syntax::Glob);
    let mut unowned = PatternList::new(Syntax::Glob);

    for token in source.lines().filter_map(|line| line.split_whitespace().next()) {
        let token = strip_anchor(token);

        if let Some(pattern) = token.strip_prefix(UNOWNED_MARKER) {
            if options.parse_unowned {
                unowned.push(strip_anchor(pattern));
            }
            continue;
        }
        if token.starts_with('#') {
            continue;
        }
        if options.ignore_default && token == DEFAULT_PATTERN {
            continue;
        }
        owned.push(token);
    }

    ManifestPatterns { owned, unowned }
}

fn strip_anchor(token: &str) -> &str {
    token.strip_prefix('/').unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globs(list: &PatternList) -> Vec<&str> {
        list.iter().map(|p| p.glob.as_str()).collect()
    }

    const SOURCE: &str = "# Owners\n\
        *       @org/everyone\n\
        /src/   @org/core @someone\n\
        docs/** docs@example.com\n\
        \n\
        #?build/**\n\
        #?/vendor\n\
        /*      @org/root\n";

    #[test]
    fn test_parse_defaults() {
        let patterns = parse(SOURCE, &ParseOptions::default());
        assert_eq!(globs(&patterns.owned), vec!["*", "src/", "docs/**", "*"]);
        assert!(patterns.unowned.is_empty());
    }

    #[test]
    fn test_parse_ignore_default() {
        let options = ParseOptions {
            ignore_default: true,
            ..Default::default()
        };
        let patterns = parse(SOURCE, &options);
        assert_eq!(globs(&patterns.owned), vec!["src/", "docs/**"]);
    }

    #[test]
    fn test_parse_unowned() {
        let options = ParseOptions {
            parse_unowned: true,
            ..Default::default()
        };
        let patterns = parse(SOURCE, &options);
        assert_eq!(globs(&patterns.unowned), vec!["build/**", "vendor"]);
        assert_eq!(patterns.owned.len(), 4);
    }

    #[test]
    fn test_parse_indented_and_crlf_lines() {
        let patterns = parse("  lib/*.rs @a\r\n\t#comment\r\n", &ParseOptions::default());
        assert_eq!(globs(&patterns.owned), vec!["lib/*.rs"]);
    }

    #[test]
    fn test_locate_prefers_root_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".github")).unwrap();
        fs::write(dir.path().join(".github/CODEOWNERS"), "nested @a\n").unwrap();

        let manifest = Manifest::locate(dir.path()).unwrap();
        assert_eq!(manifest.path, dir.path().join(".github/CODEOWNERS"));
        assert_eq!(manifest.source, "nested @a\n");

        fs::write(dir.path().join("CODEOWNERS"), "root @a\n").unwrap();
        let manifest = Manifest::locate(dir.path()).unwrap();
        assert_eq!(manifest.path, dir.path().join("CODEOWNERS"));
    }

    #[test]
    fn test_locate_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::locate(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "No CODEOWNERS file found");
        assert!(matches!(err, Error::ManifestNotFound { searched } if searched.len() == 2));
    }
}
