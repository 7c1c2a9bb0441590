use std::{collections::HashSet, fs, path::Path, path::PathBuf};

use tracing::{debug, info};

use crate::{
    expand::{Expand, FileTree},
    manifest::{self, Manifest, ParseOptions},
    pattern::{PatternList, Syntax},
    report::{Annotation, Level, Reporter},
    Result,
};

/// The ignore file read from the repository root.
pub const IGNORE_FILE: &str = ".gitignore";

/// The version control directory left out of the scan by default.
pub const VCS_DIR: &str = ".git";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Glob patterns limiting the scan. Empty means every file.
    pub files: Vec<String>,
    /// Leave files matched by `.gitignore` out of the computation.
    pub include_gitignore: bool,
    /// Scan the `.git` directory too.
    pub include_git: bool,
    /// Don't let a `*` rule count towards coverage.
    pub ignore_default: bool,
    /// Leave files matched by `#?` manifest lines out of the computation.
    pub parse_unowned_files: bool,
    /// Read this manifest instead of searching the usual locations.
    pub manifest_path: Option<PathBuf>,
}

impl Options {
    /// Set the scan scope from a space separated pattern string.
    pub fn with_files(mut self, files: &str) -> Self {
        self.files = files.split_whitespace().map(str::to_owned).collect();
        self
    }

    fn scan_patterns(&self) -> PatternList {
        let mut patterns = PatternList::new(Syntax::Glob);
        if self.files.is_empty() {
            patterns.push("*");
        } else {
            patterns.extend(self.files.iter().map(String::as_str));
        }
        if !self.include_git {
            patterns.push(&format!("!{}", VCS_DIR));
        }
        patterns
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            parse_unowned: self.parse_unowned_files,
            ignore_default: self.ignore_default,
        }
    }
}

/// The file sets of one coverage computation. Every set is in scan order
/// and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Every file in scope.
    pub all_files: Vec<String>,
    /// Every file matched by a manifest pattern, in scope or not.
    pub manifest_files: Vec<String>,
    /// Files in scope matched by a manifest pattern.
    pub codeowners_files: Vec<String>,
    /// Files matched by the ignore file.
    pub ignored_files: Vec<String>,
    /// Files matched by `#?` manifest lines.
    pub unowned_files: Vec<String>,
    /// Files that count towards coverage.
    pub all_files_clean: Vec<String>,
    pub files_covered: Vec<String>,
    pub files_not_covered: Vec<String>,
}

impl Coverage {
    /// Percentage of counted files that are covered. With nothing to count,
    /// nothing is uncovered, so that's 100%.
    pub fn percent(&self) -> f64 {
        if self.all_files_clean.is_empty() {
            return 100.0;
        }
        100.0 * self.files_covered.len() as f64 / self.all_files_clean.len() as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{}({:.2}%) files covered by CODEOWNERS",
            self.files_covered.len(),
            self.all_files_clean.len(),
            self.percent()
        )
    }

    pub fn is_complete(&self) -> bool {
        self.files_not_covered.is_empty()
    }
}

/// Compute coverage from already loaded inputs. `ignore_source` is the
/// content of the ignore file, if there is one.
pub fn reconcile(
    expander: &impl Expand,
    manifest_source: &str,
    ignore_source: Option<&str>,
    options: &Options,
) -> Result<Coverage> {
    let all_files = expander.expand(&options.scan_patterns())?;
    let all_set = to_set(&all_files);
    debug!(files = all_files.len(), "expanded scan scope");

    let patterns = manifest::parse(manifest_source, &options.parse_options());
    let manifest_files = expander.expand(&patterns.owned)?;
    debug!(files = manifest_files.len(), "expanded CODEOWNERS patterns");
    let codeowners_files = manifest_files
        .iter()
        .filter(|file| all_set.contains(file.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    // A broken ignore line only loses that line.
    let ignored_files = match ignore_source {
        Some(source) => expander
            .expand(&PatternList::from_lines(Syntax::Gitignore, source).without_invalid())?,
        None => Vec::new(),
    };
    let unowned_files = expander.expand(&patterns.unowned)?;

    let ignored_set = to_set(&ignored_files);
    let unowned_set = to_set(&unowned_files);
    let counts = |file: &String| {
        !(options.include_gitignore && ignored_set.contains(file.as_str()))
            && !unowned_set.contains(file.as_str())
    };

    let all_files_clean = all_files
        .iter()
        .filter(|f| counts(*f))
        .cloned()
        .collect::<Vec<_>>();
    let mut files_covered = codeowners_files
        .iter()
        .filter(|f| counts(*f))
        .cloned()
        .collect::<Vec<_>>();
    let clean_set = to_set(&all_files_clean);
    if !options.files.is_empty() {
        files_covered.retain(|file| clean_set.contains(file.as_str()));
    }

    let covered_set = to_set(&files_covered);
    let files_not_covered = all_files_clean
        .iter()
        .filter(|file| !covered_set.contains(file.as_str()))
        .cloned()
        .collect();

    Ok(Coverage {
        all_files,
        manifest_files,
        codeowners_files,
        ignored_files,
        unowned_files,
        all_files_clean,
        files_covered,
        files_not_covered,
    })
}

/// Run a coverage check over the repository at `root`, sending everything
/// worth reporting to `reporter`. A missing manifest fails before anything
/// is scanned. An explicit `manifest_path` is used as given, so a relative
/// one resolves against the working directory rather than `root`.
pub fn run(root: &Path, options: &Options, reporter: &mut dyn Reporter) -> Result<Coverage> {
    let manifest = match &options.manifest_path {
        Some(path) => Manifest::read_first(vec![path.clone()])?,
        None => Manifest::locate(root)?,
    };
    reporter.group("CODEOWNERS File", &manifest.source);

    let ignore_source = read_ignore_file(root);
    if ignore_source.is_none() {
        reporter.report(Level::Info, "No .gitignore file found", &Annotation::default());
    }

    let tree = FileTree::new(root);
    let coverage = reconcile(&tree, &manifest.source, ignore_source.as_deref(), options)?;

    let manifest_file = manifest
        .path
        .strip_prefix(root)
        .unwrap_or(&manifest.path)
        .to_string_lossy()
        .into_owned();
    emit_reports(&coverage, ignore_source.is_some(), &manifest_file, reporter);
    Ok(coverage)
}

fn read_ignore_file(root: &Path) -> Option<String> {
    let path = root.join(IGNORE_FILE);
    match fs::read_to_string(&path) {
        Ok(source) => Some(source),
        Err(err) => {
            info!(path = %path.display(), error = %err, "no ignore file");
            None
        }
    }
}

fn emit_reports(
    coverage: &Coverage,
    has_ignore_file: bool,
    manifest_file: &str,
    reporter: &mut dyn Reporter,
) {
    reporter.group(
        &format!("All Files: {}", coverage.all_files.len()),
        &to_json(&coverage.all_files),
    );
    reporter.group(
        &format!("CODEOWNERS Files: {}", coverage.manifest_files.len()),
        &to_json(&coverage.manifest_files),
    );
    reporter.report(
        Level::Info,
        &format!("CODEOWNERS Files in All Files: {}", coverage.codeowners_files.len()),
        &Annotation::default(),
    );
    if has_ignore_file {
        reporter.report(
            Level::Info,
            &format!(".gitignore Files: {}", coverage.ignored_files.len()),
            &Annotation::default(),
        );
    }
    if !coverage.unowned_files.is_empty() {
        reporter.group(
            &format!("Unowned Files: {}", coverage.unowned_files.len()),
            &to_json(&coverage.unowned_files),
        );
    }

    reporter.report(
        Level::Notice,
        &coverage.summary(),
        &Annotation::new("Coverage").with_file(manifest_file),
    );

    for file in &coverage.files_not_covered {
        reporter.report(
            Level::Error,
            &format!("File not covered by CODEOWNERS: {}", file),
            &Annotation::new("CODEOWNERS coverage").with_file(file.as_str()),
        );
    }
    if !coverage.is_complete() {
        reporter.report(
            Level::Error,
            &format!(
                "Files not covered by CODEOWNERS: \n{}",
                coverage.files_not_covered.join("\n")
            ),
            &Annotation::default(),
        );
    }
}

fn to_set(files: &[String]) -> HashSet<&str> {
    files.iter().map(String::as_str).collect()
}

fn to_json(files: &[String]) -> String {
    serde_json::to_string(files).unwrap_or_default()
}
