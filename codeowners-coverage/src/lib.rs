//! Measure how much of a repository is covered by its CODEOWNERS file.
//!
//! [`coverage::reconcile`] is the pure computation: it expands the scan
//! scope, the manifest patterns, the ignore file and the `#?` unowned
//! patterns through an [`Expand`] implementation and partitions the files in
//! scope into covered and uncovered. [`coverage::run`] wraps it with the
//! filesystem and a [`Reporter`].
//!
//! ```
//! use codeowners_coverage::{coverage, FileList, Options};
//!
//! let files = FileList::new(["src/main.rs", "README.md"]);
//! let result = coverage::reconcile(&files, "src/ @dev\n", None, &Options::default()).unwrap();
//! assert_eq!(result.files_not_covered, vec!["README.md"]);
//! assert_eq!(result.summary(), "1/2(50.00%) files covered by CODEOWNERS");
//! ```

pub mod coverage;
mod error;
pub mod expand;
pub mod manifest;
mod path_tree;
pub mod pattern;
pub mod patternset;
pub mod report;

pub use coverage::{Coverage, Options};
pub use error::{Error, Result};
pub use expand::{Expand, FileList, FileTree};
pub use manifest::Manifest;
pub use pattern::{Pattern, PatternList, Syntax};
pub use report::{Annotation, Level, Reporter};
