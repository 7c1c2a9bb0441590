//! Glob matching over `/`-separated paths. Patterns are compiled segment by
//! segment into one NFA, and candidate paths are matched together through a
//! prefix tree so shared directories are only stepped through once.

mod builder;
mod nfa;
mod tree_matcher;

pub use self::builder::Builder;
pub use self::tree_matcher::PatternSet;
