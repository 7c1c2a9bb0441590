use tracing::warn;

use crate::{patternset::Builder, patternset::PatternSet, Result};

/// How a pattern is anchored to the scan root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Every pattern is relative to the scan root. Used for the scan scope
    /// and for manifest patterns.
    Glob,
    /// A pattern without a `/` (other than a trailing one) matches at any
    /// depth, as in `.gitignore` files.
    Gitignore,
}

/// A single glob, optionally negated with a leading `!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub glob: String,
    pub negated: bool,
}

impl Pattern {
    pub fn parse(source: &str) -> Pattern {
        match source.strip_prefix('!') {
            Some(glob) => Pattern {
                glob: glob.to_owned(),
                negated: true,
            },
            None => Pattern {
                glob: source.to_owned(),
                negated: false,
            },
        }
    }
}

/// An ordered list of patterns in one syntax. When expanded, a path is
/// selected if the last pattern matching it isn't negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternList {
    syntax: Syntax,
    patterns: Vec<Pattern>,
}

impl PatternList {
    pub fn new(syntax: Syntax) -> Self {
        Self {
            syntax,
            patterns: Vec::new(),
        }
    }

    /// Build a list from newline separated text, skipping blank lines and
    /// `#` comments.
    pub fn from_lines(syntax: Syntax, source: &str) -> Self {
        let mut list = Self::new(syntax);
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            list.push(line);
        }
        list
    }

    pub fn push(&mut self, source: &str) {
        let pattern = Pattern::parse(source);
        if !pattern.glob.is_empty() {
            self.patterns.push(pattern);
        }
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Drop every pattern that fails to compile, logging a warning for
    /// each. The remaining patterns keep their order.
    pub fn without_invalid(mut self) -> Self {
        let syntax = self.syntax;
        self.patterns
            .retain(|pattern| match Builder::new(syntax).add(pattern) {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %err, "skipping pattern");
                    false
                }
            });
        self
    }

    /// Compile the list into a matcher.
    pub fn compile(&self) -> Result<PatternSet> {
        let mut builder = Builder::new(self.syntax);
        for pattern in &self.patterns {
            builder.add(pattern)?;
        }
        Ok(builder.build())
    }
}

impl<'a> Extend<&'a str> for PatternList {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for source in iter {
            self.push(source);
        }
    }
}
