use crate::{
    pattern::{Pattern, Syntax},
    Result,
};

use super::{
    nfa::{Nfa, StateId, Transition},
    PatternSet,
};

/// Builder for a [`PatternSet`]. Calling [`Builder::build`] will consume the
/// builder.
#[derive(Clone)]
pub struct Builder {
    nfa: Nfa,
    syntax: Syntax,
    negated: Vec<bool>,
}

impl Builder {
    pub fn new(syntax: Syntax) -> Self {
        Self {
            nfa: Nfa::new(),
            syntax,
            negated: Vec::new(),
        }
    }

    pub fn build(self) -> PatternSet {
        PatternSet::new(self.nfa, self.negated)
    }

    /// Add a pattern to the builder, returning its id. Ids follow insertion
    /// order, so a higher id means a later pattern.
    pub fn add(&mut self, pattern: &Pattern) -> Result<usize> {
        let pattern_id = self.negated.len();
        self.negated.push(pattern.negated);

        let glob = pattern.glob.strip_prefix("./").unwrap_or(&pattern.glob);

        // A leading slash anchors gitignore patterns. Glob patterns are
        // always anchored, so there it's just noise.
        let (glob, leading_slash) = match glob.strip_prefix('/') {
            Some(glob) => (glob, true),
            None => (glob, false),
        };

        // A trailing slash only matches directories. Candidates are files,
        // so the pattern needs at least one more segment below it.
        let (glob, trailing_slash) = match glob.strip_suffix('/') {
            Some(glob) => (glob, true),
            None => (glob, false),
        };

        let segments = glob
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>();
        if segments.is_empty() {
            return Ok(pattern_id);
        }

        let mut start_state_id = Nfa::START_STATE;
        if self.syntax == Syntax::Gitignore && !leading_slash && segments.len() == 1 {
            start_state_id = self.add_epsilon_transition(Nfa::START_STATE);
        }

        let mut end_state_id = start_state_id;
        for segment in &segments {
            end_state_id = match *segment {
                "**" => self.add_epsilon_transition(end_state_id),
                _ => self.add_transition(end_state_id, segment)?,
            };
        }

        // A trailing /** matches everything under the directory but not the
        // directory itself, so it needs one more segment. Same for a
        // trailing slash.
        if trailing_slash || segments.last() == Some(&"**") {
            end_state_id = self.add_transition(end_state_id, "*")?;
        }

        // Every match includes the descendants of the matched path.
        end_state_id = self.add_epsilon_transition(end_state_id);

        self.nfa.state_mut(end_state_id).mark_as_terminal(pattern_id);

        Ok(pattern_id)
    }

    // Add a regular (non-epsilon) transition from a given state via the
    // provided path segment, reusing an existing one for the same segment.
    fn add_transition(&mut self, from_id: StateId, segment: &str) -> Result<StateId> {
        let existing_transition = self
            .nfa
            .transitions_from(from_id)
            .find(|t| t.path_segment == segment && t.target != from_id);
        if let Some(t) = existing_transition {
            return Ok(t.target);
        }

        let state_id = self.nfa.add_state();
        let transition = Transition::new(segment.to_owned(), state_id)?;
        self.nfa.state_mut(from_id).add_transition(transition);
        Ok(state_id)
    }

    // Add an epsilon transition to a state with a `*` self loop. Consecutive
    // double stars collapse into one state, and an existing epsilon
    // transition is reused.
    fn add_epsilon_transition(&mut self, from_id: StateId) -> StateId {
        let is_double_star_state = self
            .nfa
            .transitions_from(from_id)
            .any(|t| t.path_segment == "*" && t.target == from_id);
        if is_double_star_state {
            return from_id;
        }

        match self.nfa.epsilon_transition_from(from_id) {
            Some(to_id) => to_id,
            None => {
                let state_id = self.nfa.add_state();
                self.nfa
                    .state_mut(state_id)
                    .add_transition(Transition::any(state_id));
                self.nfa.state_mut(from_id).epsilon_transition = Some(state_id);
                state_id
            }
        }
    }
}
