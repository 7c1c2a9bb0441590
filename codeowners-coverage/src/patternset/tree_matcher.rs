use std::collections::HashSet;

use crate::path_tree::PathTree;

use super::nfa::{Nfa, StateId};

/// A compiled pattern list. Matches many paths at once by walking a
/// [`PathTree`] of the candidates alongside the NFA. Created using a
/// [`super::Builder`].
#[derive(Clone)]
pub struct PatternSet {
    nfa: Nfa,
    negated: Vec<bool>,
}

impl PatternSet {
    pub(crate) fn new(nfa: Nfa, negated: Vec<bool>) -> PatternSet {
        Self { nfa, negated }
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.negated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.negated.is_empty()
    }

    /// Select the candidates whose last matching pattern isn't negated,
    /// keeping candidate order and dropping duplicates.
    pub fn expand<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        let matches = self.matches_for_paths(candidates);
        let mut seen = HashSet::new();
        candidates
            .iter()
            .zip(matches)
            .filter(|(_, ids)| matches!(ids.iter().max(), Some(&id) if !self.negated[id]))
            .map(|(path, _)| path.as_ref())
            .filter(|path| seen.insert(*path))
            .map(str::to_owned)
            .collect()
    }

    /// Match many paths against the patterns in the set. Returns, for each
    /// input path, the ids of the patterns matching it. The pattern ids
    /// match the order in which the patterns were added to the builder.
    pub fn matches_for_paths<S: AsRef<str>>(&self, paths: &[S]) -> Vec<Vec<usize>> {
        let mut matches = vec![Vec::new(); paths.len()];
        if self.is_empty() {
            return matches;
        }

        let tree = PathTree::from_paths(paths.iter().map(|path| path.as_ref()));
        let mut stack = vec![(self.nfa.initial_states(), PathTree::root_id())];
        while let Some((states, node_id)) = stack.pop() {
            let node = tree.node(node_id);
            // The root node holds paths with no segments at all, which
            // nothing should match.
            if !node.paths.is_empty() && node_id != PathTree::root_id() {
                let matching_patterns = states
                    .iter()
                    .flat_map(|&id| self.nfa.state(id).terminal_for_patterns.iter().copied())
                    .collect::<Vec<_>>();
                for &path_idx in &node.paths {
                    matches[path_idx].extend(matching_patterns.iter().copied());
                }
            }

            for (segment, &child_id) in &node.children {
                let next_states = self.next_states(segment, &states);
                if !next_states.is_empty() {
                    stack.push((next_states, child_id));
                }
            }
        }
        matches
    }

    // Step every current state through the NFA by one path segment, then
    // follow epsilon edges.
    fn next_states(&self, segment: &str, from_states: &[StateId]) -> Vec<StateId> {
        let mut next_states = Vec::new();
        for &state_id in from_states {
            for transition in self.nfa.transitions_from(state_id) {
                if transition.is_match(segment) && !next_states.contains(&transition.target) {
                    next_states.push(transition.target);
                }
            }
        }

        let epsilon_states = next_states
            .iter()
            .filter_map(|&state_id| self.nfa.epsilon_transition_from(state_id))
            .collect::<Vec<_>>();
        for state_id in epsilon_states {
            if !next_states.contains(&state_id) {
                next_states.push(state_id);
            }
        }
        next_states
    }
}

impl std::fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternSet")
            .field("patterns", &self.len())
            .finish()
    }
}
