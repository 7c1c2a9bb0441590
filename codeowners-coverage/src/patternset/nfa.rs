use crate::{Error, Result};

/// A nondeterministic automaton over path segments. Each transition consumes
/// one path segment; epsilon transitions consume nothing and always point at
/// a state with a `*` self loop, which is how `**` is represented.
#[derive(Clone)]
pub(crate) struct Nfa {
    states: Vec<State>,
}

impl Nfa {
    pub(crate) const START_STATE: StateId = StateId(0);

    pub(crate) fn new() -> Self {
        Self {
            states: vec![State::new()],
        }
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new());
        StateId(id as u32)
    }

    #[inline]
    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[usize::from(id)]
    }

    #[inline]
    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[usize::from(id)]
    }

    pub(crate) fn initial_states(&self) -> Vec<StateId> {
        let mut states = vec![Self::START_STATE];
        if let Some(epsilon_node_id) = self.state(Self::START_STATE).epsilon_transition {
            states.push(epsilon_node_id);
        }
        states
    }

    pub(crate) fn transitions_from(&self, state_id: StateId) -> impl Iterator<Item = &Transition> {
        self.state(state_id).transitions.iter()
    }

    pub(crate) fn epsilon_transition_from(&self, state_id: StateId) -> Option<StateId> {
        self.state(state_id).epsilon_transition
    }

    #[cfg(test)]
    pub(crate) fn states_iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct StateId(pub(crate) u32);

impl From<StateId> for usize {
    fn from(id: StateId) -> usize {
        id.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) terminal_for_patterns: Vec<usize>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) epsilon_transition: Option<StateId>,
}

impl State {
    fn new() -> Self {
        Self {
            terminal_for_patterns: Vec::new(),
            transitions: Vec::new(),
            epsilon_transition: None,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        !self.terminal_for_patterns.is_empty()
    }

    pub(crate) fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub(crate) fn mark_as_terminal(&mut self, pattern_id: usize) {
        self.terminal_for_patterns.push(pattern_id);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transition {
    pub(crate) path_segment: String,
    condition: SegmentCondition,
    pub(crate) target: StateId,
}

impl Transition {
    pub(crate) fn new(path_segment: String, target: StateId) -> Result<Transition> {
        let condition = SegmentCondition::new(&path_segment)?;
        Ok(Self {
            path_segment,
            condition,
            target,
        })
    }

    /// The `*` transition used for the self loop of `**` states.
    pub(crate) fn any(target: StateId) -> Transition {
        Self {
            path_segment: "*".to_owned(),
            condition: SegmentCondition::Unconditional,
            target,
        }
    }

    pub(crate) fn is_match(&self, candidate: &str) -> bool {
        self.condition.is_match(candidate)
    }
}

// Most segments in real manifests are literals or have a single leading or
// trailing star, so those get string comparisons instead of a regex.
#[derive(Debug, Clone)]
enum SegmentCondition {
    Unconditional,
    Literal(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Regex(regex::Regex),
}

impl SegmentCondition {
    fn new(glob: &str) -> Result<Self> {
        if glob == "*" {
            return Ok(Self::Unconditional);
        }
        if glob.contains(['\\', '?', '[']) {
            return segment_to_regex(glob).map(Self::Regex);
        }

        let inner = glob.trim_matches('*');
        if inner.contains('*') {
            return segment_to_regex(glob).map(Self::Regex);
        }

        let leading_star = glob.starts_with('*');
        let trailing_star = glob.ends_with('*');
        Ok(match (leading_star, trailing_star) {
            (false, false) => Self::Literal(inner.to_owned()),
            (false, true) => Self::Prefix(inner.to_owned()),
            (true, false) => Self::Suffix(inner.to_owned()),
            (true, true) => Self::Contains(inner.to_owned()),
        })
    }

    fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Literal(literal) => literal == candidate,
            Self::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Self::Contains(needle) => {
                memchr::memmem::find(candidate.as_bytes(), needle.as_bytes()).is_some()
            }
            Self::Regex(re) => re.is_match(candidate),
        }
    }
}

fn segment_to_regex(segment: &str) -> Result<regex::Regex> {
    let mut regex = String::with_capacity(segment.len() + 8);
    regex.push_str(r"\A");
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str(r"[^/]*"),
            '?' => regex.push_str(r"[^/]"),
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut regex, escaped),
                None => push_literal(&mut regex, '\\'),
            },
            '[' => match class_end(chars.clone()) {
                Some(len) => {
                    let class = chars.by_ref().take(len).collect::<String>();
                    chars.next(); // closing bracket
                    push_class(&mut regex, &class);
                }
                None => push_literal(&mut regex, '['),
            },
            _ => push_literal(&mut regex, c),
        }
    }
    regex.push_str(r"\z");
    regex::Regex::new(&regex).map_err(|source| Error::InvalidPattern {
        pattern: segment.to_owned(),
        source,
    })
}

fn push_literal(regex: &mut String, c: char) {
    if regex_syntax::is_meta_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}

// Length of a bracket expression body, given the characters after `[`. A `]`
// directly after the opening bracket (or its negation) is part of the class.
fn class_end(chars: impl Iterator<Item = char>) -> Option<usize> {
    let mut first = true;
    for (idx, c) in chars.enumerate() {
        match c {
            '!' | '^' if idx == 0 => continue,
            ']' if !first => return Some(idx),
            '/' => return None,
            _ => first = false,
        }
    }
    None
}

fn push_class(regex: &mut String, class: &str) {
    regex.push('[');
    let body = match class.strip_prefix(['!', '^']) {
        Some(rest) => {
            regex.push('^');
            rest
        }
        None => class,
    };
    for c in body.chars() {
        match c {
            '[' | ']' | '\\' | '&' | '~' | '^' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push(']');
}
