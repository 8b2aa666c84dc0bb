//! Longest-match separator resolution over a small lookahead window

use crate::config::ParserConfig;

/// Separator kinds the automaton reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    Field,
    Line,
}

/// Outcome of inspecting the unresolved characters at the head of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The window is a proper prefix of some separator; more input is needed
    Wait,
    /// The window starts with a separator of this kind and length (in chars)
    Separator(Separator, usize),
    /// The first character is ordinary content
    Char,
}

/// Matches configured field and line separators.
///
/// Entries are kept in priority order (field separators first, each set in
/// configured order) so that equal-length matches resolve to the first one.
#[derive(Debug, Clone)]
pub(crate) struct SeparatorMatcher {
    entries: Vec<(Vec<char>, Separator)>,
    heads: Vec<char>,
}

impl SeparatorMatcher {
    pub(crate) fn new(config: &ParserConfig) -> Self {
        let entries: Vec<(Vec<char>, Separator)> = config
            .field_separators()
            .iter()
            .map(|s| (s.chars().collect(), Separator::Field))
            .chain(
                config
                    .line_separators()
                    .iter()
                    .map(|s| (s.chars().collect(), Separator::Line)),
            )
            .collect();

        let mut heads = Vec::new();
        for (chars, _) in &entries {
            if let Some(&head) = chars.first() {
                if !heads.contains(&head) {
                    heads.push(head);
                }
            }
        }

        Self { entries, heads }
    }

    /// First characters of all separators
    pub(crate) fn heads(&self) -> &[char] {
        &self.heads
    }

    /// Resolve the head of `window`.
    ///
    /// Unless `at_end` is set, a window that could still grow into a longer
    /// separator is left unresolved.
    pub(crate) fn resolve(&self, window: &[char], at_end: bool) -> Resolution {
        if window.is_empty() {
            return Resolution::Wait;
        }

        if !at_end && self.could_extend(window) {
            return Resolution::Wait;
        }

        let mut best: Option<(usize, Separator)> = None;
        for (chars, kind) in &self.entries {
            if window.starts_with(chars) && best.map_or(true, |(len, _)| chars.len() > len) {
                best = Some((chars.len(), *kind));
            }
        }

        match best {
            Some((len, kind)) => Resolution::Separator(kind, len),
            None => Resolution::Char,
        }
    }

    fn could_extend(&self, window: &[char]) -> bool {
        self.entries
            .iter()
            .any(|(chars, _)| chars.len() > window.len() && chars.starts_with(window))
    }
}
