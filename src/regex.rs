//! Thompson construction: regular expression to NFA.
//!
//! ```text
//! Char  : NORMAL
//!       : '\' CHAR
//! Atom  : Char
//!       : '(' Alt ')'
//! Rep   : Atom
//!       : Rep '*' | Rep '+' | Rep '?'
//! Cat   :
//!       : Rep Cat
//! Alt   : Cat
//!       : Cat '|' Alt
//! ```
//!
//! Bracket sets (`[...]`) are rejected outright.

use crate::automaton::{Automaton, Kind, StateId, Symbol};
use bit_set::BitSet;
use thiserror::Error;
use vec_map::VecMap;

/// Why a pattern could not be turned into an automaton. Offsets count
/// characters, not bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("bracket expressions are not supported: `{1}` at offset {0}")]
    UnsupportedBracket(usize, char),
    #[error("unmatched '(' at offset {0}")]
    UnmatchedOpen(usize),
    #[error("unmatched ')' at offset {0}")]
    UnmatchedClose(usize),
    #[error("nothing to repeat: `{1}` at offset {0}")]
    NothingToRepeat(usize, char),
    #[error("unfollowed '\\' at offset {0}")]
    DanglingEscape(usize),
}

impl ParseError {
    /// Errors that come from constructs this crate deliberately does not
    /// implement, as opposed to patterns that are simply ill-formed.
    pub fn is_unsupported(&self) -> bool {
        matches!(*self, ParseError::UnsupportedBracket(..))
    }
}

/// A piece of NFA with a single entry and a single accepting exit.
#[derive(Copy, Clone, Debug)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// One level of parenthesis nesting.
#[derive(Default)]
struct Frame {
    alternatives: Vec<Fragment>,
    sequence: Vec<Fragment>,
}

struct Builder {
    nfa: Automaton,
}

impl Builder {
    fn state(&mut self, accepting: bool) -> StateId {
        self.nfa.add_state(Kind::Nfa, accepting)
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.nfa.add_edge(from, to, Symbol::Epsilon);
    }

    /// The empty-string fragment: one state that is both entry and exit.
    fn empty(&mut self) -> Fragment {
        let s = self.state(true);
        Fragment { start: s, end: s }
    }

    fn literal(&mut self, c: char) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.nfa.add_edge(start, end, Symbol::Char(c));
        Fragment { start, end }
    }

    fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.nfa.set_accepting(a.end, false);
        self.epsilon(a.end, b.start);
        Fragment { start: a.start, end: b.end }
    }

    fn alternate(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.epsilon(start, a.start);
        self.epsilon(start, b.start);
        for f in [a, b] {
            self.nfa.set_accepting(f.end, false);
            self.epsilon(f.end, end);
        }
        Fragment { start, end }
    }

    fn closure(&mut self, f: Fragment) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.epsilon(start, f.start);
        self.epsilon(start, end);
        self.nfa.set_accepting(f.end, false);
        self.epsilon(f.end, end);
        self.epsilon(f.end, f.start);
        Fragment { start, end }
    }

    fn plus(&mut self, f: Fragment) -> Fragment {
        let end = self.state(true);
        self.nfa.set_accepting(f.end, false);
        self.epsilon(f.end, f.start);
        self.epsilon(f.end, end);
        Fragment { start: f.start, end }
    }

    fn optional(&mut self, f: Fragment) -> Fragment {
        let start = self.state(false);
        let end = self.state(true);
        self.epsilon(start, f.start);
        self.epsilon(start, end);
        self.nfa.set_accepting(f.end, false);
        self.epsilon(f.end, end);
        Fragment { start, end }
    }

    /// Concatenates a whole sequence, pairing from the right.
    fn sequence(&mut self, fragments: Vec<Fragment>) -> Fragment {
        let mut it = fragments.into_iter().rev();
        let mut acc = match it.next() {
            Some(f) => f,
            None => return self.empty(),
        };
        for f in it {
            acc = self.concat(f, acc);
        }
        acc
    }

    /// Closes a group: `a|b|c` becomes `a|(b|c)`.
    fn finish(&mut self, frame: Frame) -> Fragment {
        let mut acc = self.sequence(frame.sequence);
        for f in frame.alternatives.into_iter().rev() {
            acc = self.alternate(f, acc);
        }
        acc
    }

    fn repeat(&mut self, frame: &mut Frame, offset: usize, op: char) -> Result<(), ParseError> {
        let f = frame.sequence.pop().ok_or(ParseError::NothingToRepeat(offset, op))?;
        let f = match op {
            '*' => self.closure(f),
            '+' => self.plus(f),
            _ => self.optional(f),
        };
        frame.sequence.push(f);
        Ok(())
    }

    fn parse(mut self, pattern: &str) -> Result<Automaton, ParseError> {
        if let Some((offset, c)) = pattern.chars().enumerate().find(|&(_, c)| c == '[' || c == ']') {
            return Err(ParseError::UnsupportedBracket(offset, c));
        }

        let mut root = Frame::default();
        // open groups, innermost last, with the offset of their '('
        let mut groups: Vec<(usize, Frame)> = Vec::new();
        let mut chars = pattern.chars().enumerate();
        while let Some((offset, c)) = chars.next() {
            match c {
                '(' => groups.push((offset, Frame::default())),
                ')' => {
                    let (_, group) = groups.pop().ok_or(ParseError::UnmatchedClose(offset))?;
                    let f = self.finish(group);
                    current(&mut root, &mut groups).sequence.push(f);
                }
                '|' => {
                    let frame = current(&mut root, &mut groups);
                    let seq = std::mem::take(&mut frame.sequence);
                    let f = self.sequence(seq);
                    frame.alternatives.push(f);
                }
                '*' | '+' | '?' => self.repeat(current(&mut root, &mut groups), offset, c)?,
                '\\' => {
                    let c = match chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, c)) => c,
                        None => return Err(ParseError::DanglingEscape(offset)),
                    };
                    let f = self.literal(c);
                    current(&mut root, &mut groups).sequence.push(f);
                }
                c => {
                    let f = self.literal(c);
                    current(&mut root, &mut groups).sequence.push(f);
                }
            }
        }

        if let Some(&(offset, _)) = groups.first() {
            return Err(ParseError::UnmatchedOpen(offset));
        }
        let f = self.finish(root);
        self.nfa.set_start(f.start);
        Ok(self.nfa)
    }
}

fn current<'a>(root: &'a mut Frame, groups: &'a mut [(usize, Frame)]) -> &'a mut Frame {
    match groups.last_mut() {
        Some((_, frame)) => frame,
        None => root,
    }
}

/// Builds the Thompson NFA for `pattern`. The result has one start state and
/// exactly one accepting state.
pub fn build(pattern: &str) -> Result<Automaton, ParseError> {
    Builder { nfa: Automaton::new() }.parse(pattern)
}

/// Reverses every edge reachable from the root of `fa` and returns the
/// reversed graph together with the states a run of it starts from: the old
/// accepting states. The old root becomes the only accepting state. No start
/// state is chosen; the returned automaton keeps the old root as its start.
pub fn reverse_edges(fa: &Automaton) -> (Automaton, BitSet) {
    let view = fa.view();
    let mut rev = Automaton::new();
    let mut index: VecMap<StateId> = VecMap::with_capacity(fa.len());
    for &id in &view.states {
        index.insert(id, rev.add_state(Kind::Nfa, id == fa.start()));
    }
    for edge in &view.edges {
        rev.add_labeled_edge(index[edge.target], index[edge.source], &edge.label);
    }
    if let Some(&root) = index.get(fa.start()) {
        rev.set_start(root);
    }
    let initial = view.accepting.iter().map(|old| index[old]).collect();
    (rev, initial)
}

/// Reverses every edge reachable from the root of `fa`.
///
/// The old root becomes the only accepting state. If `fa` has exactly one
/// accepting state it becomes the new start; otherwise a fresh start state
/// with epsilon edges to each old accepting state is added.
pub fn reverse(fa: &Automaton) -> Automaton {
    let (mut rev, initial) = reverse_edges(fa);
    let start = match initial.len() {
        1 => initial.iter().next().unwrap_or_default(),
        _ => {
            let s = rev.add_state(Kind::Nfa, false);
            for old in initial.iter() {
                rev.add_edge(s, old, Symbol::Epsilon);
            }
            s
        }
    };
    rev.set_start(start);
    rev
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepting_count(fa: &Automaton) -> usize {
        fa.view().accepting.len()
    }

    #[test]
    fn test_single_accepting_state() {
        for pattern in &["", "a", "ab", "a|b", "a*", "a+", "a?", "(ab)*c", "a(b|c)*", "((a|)|b)+", "()"] {
            let nfa = build(pattern).unwrap();
            assert_eq!(accepting_count(&nfa), 1, "{}", pattern);
        }
    }

    #[test]
    fn test_literal_shape() {
        let nfa = build("a").unwrap();
        assert_eq!(nfa.len(), 2);
        assert_eq!(nfa.state(nfa.start()).next(Symbol::Char('a')), Some(1));
        assert!(nfa.state(1).accepting);
    }

    #[test]
    fn test_empty_pattern() {
        let nfa = build("").unwrap();
        assert_eq!(nfa.len(), 1);
        assert!(nfa.state(nfa.start()).accepting);
        assert!(nfa.state(nfa.start()).edges.is_empty());
        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_parse_error() {
        assert_eq!(build("a(b").unwrap_err(), ParseError::UnmatchedOpen(1));
        assert_eq!(build("(()").unwrap_err(), ParseError::UnmatchedOpen(0));
        assert_eq!(build("a)").unwrap_err(), ParseError::UnmatchedClose(1));
        assert_eq!(build(")(").unwrap_err(), ParseError::UnmatchedClose(0));
        assert_eq!(build("*a").unwrap_err(), ParseError::NothingToRepeat(0, '*'));
        assert_eq!(build("a|+").unwrap_err(), ParseError::NothingToRepeat(2, '+'));
        assert_eq!(build("ab\\").unwrap_err(), ParseError::DanglingEscape(2));
        assert_eq!(build("[a-z]").unwrap_err(), ParseError::UnsupportedBracket(0, '['));
        assert_eq!(build("(a[b").unwrap_err(), ParseError::UnsupportedBracket(2, '['));
        assert!(build("a]").unwrap_err().is_unsupported());
        assert!(!build("(").unwrap_err().is_unsupported());
    }

    #[test]
    fn test_escapes() {
        let nfa = build("\\(\\*\\n").unwrap();
        assert!(nfa.accepts("(*\n"));
        assert!(!nfa.accepts("("));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 20_000;
        let pattern = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let nfa = build(&pattern).unwrap();
        assert!(nfa.accepts("a"));
    }

    #[test]
    fn test_reverse() {
        let nfa = build("ab").unwrap();
        let rev = reverse(&nfa);
        assert!(rev.accepts("ba"));
        assert!(!rev.accepts("ab"));
        assert_eq!(accepting_count(&rev), 1);
    }

    #[test]
    fn test_reverse_many_finals() {
        // 0 -a-> 1 (accepting) -b-> 2 (accepting)
        let mut fa = Automaton::new();
        for _ in 0..3 {
            fa.add_state(Kind::Dfa, true);
        }
        fa.set_accepting(0, false);
        fa.add_edge(0, 1, Symbol::Char('a'));
        fa.add_edge(1, 2, Symbol::Char('b'));
        let rev = reverse(&fa);
        assert_eq!(rev.len(), 4);
        assert!(rev.accepts("a"));
        assert!(rev.accepts("ba"));
        assert!(!rev.accepts("b"));
        assert!(!rev.accepts(""));
    }

    #[test]
    fn test_reverse_edges_reports_old_finals() {
        let nfa = build("a|b").unwrap();
        let (rev, initial) = reverse_edges(&nfa);
        assert_eq!(rev.len(), nfa.len());
        assert_eq!(initial.len(), 1);
        assert!(rev.state(rev.start()).accepting);

        let empty = Automaton::new();
        let (rev, initial) = reverse_edges(&empty);
        assert!(rev.is_empty());
        assert!(initial.is_empty());
    }
}
