//! Subset construction.

use crate::automaton::{Automaton, Kind, StateId, Symbol};
use bit_set::BitSet;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::{BTreeSet, VecDeque};

/// Converts the automaton rooted at `fa.start()` into an equivalent DFA.
///
/// Each DFA state stands for the epsilon closure of a set of source states;
/// sets are compared by content, so the same set reached along different
/// paths maps to a single DFA state. Symbols leading from one DFA state to
/// the same target share an edge. Empty target sets produce no transition.
///
/// Works on DFAs too, which is what the reversal minimizer relies on.
pub fn determinize(fa: &Automaton) -> Automaton {
    let mut initial = BitSet::new();
    if fa.start() < fa.len() {
        initial.insert(fa.start());
    }
    determinize_from(fa, &initial)
}

/// Subset construction starting from the closure of `initial` rather than
/// from the start state alone. An empty `initial` gives a single
/// non-accepting state.
pub fn determinize_from(fa: &Automaton, initial: &BitSet) -> Automaton {
    let mut alphabet = BTreeSet::new();
    for id in initial.iter() {
        alphabet.extend(fa.traverse(id).chars());
    }
    let mut dfa = Automaton::new();

    // set of source states -> DFA state
    let mut index: IndexMap<BitSet, StateId> = IndexMap::new();
    let mut worklist = VecDeque::new();

    let initial = fa.epsilon_closure(initial);
    let start = dfa.add_state(Kind::Dfa, fa.any_accepting(&initial));
    dfa.set_start(start);
    index.insert(initial.clone(), start);
    worklist.push_back((initial, start));

    while let Some((set, from)) = worklist.pop_front() {
        for &c in &alphabet {
            let next = fa.epsilon_closure(&fa.delta(&set, c));
            if next.is_empty() {
                continue;
            }
            let to = match index.entry(next) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => {
                    let id = dfa.add_state(Kind::Dfa, fa.any_accepting(e.key()));
                    worklist.push_back((e.key().clone(), id));
                    e.insert(id);
                    id
                }
            };
            dfa.add_edge(from, to, Symbol::Char(c));
        }
    }

    dfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex;

    #[test]
    fn test_subset_construction_basic() {
        // 0 -a-> 1, 0 -a-> 2, 1 -b-> 3 (final), 2 -b-> 3 (final)
        let mut nfa = Automaton::new();
        for _ in 0..4 {
            nfa.add_state(Kind::Nfa, false);
        }
        nfa.set_accepting(3, true);
        nfa.add_edge(0, 1, Symbol::Char('a'));
        nfa.add_edge(0, 2, Symbol::Char('a'));
        nfa.add_edge(1, 3, Symbol::Char('b'));
        nfa.add_edge(2, 3, Symbol::Char('b'));

        let dfa = determinize(&nfa);
        assert_eq!(dfa.len(), 3);
        assert!(dfa.is_deterministic());
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("a"));
        assert!(!dfa.state(dfa.start()).accepting);
    }

    #[test]
    fn test_subset_construction_with_epsilon() {
        // 0 -ε-> 1 -a-> 2 (final)
        let mut nfa = Automaton::new();
        for _ in 0..3 {
            nfa.add_state(Kind::Nfa, false);
        }
        nfa.set_accepting(2, true);
        nfa.add_edge(0, 1, Symbol::Epsilon);
        nfa.add_edge(1, 2, Symbol::Char('a'));

        let dfa = determinize(&nfa);
        assert_eq!(dfa.len(), 2);
        assert!(!dfa.view().alphabet.contains(&Symbol::Epsilon));
        assert!(dfa.accepts("a"));
    }

    #[test]
    fn test_edges_are_merged() {
        // 0 -a-> 1, 0 -b-> 1, 0 -c-> 2
        let mut nfa = Automaton::new();
        for _ in 0..3 {
            nfa.add_state(Kind::Nfa, true);
        }
        nfa.add_edge(0, 1, Symbol::Char('a'));
        nfa.add_edge(0, 1, Symbol::Char('b'));
        nfa.add_edge(0, 2, Symbol::Char('c'));

        let dfa = determinize(&nfa);
        let start = dfa.state(dfa.start());
        assert_eq!(start.edges.len(), 2);
        let ab = start.next(Symbol::Char('a')).unwrap();
        assert_eq!(start.next(Symbol::Char('b')), Some(ab));
        assert_ne!(start.next(Symbol::Char('c')), Some(ab));
    }

    #[test]
    fn test_degenerate_nfa() {
        let dfa = determinize(&Automaton::new());
        assert_eq!(dfa.len(), 1);
        assert!(!dfa.state(dfa.start()).accepting);
        assert!(dfa.state(dfa.start()).edges.is_empty());

        let mut lone = Automaton::new();
        lone.add_state(Kind::Nfa, false);
        let dfa = determinize(&lone);
        assert_eq!(dfa.len(), 1);
        assert!(!dfa.accepts(""));
    }

    #[test]
    fn test_determinize_from_several_states() {
        // 0 -a-> 2 (final), 1 -b-> 2; start from {0, 1}
        let mut nfa = Automaton::new();
        for _ in 0..3 {
            nfa.add_state(Kind::Nfa, false);
        }
        nfa.set_accepting(2, true);
        nfa.add_edge(0, 2, Symbol::Char('a'));
        nfa.add_edge(1, 2, Symbol::Char('b'));

        let initial: BitSet = [0, 1].iter().cloned().collect();
        let dfa = determinize_from(&nfa, &initial);
        assert_eq!(dfa.len(), 2);
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("b"));
        assert_eq!(determinize_from(&nfa, &BitSet::new()).len(), 1);
    }

    #[test]
    fn test_epsilon_loops() {
        let nfa = regex::build("(a*)*").unwrap();
        let dfa = determinize(&nfa);
        assert!(dfa.is_deterministic());
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("aaaa"));
    }
}
