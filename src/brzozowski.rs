//! Minimization by double reversal.

use crate::automaton::Automaton;
use crate::dfa::determinize_from;
use crate::regex::reverse_edges;

/// Minimizes any automaton, NFA or DFA, as
/// `determinize(reverse(determinize(reverse(fa))))`.
///
/// The first round yields a DFA for the reversed language whose states are
/// all reachable; reversing that and determinizing again merges every pair
/// of indistinguishable states.
pub fn minimize(fa: &Automaton) -> Automaton {
    reverse_determinize(&reverse_determinize(fa))
}

/// One round. Subset construction starts from the set of old accepting
/// states itself, not from a fresh state pointing at them: a subset holding
/// such an entry state could never equal the same subset reached later, and
/// equivalent states would stay apart.
fn reverse_determinize(fa: &Automaton) -> Automaton {
    let (rev, initial) = reverse_edges(fa);
    determinize_from(&rev, &initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Kind, Symbol};
    use crate::regex;

    #[test]
    fn test_minimize_nfa_directly() {
        let nfa = regex::build("(a|b)*abb").unwrap();
        let min = minimize(&nfa);
        assert!(min.is_deterministic());
        // the textbook example: four states
        assert_eq!(min.len(), 4);
        assert!(min.accepts("abb"));
        assert!(min.accepts("babaabb"));
        assert!(!min.accepts("abba"));
    }

    #[test]
    fn test_redundant_dfa() {
        // 0 -a-> 1 (final) -a-> 2 (final) -a-> 2 is a*a, i.e. a+
        let mut dfa = Automaton::new();
        dfa.add_state(Kind::Dfa, false);
        dfa.add_state(Kind::Dfa, true);
        dfa.add_state(Kind::Dfa, true);
        dfa.add_edge(0, 1, Symbol::Char('a'));
        dfa.add_edge(1, 2, Symbol::Char('a'));
        dfa.add_edge(2, 2, Symbol::Char('a'));

        let min = minimize(&dfa);
        assert_eq!(min.len(), 2);
        assert!(!min.accepts(""));
        assert!(min.accepts("aaa"));
    }

    #[test]
    fn test_many_finals_merge() {
        for (pattern, size) in [("a**", 1), ("(a)*", 1), ("(a|b)*", 1), ("a*b*", 2), ("((b)+)*", 1)] {
            let min = minimize(&regex::build(pattern).unwrap());
            assert_eq!(min.len(), size, "{}", pattern);
        }
    }

    #[test]
    fn test_empty_language() {
        // 0 -a-> 1, nothing accepting
        let mut dfa = Automaton::new();
        dfa.add_state(Kind::Dfa, false);
        dfa.add_state(Kind::Dfa, false);
        dfa.add_edge(0, 1, Symbol::Char('a'));
        let min = minimize(&dfa);
        assert_eq!(min.len(), 1);
        assert!(!min.state(min.start()).accepting);
    }

    #[test]
    fn test_empty_string_only() {
        let min = minimize(&regex::build("").unwrap());
        assert_eq!(min.len(), 1);
        assert!(min.state(min.start()).accepting);
        assert!(min.state(min.start()).edges.is_empty());
    }
}
