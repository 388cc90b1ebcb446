//! The graph model shared by every stage of the pipeline.
//!
//! States live in an arena owned by an `Automaton` and refer to each other
//! by index, so cyclic graphs (closures, epsilon loops) need no shared
//! ownership. A usable view of an automaton is always recomputed from a root
//! state with `traverse`.

use bit_set::BitSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::{fmt, mem};
use vec_map::VecMap;

/// Index of a state within its owning `Automaton`.
pub type StateId = usize;

/// A transition symbol.
#[derive(PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Symbol {
    /// The empty transition. Only legal on NFA edges.
    Epsilon,
    /// A single input character.
    Char(char),
}

impl Symbol {
    pub fn is_epsilon(&self) -> bool {
        *self == Symbol::Epsilon
    }

    pub fn as_char(&self) -> Option<char> {
        match *self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(c),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Char(c) => write!(f, "{:?}", c),
        }
    }
}

/// The set of symbols carried by one edge.
pub type Label = BTreeSet<Symbol>;

/// What kind of automaton a state belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Nfa,
    Dfa,
    /// A class of DFA states being refined by the partition minimizer.
    Partition(BitSet),
}

/// A directed arc. The label is a set so that several symbols leading to
/// the same target share a single edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: StateId,
    pub target: StateId,
    pub label: Label,
}

#[derive(Debug, Clone)]
pub struct State {
    pub id: StateId,
    pub kind: Kind,
    pub accepting: bool,
    pub edges: Vec<Edge>,
}

impl State {
    /// The target of the edge carrying `symbol`, if any. For a DFA state
    /// there is at most one.
    pub fn next(&self, symbol: Symbol) -> Option<StateId> {
        self.edges
            .iter()
            .find(|e| e.label.contains(&symbol))
            .map(|e| e.target)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &State) -> bool {
        self.id == other.id && mem::discriminant(&self.kind) == mem::discriminant(&other.kind)
    }
}

impl Eq for State {}

/// An arena of states plus a designated root.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    states: Vec<State>,
    start: StateId,
}

/// Everything reachable from one root, collected breadth-first.
#[derive(Debug)]
pub struct Traversal<'a> {
    /// Reachable states in visiting order; the root comes first.
    pub states: Vec<StateId>,
    /// Every symbol seen on a reachable edge, epsilon included.
    pub alphabet: BTreeSet<Symbol>,
    pub edges: Vec<&'a Edge>,
    pub accepting: BitSet,
}

impl<'a> Traversal<'a> {
    /// The alphabet without the epsilon sentinel.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.alphabet.iter().filter_map(Symbol::as_char)
    }
}

impl Automaton {
    pub fn new() -> Automaton {
        Automaton { states: Vec::new(), start: 0 }
    }

    /// Allocates a state. Ids are handed out in order starting from zero.
    pub fn add_state(&mut self, kind: Kind, accepting: bool) -> StateId {
        let id = self.states.len();
        self.states.push(State { id, kind, accepting, edges: Vec::new() });
        id
    }

    /// Adds `symbol` to the edge `from -> to`, creating the edge if there is
    /// none yet.
    pub fn add_edge(&mut self, from: StateId, to: StateId, symbol: Symbol) {
        debug_assert!(
            !(symbol.is_epsilon() && self.states[from].kind != Kind::Nfa),
            "epsilon edge on a deterministic state"
        );
        let edges = &mut self.states[from].edges;
        match edges.iter_mut().find(|e| e.target == to) {
            Some(edge) => {
                edge.label.insert(symbol);
            }
            None => {
                let mut label = Label::new();
                label.insert(symbol);
                edges.push(Edge { source: from, target: to, label });
            }
        }
    }

    pub fn add_labeled_edge(&mut self, from: StateId, to: StateId, label: &Label) {
        for &symbol in label {
            self.add_edge(from, to, symbol);
        }
    }

    pub fn set_accepting(&mut self, id: StateId, accepting: bool) {
        self.states[id].accepting = accepting;
    }

    pub fn set_start(&mut self, id: StateId) {
        debug_assert!(id < self.states.len(), "start {} out of range ({} states)", id, self.states.len());
        self.start = id;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    /// Number of states in the arena, reachable or not.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Breadth-first walk from `root`, visiting each state once.
    pub fn traverse(&self, root: StateId) -> Traversal<'_> {
        let mut seen = BitSet::with_capacity(self.states.len());
        let mut queue = VecDeque::new();
        let mut result = Traversal {
            states: Vec::new(),
            alphabet: BTreeSet::new(),
            edges: Vec::new(),
            accepting: BitSet::new(),
        };
        if root >= self.states.len() {
            return result;
        }

        seen.insert(root);
        queue.push_back(root);
        while let Some(id) = queue.pop_front() {
            let state = &self.states[id];
            result.states.push(id);
            if state.accepting {
                result.accepting.insert(id);
            }
            for edge in &state.edges {
                result.alphabet.extend(edge.label.iter().cloned());
                result.edges.push(edge);
                if seen.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        result
    }

    /// Traversal from the automaton's own start state.
    pub fn view(&self) -> Traversal<'_> {
        self.traverse(self.start)
    }

    /// All states reachable from `set` through epsilon edges alone,
    /// `set` itself included.
    pub fn epsilon_closure(&self, set: &BitSet) -> BitSet {
        let mut closure = set.clone();
        let mut stack: Vec<StateId> = set.iter().collect();
        while let Some(id) = stack.pop() {
            for edge in &self.states[id].edges {
                if edge.label.contains(&Symbol::Epsilon) && closure.insert(edge.target) {
                    stack.push(edge.target);
                }
            }
        }
        closure
    }

    /// The states directly reachable from `set` on `ch`, without closing
    /// over epsilon edges.
    pub fn delta(&self, set: &BitSet, ch: char) -> BitSet {
        let symbol = Symbol::Char(ch);
        let mut next = BitSet::new();
        for id in set.iter() {
            for edge in &self.states[id].edges {
                if edge.label.contains(&symbol) {
                    next.insert(edge.target);
                }
            }
        }
        next
    }

    pub fn any_accepting(&self, set: &BitSet) -> bool {
        set.iter().any(|id| self.states[id].accepting)
    }

    /// Runs the automaton over `input`, tracking every active state at once.
    /// Works for any kind of automaton.
    pub fn accepts(&self, input: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }
        let mut current = BitSet::new();
        current.insert(self.start);
        current = self.epsilon_closure(&current);
        for ch in input.chars() {
            current = self.epsilon_closure(&self.delta(&current, ch));
            if current.is_empty() {
                return false;
            }
        }
        self.any_accepting(&current)
    }

    /// True if no reachable edge carries epsilon and no reachable state has
    /// two edges sharing a symbol.
    pub fn is_deterministic(&self) -> bool {
        let view = self.view();
        if view.alphabet.contains(&Symbol::Epsilon) {
            return false;
        }
        view.states.iter().all(|&id| {
            let mut seen = BTreeSet::new();
            self.states[id]
                .edges
                .iter()
                .flat_map(|e| e.label.iter())
                .all(|symbol| seen.insert(*symbol))
        })
    }

    /// Structural equality of two deterministic automata up to renaming of
    /// states, considering only what is reachable from each start.
    pub fn isomorphic(&self, other: &Automaton) -> bool {
        if self.states.is_empty() || other.states.is_empty() {
            return self.states.is_empty() && other.states.is_empty();
        }
        if self.view().states.len() != other.view().states.len() {
            return false;
        }

        let mut forward: VecMap<StateId> = VecMap::new();
        let mut backward: VecMap<StateId> = VecMap::new();
        let mut queue = VecDeque::new();
        forward.insert(self.start, other.start);
        backward.insert(other.start, self.start);
        queue.push_back((self.start, other.start));

        while let Some((a, b)) = queue.pop_front() {
            let (a, b) = (&self.states[a], &other.states[b]);
            if a.accepting != b.accepting {
                return false;
            }
            let (ta, tb) = (transitions(a), transitions(b));
            if ta.len() != tb.len() {
                return false;
            }
            for ((sa, na), (sb, nb)) in ta.into_iter().zip(tb) {
                if sa != sb {
                    return false;
                }
                match (forward.get(na), backward.get(nb)) {
                    (Some(&fa), Some(&bb)) if fa == nb && bb == na => {}
                    (None, None) => {
                        forward.insert(na, nb);
                        backward.insert(nb, na);
                        queue.push_back((na, nb));
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

fn transitions(state: &State) -> BTreeMap<Symbol, StateId> {
    let mut map = BTreeMap::new();
    for edge in &state.edges {
        for &symbol in &edge.label {
            map.insert(symbol, edge.target);
        }
    }
    map
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let view = self.view();
        writeln!(f, "start: {}", self.start)?;
        for &id in &view.states {
            let state = &self.states[id];
            write!(f, "  {}", id)?;
            if state.accepting {
                write!(f, " (accepting)")?;
            }
            if let Kind::Partition(ref members) = state.kind {
                write!(f, " {:?}", members)?;
            }
            for edge in &state.edges {
                let symbols: Vec<String> = edge.label.iter().map(|s| s.to_string()).collect();
                write!(f, " [{}] -> {};", symbols.join(" "), edge.target)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
