//! DFA minimization by partition refinement.

use crate::automaton::{Automaton, Kind, StateId, Symbol};
use bit_set::BitSet;
use vec_map::VecMap;

/// Blocks of equivalent states, with a reverse lookup from state to block.
/// States in no block are dead and treated as if they were not there.
///
/// Blocks stay plain bit sets while refining; `classes` turns each final
/// block into a `Kind::Partition` state holding its members.
struct Partition {
    blocks: Vec<BitSet>,
    owner: VecMap<usize>,
}

impl Partition {
    /// The accepting / non-accepting split over the live reachable states.
    /// A dead start state gets a block of its own.
    fn initial(dfa: &Automaton) -> Partition {
        let view = dfa.view();
        let live = live(dfa);
        let mut rejecting: BitSet = view.states.iter().cloned().filter(|&id| live.contains(id)).collect();
        rejecting.difference_with(&view.accepting);

        let mut partition = Partition { blocks: Vec::new(), owner: VecMap::new() };
        partition.push(view.accepting.clone());
        partition.push(rejecting);
        if !live.contains(dfa.start()) {
            partition.push(Some(dfa.start()).into_iter().collect());
        }
        partition
    }

    fn push(&mut self, block: BitSet) {
        if block.is_empty() {
            return;
        }
        let index = self.blocks.len();
        for id in block.iter() {
            self.owner.insert(id, index);
        }
        self.blocks.push(block);
    }

    fn block_of(&self, id: StateId) -> Option<usize> {
        self.owner.get(id).cloned()
    }

    /// Groups block `index` by where `c` leads each member: the target's
    /// block, or `None` for a missing or dead transition. Returns the members
    /// that disagree with the first one.
    fn split(&self, dfa: &Automaton, index: usize, c: char) -> Option<BitSet> {
        let land = |id: StateId| {
            dfa.state(id)
                .next(Symbol::Char(c))
                .and_then(|t| self.block_of(t))
        };
        let block = &self.blocks[index];
        let first = land(block.iter().next()?);
        let rest: BitSet = block.iter().filter(|&id| land(id) != first).collect();
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// One refinement step. Returns false once no block can be split.
    fn refine(&mut self, dfa: &Automaton, alphabet: &[char]) -> bool {
        for index in 0..self.blocks.len() {
            if self.blocks[index].len() < 2 {
                continue;
            }
            for &c in alphabet {
                if let Some(rest) = self.split(dfa, index, c) {
                    self.blocks[index].difference_with(&rest);
                    self.push(rest);
                    return true;
                }
            }
        }
        false
    }
}

/// States from which an accepting state is reachable.
fn live(dfa: &Automaton) -> BitSet {
    let mut live: BitSet = (0..dfa.len()).filter(|&id| dfa.state(id).accepting).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for id in 0..dfa.len() {
            if !live.contains(id) && dfa.state(id).edges.iter().any(|e| live.contains(e.target)) {
                live.insert(id);
                changed = true;
            }
        }
    }
    live
}

/// Minimizes the DFA rooted at `dfa.start()`.
///
/// Starts from the accepting / non-accepting split and keeps splitting blocks
/// whose members disagree on where some symbol leads, until nothing
/// changes. A missing transition counts as its own destination, and states
/// that cannot reach acceptance are dropped. The surviving blocks become
/// fresh DFA states numbered breadth-first from the start.
pub fn minimize(dfa: &Automaton) -> Automaton {
    // an empty automaton, or one whose start does not exist, has the empty
    // language; determinize gives the lone non-accepting state for it
    if dfa.start() >= dfa.len() {
        return crate::dfa::determinize(dfa);
    }
    let alphabet: Vec<char> = dfa.view().chars().collect();

    let mut partition = Partition::initial(dfa);
    while partition.refine(dfa, &alphabet) {}

    let classes = classes(dfa, &partition);
    match partition.block_of(dfa.start()) {
        Some(start) => translate(&classes, start),
        None => unreachable!("the start state always has a block"),
    }
}

/// Materializes each block as a partition state carrying the union of its
/// members' edges.
fn classes(dfa: &Automaton, partition: &Partition) -> Automaton {
    let mut classes = Automaton::new();
    for block in &partition.blocks {
        let accepting = block.iter().any(|id| dfa.state(id).accepting);
        classes.add_state(Kind::Partition(block.clone()), accepting);
    }
    for (index, block) in partition.blocks.iter().enumerate() {
        for id in block.iter() {
            for edge in &dfa.state(id).edges {
                if let Some(to) = partition.block_of(edge.target) {
                    classes.add_labeled_edge(index, to, &edge.label);
                }
            }
        }
    }
    classes
}

fn translate(classes: &Automaton, start: StateId) -> Automaton {
    let view = classes.traverse(start);
    let mut result = Automaton::new();
    let mut index: VecMap<StateId> = VecMap::with_capacity(classes.len());
    for &class in &view.states {
        index.insert(class, result.add_state(Kind::Dfa, classes.state(class).accepting));
    }
    for edge in &view.edges {
        result.add_labeled_edge(index[edge.source], index[edge.target], &edge.label);
    }
    result.set_start(index[start]);
    result
}
