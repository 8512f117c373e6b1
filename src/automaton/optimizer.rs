//! Epsilon removal.
//!
//! The builder glues everything together with epsilon states, most of which
//! are redundant once the graph is complete. A single pass merges each
//! removable epsilon into its unique predecessor or successor; what remains
//! is the same language with fewer states for the executor to close over.

use super::state::StateKind;
use super::{Automaton, StateId, Symbol};

/// Rewrites an automaton in place. The graph must not be simulated while an
/// optimizer borrows it.
pub struct Optimizer<'a, S: Symbol> {
    graph: &'a mut Automaton<S>,
}

impl<'a, S: Symbol> Optimizer<'a, S> {
    pub fn new(graph: &'a mut Automaton<S>) -> Self {
        Optimizer { graph }
    }

    /// Merge away every epsilon state with a unique predecessor or a unique
    /// successor. Start, accept and the states referenced as sub-automaton
    /// handles stay put, as does any epsilon with fan-in and fan-out both
    /// greater than one.
    pub fn remove_epsilons(&mut self) {
        let keep = self.pinned();
        let ids: Vec<StateId> = self.graph.ids().collect();

        for id in ids {
            if keep[id.index()] || !self.graph.kind(id).is_epsilon() {
                continue;
            }
            let preds: Vec<StateId> = self.graph.prev(id).to_vec();
            let succs: Vec<StateId> = self.graph.next(id).to_vec();

            if preds.len() == 1 && !succs.is_empty() && preds[0] != id {
                // Unique predecessor inherits all outgoing edges.
                let pred = preds[0];
                self.graph.unlink(pred, id);
                for succ in succs {
                    self.graph.unlink(id, succ);
                    self.graph.link(pred, succ);
                }
                self.graph.remove_state(id);
            } else if succs.len() == 1 && !preds.is_empty() && succs[0] != id {
                // Unique successor inherits all incoming edges.
                let succ = succs[0];
                self.graph.unlink(id, succ);
                for pred in preds {
                    self.graph.unlink(pred, id);
                    self.graph.link(pred, succ);
                }
                self.graph.remove_state(id);
            }
        }
    }

    /// States that must survive: start, accept, and every sub-automaton
    /// handle referenced by a lookahead or macro state.
    fn pinned(&self) -> Vec<bool> {
        let mut keep = vec![false; self.graph.num_slots()];
        keep[self.graph.start().index()] = true;
        keep[self.graph.accept().index()] = true;
        for id in self.graph.ids() {
            match *self.graph.kind(id) {
                StateKind::Lookahead { start, accept, .. }
                | StateKind::Macro { start, accept } => {
                    keep[start.index()] = true;
                    keep[accept.index()] = true;
                }
                _ => {}
            }
        }
        keep
    }
}

#[cfg(test)]
mod tests {
    use super::super::Builder;
    use super::*;

    fn accepts(automaton: &Automaton<char>, input: &str) -> bool {
        let symbols: Vec<char> = input.chars().collect();
        automaton.executor(&symbols).accept()
    }

    fn literal_graph(word: &str) -> Automaton<char> {
        let mut automaton = Automaton::new();
        let mut builder = Builder::new(&mut automaton);
        for symbol in word.chars() {
            builder.push_state(StateKind::Symbol(symbol));
        }
        builder.finish().unwrap();
        automaton
    }

    #[test]
    fn test_removes_builder_glue() {
        let mut automaton = literal_graph("abc");
        let before = automaton.num_states();
        Optimizer::new(&mut automaton).remove_epsilons();
        assert!(automaton.num_states() < before);
    }

    #[test]
    fn test_start_and_accept_survive() {
        let mut automaton = literal_graph("a");
        Optimizer::new(&mut automaton).remove_epsilons();
        assert!(automaton.contains(automaton.start()));
        assert!(automaton.contains(automaton.accept()));
    }

    #[test]
    fn test_language_preserved_on_loops() {
        // (ab)+ keeps its cycle through the merge.
        let mut automaton = Automaton::new();
        let mut builder = Builder::new(&mut automaton);
        builder.begin_group().unwrap();
        builder.push_state(StateKind::Symbol('a'));
        builder.push_state(StateKind::Symbol('b'));
        builder.end_group().unwrap();
        builder.push_jump();
        builder.finish().unwrap();

        Optimizer::new(&mut automaton).remove_epsilons();

        assert!(accepts(&automaton, "ab"));
        assert!(accepts(&automaton, "ababab"));
        assert!(!accepts(&automaton, "aab"));
        assert!(!accepts(&automaton, "aba"));
        assert!(!accepts(&automaton, ""));
    }

    #[test]
    fn test_empty_expression_still_accepts_empty() {
        let mut automaton = literal_graph("");
        Optimizer::new(&mut automaton).remove_epsilons();
        assert!(accepts(&automaton, ""));
        assert!(!accepts(&automaton, "a"));
    }
}
