//! Frontier-set simulation of the automaton.
//!
//! All non-determinism lives in the frontier: the set of states the
//! simulation occupies at the current input position. Each step consumes
//! one symbol, moves the frontier through every matching successor, and
//! closes over the zero-width kinds. Lookahead and macro states are
//! resolved by recursively simulating their sub-automaton against the
//! remaining input tail with a fresh frontier.

use std::mem;

use super::sparse_set::SparseSet;
use super::state::{StateKind, Symbol};
use super::{Automaton, StateId};

/// Verdict of a single executor step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Input remains and the frontier is non-empty.
    Running,
    /// The whole input was consumed with the accept state in the frontier.
    Accepted,
    /// The frontier died, or the input ended away from the accept state.
    Rejected,
}

impl Status {
    #[inline]
    pub fn is_done(self) -> bool {
        !matches!(self, Status::Running)
    }
}

/// Simulates one input against one compiled automaton.
///
/// The executor borrows the graph immutably, so any number of them can run
/// against the same automaton at once. A terminal verdict is sticky:
/// further [`Executor::step`] calls keep returning it until
/// [`Executor::reset`].
pub struct Executor<'a, S: Symbol> {
    graph: &'a Automaton<S>,
    start: StateId,
    accept: StateId,
    input: &'a [S],
    /// Symbol just before `input`; `None` at the true beginning. Boundary
    /// states in a sub-simulation need it, since their tail starts
    /// mid-input.
    lead: Option<S>,
    cursor: usize,
    frontier: SparseSet,
    scratch: SparseSet,
    verdict: Option<bool>,
}

impl<'a, S: Symbol> Executor<'a, S> {
    pub(super) fn new(
        graph: &'a Automaton<S>,
        start: StateId,
        accept: StateId,
        input: &'a [S],
        lead: Option<S>,
    ) -> Self {
        let capacity = graph.num_slots();
        let mut executor = Executor {
            graph,
            start,
            accept,
            input,
            lead,
            cursor: 0,
            frontier: SparseSet::new(capacity),
            scratch: SparseSet::new(capacity),
            verdict: None,
        };
        executor.seed();
        executor
    }

    fn seed(&mut self) {
        self.frontier.insert(self.start);
        eps_closure(self.graph, &mut self.frontier, self.lead, self.input);
    }

    /// Rewind to the initial frontier for another run over the same input.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.verdict = None;
        self.frontier.clear();
        self.scratch.clear();
        self.seed();
    }

    /// Advance by one symbol.
    ///
    /// At end of input this settles the verdict instead: accepted iff the
    /// accept state is in the frontier.
    pub fn step(&mut self) -> Status {
        if let Some(accepted) = self.verdict {
            return terminal(accepted);
        }
        if self.cursor == self.input.len() {
            let accepted = self.frontier.contains(self.accept);
            self.verdict = Some(accepted);
            return terminal(accepted);
        }

        let graph = self.graph;
        let symbol = self.input[self.cursor];
        self.scratch.clear();
        for position in 0..self.frontier.len() {
            let state = self.frontier.get(position);
            for &next in graph.next(state) {
                if graph.kind(next).matches(symbol) {
                    self.scratch.insert(next);
                }
            }
        }

        self.cursor += 1;
        eps_closure(
            graph,
            &mut self.scratch,
            Some(symbol),
            &self.input[self.cursor..],
        );
        mem::swap(&mut self.frontier, &mut self.scratch);

        if self.frontier.is_empty() {
            self.verdict = Some(false);
            return Status::Rejected;
        }
        Status::Running
    }

    /// Drive the simulation to its verdict.
    pub fn accept(&mut self) -> bool {
        loop {
            match self.step() {
                Status::Running => {}
                Status::Accepted => return true,
                Status::Rejected => return false,
            }
        }
    }
}

#[inline]
fn terminal(accepted: bool) -> Status {
    if accepted {
        Status::Accepted
    } else {
        Status::Rejected
    }
}

/// Close `set` over the zero-width kinds.
///
/// The set doubles as its own worklist: newly inserted states are visited
/// in turn, so the closure is transitive. `prev` is the symbol consumed
/// just before this position and `tail` the input not yet consumed; both
/// feed the boundary and lookahead predicates.
fn eps_closure<S: Symbol>(
    graph: &Automaton<S>,
    set: &mut SparseSet,
    prev: Option<S>,
    tail: &[S],
) {
    let mut position = 0;
    while position < set.len() {
        let state = set.get(position);
        position += 1;

        for &next in graph.next(state) {
            if set.contains(next) {
                continue;
            }
            let pass = match *graph.kind(next) {
                StateKind::Epsilon => true,
                StateKind::Boundary { ref word, negated } => {
                    let before = prev.map_or(false, |symbol| word.contains(symbol));
                    let after = tail.first().map_or(false, |&symbol| word.contains(symbol));
                    if negated {
                        before && after
                    } else {
                        before != after
                    }
                }
                StateKind::Lookahead {
                    negated,
                    start,
                    accept,
                } => accepts_prefix(graph, start, accept, prev, tail) != negated,
                StateKind::Macro { start, accept } => {
                    accepts_prefix(graph, start, accept, prev, tail)
                }
                _ => false,
            };
            if pass {
                set.insert(next);
            }
        }
    }
}

/// Does the sub-automaton delimited by `start`/`accept` accept some prefix
/// of `input`? Runs a fresh frontier; recursion through nested lookaheads
/// bottoms out because every sub-simulation works on a strict sub-automaton
/// of a finite graph.
fn accepts_prefix<S: Symbol>(
    graph: &Automaton<S>,
    start: StateId,
    accept: StateId,
    lead: Option<S>,
    input: &[S],
) -> bool {
    let mut executor = Executor::new(graph, start, accept, input, lead);
    loop {
        if executor.frontier.contains(accept) {
            return true;
        }
        if executor.cursor == input.len() || executor.frontier.is_empty() {
            return false;
        }
        executor.step();
    }
}
