//! Non-deterministic finite automaton: state graph, builder, optimizer and
//! executor.
//!
//! The automaton owns its states in an arena addressed by [`StateId`], so the
//! graph may freely contain cycles (`+`, `*` and open-ended repetitions all
//! loop back through earlier states) without any ownership knots. Every edge
//! `u -> v` is mirrored by a back-edge `v <- u`; the optimizer relies on the
//! back-edges to merge redundant epsilon states into their neighbours.
//!
//! Transitions carry no labels of their own. Whether an input symbol (or no
//! symbol at all) moves the simulation along an edge is decided by the
//! *target* state's [`StateKind`].

mod builder;
mod executor;
mod optimizer;
mod sparse_set;
mod state;


pub use builder::{Builder, MacroKind};
pub use executor::{Executor, Status};
pub use optimizer::Optimizer;
pub use state::{State, StateKind, Symbol, SymbolClass};

use std::fmt;

/// A state identifier: a stable index into the automaton's arena.
///
/// Ids stay valid for the lifetime of the automaton; removing a state
/// tombstones its slot instead of shifting its neighbours.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    /// The arena slot behind this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An NFA over the alphabet `S`.
///
/// A fresh automaton holds exactly two states, *start* and *accept*, both
/// epsilon-kinded; they exist for the whole lifetime of the graph. All other
/// states are created through a [`Builder`].
///
/// Once built (and optionally run through the [`Optimizer`]) the graph is
/// immutable, and any number of [`Executor`]s may simulate it concurrently,
/// each owning its own frontier.
#[derive(Debug)]
pub struct Automaton<S: Symbol> {
    states: Vec<Option<State<S>>>,
    start: StateId,
    accept: StateId,
}

impl<S: Symbol> Automaton<S> {
    /// Create an empty automaton that accepts nothing.
    pub fn new() -> Self {
        let mut automaton = Automaton {
            states: Vec::new(),
            start: StateId(0),
            accept: StateId(0),
        };
        automaton.start = automaton.add_state(StateKind::Epsilon);
        automaton.accept = automaton.add_state(StateKind::Epsilon);
        automaton
    }

    /// The distinguished start state.
    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The distinguished accept state.
    #[inline]
    pub fn accept(&self) -> StateId {
        self.accept
    }

    #[inline]
    pub fn is_start(&self, id: StateId) -> bool {
        id == self.start
    }

    #[inline]
    pub fn is_accept(&self, id: StateId) -> bool {
        id == self.accept
    }

    /// Allocate a new state of the given kind and hand back its id.
    pub fn add_state(&mut self, kind: StateKind<S>) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(Some(State::new(kind)));
        id
    }

    /// Add the edge `from -> to` together with its back-edge.
    ///
    /// Edges are kept in insertion order and duplicates are allowed.
    pub fn link(&mut self, from: StateId, to: StateId) {
        self.state_mut(from).push_next(to);
        self.state_mut(to).push_prev(from);
    }

    /// Remove one occurrence of the edge `from -> to` and its back-edge.
    pub fn unlink(&mut self, from: StateId, to: StateId) {
        let removed = self.state_mut(from).remove_next(to);
        debug_assert!(removed, "unlink of missing edge");
        let removed = self.state_mut(to).remove_prev(from);
        debug_assert!(removed, "back-edge out of sync");
    }

    /// Borrow a state. Panics if the id was tombstoned by the optimizer;
    /// holding an id to a removed state is a bug in the caller.
    #[inline]
    pub fn state(&self, id: StateId) -> &State<S> {
        self.states[id.index()]
            .as_ref()
            .expect("dangling state id")
    }

    #[inline]
    fn state_mut(&mut self, id: StateId) -> &mut State<S> {
        self.states[id.index()]
            .as_mut()
            .expect("dangling state id")
    }

    /// The kind of the given state.
    #[inline]
    pub fn kind(&self, id: StateId) -> &StateKind<S> {
        self.state(id).kind()
    }

    /// Successors of the given state, in insertion order.
    #[inline]
    pub fn next(&self, id: StateId) -> &[StateId] {
        self.state(id).next()
    }

    /// Predecessors of the given state, in insertion order.
    #[inline]
    pub fn prev(&self, id: StateId) -> &[StateId] {
        self.state(id).prev()
    }

    /// True if the id refers to a live (non-tombstoned) state.
    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        self.states
            .get(id.index())
            .map_or(false, |slot| slot.is_some())
    }

    /// Number of arena slots, live or not. Executor frontiers are sized by
    /// this so that any id the graph can hand out fits.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.states.len()
    }

    /// Number of live states.
    pub fn num_states(&self) -> usize {
        self.states.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate over the ids of all live states.
    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| StateId(index as u32))
    }

    /// Tombstone a state. The caller must have unlinked all of its edges.
    fn remove_state(&mut self, id: StateId) {
        debug_assert!(!self.is_start(id) && !self.is_accept(id));
        debug_assert!(self.state(id).next().is_empty());
        debug_assert!(self.state(id).prev().is_empty());
        self.states[id.index()] = None;
    }

    /// Create an executor that tests whether this automaton accepts `input`
    /// in full.
    pub fn executor<'a>(&'a self, input: &'a [S]) -> Executor<'a, S> {
        Executor::new(self, self.start, self.accept, input, None)
    }
}

impl<S: Symbol> Default for Automaton<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first dump of the graph, one state per line, indented by depth.
/// Cycles surface as `(repeated)` lines.
impl<S: Symbol> fmt::Display for Automaton<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited = vec![false; self.states.len()];
        let mut stack = vec![(self.start, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            for _ in 0..depth {
                f.write_str("| ")?;
            }

            let tag = if self.is_start(id) {
                " [start]"
            } else if self.is_accept(id) {
                " [accept]"
            } else {
                ""
            };

            if visited[id.index()] {
                writeln!(f, "{:?}#{}{} (repeated)", self.kind(id), id.index(), tag)?;
                continue;
            }
            visited[id.index()] = true;
            writeln!(f, "{:?}#{}{}", self.kind(id), id.index(), tag)?;

            // Reverse so the dump follows insertion order.
            for &next in self.next(id).iter().rev() {
                stack.push((next, depth + 1));
            }
        }
        Ok(())
    }
}
