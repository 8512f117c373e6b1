//! States, state kinds and the symbol alphabet.
//!
//! A state is a node in the graph: a kind plus its outgoing and incoming
//! edges. The kind is what gives an edge meaning: entering a state consumes
//! an input symbol (or not) according to the kind of the state being
//! entered, never according to the edge itself.

use std::fmt;

use smallvec::SmallVec;

use super::StateId;

/// Alphabet symbol for an automaton.
///
/// Symbols are compared for equality and ordered (ranges like `a-z` rely on
/// the order). `NULL` is the distinguished zero symbol that the `.`
/// wildcard refuses to match.
pub trait Symbol: Copy + Eq + Ord + fmt::Debug {
    /// The zero symbol, never matched by [`StateKind::Any`].
    const NULL: Self;
}

impl Symbol for char {
    const NULL: Self = '\0';
}

impl Symbol for u8 {
    const NULL: Self = 0;
}

/// A set of symbols: single members plus inclusive ranges, with an optional
/// negation flag.
///
/// Backs the `[...]`, `[^...]` and `\d`/`\w`/`\s` (and negated) character
/// classes, and the word class consulted by boundary states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolClass<S> {
    singles: SmallVec<[S; 8]>,
    ranges: SmallVec<[(S, S); 4]>,
    negated: bool,
}

impl<S: Symbol> SymbolClass<S> {
    /// An empty, non-negated set.
    pub fn new() -> Self {
        SymbolClass {
            singles: SmallVec::new(),
            ranges: SmallVec::new(),
            negated: false,
        }
    }

    /// Flip the set into its complement.
    pub fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Add a single symbol to the set.
    pub fn push_single(&mut self, symbol: S) {
        self.singles.push(symbol);
    }

    /// Add an inclusive range to the set. `lo` must not exceed `hi`.
    pub fn push_range(&mut self, lo: S, hi: S) {
        debug_assert!(lo <= hi, "class range out of order");
        self.ranges.push((lo, hi));
    }

    /// Copy the members (not the negation flag) of `other` into this set.
    pub fn merge(&mut self, other: &SymbolClass<S>) {
        self.singles.extend_from_slice(&other.singles);
        self.ranges.extend_from_slice(&other.ranges);
    }

    /// True if the set has no members. A negated empty set is still empty.
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }

    /// Membership test, honouring negation.
    pub fn contains(&self, symbol: S) -> bool {
        let member = self.singles.contains(&symbol)
            || self
                .ranges
                .iter()
                .any(|&(lo, hi)| lo <= symbol && symbol <= hi);
        member != self.negated
    }
}

impl<S: Symbol> Default for SymbolClass<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// The kind of a state decides how the simulation may enter it.
///
/// `Epsilon`, `Boundary`, `Lookahead` and `Macro` are zero-width: they never
/// consume a symbol and are resolved during epsilon closure. The remaining
/// kinds consume exactly one symbol when their predicate matches.
///
/// `Lookahead` and `Macro` reference a sub-automaton by its start and accept
/// handles. Those handles live in the same arena as the rest of the graph;
/// cloning such a state copies the handles and shares the sub-automaton.
#[derive(Clone, Debug)]
pub enum StateKind<S> {
    /// Structural glue; traversed freely.
    Epsilon,
    /// Consumes one symbol; matches anything except the zero symbol.
    Any,
    /// Consumes one symbol; matches iff equal to the payload.
    Symbol(S),
    /// Consumes one symbol; matches iff `lo <= s <= hi`.
    Range(S, S),
    /// Consumes one symbol; matches iff the set accepts it.
    Class(SymbolClass<S>),
    /// Zero-width word-boundary assertion. Succeeds where exactly one of
    /// the surrounding symbols belongs to `word`; negated, it succeeds
    /// between two `word` symbols.
    Boundary { word: SymbolClass<S>, negated: bool },
    /// Zero-width assertion on the input tail: succeeds iff the
    /// sub-automaton would (or, negated, would not) accept a prefix of it.
    Lookahead {
        negated: bool,
        start: StateId,
        accept: StateId,
    },
    /// Sub-automaton splice point, traversed iff the sub-automaton accepts
    /// a prefix of the input tail.
    Macro { start: StateId, accept: StateId },
}

impl<S: Symbol> StateKind<S> {
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, StateKind::Epsilon)
    }

    /// True for the kinds that consume an input symbol when entered.
    #[inline]
    pub fn consumes(&self) -> bool {
        matches!(
            self,
            StateKind::Any | StateKind::Symbol(_) | StateKind::Range(_, _) | StateKind::Class(_)
        )
    }

    /// Match one symbol. Zero-width kinds never match here; they are
    /// resolved during epsilon closure instead.
    pub fn matches(&self, symbol: S) -> bool {
        match self {
            StateKind::Any => symbol != S::NULL,
            StateKind::Symbol(expected) => symbol == *expected,
            StateKind::Range(lo, hi) => *lo <= symbol && symbol <= *hi,
            StateKind::Class(set) => set.contains(symbol),
            _ => false,
        }
    }
}

/// A node in the state graph.
///
/// Both edge lists are ordered by insertion and may hold duplicates; the
/// `prev` list mirrors every `next` entry of the states pointing here.
#[derive(Debug)]
pub struct State<S> {
    kind: StateKind<S>,
    next: SmallVec<[StateId; 4]>,
    prev: SmallVec<[StateId; 4]>,
}

impl<S: Symbol> State<S> {
    pub(super) fn new(kind: StateKind<S>) -> Self {
        State {
            kind,
            next: SmallVec::new(),
            prev: SmallVec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &StateKind<S> {
        &self.kind
    }

    #[inline]
    pub fn next(&self) -> &[StateId] {
        &self.next
    }

    #[inline]
    pub fn prev(&self) -> &[StateId] {
        &self.prev
    }

    pub(super) fn push_next(&mut self, id: StateId) {
        self.next.push(id);
    }

    pub(super) fn push_prev(&mut self, id: StateId) {
        self.prev.push(id);
    }

    /// Remove the first occurrence of `id` from the successor list,
    /// preserving the order of the rest.
    pub(super) fn remove_next(&mut self, id: StateId) -> bool {
        match self.next.iter().position(|&other| other == id) {
            Some(position) => {
                self.next.remove(position);
                true
            }
            None => false,
        }
    }

    pub(super) fn remove_prev(&mut self, id: StateId) -> bool {
        match self.prev.iter().position(|&other| other == id) {
            Some(position) => {
                self.prev.remove(position);
                true
            }
            None => false,
        }
    }
}
