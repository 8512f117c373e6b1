//! Graph construction: a token stream becomes states and edges.
//!
//! ## The group stack
//!
//! The builder keeps a bounded stack of `(start, end)` frames. Frame 0 is
//! the whole expression, delimited by the graph's start and accept states.
//! `begin_group` pushes a frame, `end_group` pops it.
//!
//! The frame slot just above the innermost open group is special: it records
//! the most recently inserted *atom*. `push_state` stores the fresh
//! `(epsilon, state)` pair there, and `end_group` leaves the closed group's
//! frame there when it decrements the stack index. A quantifier
//! (`push_jump`, `push_skip`, `push_repeat`) always operates on that top
//! frame, which is exactly what makes `a+`, `(ab)+` and `(ab){2,4}` apply to
//! the preceding atom or group as a whole. This convention is the subtlest
//! part of the builder; every operation below is written against it.

use rustc_hash::FxHashMap;

use crate::RegexError;

use super::state::{StateKind, Symbol};
use super::{Automaton, StateId};

/// Hard limit on group nesting, frame 0 included.
const MAX_GROUPS: usize = 127;

/// A group or atom scope: the epsilon states delimiting it.
#[derive(Clone, Copy)]
struct Frame {
    start: StateId,
    end: StateId,
}

/// Bookkeeping for an open `begin_macro`: the atom frame to restore on
/// `end_macro`, and the stack index of the sub-automaton's frame.
struct MacroScope {
    atom: Frame,
    sub_index: usize,
}

/// What a `begin_macro`/`end_macro` pair splices into the outer graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacroKind {
    /// Plain sub-automaton splice: traversed iff the sub-automaton accepts
    /// a prefix of the remaining input.
    Splice,
    /// `(?=...)`: succeeds iff the sub-automaton accepts a prefix.
    PositiveLookahead,
    /// `(?!...)`: succeeds iff the sub-automaton accepts no prefix.
    NegativeLookahead,
}

/// Incrementally builds an [`Automaton`].
///
/// Operations append to the graph at the *current* state, which starts out
/// at the graph's start state. [`Builder::finish`] joins the last open
/// alternative to the accept state and must be called exactly once.
///
/// ```
/// use regex_nfa::{Automaton, Builder, StateKind};
///
/// // (a|b)+
/// let mut automaton = Automaton::new();
/// let mut builder = Builder::new(&mut automaton);
/// builder.begin_group().unwrap();
/// builder.push_state(StateKind::Symbol('a'));
/// builder.push_branch();
/// builder.push_state(StateKind::Symbol('b'));
/// builder.end_group().unwrap();
/// builder.push_jump();
/// builder.finish().unwrap();
///
/// let input: Vec<char> = "abba".chars().collect();
/// assert!(automaton.executor(&input).accept());
/// ```
pub struct Builder<'a, S: Symbol> {
    graph: &'a mut Automaton<S>,
    /// The state new atoms are appended after.
    current: StateId,
    frames: [Frame; MAX_GROUPS],
    /// Index of the last-atom frame; `frames[group - 1]` is the innermost
    /// enclosing group.
    group: usize,
    macros: Vec<MacroScope>,
}

impl<'a, S: Symbol> Builder<'a, S> {
    pub fn new(graph: &'a mut Automaton<S>) -> Self {
        let top = Frame {
            start: graph.start(),
            end: graph.accept(),
        };
        Builder {
            current: top.start,
            frames: [top; MAX_GROUPS],
            group: 1,
            macros: Vec::new(),
            graph,
        }
    }

    /// Append a new state of the given kind after the current state, behind
    /// a fresh epsilon. The `(epsilon, state)` pair becomes the last atom,
    /// so a quantifier that follows applies to this state alone.
    pub fn push_state(&mut self, kind: StateKind<S>) -> &mut Self {
        let epsilon = self.graph.add_state(StateKind::Epsilon);
        let state = self.graph.add_state(kind);
        self.graph.link(self.current, epsilon);
        self.graph.link(epsilon, state);
        self.current = state;
        self.frames[self.group] = Frame {
            start: epsilon,
            end: state,
        };
        self
    }

    /// Open a group (`(` in pattern syntax).
    pub fn begin_group(&mut self) -> Result<&mut Self, RegexError> {
        if self.group + 1 >= MAX_GROUPS {
            return Err(RegexError::GroupOverflow);
        }
        let start = self.graph.add_state(StateKind::Epsilon);
        let end = self.graph.add_state(StateKind::Epsilon);
        self.graph.link(self.current, start);
        self.current = start;
        self.frames[self.group] = Frame { start, end };
        self.group += 1;
        Ok(self)
    }

    /// Close the innermost group (`)`). The closed group's frame becomes
    /// the last atom, so a quantifier that follows applies to the whole
    /// group.
    pub fn end_group(&mut self) -> Result<&mut Self, RegexError> {
        if self.group <= self.scope_floor() + 1 {
            return Err(RegexError::Syntax("unmatched `)`".into()));
        }
        self.group -= 1;
        let frame = self.frames[self.group];
        self.graph.link(self.current, frame.end);
        self.current = frame.end;
        Ok(self)
    }

    /// Terminate the current alternative and start another one at the
    /// enclosing group's start (`|`). All alternatives of a group join at
    /// its end state.
    pub fn push_branch(&mut self) -> &mut Self {
        let enclosing = self.frames[self.group - 1];
        self.graph.link(self.current, enclosing.end);
        self.current = enclosing.start;
        self
    }

    /// Loop the last atom back onto itself (`+`): one or more repetitions.
    pub fn push_jump(&mut self) -> &mut Self {
        let atom = self.frames[self.group];
        self.graph.link(atom.end, atom.start);
        self
    }

    /// Allow the last atom to be bypassed (`?`; combined with `push_jump`
    /// it yields `*`).
    pub fn push_skip(&mut self) -> &mut Self {
        let skip = self.graph.add_state(StateKind::Epsilon);
        self.graph.link(self.current, skip);
        self.graph.link(self.frames[self.group].start, skip);
        self.current = skip;
        self
    }

    /// Bounded repetition of the last atom: `{min}`, `{min,max}`, or with
    /// `max == 0` the open-ended `{min,}`.
    ///
    /// The atom's subgraph is cloned `min - 1` times behind separator
    /// epsilons (the separators keep loops inside one copy from bleeding
    /// into the next), then either looped open-endedly or extended with
    /// `max - min` skippable copies. A terminating epsilon becomes the new
    /// last-atom end, so a further quantifier sees the whole repetition.
    pub fn push_repeat(&mut self, min: u32, max: u32) -> Result<&mut Self, RegexError> {
        if max != 0 && min > max {
            return Err(RegexError::Syntax(format!(
                "bad repetition bounds {{{min},{max}}}"
            )));
        }
        let atom = self.frames[self.group];

        // Mandatory copies. `last_entry` tracks the epsilon in front of the
        // last copy so an open-ended repeat can loop back over it.
        let mut last_entry = atom.start;
        for _ in 1..min {
            let separator = self.graph.add_state(StateKind::Epsilon);
            self.graph.link(self.current, separator);
            let copy = self.clone_group(atom, separator);
            self.current = copy.end;
            last_entry = separator;
        }

        // `shortcut` carries the separator whose skip edge still needs a
        // landing site: the next separator, or the terminating epsilon.
        let mut shortcut: Option<StateId> = None;
        if max == 0 {
            self.graph.link(self.current, last_entry);
        } else {
            let optional = if min == 0 { max - 1 } else { max - min };
            for _ in 0..optional {
                let separator = self.graph.add_state(StateKind::Epsilon);
                self.graph.link(self.current, separator);
                if let Some(from) = shortcut.take() {
                    self.graph.link(from, separator);
                }
                shortcut = Some(separator);
                let copy = self.clone_group(atom, separator);
                self.current = copy.end;
            }
        }

        let end = self.graph.add_state(StateKind::Epsilon);
        self.graph.link(self.current, end);
        if let Some(from) = shortcut {
            self.graph.link(from, end);
        }
        if min == 0 {
            // Zero repetitions allowed: bypass the first copy too.
            self.graph.link(atom.start, end);
        }
        self.current = end;
        self.frames[self.group].end = end;
        Ok(self)
    }

    /// Open a sub-automaton and splice a state of the requested macro kind
    /// into the outer graph. Until [`Builder::end_macro`], all operations
    /// build the sub-automaton.
    pub fn begin_macro(&mut self, kind: MacroKind) -> Result<&mut Self, RegexError> {
        if self.group + 1 >= MAX_GROUPS {
            return Err(RegexError::GroupOverflow);
        }
        let sub_start = self.graph.add_state(StateKind::Epsilon);
        let sub_accept = self.graph.add_state(StateKind::Epsilon);
        let kind = match kind {
            MacroKind::Splice => StateKind::Macro {
                start: sub_start,
                accept: sub_accept,
            },
            MacroKind::PositiveLookahead => StateKind::Lookahead {
                negated: false,
                start: sub_start,
                accept: sub_accept,
            },
            MacroKind::NegativeLookahead => StateKind::Lookahead {
                negated: true,
                start: sub_start,
                accept: sub_accept,
            },
        };

        // Attach the macro node itself as a regular atom.
        let epsilon = self.graph.add_state(StateKind::Epsilon);
        let node = self.graph.add_state(kind);
        self.graph.link(self.current, epsilon);
        self.graph.link(epsilon, node);

        self.macros.push(MacroScope {
            atom: Frame {
                start: epsilon,
                end: node,
            },
            sub_index: self.group,
        });
        self.frames[self.group] = Frame {
            start: sub_start,
            end: sub_accept,
        };
        self.group += 1;
        self.current = sub_start;
        Ok(self)
    }

    /// Close the innermost sub-automaton and resume building the outer
    /// graph after its macro node.
    pub fn end_macro(&mut self) -> Result<&mut Self, RegexError> {
        let scope = self
            .macros
            .pop()
            .ok_or_else(|| RegexError::Syntax("unmatched macro end".into()))?;
        if self.group != scope.sub_index + 1 {
            return Err(RegexError::Syntax(
                "unbalanced group inside sub-automaton".into(),
            ));
        }
        self.group -= 1;
        let sub = self.frames[self.group];
        self.graph.link(self.current, sub.end);

        // The macro node is the atom a following quantifier applies to.
        self.frames[self.group] = scope.atom;
        self.current = scope.atom.end;
        Ok(self)
    }

    /// Join the last alternative to the accept state. Fails when groups or
    /// sub-automata are still open.
    pub fn finish(self) -> Result<(), RegexError> {
        if !self.macros.is_empty() {
            return Err(RegexError::Syntax("unterminated sub-automaton".into()));
        }
        if self.group != 1 {
            return Err(RegexError::Syntax("unmatched `(`".into()));
        }
        let top = self.frames[0];
        self.graph.link(self.current, top.end);
        Ok(())
    }

    /// The stack index below which `end_group` must not pop: the frame of
    /// the innermost open sub-automaton, or frame 0.
    fn scope_floor(&self) -> usize {
        self.macros.last().map_or(0, |scope| scope.sub_index)
    }

    /// Clone the subgraph delimited by `source`, attach the copy after
    /// `attach`, and return the copy's frame.
    ///
    /// Pre-order traversal from `source.start`; the edges out of
    /// `source.end` are not followed, so surrounding context is never
    /// duplicated. Revisits only add edges, which preserves any cycle
    /// structure inside the copy.
    fn clone_group(&mut self, source: Frame, attach: StateId) -> Frame {
        let mut mapping: FxHashMap<StateId, StateId> = FxHashMap::default();

        let kind = self.graph.kind(source.start).clone();
        let first = self.graph.add_state(kind);
        mapping.insert(source.start, first);
        self.graph.link(attach, first);

        let mut pending = vec![source.start];
        while let Some(old) = pending.pop() {
            if old == source.end {
                continue;
            }
            let from = mapping[&old];
            let successors: Vec<StateId> = self.graph.next(old).to_vec();
            for old_next in successors {
                let to = match mapping.get(&old_next) {
                    Some(&existing) => existing,
                    None => {
                        let kind = self.graph.kind(old_next).clone();
                        let cloned = self.graph.add_state(kind);
                        mapping.insert(old_next, cloned);
                        pending.push(old_next);
                        cloned
                    }
                };
                self.graph.link(from, to);
            }
        }

        let end = match mapping.get(&source.end) {
            Some(&end) => end,
            // The group end was unreachable from its start; clone it
            // detached so the caller still has a landing state.
            None => {
                let kind = self.graph.kind(source.end).clone();
                self.graph.add_state(kind)
            }
        };
        Frame { start: first, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(automaton: &Automaton<char>, input: &str) -> bool {
        let symbols: Vec<char> = input.chars().collect();
        automaton.executor(&symbols).accept()
    }

    #[test]
    fn test_alternatives_join_at_group_end() {
        // (a|b)+
        let mut automaton = Automaton::new();
        let mut builder = Builder::new(&mut automaton);
        builder.begin_group().unwrap();
        builder.push_state(StateKind::Symbol('a'));
        builder.push_branch();
        builder.push_state(StateKind::Symbol('b'));
        builder.end_group().unwrap();
        builder.push_jump();
        builder.finish().unwrap();

        assert!(accepts(&automaton, "abbabba"));
        assert!(accepts(&automaton, "a"));
        assert!(!accepts(&automaton, "abbacba"));
        assert!(!accepts(&automaton, ""));
    }

    #[test]
    fn test_group_overflow() {
        let mut automaton = Automaton::<char>::new();
        let mut builder = Builder::new(&mut automaton);
        let mut result = Ok(());
        for _ in 0..MAX_GROUPS {
            if let Err(error) = builder.begin_group() {
                result = Err(error);
                break;
            }
        }
        assert!(matches!(result, Err(RegexError::GroupOverflow)));
    }

    #[test]
    fn test_unmatched_close() {
        let mut automaton = Automaton::<char>::new();
        let mut builder = Builder::new(&mut automaton);
        assert!(matches!(
            builder.end_group(),
            Err(RegexError::Syntax(_))
        ));
    }

    #[test]
    fn test_finish_rejects_open_group() {
        let mut automaton = Automaton::<char>::new();
        let mut builder = Builder::new(&mut automaton);
        builder.begin_group().unwrap();
        builder.push_state(StateKind::Symbol('a'));
        assert!(matches!(builder.finish(), Err(RegexError::Syntax(_))));
    }

    #[test]
    fn test_repeat_rejects_inverted_bounds() {
        let mut automaton = Automaton::<char>::new();
        let mut builder = Builder::new(&mut automaton);
        builder.push_state(StateKind::Symbol('a'));
        assert!(matches!(
            builder.push_repeat(3, 2),
            Err(RegexError::Syntax(_))
        ));
    }

    #[test]
    fn test_repeat_open_ended_equals_jump_for_min_one() {
        // a{1,} behaves like a+.
        let mut automaton = Automaton::new();
        let mut builder = Builder::new(&mut automaton);
        builder.push_state(StateKind::Symbol('a'));
        builder.push_repeat(1, 0).unwrap();
        builder.finish().unwrap();

        assert!(accepts(&automaton, "a"));
        assert!(accepts(&automaton, "aaaa"));
        assert!(!accepts(&automaton, ""));
        assert!(!accepts(&automaton, "ab"));
    }
}
