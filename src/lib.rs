//! regex-nfa: full-match regular expressions over an explicit NFA.
//!
//! A pattern string compiles into a graph of states connected by unlabeled
//! transitions; whether an input symbol moves the simulation along an edge
//! is decided by the kind of the state being entered. Matching is
//! *full-input*: the automaton accepts only when every input symbol is
//! consumed and the accept state is reachable.
//!
//! ```
//! use regex_nfa::Regex;
//!
//! let re = Regex::new("(ab)+").unwrap();
//! assert!(re.accept("ababab"));
//! assert!(!re.accept("abb"));
//! ```
//!
//! The [`automaton`] module exposes the pieces behind the facade (the
//! state graph, the [`Builder`], the [`Optimizer`] and the stepwise
//! [`Executor`]) for callers that construct automata programmatically or
//! need step-level control over a match.

pub mod automaton;
mod pattern;

use std::fmt;

pub use automaton::{
    Automaton, Builder, Executor, MacroKind, Optimizer, State, StateId, StateKind, Status, Symbol,
    SymbolClass,
};

/// Errors surfaced while compiling a pattern.
#[derive(Debug)]
pub enum RegexError {
    /// Malformed pattern: unbalanced parentheses, a dangling escape, a bad
    /// character class or inverted repetition bounds.
    Syntax(String),
    /// Groups nested deeper than the builder's fixed stack allows.
    GroupOverflow,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::Syntax(message) => write!(f, "pattern syntax error: {}", message),
            RegexError::GroupOverflow => write!(f, "too many nested groups"),
        }
    }
}

impl std::error::Error for RegexError {}

/// A compiled regular expression.
///
/// Compilation builds the state graph and strips its redundant epsilon
/// states; afterwards the graph is immutable, and [`Regex::accept`] may be
/// called from any number of threads at once.
#[derive(Debug)]
pub struct Regex {
    automaton: Automaton<char>,
}

impl Regex {
    /// Compile `pattern`. On error the partially built graph is discarded.
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        let mut automaton = Automaton::new();
        let mut builder = Builder::new(&mut automaton);
        pattern::compile_into(&mut builder, pattern)?;
        builder.finish()?;
        Optimizer::new(&mut automaton).remove_epsilons();
        Ok(Regex { automaton })
    }

    /// Test whether the automaton accepts `input` in full.
    ///
    /// ```
    /// use regex_nfa::Regex;
    ///
    /// let re = Regex::new("Hello").unwrap();
    /// assert!(re.accept("Hello"));
    /// assert!(!re.accept("Hello, world!"));
    /// ```
    pub fn accept(&self, input: &str) -> bool {
        let symbols: Vec<char> = input.chars().collect();
        self.automaton.executor(&symbols).accept()
    }

    /// The compiled state graph.
    pub fn automaton(&self) -> &Automaton<char> {
        &self.automaton
    }
}

/// Compile `pattern` in place and test `input` against it.
pub fn accept(pattern: &str, input: &str) -> Result<bool, RegexError> {
    Ok(Regex::new(pattern)?.accept(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        let re = Regex::new("abc").unwrap();
        assert!(re.accept("abc"));
        assert!(!re.accept("abcd"));
        assert!(!re.accept(" abc"));
        assert!(!re.accept(""));
    }

    #[test]
    fn test_two_dots() {
        let re = Regex::new("..").unwrap();
        for code in 32..127u32 {
            let symbol = char::from_u32(code).unwrap();
            assert!(!re.accept(&symbol.to_string()));
            assert!(re.accept(&symbol.to_string().repeat(2)));
            assert!(!re.accept(&symbol.to_string().repeat(3)));
        }
    }

    #[test]
    fn test_dot_rejects_null() {
        let re = Regex::new(".").unwrap();
        for code in 1..127u32 {
            let symbol = char::from_u32(code).unwrap();
            assert!(re.accept(&symbol.to_string()));
        }
        assert!(!re.accept("\0"));
    }

    #[test]
    fn test_plus() {
        let re = Regex::new("a+").unwrap();
        for count in [1, 2, 17, 1000] {
            assert!(re.accept(&"a".repeat(count)));
            assert!(!re.accept(&"b".repeat(count)));
        }
        assert!(!re.accept(""));
    }

    #[test]
    fn test_plus_then_star() {
        let re = Regex::new("a+b*").unwrap();
        assert!(re.accept("a"));
        assert!(re.accept("ab"));
        assert!(re.accept("abbb"));
        assert!(re.accept("aaabbbb"));
        assert!(re.accept("aaaa"));
        assert!(!re.accept("abba"));
        assert!(!re.accept("ababab"));
        assert!(!re.accept("b"));
    }

    #[test]
    fn test_group_plus() {
        let re = Regex::new("(ab)+").unwrap();
        assert!(re.accept("ab"));
        assert!(re.accept("ababab"));
        assert!(!re.accept("aaabbbb"));
        assert!(!re.accept("abbb"));
        assert!(!re.accept("abba"));
        assert!(!re.accept("aaaa"));
    }

    #[test]
    fn test_word_class_members() {
        let re = Regex::new("[a-zA-Z0-9_]").unwrap();
        let mut accepted = 0;
        for code in 0..127u32 {
            let symbol = char::from_u32(code).unwrap();
            let expected = symbol.is_ascii_alphanumeric() || symbol == '_';
            assert_eq!(re.accept(&symbol.to_string()), expected, "{symbol:?}");
            if expected {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 63);
    }

    #[test]
    fn test_digit_escape() {
        let re = Regex::new("\\d\\d").unwrap();
        assert!(re.accept("10"));
        assert!(re.accept("67"));
        assert!(!re.accept("1"));
        assert!(!re.accept("ab"));
        assert!(!re.accept("123"));
    }

    #[test]
    fn test_word_escape() {
        let re = Regex::new("\\w").unwrap();
        for code in 0..127u32 {
            let symbol = char::from_u32(code).unwrap();
            let expected = symbol.is_ascii_alphanumeric() || symbol == '_';
            assert_eq!(re.accept(&symbol.to_string()), expected, "{symbol:?}");
        }
    }

    #[test]
    fn test_space_escape() {
        let re = Regex::new("\\s").unwrap();
        for code in 0..127u32 {
            let symbol = char::from_u32(code).unwrap();
            let expected = matches!(symbol, ' ' | '\t' | '\r' | '\u{000B}' | '\n' | '\u{000C}');
            assert_eq!(re.accept(&symbol.to_string()), expected, "{symbol:?}");
        }
    }

    #[test]
    fn test_negated_escapes() {
        let non_digit = Regex::new("\\D").unwrap();
        assert!(non_digit.accept("a"));
        assert!(!non_digit.accept("7"));

        let non_word = Regex::new("\\W").unwrap();
        assert!(non_word.accept("!"));
        assert!(!non_word.accept("x"));

        let non_space = Regex::new("\\S").unwrap();
        assert!(non_space.accept("x"));
        assert!(!non_space.accept(" "));
    }

    #[test]
    fn test_negated_class() {
        let re = Regex::new("[^abc]").unwrap();
        assert!(re.accept("d"));
        assert!(re.accept("!"));
        assert!(!re.accept("a"));
        assert!(!re.accept("b"));
        assert!(!re.accept("c"));
    }

    #[test]
    fn test_empty_negated_class_is_any() {
        let re = Regex::new("[^]").unwrap();
        for code in 1..127u32 {
            let symbol = char::from_u32(code).unwrap();
            assert!(re.accept(&symbol.to_string()));
        }
        assert!(!re.accept("\0"));
        assert!(!re.accept("ab"));
    }

    #[test]
    fn test_optional() {
        let re = Regex::new("ab?c").unwrap();
        assert!(re.accept("abc"));
        assert!(re.accept("ac"));
        assert!(!re.accept("abbc"));
    }

    #[test]
    fn test_alternation() {
        let re = Regex::new("cat|dog").unwrap();
        assert!(re.accept("cat"));
        assert!(re.accept("dog"));
        assert!(!re.accept("catdog"));
        assert!(!re.accept("ca"));
    }

    #[test]
    fn test_bounded_repetition() {
        let re = Regex::new("a{2,3}").unwrap();
        assert!(!re.accept("a"));
        assert!(re.accept("aa"));
        assert!(re.accept("aaa"));
        assert!(!re.accept("aaaa"));

        let re = Regex::new("(ab){2}").unwrap();
        assert!(re.accept("abab"));
        assert!(!re.accept("ab"));
        assert!(!re.accept("ababab"));

        let re = Regex::new("a{3,}").unwrap();
        assert!(!re.accept("aa"));
        assert!(re.accept("aaa"));
        assert!(re.accept(&"a".repeat(50)));
    }

    #[test]
    fn test_word_boundary() {
        let re = Regex::new("\\bab").unwrap();
        assert!(re.accept("ab"));

        let re = Regex::new("a\\bb").unwrap();
        assert!(!re.accept("ab"));

        let re = Regex::new("a\\Bb").unwrap();
        assert!(re.accept("ab"));

        let re = Regex::new("ab\\b").unwrap();
        assert!(re.accept("ab"));

        let re = Regex::new("a, \\bb").unwrap();
        assert!(re.accept("a, b"));
    }

    #[test]
    fn test_url_pattern() {
        let re = Regex::new("https?://\\w+(\\.\\w+)+").unwrap();
        assert!(re.accept("http://example.com"));
        assert!(re.accept("https://www.example.co.uk"));
        assert!(!re.accept("ftp://example.com"));
        assert!(!re.accept("https://example"));
    }

    #[test]
    fn test_empty_pattern_accepts_only_empty_input() {
        let re = Regex::new("").unwrap();
        assert!(re.accept(""));
        assert!(!re.accept("a"));
    }

    #[test]
    fn test_empty_alternative() {
        let re = Regex::new("a|").unwrap();
        assert!(re.accept("a"));
        assert!(re.accept(""));
        assert!(!re.accept("b"));
    }

    #[test]
    fn test_one_shot_accept() {
        assert!(accept("[abc]+", "aabbabc").unwrap());
        assert!(!accept("[abc]+", "aabbabcd").unwrap());
        assert!(accept("\\d{1,3}(\\.\\d{1,3}){3}", "127.167.178.11").unwrap());
        assert!(!accept("\\d{1,3}(\\.\\d{1,3}){3}", "127.167.178").unwrap());
    }

    #[test]
    fn test_error_display() {
        let error = Regex::new("(a").unwrap_err();
        assert!(error.to_string().contains("syntax"));
        let error = Regex::new(&"(".repeat(200)).unwrap_err();
        assert!(error.to_string().contains("nested"));
    }
}
