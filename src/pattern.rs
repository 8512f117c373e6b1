//! Textual pattern driver.
//!
//! Tokenizes a pattern string and drives the [`Builder`] one token at a
//! time. Recognized syntax:
//! - literals, `.`
//! - `(`...`)` grouping and `|` alternation
//! - `+`, `*`, `?` and `{m}` / `{m,n}` / `{m,}` quantifiers
//! - `[...]` and `[^...]` character classes with ranges
//! - `\d` `\w` `\s`, their negations `\D` `\W` `\S`, and the word-boundary
//!   assertions `\b` `\B`; any other escaped character is a literal

use crate::automaton::{Builder, StateKind, SymbolClass};
use crate::RegexError;

/// Digits, `0-9`.
pub(crate) fn digit_class() -> SymbolClass<char> {
    let mut class = SymbolClass::new();
    class.push_range('0', '9');
    class
}

/// Word characters, `A-Za-z0-9_`.
pub(crate) fn word_class() -> SymbolClass<char> {
    let mut class = SymbolClass::new();
    class.push_range('A', 'Z');
    class.push_range('a', 'z');
    class.push_range('0', '9');
    class.push_single('_');
    class
}

/// Whitespace: space, tab, carriage return, vertical tab, newline and form
/// feed.
pub(crate) fn space_class() -> SymbolClass<char> {
    let mut class = SymbolClass::new();
    class.push_single(' ');
    class.push_single('\t');
    class.push_single('\r');
    class.push_single('\u{000B}');
    class.push_single('\n');
    class.push_single('\u{000C}');
    class
}

/// Feed `pattern` through `builder`, one token at a time. The caller still
/// owns `Builder::finish`.
pub(crate) fn compile_into(
    builder: &mut Builder<'_, char>,
    pattern: &str,
) -> Result<(), RegexError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut index = 0;

    while index < chars.len() {
        match chars[index] {
            '(' => {
                builder.begin_group()?;
            }
            ')' => {
                builder.end_group()?;
            }
            '|' => {
                builder.push_branch();
            }
            '+' => {
                builder.push_jump();
            }
            '*' => {
                builder.push_skip().push_jump();
            }
            '?' => {
                builder.push_skip();
            }
            '.' => {
                builder.push_state(StateKind::Any);
            }
            '{' => {
                let (min, max, next) = parse_bounds(&chars, index)?;
                builder.push_repeat(min, max)?;
                index = next;
                continue;
            }
            '[' => {
                index = parse_class(builder, &chars, index)?;
                continue;
            }
            '\\' => {
                index = parse_escape(builder, &chars, index)?;
                continue;
            }
            literal => {
                builder.push_state(StateKind::Symbol(literal));
            }
        }
        index += 1;
    }
    Ok(())
}

/// Parse `{m}`, `{m,n}` or `{m,}` starting at the `{`. Returns the bounds in
/// the builder's encoding (`max == 0` for open-ended) and the index just
/// past the `}`.
fn parse_bounds(chars: &[char], start: usize) -> Result<(u32, u32, usize), RegexError> {
    let mut index = start + 1;

    let min = parse_number(chars, &mut index)?;
    let (min, max) = match chars.get(index) {
        Some('}') => {
            if min == 0 {
                return Err(RegexError::Syntax("repetition of zero".into()));
            }
            (min, min)
        }
        Some(',') => {
            index += 1;
            match chars.get(index) {
                Some('}') => (min, 0),
                Some(c) if c.is_ascii_digit() => {
                    let max = parse_number(chars, &mut index)?;
                    if max == 0 {
                        return Err(RegexError::Syntax("repetition of zero".into()));
                    }
                    if chars.get(index) != Some(&'}') {
                        return Err(RegexError::Syntax("malformed repetition".into()));
                    }
                    (min, max)
                }
                _ => return Err(RegexError::Syntax("malformed repetition".into())),
            }
        }
        _ => return Err(RegexError::Syntax("malformed repetition".into())),
    };
    Ok((min, max, index + 1))
}

fn parse_number(chars: &[char], index: &mut usize) -> Result<u32, RegexError> {
    let first = *index;
    while matches!(chars.get(*index), Some(c) if c.is_ascii_digit()) {
        *index += 1;
    }
    if *index == first {
        return Err(RegexError::Syntax("malformed repetition".into()));
    }
    chars[first..*index]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| RegexError::Syntax("repetition bound too large".into()))
}

/// Parse an escape starting at the `\`. Returns the index just past the
/// escaped character.
fn parse_escape(
    builder: &mut Builder<'_, char>,
    chars: &[char],
    start: usize,
) -> Result<usize, RegexError> {
    let escaped = chars
        .get(start + 1)
        .ok_or_else(|| RegexError::Syntax("dangling escape".into()))?;
    match escaped {
        'd' => builder.push_state(StateKind::Class(digit_class())),
        'D' => builder.push_state(StateKind::Class(digit_class().negated())),
        'w' => builder.push_state(StateKind::Class(word_class())),
        'W' => builder.push_state(StateKind::Class(word_class().negated())),
        's' => builder.push_state(StateKind::Class(space_class())),
        'S' => builder.push_state(StateKind::Class(space_class().negated())),
        'b' => builder.push_state(StateKind::Boundary {
            word: word_class(),
            negated: false,
        }),
        'B' => builder.push_state(StateKind::Boundary {
            word: word_class(),
            negated: true,
        }),
        &literal => builder.push_state(StateKind::Symbol(literal)),
    };
    Ok(start + 2)
}

/// Parse a bracket expression starting at the `[`. Returns the index just
/// past the `]`.
fn parse_class(
    builder: &mut Builder<'_, char>,
    chars: &[char],
    start: usize,
) -> Result<usize, RegexError> {
    let mut index = start + 1;
    let mut negated = false;
    if chars.get(index) == Some(&'^') {
        negated = true;
        index += 1;
        // `[^]` matches anything, like `.`.
        if chars.get(index) == Some(&']') {
            builder.push_state(StateKind::Any);
            return Ok(index + 1);
        }
    }

    let mut class = SymbolClass::new();
    loop {
        match chars.get(index) {
            None => return Err(RegexError::Syntax("unterminated character class".into())),
            Some(']') => break,
            Some('\\') => {
                let escaped = chars
                    .get(index + 1)
                    .ok_or_else(|| RegexError::Syntax("dangling escape".into()))?;
                match escaped {
                    'd' => class.merge(&digit_class()),
                    'w' => class.merge(&word_class()),
                    's' => class.merge(&space_class()),
                    &literal => class.push_single(literal),
                }
                index += 2;
            }
            Some(&low) => {
                let dashed = chars.get(index + 1) == Some(&'-')
                    && matches!(chars.get(index + 2), Some(&high) if high != ']');
                if dashed {
                    let high = chars[index + 2];
                    if low > high {
                        return Err(RegexError::Syntax(format!(
                            "class range out of order: {low}-{high}"
                        )));
                    }
                    class.push_range(low, high);
                    index += 3;
                } else {
                    class.push_single(low);
                    index += 1;
                }
            }
        }
    }

    if class.is_empty() {
        return Err(RegexError::Syntax("empty character class".into()));
    }
    let class = if negated { class.negated() } else { class };
    builder.push_state(StateKind::Class(class));
    Ok(index + 1)
}
