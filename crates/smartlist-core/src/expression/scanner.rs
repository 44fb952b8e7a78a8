//! Depth-aware text scanning shared by the clause and field-value grammars.
//!
//! Neither grammar is tokenized. The parser works directly on substrings:
//! it splits on whole-word operators outside any group, strips a `NOT`
//! prefix, or unwraps one layer of enclosing delimiters.

/// The grammar a piece of text is scanned under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    /// The filter clause: groups are `[...]`.
    Clause,
    /// A genre/language/type value: groups are `(...)`.
    FieldValue,
}

impl Grammar {
    /// The delimiters that form a group in this grammar.
    pub(crate) fn delimiters(self) -> (char, char) {
        match self {
            Grammar::Clause => ('[', ']'),
            Grammar::FieldValue => ('(', ')'),
        }
    }

    /// Whether `c` raises the nesting depth.
    ///
    /// The clause grammar also treats `(` as nesting so that operators inside
    /// a field value such as `genre:(Action OR Comedy)` stay with their leaf.
    /// An unclosed `(` therefore keeps the rest of the clause in that value.
    fn opens(self, c: char) -> bool {
        match self {
            Grammar::Clause => c == '[' || c == '(',
            Grammar::FieldValue => c == '(',
        }
    }

    /// Whether `c` lowers the nesting depth.
    fn closes(self, c: char) -> bool {
        match self {
            Grammar::Clause => c == ']' || c == ')',
            Grammar::FieldValue => c == ')',
        }
    }
}

/// Splits `text` on every whole-word occurrence of `operator` at depth 0.
///
/// An occurrence is whole-word when the characters on both sides are
/// whitespace or the edge of the text. Parts are trimmed and empty parts are
/// dropped, so callers only act on the split when two or more parts remain.
pub(crate) fn split_top_level<'a>(text: &'a str, operator: &str, grammar: Grammar) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    // `None` stands in for the leading edge, which counts as whitespace.
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        if grammar.opens(c) {
            depth += 1;
        } else if grammar.closes(c) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && is_operator_at(text, i, operator, previous) {
            parts.push(&text[start..i]);
            start = i + operator.len();
            // Operators are ASCII, so one char per byte.
            for _ in 1..operator.len() {
                chars.next();
            }
            previous = operator.chars().last();
            continue;
        }
        previous = Some(c);
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn is_operator_at(text: &str, at: usize, operator: &str, previous: Option<char>) -> bool {
    if !text[at..].starts_with(operator) {
        return false;
    }
    let before = previous.map_or(true, char::is_whitespace);
    let after = text[at + operator.len()..]
        .chars()
        .next()
        .map_or(true, char::is_whitespace);
    before && after
}

/// Returns the remainder after a leading `NOT` keyword.
///
/// The keyword is case-insensitive and must be followed by whitespace.
pub(crate) fn strip_not(text: &str) -> Option<&str> {
    const KEYWORD: &str = "NOT";

    let head = text.get(..KEYWORD.len())?;
    if !head.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    let rest = &text[KEYWORD.len()..];
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Removes one layer of group delimiters when they span the whole text.
///
/// `[a] AND [b]` starts and ends with brackets but is not wrapped, because
/// the opening bracket closes before the end of the text.
pub(crate) fn strip_group(text: &str, grammar: Grammar) -> Option<&str> {
    let (open, close) = grammar.delimiters();
    let inner = text.strip_prefix(open)?.strip_suffix(close)?;

    let mut depth = 1usize;
    for c in inner.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return None;
            }
        }
    }

    Some(inner.trim())
}
