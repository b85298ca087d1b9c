//! Wildcard IP pattern matching.
//!
//! # Responsibilities
//! - Compile a dotted pattern such as `127.0.0.*` into a matcher
//! - Match concrete client IP strings against it (full-string match)
//! - Report where the first wildcard sits (used for specificity ordering)
//!
//! # Design Decisions
//! - No regex: patterns are split on `.` and compared segment by segment
//! - `*` accepts a run of one or more ASCII digits, never a `.`
//! - Candidate and pattern must have the same number of segments

use thiserror::Error;

/// The wildcard pattern that matches every dotted-quad address.
pub const IP_ALL: &str = "*.*.*.*";

/// Error returned when a pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty ip pattern")]
    Empty,

    #[error("ip pattern {pattern:?} has an empty segment at position {index}")]
    EmptySegment { pattern: String, index: usize },

    #[error("ip pattern {pattern:?} contains invalid character {ch:?}")]
    InvalidChar { pattern: String, ch: char },
}

/// One piece of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// At least this many ASCII digits. Adjacent `*` collapse into one token.
    Digits(usize),
}

/// A compiled wildcard IP pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPattern {
    source: String,
    segments: Vec<Vec<Token>>,
    wildcard_pos: Option<usize>,
}

impl IpPattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        if let Some(ch) = pattern.chars().find(|c| !is_pattern_char(*c)) {
            return Err(PatternError::InvalidChar {
                pattern: pattern.to_string(),
                ch,
            });
        }

        let mut segments = Vec::new();
        for (index, raw) in pattern.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PatternError::EmptySegment {
                    pattern: pattern.to_string(),
                    index,
                });
            }
            segments.push(tokenize(raw));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            wildcard_pos: pattern.find('*'),
        })
    }

    /// The pattern text this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Byte index of the first `*`, if any.
    pub fn wildcard_pos(&self) -> Option<usize> {
        self.wildcard_pos
    }

    /// True if the pattern is the universal wildcard.
    pub fn is_universal(&self) -> bool {
        self.source == IP_ALL
    }

    /// Returns true if `ip` matches the whole pattern.
    pub fn matches(&self, ip: &str) -> bool {
        let mut parts = ip.split('.');
        for segment in &self.segments {
            match parts.next() {
                Some(part) if match_tokens(segment, part) => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }
}

impl std::fmt::Display for IpPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Characters allowed in a pattern. Regex metacharacters other than `.` and
/// `*` are rejected so that patterns keep their literal meaning.
fn is_pattern_char(c: char) -> bool {
    if c.is_whitespace() || c.is_control() {
        return false;
    }
    !matches!(
        c,
        '\\' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$'
    )
}

fn tokenize(segment: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    for c in segment.chars() {
        if c == '*' {
            match tokens.last_mut() {
                Some(Token::Digits(min)) if literal.is_empty() => *min += 1,
                _ => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Digits(1));
                }
            }
        } else {
            literal.push(c);
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// Match a full segment, e.g. `1*1` behaves like `1\d+1`.
///
/// Tracks the set of reachable byte offsets token by token, so the cost is
/// O(tokens * input) whatever the number of wildcards.
fn match_tokens(tokens: &[Token], input: &str) -> bool {
    let bytes = input.as_bytes();
    let len = bytes.len();

    // digit_run[i] = number of consecutive digits starting at i.
    let mut digit_run = vec![0usize; len + 1];
    for i in (0..len).rev() {
        if bytes[i].is_ascii_digit() {
            digit_run[i] = digit_run[i + 1] + 1;
        }
    }

    let mut reachable = vec![false; len + 1];
    reachable[0] = true;

    for token in tokens {
        let mut next = vec![false; len + 1];
        match token {
            Token::Literal(lit) => {
                let lit = lit.as_bytes();
                for i in (0..=len).filter(|&i| reachable[i]) {
                    if bytes[i..].starts_with(lit) {
                        next[i + lit.len()] = true;
                    }
                }
            }
            Token::Digits(min) => {
                // Each reachable i opens the range [i + min, i + digit_run[i]].
                // Ranges are merged with a running "open until" bound.
                let mut open_until: Option<usize> = None;
                for j in 0..=len {
                    if j >= *min && reachable[j - min] && digit_run[j - min] >= *min {
                        let end = j - min + digit_run[j - min];
                        open_until = Some(open_until.map_or(end, |e| e.max(end)));
                    }
                    match open_until {
                        Some(end) if j <= end => next[j] = true,
                        Some(_) => open_until = None,
                        None => {}
                    }
                }
            }
        }
        if !next.iter().any(|&r| r) {
            return false;
        }
        reachable = next;
    }

    reachable[len]
}
