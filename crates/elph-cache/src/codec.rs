//! Line codec for edge records.
//!
//! Every record is a single line of the form `source -> target`, where both
//! sides are project names. There is no header and every record, including
//! the last, is terminated by a newline.
//!
//! # Examples
//!
//! ```
//! use elph_cache::codec::{format_edges, EdgeRecord};
//!
//! let edges = vec![EdgeRecord::new("app", "cnf"), EdgeRecord::new("app", "lib")];
//! assert_eq!(format_edges(&edges), "app -> cnf\napp -> lib\n");
//!
//! let parsed: EdgeRecord = "app -> lib".parse().unwrap();
//! assert_eq!(parsed.target, "lib");
//! ```

use std::fmt;
use std::str::FromStr;

/// Separator between the source and target of a record.
pub const SEPARATOR: &str = " -> ";

/// One cached dependency edge: `source` requires `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeRecord {
    /// Name of the depending project.
    pub source: String,
    /// Name of the project depended upon.
    pub target: String,
}

impl EdgeRecord {
    /// Creates a record from a source and a target name.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for EdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source, SEPARATOR, self.target)
    }
}

/// Reason a line could not be decoded into an [`EdgeRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not split into exactly two tokens on [`SEPARATOR`].
    TokenCount(usize),
    /// One side of the separator was blank.
    EmptyToken,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenCount(n) => write!(
                f,
                "expected 2 tokens separated by '{}', found {}",
                SEPARATOR.trim(),
                n
            ),
            Self::EmptyToken => write!(f, "project name must not be empty"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Decodes a single line into an [`EdgeRecord`].
///
/// A trailing carriage return is tolerated so that files edited on Windows
/// still load. Surrounding whitespace of each token is trimmed.
///
/// # Errors
///
/// Returns [`ParseError`] when the line does not contain exactly one
/// separator or when either token is blank.
pub fn parse_line(line: &str) -> Result<EdgeRecord, ParseError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let tokens: Vec<&str> = line.split(SEPARATOR).collect();
    if tokens.len() != 2 {
        return Err(ParseError::TokenCount(tokens.len()));
    }
    let (source, target) = (tokens[0].trim(), tokens[1].trim());
    if source.is_empty() || target.is_empty() {
        return Err(ParseError::EmptyToken);
    }
    Ok(EdgeRecord::new(source, target))
}

impl FromStr for EdgeRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

/// Encodes records into the on-disk text form, one per line.
pub fn format_edges<'a, I>(edges: I) -> String
where
    I: IntoIterator<Item = &'a EdgeRecord>,
{
    let mut out = String::new();
    for edge in edges {
        out.push_str(&edge.source);
        out.push_str(SEPARATOR);
        out.push_str(&edge.target);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_valid_line() {
        let record = parse_line("com.ibm.ws.kernel -> cnf").unwrap();
        assert_eq!(record, EdgeRecord::new("com.ibm.ws.kernel", "cnf"));
    }

    #[test]
    fn parse_tolerates_carriage_return() {
        let record = parse_line("a -> b\r").unwrap();
        assert_eq!(record.target, "b");
    }

    #[rstest]
    #[case("", 1)]
    #[case("just-a-name", 1)]
    #[case("a -> b -> c", 3)]
    #[case("a->b", 1)]
    fn parse_rejects_wrong_token_count(#[case] line: &str, #[case] count: usize) {
        assert_eq!(parse_line(line), Err(ParseError::TokenCount(count)));
    }

    #[rstest]
    #[case(" -> b")]
    #[case("a -> ")]
    #[case("   ->    ")]
    fn parse_rejects_blank_tokens(#[case] line: &str) {
        assert_eq!(parse_line(line), Err(ParseError::EmptyToken));
    }

    #[test]
    fn format_terminates_every_record() {
        let edges = [EdgeRecord::new("x", "y")];
        assert_eq!(format_edges(&edges), "x -> y\n");
        assert_eq!(format_edges(&Vec::<EdgeRecord>::new()), "");
    }

    #[test]
    fn display_matches_file_form() {
        assert_eq!(EdgeRecord::new("a", "b").to_string(), "a -> b");
    }

    #[test]
    fn parse_error_messages() {
        assert!(ParseError::TokenCount(3).to_string().contains("found 3"));
        assert!(ParseError::EmptyToken.to_string().contains("empty"));
    }
}
