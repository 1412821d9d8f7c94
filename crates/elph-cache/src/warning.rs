//! Warning types for non-fatal errors while loading a cache file.
//!
//! A corrupt line in the edge cache must never make the catalog unusable:
//! the line is skipped and reported through a [`Warning`].
//!
//! # Examples
//!
//! ```
//! use elph_cache::warning::Warning;
//!
//! let warning = Warning::MalformedLine {
//!     line_number: 3,
//!     line: "a => b".to_string(),
//!     error: "expected 2 tokens separated by '->', found 1".to_string(),
//! };
//!
//! assert_eq!(warning.line_number(), 3);
//! assert_eq!(warning.kind(), "malformed_line");
//! ```

/// A non-fatal problem found while reading a cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line could not be decoded as `source -> target`.
    MalformedLine {
        /// The 1-based line number.
        line_number: usize,
        /// The offending line, without its terminator.
        line: String,
        /// Why decoding failed.
        error: String,
    },

    /// A line was skipped for a reason other than its syntax.
    SkippedLine {
        /// The 1-based line number.
        line_number: usize,
        /// Why the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedLine { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a human-readable description of the warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use elph_cache::warning::Warning;
    ///
    /// let warning = Warning::SkippedLine {
    ///     line_number: 7,
    ///     reason: "invalid UTF-8".to_string(),
    /// };
    /// assert_eq!(warning.description(), "line 7: skipped: invalid UTF-8");
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedLine {
                line_number,
                line,
                error,
            } => format!("line {line_number}: malformed edge {line:?}: {error}"),
            Self::SkippedLine {
                line_number,
                reason,
            } => format!("line {line_number}: skipped: {reason}"),
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedLine { .. } => "malformed_line",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}
