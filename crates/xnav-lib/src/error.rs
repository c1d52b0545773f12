use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the navigation data library.
pub type Result<T> = std::result::Result<T, Error>;

/// Token type requested from a row when a conversion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Integer,
    Double,
    Word,
    /// A single-letter code such as an airway direction.
    Code,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TokenKind::Integer => "integer",
            TokenKind::Double => "floating-point number",
            TokenKind::Word => "word",
            TokenKind::Code => "record code",
        };
        f.write_str(value)
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A token could not be converted to the requested type, or was absent.
    #[error("malformed token on line {line}: expected {expected}, found {}", describe_found(.found))]
    MalformedToken {
        line: usize,
        expected: TokenKind,
        found: Option<String>,
    },

    /// The source ended before a header line could be read.
    #[error("navigation data source is empty; expected a header line")]
    MissingHeader,

    /// The header line does not begin with a numeric format version.
    #[error("unsupported navigation data header: {header:?}")]
    UnsupportedHeader { header: String },

    /// A parser was driven before a record sink was registered.
    #[error("{parser} parser has no acceptor registered")]
    AcceptorMissing { parser: &'static str },

    /// Wraps any failure with the file it originated from.
    #[error("failed to parse navigation data file {path}")]
    NavDataFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A configured data file or directory does not exist.
    #[error("navigation data not found at {path}")]
    NavDataNotFound { path: PathBuf },

    /// No X-Plane installation could be resolved.
    #[error("failed to resolve an X-Plane installation; pass an explicit root or set XNAV_XPLANE_ROOT")]
    XPlaneRootUnavailable,

    /// Raised when an airport identifier could not be found in the world.
    #[error("unknown airport: {name}{}", format_suggestions(.suggestions))]
    UnknownAirport {
        name: String,
        suggestions: Vec<String>,
    },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the originating file path to an error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::NavDataFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(token) => format!("{token:?}"),
        None => "end of line".to_string(),
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
