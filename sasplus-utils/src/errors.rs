//! Errors generated by the scoping tool.

/// Convenience wrapper to represent success or a meaningful tool error.
pub type SasResult<T> = std::result::Result<T, Error>;

/// Errors generated while parsing, scoping or serializing a SAS+ task.
#[derive(Clone)]
pub struct Error {
    kind: Box<ErrorKind>,
    post_msg: Option<String>,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(post) = &self.post_msg {
            write!(f, "\n{}", post)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn with_post_msg(mut self, msg: Option<String>) -> Self {
        self.post_msg = msg;
        self
    }

    /// Malformed SAS+ input: missing section, wrong counts, non-integer
    /// where an integer was expected. `section` names the offending
    /// `begin_X`/`end_X` block.
    pub fn parse_error<S: ToString>(section: S, msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Parse(section.to_string())),
            post_msg: Some(msg.to_string()),
        }
    }

    /// Structural inconsistency discovered after a successful parse (e.g.
    /// initial-state length does not match the variable count).
    pub fn invariant<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::Invariant(msg.to_string())),
            post_msg: None,
        }
    }

    /// A merge was requested on actions with differing effect fingerprints.
    /// Always a programmer error in the caller, never triggered by input
    /// data alone.
    pub fn merge_invariant<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::MergeInvariant(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn invalid_file<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::InvalidFile(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn write_error<S: ToString>(msg: S) -> Self {
        Self {
            kind: Box::new(ErrorKind::WriteError(msg.to_string())),
            post_msg: None,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// The kinds of errors the tool can raise. See spec §7.
#[derive(Clone)]
enum ErrorKind {
    /// Codec parse error: malformed SAS+ input. The `String` names the
    /// section (`"variables"`, `"operators"`, ...) in which parsing failed.
    Parse(String),
    /// Codec invariant violation discovered after a successful parse.
    Invariant(String),
    /// Merge invariant violation: actions with differing effect
    /// fingerprints were handed to the merge procedure.
    MergeInvariant(String),
    /// The input file could not be read.
    InvalidFile(String),
    /// Failed to write the scoped output.
    WriteError(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorKind::*;
        match self {
            Parse(section) => write!(f, "Parse error in `{section}' section"),
            Invariant(msg) => write!(f, "Invariant violation: {msg}"),
            MergeInvariant(msg) => {
                write!(f, "Merge invariant violation: {msg}")
            }
            InvalidFile(msg) => write!(f, "{msg}"),
            WriteError(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::write_error(format!("IO error: {e}"))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Error::parse_error("unknown", e.to_string())
    }
}
