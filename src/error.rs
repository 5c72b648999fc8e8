//! Crate-wide error type
//!
//! Every fallible operation returns [`Error`]. Lower-level failures are
//! wrapped with a boundary message via [`ResultExt::context`] as they cross
//! component seams; nothing is swallowed. The binary picks how much of the
//! chain to render.

use std::fmt;
use std::io;

/// Error type shared by all components
#[derive(Debug)]
pub enum Error {
    /// No note with the requested UID exists in the store
    NotFound { uid: String },
    /// Malformed note file or malformed status-protocol line
    Parse { message: String },
    /// Filesystem write failure
    Write { path: String, source: io::Error },
    /// Read/stat/listing failure
    Io { message: String, source: io::Error },
    /// Nonzero exit from the underlying VCS tool, diagnostic text attached
    Vcs { command: String, detail: String },
    /// Unreadable or undecodable configuration
    Config { message: String },
    /// A lower-level error wrapped with a boundary message
    Context { message: String, source: Box<Error> },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a [`Error::Parse`] with the given message.
    pub fn parse(message: impl Into<String>) -> Error {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Config`] with the given message.
    pub fn config(message: impl Into<String>) -> Error {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wrap this error with a boundary message, keeping it as the cause.
    pub fn context(self, message: impl Into<String>) -> Error {
        Error::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }

    /// The deepest cause in the chain, as rendered by default.
    pub fn root_cause(&self) -> String {
        let mut current: &dyn std::error::Error = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }

    /// The full chain, one numbered line per error, innermost first.
    pub fn render_chain(&self) -> String {
        let mut messages = Vec::new();
        let mut current: Option<&dyn std::error::Error> = Some(self);
        while let Some(error) = current {
            messages.push(error.to_string());
            current = error.source();
        }

        let mut rendered = String::from("errors in order from innermost:");
        for (index, message) in messages.iter().rev().enumerate() {
            rendered.push_str(&format!("\n  {}. {}", index + 1, message));
        }
        rendered
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { uid } => write!(f, "no note with UID '{}'", uid),
            Error::Parse { message } => write!(f, "{}", message),
            Error::Write { path, .. } => write!(f, "cannot write '{}'", path),
            Error::Io { message, .. } => write!(f, "{}", message),
            Error::Vcs { command, detail } => write!(f, "{} failed: {}", command, detail),
            Error::Config { message } => write!(f, "{}", message),
            Error::Context { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { source, .. } | Error::Io { source, .. } => Some(source),
            Error::Context { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Extension adding [`Error::context`] to `Result`.
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.context(message))
    }
}
