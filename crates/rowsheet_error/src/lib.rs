use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;

/// Broad category of a failure.
///
/// The kind survives wrapping, so a validation failure deep inside an
/// operation is still reported as a validation failure at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed construction input.
    Configuration,
    /// Credentials could not be read or exchanged for a token.
    Initialization,
    /// Caller input rejected before (or instead of) mutating the sheet.
    Validation,
    /// A named remote entity could not be resolved.
    Lookup,
    /// The remote service call failed.
    Transport,
    /// Anything else, typically local encode/decode failures.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Initialization => "initialization",
            Self::Validation => "validation",
            Self::Lookup => "lookup",
            Self::Transport => "transport",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug)]
pub struct SheetsError {
    inner: Box<SheetsErrorInner>,
}

#[derive(Debug)]
struct SheetsErrorInner {
    msg: String,
    kind: ErrorKind,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<(Cow<'static, str>, String)>,
}

impl SheetsError {
    /// Create a new internal error with the given message.
    pub fn new(msg: impl Into<String>) -> Self {
        SheetsError {
            inner: Box::new(SheetsErrorInner {
                msg: msg.into(),
                kind: ErrorKind::Internal,
                source: None,
                fields: Vec::new(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::new(msg).with_kind(ErrorKind::Configuration)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(msg).with_kind(ErrorKind::Validation)
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::new(msg).with_kind(ErrorKind::Lookup)
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(msg).with_kind(ErrorKind::Transport)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    /// Attach a structured field to the error.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: fmt::Display,
    {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    /// Wrap this error in a new error with a more descriptive message.
    ///
    /// The kind of the wrapped error is kept.
    pub fn wrap(self, msg: impl Into<String>) -> Self {
        let kind = self.inner.kind;
        Self::with_source(msg, Box::new(self)).with_kind(kind)
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;
        for (key, value) in &self.inner.fields {
            write!(f, " [{key}: {value}]")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl Error for SheetsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension for adding context to results from other crates.
pub trait ResultExt<T, E> {
    /// Wrap an error with a static message.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap an error with a message produced from a closure.
    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| SheetsError::with_source(msg, Box::new(e)))
    }

    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| SheetsError::with_source(f(), Box::new(e)))
    }
}
