/// Error types for binding-tree export and parsing.
#[derive(Debug)]
pub enum BindingError {
    /// quick-xml reader or writer error
    Xml(quick_xml::Error),

    /// Malformed escape sequence in text or attribute content
    Escape(quick_xml::escape::EscapeError),

    /// IO error while reading or writing a document
    Io(std::io::Error),

    /// Exported bytes were not valid UTF-8
    Utf8(std::string::FromUtf8Error),

    /// Structurally invalid document (no root, unbalanced tags, unknown entity)
    Malformed(String),
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingError::Xml(e) => write!(f, "XML error: {}", e),
            BindingError::Escape(e) => write!(f, "XML escape error: {}", e),
            BindingError::Io(e) => write!(f, "IO error: {}", e),
            BindingError::Utf8(e) => write!(f, "UTF-8 error: {}", e),
            BindingError::Malformed(msg) => write!(f, "malformed document: {}", msg),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::Xml(e) => Some(e),
            BindingError::Escape(e) => Some(e),
            BindingError::Io(e) => Some(e),
            BindingError::Utf8(e) => Some(e),
            BindingError::Malformed(_) => None,
        }
    }
}

impl From<quick_xml::Error> for BindingError {
    fn from(err: quick_xml::Error) -> Self {
        BindingError::Xml(err)
    }
}

impl From<quick_xml::escape::EscapeError> for BindingError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        BindingError::Escape(err)
    }
}

impl From<std::io::Error> for BindingError {
    fn from(err: std::io::Error) -> Self {
        BindingError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for BindingError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        BindingError::Utf8(err)
    }
}

impl From<String> for BindingError {
    fn from(msg: String) -> Self {
        BindingError::Malformed(msg)
    }
}

impl From<&str> for BindingError {
    fn from(msg: &str) -> Self {
        BindingError::Malformed(msg.to_string())
    }
}

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindingError>;
