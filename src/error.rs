use thiserror::Error;

#[derive(Error, Debug)]
pub enum GedcomError {
    #[error("Malformed document: {message}")]
    MalformedDocument { message: String, line: Option<usize> },
    #[error("Malformed cross-reference: {0}")]
    MalformedXRef(String),
    #[error("Unknown tag kind: {0}")]
    UnknownTagKind(String),
    #[error("Date format error: {0}")]
    DateFormat(String),
    #[error("Calendar conversion error: '{token}' is not valid for the {calendar} calendar")]
    CalendarConversion { calendar: String, token: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GedcomError>;

// Helper conversions
impl From<config::ConfigError> for GedcomError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl GedcomError {
    pub fn malformed(message: impl Into<String>, line: usize) -> Self {
        Self::MalformedDocument { message: message.into(), line: Some(line) }
    }
    /// Fatal errors abort a whole load, everything else is contained to its field.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. } | Self::Io(_))
    }
}
