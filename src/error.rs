use std::fmt;

/// Everything that can go wrong during a digest run.
///
/// `FileOpen`, `RowRead` and `Config` stop the run. `Request`, `BodyRead` and
/// `JsonParse` only drop the flight they belong to. `TemplateRender` is logged
/// and the built-in template is used instead. `EmailSend` ends the run.
#[derive(Debug)]
pub enum DigestError {
    Config(String),
    FileOpen(String),
    RowRead(String),
    Request(String),
    BodyRead(String),
    JsonParse(String),
    TemplateRender(String),
    EmailSend(String),
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Invalid configuration: {}", e),
            Self::FileOpen(e) => write!(f, "Error opening spreadsheet: {}", e),
            Self::RowRead(e) => write!(f, "Error reading rows from spreadsheet: {}", e),
            Self::Request(e) => write!(f, "Error sending request: {}", e),
            Self::BodyRead(e) => write!(f, "Error reading response: {}", e),
            Self::JsonParse(e) => write!(f, "Error decoding status JSON: {}", e),
            Self::TemplateRender(e) => write!(f, "Error templating email body: {}", e),
            Self::EmailSend(e) => write!(f, "Error sending email: {}", e),
        }
    }
}

impl std::error::Error for DigestError {}
