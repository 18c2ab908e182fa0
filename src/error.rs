/// Failure taxonomy shared by the extractors and the page/fetch engines.
///
/// A missing release date on a single chapter is the only condition the
/// extractors recover from; everything surfaced here aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A required element is absent from the rendered document.
    #[error("selector not found for {what}: {selector}")]
    SelectorNotFound {
        what: &'static str,
        selector: &'static str,
    },

    /// Numeric, date or URL text did not have the expected shape.
    #[error("failed to parse {what} from {input:?}: {reason}")]
    ParseFailure {
        what: &'static str,
        input: String,
        reason: String,
    },

    /// An auxiliary HTTP endpoint failed or answered with a non-success status.
    #[error("GET {url} failed: {reason}")]
    Endpoint { url: String, reason: String },

    /// The page engine itself failed (navigation, devtools protocol, parsing).
    #[error("page engine: {0:#}")]
    Page(#[source] anyhow::Error),
}

impl ScrapeError {
    pub fn missing(what: &'static str, selector: &'static str) -> Self {
        Self::SelectorNotFound { what, selector }
    }

    pub fn parse(what: &'static str, input: impl Into<String>, reason: impl ToString) -> Self {
        Self::ParseFailure {
            what,
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
