use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpenUrlError {
    #[error("Invalid URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("Refusing to open {0} URL (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Check a backend-supplied URL before handing it to the system opener.
///
/// Only `http` and `https` are passed through so that a crafted article
/// cannot launch `file:` or custom-scheme handlers.
///
/// ```
/// use truelens::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://news.example.com/a/1").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// ```
pub fn validate_url_for_open(raw: &str) -> Result<Url, OpenUrlError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OpenUrlError::UnsupportedScheme(other.to_string())),
    }
}
