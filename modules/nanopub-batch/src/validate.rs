use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must start with http:// or https://")]
    MissingScheme,

    #[error("URL doesn't appear to be a nanopublication")]
    NotNanopub,
}

/// Check that an identifier is a plausible nanopub URL before any network
/// use. Rejected identifiers short-circuit into an error record.
///
/// A URL passes when it carries the `/np/` identifier-namespace segment
/// (w3id.org/np/... and friends) or mentions "nanopub" anywhere in any case.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::MissingScheme);
    }

    if !url.contains("/np/") && !url.to_lowercase().contains("nanopub") {
        return Err(ValidationError::NotNanopub);
    }

    Ok(())
}
