//! Domain name normalization and TLD extraction.

use crate::error::{Result, VigilError};

const MAX_DOMAIN_LENGTH: usize = 255;

/// Normalize a domain name to its canonical monitored form.
///
/// This function:
/// - Trims whitespace and converts to lowercase
/// - Requires at least two labels separated by dots
/// - Allows only alphanumerics and interior hyphens within labels
/// - Requires an alphabetic final label, since that label picks the registry
pub fn normalize_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().to_lowercase();

    if domain.is_empty() || !domain.contains('.') {
        return Err(VigilError::InvalidDomain(domain));
    }

    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(VigilError::InvalidDomain(domain));
    }

    // Basic validation - alphanumeric, hyphens, and dots
    let valid = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(VigilError::InvalidDomain(domain));
    }

    // Check for consecutive dots or dots at start/end
    if domain.contains("..") || domain.starts_with('.') || domain.ends_with('.') {
        return Err(VigilError::InvalidDomain(domain));
    }

    // Check for hyphens at start/end of labels
    for label in domain.split('.') {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(VigilError::InvalidDomain(domain.clone()));
        }
    }

    let tld_is_alphabetic = domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_alphabetic()));
    if !tld_is_alphabetic {
        return Err(VigilError::InvalidDomain(domain));
    }

    Ok(domain)
}

/// The final label of a domain, which selects the registry to ask.
pub fn tld(domain: &str) -> Option<&str> {
    domain.rsplit('.').next().filter(|label| !label.is_empty())
}
