//! Validation utilities for the River Gauge backend

use std::collections::HashSet;

use thiserror::Error;

use crate::models::SiteId;

/// Problems with a configured site list
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("site list is empty")]
    EmptySiteList,

    #[error("invalid site id {id:?}: {reason}")]
    InvalidSiteId { id: String, reason: &'static str },

    #[error("site id {0} is listed more than once")]
    DuplicateSiteId(String),
}

// ============================================================================
// Site Validations
// ============================================================================

/// Validate a site id: any non-empty token without whitespace
pub fn validate_site_id(id: &str) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err("Site id must not be empty");
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("Site id must not contain whitespace");
    }
    Ok(())
}

/// Validate a whole site list and convert it into identifiers
pub fn validate_site_list<S: AsRef<str>>(ids: &[S]) -> Result<Vec<SiteId>, ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySiteList);
    }

    let mut seen = HashSet::new();
    let mut sites = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = raw.as_ref().trim();
        validate_site_id(id).map_err(|reason| ValidationError::InvalidSiteId {
            id: id.to_string(),
            reason,
        })?;
        if !seen.insert(id.to_string()) {
            return Err(ValidationError::DuplicateSiteId(id.to_string()));
        }
        sites.push(SiteId::from(id));
    }
    Ok(sites)
}
