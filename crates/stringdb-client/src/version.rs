//! Release discovery
//!
//! STRING publishes one stable address per release. Requests for a release
//! the listing does not know fall back to the conventional legacy host name
//! (`https://version-11-5.string-db.org`) with a warning instead of failing.

use crate::api::{endpoints, ApiClient, StringVersion};
use crate::error::{ClientError, Result};
use tracing::{info, warn};

/// Outcome of matching a requested release against the published list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
    /// Listed release with its stable address
    Supported(String),
    /// Unlisted release; best-effort legacy address
    Legacy(String),
}

impl VersionChoice {
    pub fn address(&self) -> &str {
        match self {
            VersionChoice::Supported(addr) | VersionChoice::Legacy(addr) => addr,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, VersionChoice::Legacy(_))
    }
}

/// Fetch the published releases, newest first
pub async fn discover(client: &ApiClient) -> Result<Vec<StringVersion>> {
    let url = endpoints::version_url(client.discovery_url());
    let versions: Vec<StringVersion> = client.get_json(&url).await?;
    info!(count = versions.len(), "Discovered STRING releases");
    Ok(versions)
}

/// Pick the address serving `requested` (the newest release when `None`)
pub fn choose_version(versions: &[StringVersion], requested: Option<&str>) -> Result<VersionChoice> {
    let latest = versions.first();

    let requested = match requested {
        Some(v) => v.trim(),
        None => {
            return latest
                .map(|v| VersionChoice::Supported(v.stable_address.clone()))
                .ok_or_else(|| ClientError::UnsupportedVersion("latest (no releases published)".to_string()));
        },
    };

    if let Some(found) = versions.iter().find(|v| v.string_version == requested) {
        return Ok(VersionChoice::Supported(found.stable_address.clone()));
    }

    let legacy = legacy_address(requested)?;
    warn!(
        requested,
        latest = latest.map(|v| v.string_version.as_str()).unwrap_or("unknown"),
        address = %legacy,
        "Requested STRING version is not listed, trying legacy address"
    );
    Ok(VersionChoice::Legacy(legacy))
}

/// `11.5` -> `https://version-11-5.string-db.org`
pub fn legacy_address(version: &str) -> Result<String> {
    let parts: Vec<&str> = version.split('.').collect();
    let numeric = !version.is_empty()
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if !numeric {
        return Err(ClientError::UnsupportedVersion(version.to_string()));
    }

    Ok(format!("https://version-{}.string-db.org", parts.join("-")))
}

/// Discover releases and return a client bound to the chosen one
pub async fn bind(client: ApiClient, requested: Option<&str>) -> Result<(ApiClient, VersionChoice)> {
    let versions = discover(&client).await?;
    let choice = choose_version(&versions, requested)?;
    Ok((client.with_base_url(choice.address()), choice))
}
