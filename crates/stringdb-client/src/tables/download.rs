//! Streaming table download
//!
//! The body is written to a temporary file next to the destination and
//! persisted under the final name only once the stream completed.

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::progress;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Download `url` to `dest`, returning the number of bytes written
pub async fn download_to(client: &ApiClient, url: &str, dest: &Path) -> Result<u64> {
    let dir = dest
        .parent()
        .ok_or_else(|| ClientError::config(format!("'{}' has no parent directory", dest.display())))?;
    let label = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_string());

    let response = client.get_stream(url).await?;
    let pb = progress::create_download_progress(response.content_length(), &format!("Downloading {}", label));

    let mut file = NamedTempFile::new_in(dir)?;
    let mut written = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    file.flush()?;

    file.persist(dest).map_err(|e| ClientError::Io(e.error))?;
    pb.finish_and_clear();
    debug!(dest = %dest.display(), written, "Persisted download");

    Ok(written)
}
