//! HTTP download of web-located files.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::core::QuillError;
use crate::utils::fs::{atomic_write, ensure_parent_dir};

/// Downloads a URL to a local file.
///
/// The whole request is bounded by `timeout`; exceeding it surfaces as
/// [`QuillError::CommandTimeout`]. Any HTTP status of 400 or above fails
/// with [`QuillError::DownloadFailed`]. The body is written atomically, so
/// a failed download never leaves a truncated file at `dest`.
pub async fn download_file(
    client: &reqwest::Client,
    url: &Url,
    dest: &Path,
    timeout: Duration,
) -> Result<()> {
    tracing::info!("Downloading {} to {}", url, dest.display());
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| map_request_error(e, url, timeout))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(QuillError::DownloadFailed {
            url: url.to_string(),
            reason: format!("got status code {status}"),
        }
        .into());
    }

    let bytes =
        response.bytes().await.map_err(|e| map_request_error(e, url, timeout))?;

    ensure_parent_dir(dest)?;
    atomic_write(dest, bytes.as_ref())?;
    tracing::debug!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}

fn map_request_error(e: reqwest::Error, url: &Url, timeout: Duration) -> QuillError {
    if e.is_timeout() {
        QuillError::CommandTimeout {
            operation: format!("download {url}"),
            seconds: timeout.as_secs(),
        }
    } else {
        QuillError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
