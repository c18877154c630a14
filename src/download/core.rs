//! Tarball download with timeouts and progress reporting

use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use super::github::ReleaseTarget;

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

/// Download the release tarball into `dest_dir`, streaming with an
/// inactivity timeout and a progress bar.
///
/// Returns the path of the downloaded file. An empty download is an error.
pub async fn fetch_tarball(target: &ReleaseTarget, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = target
        .download_url
        .rsplit('/')
        .next()
        .ok_or_else(|| anyhow!("Malformed download URL: {}", target.download_url))?;
    let tarball_path = dest_dir.join(file_name);

    let client = reqwest::Client::builder()
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(concat!("exporter-install/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(&target.download_url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "Download failed: HTTP {} for {}",
            response.status(),
            target.download_url
        ));
    }

    let total_bytes = target.size_hint.or(response.content_length());
    let bar = match total_bytes {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )?
                .progress_chars("=> "),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(ProgressStyle::with_template("{spinner} {bytes} downloaded")?);
            bar
        }
    };

    let mut file = tokio::fs::File::create(&tarball_path).await?;
    let mut downloaded: u64 = 0;

    use futures::StreamExt;
    let mut stream = response.bytes_stream();

    loop {
        // Wrap stream.next() with timeout to detect a stalled transfer
        let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(None) => break, // Stream ended normally
            Err(_) => {
                return Err(anyhow!(
                    "Download timeout: no data received for {} seconds ({} bytes downloaded)",
                    DOWNLOAD_INACTIVITY_TIMEOUT.as_secs(),
                    downloaded
                ));
            }
        };

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        bar.set_position(downloaded);
    }

    file.flush().await?;
    bar.finish_and_clear();

    if downloaded == 0 {
        return Err(anyhow!(
            "Downloaded file is empty: {}",
            tarball_path.display()
        ));
    }
    if let Some(total) = total_bytes
        && downloaded != total
    {
        return Err(anyhow!(
            "Truncated download: got {} of {} bytes",
            downloaded,
            total
        ));
    }

    Ok(tarball_path)
}
