//! Bulk resume download
//!
//! Downloads every participant resume and packs them into one tar archive.
//! Downloads run through a bounded pool; a failed download drops only that
//! entry and is reported back alongside the archive.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use sponsor_common::db::Participant;
use sponsor_common::time::elapsed_ms;
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("sponsor-server/", env!("CARGO_PKG_VERSION"));

/// Archive-level failures. Individual download failures are not errors;
/// see [`ResumeArchive::failures`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("resume archive timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to write resume archive: {0}")]
    Archive(#[from] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One file in the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// A resume that could not be downloaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub reason: String,
}

/// Result of a bulk download
#[derive(Debug)]
pub struct ResumeArchive {
    /// Complete tar archive
    pub bytes: Vec<u8>,
    pub entries: Vec<ArchiveEntry>,
    pub failures: Vec<DownloadFailure>,
}

/// Entry name for the resume at `index` in the download list
pub fn entry_name(index: usize) -> String {
    format!("resume-{}.pdf", index)
}

/// Downloads resumes and builds the archive
#[derive(Debug, Clone)]
pub struct ResumeArchiver {
    http: reqwest::Client,
    concurrency: usize,
    timeout: Duration,
}

impl ResumeArchiver {
    /// Archiver with its own HTTP client.
    ///
    /// `timeout` bounds the whole operation, not each download.
    pub fn new(concurrency: usize, timeout: Duration) -> Result<Self, ArchiveError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, concurrency, timeout))
    }

    pub fn with_client(http: reqwest::Client, concurrency: usize, timeout: Duration) -> Self {
        Self {
            http,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Download the resumes of `participants` and archive them.
    ///
    /// Participants without a resume URL are skipped. Entries are named by
    /// their position among the participants that have one, so a failed
    /// download leaves a gap rather than shifting later names.
    pub async fn archive(&self, participants: &[Participant]) -> Result<ResumeArchive, ArchiveError> {
        let start = Instant::now();
        let urls: Vec<String> = participants
            .iter()
            .filter(|p| p.has_resume())
            .map(|p| p.resume_url.clone())
            .collect();

        debug!(
            participants = participants.len(),
            resumes = urls.len(),
            concurrency = self.concurrency,
            "Downloading resumes"
        );

        let downloads = tokio::time::timeout(
            self.timeout,
            download_all(self.http.clone(), urls.clone(), self.concurrency),
        )
        .await
        .map_err(|_| ArchiveError::Timeout(self.timeout))?;

        let mut builder = tar::Builder::new(Vec::new());
        let mut entries = Vec::new();
        let mut failures = Vec::new();

        for (index, (url, result)) in urls.iter().zip(downloads).enumerate() {
            match result {
                Ok(bytes) => {
                    let name = entry_name(index);
                    append_entry(&mut builder, &name, &bytes)?;
                    entries.push(ArchiveEntry {
                        name,
                        url: url.to_string(),
                        size: bytes.len() as u64,
                    });
                }
                Err(reason) => {
                    warn!(url = %url, reason = %reason, "Resume download failed; skipping");
                    failures.push(DownloadFailure {
                        url: url.to_string(),
                        reason,
                    });
                }
            }
        }

        let bytes = builder.into_inner()?;

        info!(
            entries = entries.len(),
            failures = failures.len(),
            archive_bytes = bytes.len(),
            elapsed_ms = elapsed_ms(start),
            "Resume archive built"
        );

        Ok(ResumeArchive {
            bytes,
            entries,
            failures,
        })
    }
}

/// Download every URL with at most `concurrency` requests in flight.
/// Results come back in input order. Each download owns its client handle
/// and URL; nothing borrowed from the caller crosses an await.
async fn download_all(
    http: reqwest::Client,
    urls: Vec<String>,
    concurrency: usize,
) -> Vec<Result<Vec<u8>, String>> {
    stream::iter(urls)
        .map(move |url| {
            let http = http.clone();
            async move { download(&http, &url).await }
        })
        .buffered(concurrency)
        .collect()
        .await
}

async fn download(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let response = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;

    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}

fn append_entry(
    builder: &mut tar::Builder<Vec<u8>>,
    name: &str,
    bytes: &[u8],
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o600);
    header.set_mtime(u64::try_from(sponsor_common::time::now().timestamp()).unwrap_or(0));
    builder.append_data(&mut header, name, bytes)
}
