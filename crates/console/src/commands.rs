// crates/console/src/commands.rs
//! Step implementations behind the subcommands.
//!
//! Each command is one control-panel action: issue the REST call, and for
//! the async steps hand the returned job to a poller and render its event
//! stream until the job terminates. The composite `run` chains the steps
//! with the same gating the panel's button-unlock order imposed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use maskdeck_core::{
    build_mapping_text, build_personal_info_csv, mapping_file_name, masked_archive_file_name,
    personal_info_file_name, shared_session, with_session, ApiClient, JobOutcome, JobPoller,
    SharedSession, DEFAULT_POLL_INTERVAL,
};
use maskdeck_types::{JobHandle, ScannedFile};

use crate::render::StepRenderer;

/// OCR polls faster than the baseline for snappier current-file updates.
/// Still fixed for the life of the job.
const OCR_POLL_INTERVAL: Duration = Duration::from_millis(1000);

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

pub struct App {
    client: ApiClient,
    session: SharedSession,
    interval_override: Option<Duration>,
}

impl App {
    pub fn new(server_url: &str, poll_interval_ms: Option<u64>) -> Self {
        Self {
            client: ApiClient::new(server_url),
            session: shared_session(),
            interval_override: poll_interval_ms.map(Duration::from_millis),
        }
    }

    /// `maskdeck status` — connectivity probe and folder inventory.
    pub async fn status(&self) -> Result<()> {
        let health = self
            .client
            .health()
            .await
            .with_context(|| format!("server unreachable at {}", self.client.base_url()))?;

        eprintln!("  \u{2713} server reachable at {}", self.client.base_url());
        let pdfs = health.folders.pdfs;
        let masked = health.folders.masked_pdfs;
        eprintln!(
            "    pdfs:        {}",
            if pdfs.exists {
                format!("{} files", pdfs.count)
            } else {
                "missing".to_string()
            }
        );
        eprintln!(
            "    masked-pdfs: {}",
            if masked.exists {
                format!("{} files", masked.count)
            } else {
                "missing".to_string()
            }
        );
        Ok(())
    }

    /// `maskdeck scan` — enumerate the source folder.
    pub async fn scan(&self) -> Result<usize> {
        let scan = self.client.scan_pdfs().await.context("scan failed")?;

        eprintln!(
            "  \u{2713} {} PDF files in {} ({:.2} MB total)",
            scan.count,
            scan.folder.as_deref().unwrap_or("pdfs"),
            megabytes(scan.total_size),
        );
        for (index, file) in scan.files.iter().enumerate() {
            eprintln!(
                "    {:>3}. {} ({:.2} MB)",
                index + 1,
                file.filename,
                megabytes(file.size)
            );
        }

        let count = scan.count;
        self.record_scan(scan.files);
        Ok(count)
    }

    fn record_scan(&self, files: Vec<ScannedFile>) {
        maskdeck_core::with_session_mut(&self.session, |ctx| ctx.record_scan(files));
    }

    /// `maskdeck mask` — start and follow the masking job.
    pub async fn mask(&self) -> Result<()> {
        let handle = self.client.mask_pdfs().await.context("masking failed to start")?;
        eprintln!("  \u{2192} masking job {} started", handle.job_id);
        self.follow(handle, DEFAULT_POLL_INTERVAL).await?;

        let masked = with_session(&self.session, |ctx| ctx.masked_files().len()).unwrap_or(0);
        eprintln!("  \u{2713} masking complete \u{2014} {masked} files processed");
        Ok(())
    }

    /// `maskdeck ocr` — start and follow the OCR job.
    pub async fn ocr(&self) -> Result<()> {
        let handle = self.client.run_ocr().await.context("ocr failed to start")?;
        eprintln!("  \u{2192} ocr job {} started", handle.job_id);
        self.follow(handle, OCR_POLL_INTERVAL).await?;
        eprintln!("  \u{2713} ocr complete");
        Ok(())
    }

    /// Poll `handle` to a terminal state, rendering its events.
    async fn follow(&self, handle: JobHandle, default_interval: Duration) -> Result<()> {
        let interval = self.interval_override.unwrap_or(default_interval);
        let (events, stream) = maskdeck_core::channel();
        let poller = JobPoller::new(self.client.clone(), events).with_interval(interval);
        let renderer = tokio::spawn(StepRenderer::new().run(stream));

        let task = poller.start(handle, self.session.clone());
        let outcome = task.outcome().await;

        // Dropping the poller closes the last event sender; the renderer
        // drains what's left and exits.
        drop(poller);
        let _ = renderer.await;

        match outcome {
            JobOutcome::Completed => Ok(()),
            JobOutcome::Failed { error } => bail!("job failed: {error}"),
            JobOutcome::Cancelled => bail!("polling stopped before the job finished"),
        }
    }

    /// `maskdeck extract` — synchronous extraction, written as CSV.
    pub async fn extract(&self, output: Option<&Path>) -> Result<PathBuf> {
        let resp = self.client.extract_info().await.context("extraction failed")?;

        if resp.personal_info.is_empty() {
            bail!(
                "no extractable entries: file names must follow the \
                 <name>_<birthdate>.pdf convention"
            );
        }

        let csv = build_personal_info_csv(&resp.personal_info);
        let count = resp.personal_info.len();
        maskdeck_core::with_session_mut(&self.session, |ctx| {
            ctx.record_personal_info(resp.personal_info)
        });

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(personal_info_file_name()));
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  \u{2713} {count} entries written to {}", path.display());
        Ok(path)
    }

    /// `maskdeck download` — save the masked-files archive.
    pub async fn download(&self, output: Option<&Path>) -> Result<PathBuf> {
        let bytes = self
            .client
            .download_masked()
            .await
            .context("download failed")?;

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(masked_archive_file_name()));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!(
            "  \u{2713} archive saved to {} ({:.2} MB)",
            path.display(),
            megabytes(bytes.len() as u64)
        );
        Ok(path)
    }

    /// `maskdeck run` — the whole pipeline, each step gated on the one
    /// before it.
    pub async fn run(&self) -> Result<()> {
        self.status().await?;

        let count = self.scan().await?;
        if count == 0 {
            bail!("nothing to process: the source folder holds no PDF files");
        }

        self.mask().await?;
        self.write_mapping().await?;
        self.ocr().await?;
        self.extract(None).await?;

        eprintln!("  \u{2713} pipeline complete");
        Ok(())
    }

    /// Write the number → original-name mapping gathered by the masking
    /// step, if the server reported one.
    async fn write_mapping(&self) -> Result<()> {
        let mapping =
            with_session(&self.session, |ctx| ctx.file_mapping().to_vec()).unwrap_or_default();
        if mapping.is_empty() {
            tracing::warn!("masking completed without a file mapping; skipping mapping export");
            return Ok(());
        }

        let path = PathBuf::from(mapping_file_name());
        tokio::fs::write(&path, build_mapping_text(&mapping))
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  \u{2713} mapping written to {}", path.display());
        Ok(())
    }
}
