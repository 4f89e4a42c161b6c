use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use nanopub_common::{BatchConfig, NormalizedRecord, ProcessorError, Timing};

use crate::aggregate;
use crate::extract;
use crate::fetch::{HttpFetcher, RecordFetcher};
use crate::report::{self, BatchOutput};
use crate::validate;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub interrupted: bool,
    pub processing_time_seconds: f64,
}

impl RunSummary {
    /// Process exit condition: 0 when every record processed, 2 on partial
    /// failure, 1 on an empty batch or total failure, 130 on operator
    /// interruption.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.total == 0 {
            1
        } else if self.failed == 0 {
            0
        } else if self.processed == 0 {
            1
        } else {
            2
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Batch Run Complete ===")?;
        writeln!(f, "Records supplied: {}", self.total)?;
        writeln!(f, "Processed:        {}", self.processed)?;
        writeln!(f, "Failed:           {}", self.failed)?;
        if self.interrupted {
            writeln!(f, "Interrupted:      yes (partial results flushed)")?;
        }
        write!(f, "Processing time:  {:.2}s", self.processing_time_seconds)
    }
}

/// Drives validate → fetch → extract per record, then aggregation and
/// reporting once over the full collected set.
pub struct BatchRunner {
    config: BatchConfig,
    fetcher: Arc<dyn RecordFetcher>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(config.timeout_secs)));
        Self { config, fetcher }
    }

    /// Swap the network seam. Tests use this with stub fetchers.
    pub fn with_fetcher(config: BatchConfig, fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub async fn run(&self) -> Result<RunSummary, ProcessorError> {
        let started = Instant::now();
        let started_at = Utc::now();
        let total = self.config.urls.len();

        if total == 0 {
            warn!("No nanopublication URLs provided, nothing to do");
            return Ok(RunSummary {
                total: 0,
                ..Default::default()
            });
        }

        info!(
            batch_id = self.config.batch_id.as_str(),
            records = total,
            concurrency = self.config.concurrency,
            "Starting batch run"
        );

        // Results land in an arena keyed by original index, so bounded
        // parallel fetching never reorders the collected sequence.
        let mut arena: Vec<Option<(NormalizedRecord, Option<String>)>> = Vec::new();
        arena.resize_with(total, || None);

        let mut items = stream::iter(self.config.urls.iter().enumerate().map(|(index, url)| {
            let fetcher = Arc::clone(&self.fetcher);
            let url = url.clone();
            async move {
                info!(url = url.as_str(), item = index + 1, total, "Processing record");
                let item = process_record(fetcher.as_ref(), &url).await;
                (index, item)
            }
        }))
        .buffer_unordered(self.config.concurrency);

        let mut interrupted = false;
        loop {
            tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, flushing completed records into a partial report");
                    interrupted = true;
                    break;
                }
                next = items.next() => match next {
                    Some((index, item)) => arena[index] = Some(item),
                    None => break,
                }
            }
        }
        drop(items);

        let mut records = Vec::new();
        let mut samples = Vec::new();
        for slot in arena {
            if let Some((record, sample)) = slot {
                records.push(record);
                samples.push(sample);
            }
        }

        let processed = records.iter().filter(|r| r.is_success()).count();
        let failed = records.len() - processed;

        info!(records = records.len(), "Generating batch analysis");
        let analysis = aggregate::analyze(&records);

        let output = BatchOutput {
            batch_id: &self.config.batch_id,
            timestamp: started_at,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            records: &records,
            samples: &samples,
            analysis: &analysis,
        };
        let report_text = report::render(&output);
        report::write_artifacts(&self.config.out_dir, &output, &report_text)?;
        info!("{report_text}");

        Ok(RunSummary {
            total,
            processed,
            failed,
            interrupted,
            processing_time_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// One record through the validate → fetch → extract chain. Failures become
/// error records here; nothing escapes to halt the batch.
async fn process_record(
    fetcher: &dyn RecordFetcher,
    url: &str,
) -> (NormalizedRecord, Option<String>) {
    if let Err(e) = validate::validate_url(url) {
        warn!(url, error = %e, "URL validation failed");
        let record = NormalizedRecord::failed(url, format!("URL validation failed: {e}"));
        return (record, None);
    }

    let fetch_start = Instant::now();
    let outcome = match fetcher.fetch(url).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(url, error = %e, "Fetch failed");
            return (NormalizedRecord::failed(url, e.to_string()), None);
        }
    };
    let fetch_seconds = fetch_start.elapsed().as_secs_f64();

    info!(
        url,
        bytes = outcome.raw_text.len(),
        format = outcome.declared_format.as_str(),
        "Fetched record content"
    );

    let analysis_start = Instant::now();
    let mut record = extract::extract(&outcome.raw_text, url);
    record.timing = Timing {
        fetch_seconds,
        analysis_seconds: analysis_start.elapsed().as_secs_f64(),
    };

    info!(
        url,
        triples = record.total_triples,
        prefixes = record.prefixes.len(),
        graphs = record.graphs.present_names().len(),
        "Record analyzed"
    );

    (record, Some(truncate_sample(&outcome.raw_text)))
}

/// Bounded raw-text sample kept for the per-record artifact.
fn truncate_sample(raw: &str) -> String {
    const SAMPLE_CHARS: usize = 2000;
    if raw.chars().count() <= SAMPLE_CHARS {
        raw.to_string()
    } else {
        let mut sample: String = raw.chars().take(SAMPLE_CHARS).collect();
        sample.push_str("...");
        sample
    }
}
