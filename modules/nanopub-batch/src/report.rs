//! Batch report generation — JSON artifacts plus a rendered text summary.
//!
//! Each run writes `batch_results.json`, `combined_analysis.json`, one
//! `individual/record_NNN.json` per successfully processed record, and
//! `summary.txt` under the configured output directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use nanopub_common::{BatchAnalysis, NormalizedRecord, ProcessorError};

/// Everything the reporter needs for one batch. `samples` is parallel to
/// `records`: the truncated raw text kept for successful fetches, `None` for
/// error records.
pub struct BatchOutput<'a> {
    pub batch_id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub processing_time_seconds: f64,
    pub records: &'a [NormalizedRecord],
    pub samples: &'a [Option<String>],
    pub analysis: &'a BatchAnalysis,
}

// ---------------------------------------------------------------------------
// Serialization wrappers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct BatchResultsFile<'a> {
    batch_id: &'a str,
    timestamp: DateTime<Utc>,
    total: usize,
    processed: usize,
    failed: usize,
    processing_time_seconds: f64,
    results: &'a [NormalizedRecord],
}

#[derive(Serialize)]
struct IndividualRecordFile<'a> {
    analysis: &'a NormalizedRecord,
    rdf_sample: &'a str,
    full_rdf_size: usize,
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Render the human-readable batch report.
pub fn render(output: &BatchOutput) -> String {
    TextReport(output).to_string()
}

struct TextReport<'a>(&'a BatchOutput<'a>);

impl std::fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = self.0;
        let analysis = output.analysis;
        let successful: Vec<&NormalizedRecord> =
            output.records.iter().filter(|r| r.is_success()).collect();
        let failed: Vec<&NormalizedRecord> =
            output.records.iter().filter(|r| !r.is_success()).collect();

        writeln!(f, "=== NANOPUB BATCH PROCESSING REPORT ===")?;
        writeln!(f, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Batch ID: {}", output.batch_id)?;

        writeln!(f, "\n=== PROCESSING SUMMARY ===")?;
        writeln!(f, "Total records:          {}", output.records.len())?;
        writeln!(f, "Successfully processed: {}", successful.len())?;
        writeln!(f, "Failed:                 {}", failed.len())?;
        writeln!(
            f,
            "Success rate:           {:.1}%",
            successful.len() as f64 / output.records.len().max(1) as f64 * 100.0
        )?;
        writeln!(f, "Total triples analyzed: {}", analysis.total_triples)?;

        if !successful.is_empty() {
            writeln!(f, "\n=== PROCESSED RECORDS ===")?;
            for (i, record) in successful.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, record.url)?;
                writeln!(f, "   Triples:  {}", record.total_triples)?;
                let graphs: Vec<&str> = record
                    .graphs
                    .present_names()
                    .into_iter()
                    .map(|g| g.as_str())
                    .collect();
                writeln!(f, "   Graphs:   {}", graphs.join(", "))?;
                writeln!(f, "   Size:     {} bytes", record.size_bytes)?;
                writeln!(
                    f,
                    "   Author:   {}",
                    record.metadata.author_name.as_deref().unwrap_or("Unknown")
                )?;
            }
        }

        if !failed.is_empty() {
            writeln!(f, "\n=== FAILED RECORDS ===")?;
            for (i, record) in failed.iter().enumerate() {
                writeln!(
                    f,
                    "{}. {} - Error: {}",
                    i + 1,
                    record.url,
                    record.error.as_deref().unwrap_or("Unknown error")
                )?;
            }
        }

        writeln!(f, "\n=== CROSS-RECORD ANALYSIS ===")?;
        writeln!(f, "Common prefixes: {}", analysis.common_prefixes.len())?;
        let mut prefixes: Vec<_> = analysis.common_prefixes.iter().collect();
        prefixes.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
        for (name, usage) in prefixes.iter().take(5) {
            writeln!(f, "  - {}: {} (used in {} records)", name, usage.uri, usage.count)?;
        }

        if !analysis.graph_distribution.is_empty() {
            writeln!(f, "\nGraph distribution:")?;
            let mut graphs: Vec<_> = analysis.graph_distribution.iter().collect();
            graphs.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (name, count) in graphs {
                writeln!(
                    f,
                    "  - {}: {} records ({:.1}%)",
                    name,
                    count,
                    *count as f64 / successful.len().max(1) as f64 * 100.0
                )?;
            }
        }

        if !analysis.author_network.is_empty() {
            writeln!(f, "\nAuthor network:")?;
            let mut authors: Vec<_> = analysis.author_network.iter().collect();
            authors.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (author, count) in authors.iter().take(5) {
                writeln!(f, "  - {author}: {count} record(s)")?;
            }
        }

        writeln!(f, "\n=== RECOMMENDATIONS ===")?;
        if successful.len() > 1 {
            writeln!(f, "- Sufficient data for batch analysis")?;
            if analysis.common_prefixes.len() > 3 {
                writeln!(f, "- Good semantic consistency across records")?;
            } else {
                writeln!(f, "- Limited shared vocabularies, consider standardization")?;
            }
        } else {
            writeln!(f, "- Single record processed, batch benefits limited")?;
        }
        if analysis.total_triples > 50 {
            writeln!(f, "- Rich semantic content available for knowledge graph construction")?;
        }

        writeln!(f, "\n=== FILES GENERATED ===")?;
        writeln!(f, "- batch_results.json (detailed processing results)")?;
        writeln!(f, "- combined_analysis.json (cross-record analysis)")?;
        writeln!(f, "- individual/*.json ({} individual analyses)", successful.len())?;
        writeln!(f, "- summary.txt (this report)")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Artifact writing
// ---------------------------------------------------------------------------

/// Write all batch artifacts under `out_dir`. Returns the paths written.
/// A write failure here is fatal to the run, unlike per-item errors.
pub fn write_artifacts(
    out_dir: &Path,
    output: &BatchOutput,
    report_text: &str,
) -> Result<Vec<PathBuf>, ProcessorError> {
    let individual_dir = out_dir.join("individual");
    std::fs::create_dir_all(&individual_dir).map_err(|e| {
        ProcessorError::Report(format!(
            "Failed to create output directory {}: {e}",
            individual_dir.display()
        ))
    })?;

    let processed = output.records.iter().filter(|r| r.is_success()).count();
    let failed = output.records.len() - processed;

    let results_path = out_dir.join("batch_results.json");
    let results_file = BatchResultsFile {
        batch_id: output.batch_id,
        timestamp: output.timestamp,
        total: output.records.len(),
        processed,
        failed,
        processing_time_seconds: output.processing_time_seconds,
        results: output.records,
    };
    std::fs::write(&results_path, serde_json::to_string_pretty(&results_file)?)?;

    let analysis_path = out_dir.join("combined_analysis.json");
    std::fs::write(&analysis_path, serde_json::to_string_pretty(output.analysis)?)?;

    let mut written = vec![results_path, analysis_path];

    for (i, (record, sample)) in output.records.iter().zip(output.samples).enumerate() {
        let Some(sample) = sample else { continue };
        let path = individual_dir.join(format!("record_{:03}.json", i + 1));
        let file = IndividualRecordFile {
            analysis: record,
            rdf_sample: sample,
            full_rdf_size: record.size_bytes,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        written.push(path);
    }

    let report_path = out_dir.join("summary.txt");
    std::fs::write(&report_path, report_text)?;
    written.push(report_path);

    info!(
        dir = %out_dir.display(),
        files = written.len(),
        "Batch artifacts saved"
    );

    Ok(written)
}
