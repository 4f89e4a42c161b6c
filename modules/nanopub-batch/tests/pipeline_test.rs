//! End-to-end pipeline tests against an in-process registry stub: no
//! network, real attempt ordering, real extraction and reporting.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use nanopub_batch::fetch::RecordFetcher;
use nanopub_batch::runner::BatchRunner;
use nanopub_client::{acceptable, fetch_attempts, FetchError, FetchOutcome};
use nanopub_common::BatchConfig;

/// Stand-in for the remote registry. Maps exact request URLs to bodies and
/// replays the client's fixed attempt order and acceptance checks, so tests
/// exercise the same fallback selection as production.
struct FakeRegistry {
    pages: HashMap<String, String>,
}

impl FakeRegistry {
    fn new() -> Self {
        Self { pages: HashMap::new() }
    }

    fn serve(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl RecordFetcher for FakeRegistry {
    async fn fetch(&self, url: &str) -> nanopub_client::Result<FetchOutcome> {
        let attempts = fetch_attempts(url);
        let total_attempts = attempts.len();
        for attempt in &attempts {
            if let Some(body) = self.pages.get(&attempt.url) {
                if acceptable(body) {
                    return Ok(FetchOutcome {
                        raw_text: body.trim().to_string(),
                        declared_format: attempt.accept.to_string(),
                    });
                }
            }
        }
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: total_attempts,
        })
    }
}

const TRIG_BODY: &str = r#"@prefix ex: <http://example.org/> .

sub:assertion {
  ex:mosquito ex:transmits ex:malaria .
  ex:malaria ex:affects ex:humans .
  ex:humans ex:liveIn ex:regions .
}
"#;

const HTML_ERROR_PAGE: &str = "<!DOCTYPE html><html><body>Not Found</body></html>";

fn pubinfo_body(author: &str) -> String {
    format!(
        r#"@prefix ex: <http://example.org/> .
@prefix dct: <http://purl.org/dc/terms/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .

sub:assertion {{
  ex:a ex:relatesTo ex:b .
}}

sub:pubinfo {{
  ex:pub dct:created "2024-03-15T10:30:00Z" .
  ex:author foaf:name "{author}" .
}}
"#
    )
}

fn config_in(dir: &Path, urls: &[&str]) -> BatchConfig {
    let mut config = BatchConfig::new("batch_test", urls.iter().map(|s| s.to_string()).collect());
    config.out_dir = dir.join("results");
    config
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// --- Scenario A: single .trig record processes cleanly, exit 0 ---

#[tokio::test]
async fn single_trig_record_processes_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::new().serve("https://example.org/np/abc.trig", TRIG_BODY);
    let runner = BatchRunner::with_fetcher(
        config_in(dir.path(), &["https://example.org/np/abc"]),
        Arc::new(registry),
    );

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);

    let results = read_json(&dir.path().join("results/batch_results.json"));
    let record = &results["results"][0];
    assert_eq!(record["status"], "processed");
    assert_eq!(record["graphs"]["assertion"]["present"], true);
    assert_eq!(record["graphs"]["assertion"]["triple_count"], 3);
    assert_eq!(record["prefixes"][0]["prefix"], "ex");
    assert_eq!(record["prefixes"][0]["uri"], "http://example.org/");
    assert!(record.get("error").is_none());
}

// --- Fetcher attempt-order law: earlier acceptable attempt wins ---

#[tokio::test]
async fn earlier_format_attempt_wins() {
    let registry = FakeRegistry::new()
        .serve("https://w3id.org/np/RAx.trig", TRIG_BODY)
        .serve("https://w3id.org/np/RAx.ttl", "@prefix other: <http://other.org/> .");

    let outcome = registry.fetch("https://w3id.org/np/RAx").await.unwrap();
    assert_eq!(outcome.declared_format, "application/trig");
    assert!(outcome.raw_text.contains("ex:mosquito"));
}

#[tokio::test]
async fn bare_url_is_the_fallback_when_no_suffix_variant_exists() {
    let registry = FakeRegistry::new().serve("https://w3id.org/np/RAx", TRIG_BODY);

    let outcome = registry.fetch("https://w3id.org/np/RAx").await.unwrap();
    assert_eq!(
        outcome.declared_format,
        "application/trig, application/n-quads, text/turtle, application/rdf+xml"
    );
}

// --- Scenario B: partial failure, exit 2 ---

#[tokio::test]
async fn partial_failure_exits_2_with_exhaustion_message() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::new()
        .serve("https://w3id.org/np/RAgood.trig", TRIG_BODY)
        .serve("https://w3id.org/np/RAbad", HTML_ERROR_PAGE)
        .serve("https://w3id.org/np/RAbad.trig", HTML_ERROR_PAGE);
    let runner = BatchRunner::with_fetcher(
        config_in(
            dir.path(),
            &["https://w3id.org/np/RAgood", "https://w3id.org/np/RAbad"],
        ),
        Arc::new(registry),
    );

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.exit_code(), 2);

    let results = read_json(&dir.path().join("results/batch_results.json"));
    assert_eq!(results["processed"], 1);
    assert_eq!(results["failed"], 1);

    // order-preserving: results follow the input sequence
    assert_eq!(results["results"][0]["url"], "https://w3id.org/np/RAgood");
    assert_eq!(results["results"][1]["url"], "https://w3id.org/np/RAbad");
    assert_eq!(results["results"][1]["status"], "error");
    let error = results["results"][1]["error"].as_str().unwrap();
    assert!(error.contains("No acceptable response"), "got: {error}");

    let report = std::fs::read_to_string(dir.path().join("results/summary.txt")).unwrap();
    assert!(report.contains("=== FAILED RECORDS ==="));
    assert!(report.contains("https://w3id.org/np/RAbad - Error:"));
}

// --- Scenario C: empty URL list aborts with exit 1 and no artifacts ---

#[tokio::test]
async fn empty_batch_exits_1_without_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let runner = BatchRunner::with_fetcher(
        config_in(dir.path(), &[]),
        Arc::new(FakeRegistry::new()),
    );

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.exit_code(), 1);
    assert!(!dir.path().join("results").exists());
}

// --- All records failing exits 1, but the batch still reports ---

#[tokio::test]
async fn total_failure_exits_1_and_still_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::new();
    let runner = BatchRunner::with_fetcher(
        config_in(
            dir.path(),
            &["ftp://w3id.org/np/RAx", "https://w3id.org/np/RAmissing"],
        ),
        Arc::new(registry),
    );

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.exit_code(), 1);

    let results = read_json(&dir.path().join("results/batch_results.json"));
    let validation_error = results["results"][0]["error"].as_str().unwrap();
    assert!(validation_error.starts_with("URL validation failed:"), "got: {validation_error}");
    assert_eq!(results["results"][1]["status"], "error");

    // aggregation and reporting still ran over the all-failed set
    assert!(dir.path().join("results/combined_analysis.json").exists());
    assert!(dir.path().join("results/summary.txt").exists());
    assert!(!dir.path().join("results/individual/record_001.json").exists());
}

// --- Scenario D: shared author shows up in the author network ---

#[tokio::test]
async fn shared_author_is_counted_across_records() {
    let dir = tempfile::tempdir().unwrap();
    let body = pubinfo_body("Jane Doe");
    let registry = FakeRegistry::new()
        .serve("https://w3id.org/np/RA1.trig", &body)
        .serve("https://w3id.org/np/RA2.trig", &body);
    let runner = BatchRunner::with_fetcher(
        config_in(dir.path(), &["https://w3id.org/np/RA1", "https://w3id.org/np/RA2"]),
        Arc::new(registry),
    );

    let summary = runner.run().await.unwrap();
    assert_eq!(summary.exit_code(), 0);

    let results = read_json(&dir.path().join("results/batch_results.json"));
    assert_eq!(results["results"][0]["metadata"]["author_name"], "Jane Doe");

    let analysis = read_json(&dir.path().join("results/combined_analysis.json"));
    assert_eq!(analysis["author_network"]["Jane Doe"], 2);
    assert_eq!(analysis["temporal_distribution"]["2024-03-15"], 2);
    // ex, dct, foaf all appear in both records
    assert_eq!(analysis["common_prefixes"]["ex"]["count"], 2);
    assert_eq!(analysis["graph_distribution"]["assertion"], 2);
    assert_eq!(analysis["graph_distribution"]["pubinfo"], 2);
}

// --- Record invariant holds for every result the pipeline emits ---

#[tokio::test]
async fn every_result_satisfies_the_record_invariant() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::new().serve("https://w3id.org/np/RAgood.trig", TRIG_BODY);
    let runner = BatchRunner::with_fetcher(
        config_in(
            dir.path(),
            &[
                "https://w3id.org/np/RAgood",
                "https://w3id.org/np/RAmissing",
                "not-a-url",
            ],
        ),
        Arc::new(registry),
    );

    runner.run().await.unwrap();

    let results = read_json(&dir.path().join("results/batch_results.json"));
    for record in results["results"].as_array().unwrap() {
        match record["status"].as_str().unwrap() {
            "processed" => {
                assert!(record.get("error").is_none(), "processed record has error: {record}");
            }
            "error" => {
                assert!(record["error"].is_string(), "error record lacks message: {record}");
                assert_eq!(record["total_triples"], 0);
            }
            other => panic!("unexpected status {other}"),
        }
    }
}

// --- Individual artifacts carry the truncated raw sample ---

#[tokio::test]
async fn individual_artifacts_keep_a_raw_sample() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FakeRegistry::new().serve("https://w3id.org/np/RAgood.trig", TRIG_BODY);
    let runner = BatchRunner::with_fetcher(
        config_in(dir.path(), &["https://w3id.org/np/RAgood"]),
        Arc::new(registry),
    );

    runner.run().await.unwrap();

    let individual = read_json(&dir.path().join("results/individual/record_001.json"));
    assert_eq!(individual["analysis"]["status"], "processed");
    assert!(individual["rdf_sample"].as_str().unwrap().contains("sub:assertion"));
    assert_eq!(
        individual["full_rdf_size"],
        individual["analysis"]["size_bytes"]
    );
}
