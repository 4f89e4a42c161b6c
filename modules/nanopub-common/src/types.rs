use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Per-record types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Processed,
    Error,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Processed => write!(f, "processed"),
            RecordStatus::Error => write!(f, "error"),
        }
    }
}

/// The four named graphs of a nanopublication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphName {
    Head,
    Assertion,
    Provenance,
    Pubinfo,
}

impl GraphName {
    pub const ALL: [GraphName; 4] = [
        GraphName::Head,
        GraphName::Assertion,
        GraphName::Provenance,
        GraphName::Pubinfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphName::Head => "head",
            GraphName::Assertion => "assertion",
            GraphName::Provenance => "provenance",
            GraphName::Pubinfo => "pubinfo",
        }
    }

    /// Literal token that marks this graph in serialized nanopub text.
    pub fn marker(&self) -> &'static str {
        match self {
            GraphName::Head => "sub:Head",
            GraphName::Assertion => "sub:assertion",
            GraphName::Provenance => "sub:provenance",
            GraphName::Pubinfo => "sub:pubinfo",
        }
    }
}

impl std::fmt::Display for GraphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub present: bool,
    pub triple_count: u32,
}

/// Presence and triple counts for all four named graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub head: GraphInfo,
    pub assertion: GraphInfo,
    pub provenance: GraphInfo,
    pub pubinfo: GraphInfo,
}

impl GraphSummary {
    pub fn get(&self, name: GraphName) -> &GraphInfo {
        match name {
            GraphName::Head => &self.head,
            GraphName::Assertion => &self.assertion,
            GraphName::Provenance => &self.provenance,
            GraphName::Pubinfo => &self.pubinfo,
        }
    }

    pub fn get_mut(&mut self, name: GraphName) -> &mut GraphInfo {
        match name {
            GraphName::Head => &mut self.head,
            GraphName::Assertion => &mut self.assertion,
            GraphName::Provenance => &mut self.provenance,
            GraphName::Pubinfo => &mut self.pubinfo,
        }
    }

    /// Names of the graphs that are present, in canonical order.
    pub fn present_names(&self) -> Vec<GraphName> {
        GraphName::ALL
            .into_iter()
            .filter(|g| self.get(*g).present)
            .collect()
    }

    /// Sum of per-graph triple counts (diagnostic cross-check, see extractor).
    pub fn triple_sum(&self) -> u32 {
        GraphName::ALL.into_iter().map(|g| self.get(g).triple_count).sum()
    }
}

/// One `@prefix` declaration as it appeared in the serialized text.
/// Duplicates are kept in encounter order; aggregation dedups by (prefix, uri).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixBinding {
    pub prefix: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub fetch_seconds: f64,
    pub analysis_seconds: f64,
}

/// The durable per-item result of the pipeline.
///
/// Exactly one of the two shapes holds: a processed record carries graph and
/// triple data with `error: None`; an error record carries the error string
/// with all structural fields zeroed. The constructors below are the only
/// ways a record is built, so the invariant cannot be violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub url: String,
    pub status: RecordStatus,
    pub retrieved_at: DateTime<Utc>,
    pub size_bytes: usize,
    pub line_count: usize,
    pub graphs: GraphSummary,
    pub total_triples: u32,
    pub prefixes: Vec<PrefixBinding>,
    pub metadata: RecordMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timing: Timing,
}

impl NormalizedRecord {
    /// A successfully analyzed record. Structural fields are filled in by the
    /// extractor after construction.
    pub fn processed(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: RecordStatus::Processed,
            retrieved_at: Utc::now(),
            size_bytes: 0,
            line_count: 0,
            graphs: GraphSummary::default(),
            total_triples: 0,
            prefixes: Vec::new(),
            metadata: RecordMetadata::default(),
            error: None,
            timing: Timing::default(),
        }
    }

    /// A record that failed validation or fetching. Carries only the error.
    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: RecordStatus::Error,
            retrieved_at: Utc::now(),
            size_bytes: 0,
            line_count: 0,
            graphs: GraphSummary::default(),
            total_triples: 0,
            prefixes: Vec::new(),
            metadata: RecordMetadata::default(),
            error: Some(error.into()),
            timing: Timing::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Processed
    }
}

// --- Batch-level types ---

/// How often a prefix name occurred across the batch, with the namespace URI
/// from its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixUsage {
    pub uri: String,
    pub count: u32,
}

/// Cross-record statistics, recomputed from the full record set each run.
/// All maps are BTreeMaps so serialization is reproducible byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub total_records: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub total_triples: u64,
    pub common_prefixes: BTreeMap<String, PrefixUsage>,
    pub graph_distribution: BTreeMap<String, u32>,
    pub author_network: BTreeMap<String, u32>,
    pub temporal_distribution: BTreeMap<String, u32>,
}
