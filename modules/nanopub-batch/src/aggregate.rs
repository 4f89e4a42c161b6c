use std::collections::BTreeSet;

use nanopub_common::{BatchAnalysis, NormalizedRecord, PrefixUsage};

/// Compute cross-record statistics from the complete record sequence, error
/// records included. Pure single pass; given the same input sequence the
/// output serializes byte-for-byte identically.
pub fn analyze(records: &[NormalizedRecord]) -> BatchAnalysis {
    let mut analysis = BatchAnalysis {
        total_records: records.len(),
        ..Default::default()
    };

    for record in records {
        if record.is_success() {
            analysis.successful_count += 1;
            analysis.total_triples += u64::from(record.total_triples);
        } else {
            analysis.failed_count += 1;
        }

        // Occurrence-level duplicates collapse per record; counts are keyed
        // by prefix name with the URI from its first occurrence.
        let mut seen = BTreeSet::new();
        for binding in &record.prefixes {
            if seen.insert((binding.prefix.as_str(), binding.uri.as_str())) {
                analysis
                    .common_prefixes
                    .entry(binding.prefix.clone())
                    .and_modify(|usage| usage.count += 1)
                    .or_insert_with(|| PrefixUsage {
                        uri: binding.uri.clone(),
                        count: 1,
                    });
            }
        }

        for name in record.graphs.present_names() {
            *analysis
                .graph_distribution
                .entry(name.as_str().to_string())
                .or_insert(0) += 1;
        }

        if let Some(author) = &record.metadata.author_name {
            *analysis.author_network.entry(author.clone()).or_insert(0) += 1;
        }

        if let Some(created) = &record.metadata.created {
            // Unparseable dates are swallowed per-record: the record simply
            // contributes to no bucket.
            if let Some(day) = date_bucket(created) {
                *analysis.temporal_distribution.entry(day).or_insert(0) += 1;
            }
        }
    }

    // Only prefixes used by more than one record count as shared vocabulary.
    analysis.common_prefixes.retain(|_, usage| usage.count > 1);

    analysis
}

/// Day-granularity bucket from an ISO-ish creation date, or None when the
/// leading `YYYY-MM-DD` doesn't parse.
fn date_bucket(created: &str) -> Option<String> {
    let day = created.get(..10)?;
    chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    Some(day.to_string())
}
