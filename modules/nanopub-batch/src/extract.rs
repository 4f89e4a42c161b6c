use nanopub_common::{GraphName, NormalizedRecord, PrefixBinding, RecordMetadata};
use regex::Regex;

/// Extract a normalized structural summary from raw nanopub text.
///
/// This is pattern matching over the flat serialized text, not a conformant
/// TriG/N-Quads parser. Triple counts are line-oriented estimates; the
/// whole-document estimate is the canonical `total_triples`, per-graph span
/// counts are kept as a diagnostic cross-check.
///
/// Never fails: malformed input degrades to zero counts and empty metadata
/// on a record that still reports status=processed.
pub fn extract(raw_text: &str, url: &str) -> NormalizedRecord {
    let mut record = NormalizedRecord::processed(url);
    record.size_bytes = raw_text.len();
    record.line_count = raw_text.split('\n').count();
    record.prefixes = extract_prefixes(raw_text);

    for name in GraphName::ALL {
        if raw_text.contains(name.marker()) {
            let info = record.graphs.get_mut(name);
            info.present = true;
            info.triple_count = graph_triple_count(raw_text, name.marker());
        }
    }

    record.total_triples = estimate_total_triples(raw_text);
    record.metadata = extract_metadata(raw_text);
    record
}

/// All `@prefix name: <uri>` declarations in encounter order. Duplicates are
/// kept; aggregation dedups per record.
fn extract_prefixes(text: &str) -> Vec<PrefixBinding> {
    let prefix_re = Regex::new(r"@prefix\s+(\w+):\s+<([^>]+)>").expect("valid regex");
    prefix_re
        .captures_iter(text)
        .map(|cap| PrefixBinding {
            prefix: cap[1].to_string(),
            uri: cap[2].to_string(),
        })
        .collect()
}

/// Count non-blank, non-comment lines between a graph's marker and its
/// closing brace. Irregular formatting (no isolatable span) yields zero —
/// the graph stays marked present.
fn graph_triple_count(text: &str, marker: &str) -> u32 {
    let pattern = format!(r"{}\s*\{{([^}}]*)\}}", regex::escape(marker));
    let span_re = Regex::new(&pattern).expect("valid regex");

    match span_re.captures(text) {
        Some(cap) => cap[1]
            .trim()
            .lines()
            .filter(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .count() as u32,
        None => 0,
    }
}

/// Whole-document triple estimate: non-blank lines that are neither comments
/// nor prefix declarations and carry either a `ns:localname` token or an
/// absolute bracketed URI.
fn estimate_total_triples(text: &str) -> u32 {
    let qname_re = Regex::new(r"\s+\w+:\w+\s+").expect("valid regex");
    text.lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty()
                && !line.starts_with('#')
                && !line.starts_with('@')
                && (qname_re.is_match(line) || line.contains("<http"))
        })
        .count() as u32
}

/// Creator, creation date, and author name. Each field is independently
/// optional; absence of one never blocks the others.
fn extract_metadata(text: &str) -> RecordMetadata {
    let creator_re = Regex::new(r"dct:creator\s+([^;]+)").expect("valid regex");
    let created_re = Regex::new(r#"dct:created\s+"([^"]+)""#).expect("valid regex");
    let name_re = Regex::new(r#"foaf:name\s+"([^"]+)""#).expect("valid regex");

    RecordMetadata {
        creator: creator_re.captures(text).map(|cap| cap[1].trim().to_string()),
        created: created_re.captures(text).map(|cap| cap[1].trim().to_string()),
        author_name: name_re.captures(text).map(|cap| cap[1].trim().to_string()),
    }
}
