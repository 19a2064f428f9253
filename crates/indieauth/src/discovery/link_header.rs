//! # `Link` Header Parsing
//!
//! Extracts endpoint hints from RFC 8288 `Link` headers such as:
//!
//! ```text
//! Link: <https://auth.example/>; rel="authorization_endpoint",
//!       </micropub>; rel=micropub
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use http::HeaderMap;
use http::header::LINK;
use regex::Regex;
use url::Url;

static REL_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[;\s])rel\s*=\s*(?:"([^"]*)"|([^;"<\s]+))"#)
        .expect("rel parameter pattern is valid")
});

static BARE_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^<>|\s;]+").expect("target pattern is valid"));

/// `(lowercased relation, endpoint key)` pairs in a stable order
///
/// When several relations map to the same key, the later pair in this order
/// wins.
pub(super) fn relation_keys(rel_endpoints: &HashMap<String, String>) -> Vec<(String, &str)> {
    let mut pairs: Vec<(String, &String, &str)> = rel_endpoints
        .iter()
        .map(|(relation, key)| (relation.to_ascii_lowercase(), relation, key.as_str()))
        .collect();
    pairs.sort_unstable();
    pairs
        .into_iter()
        .map(|(relation, _, key)| (relation, key))
        .collect()
}

/// Collect endpoint hints from every `Link` header
///
/// Returns `endpoint key -> absolute URL` for relations present in
/// `rel_endpoints`. When several entries carry the same relation, the last
/// one wins.
pub fn endpoints_from_headers(
    headers: &HeaderMap,
    rel_endpoints: &HashMap<String, String>,
    base: &Url,
) -> HashMap<String, String> {
    let mut found = HashMap::new();
    for value in headers.get_all(LINK) {
        if let Ok(value) = value.to_str() {
            found.extend(parse_link_header(value, rel_endpoints, base));
        }
    }
    found
}

/// Parse a single `Link` header value
pub fn parse_link_header(
    header: &str,
    rel_endpoints: &HashMap<String, String>,
    base: &Url,
) -> HashMap<String, String> {
    let wanted = relation_keys(rel_endpoints);
    let mut found = HashMap::new();

    for entry in header.split(',') {
        let Some((target, params)) = split_entry(entry) else {
            continue;
        };
        let Some(rel) = REL_PARAM
            .captures(params)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        else {
            continue;
        };
        let relations: Vec<String> = rel
            .as_str()
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();

        let Ok(resolved) = base.join(target) else {
            continue;
        };
        for (relation, key) in &wanted {
            if relations.contains(relation) {
                found.insert((*key).to_string(), String::from(resolved.clone()));
            }
        }
    }

    found
}

/// Split an entry into its target URL and parameter text
///
/// Targets are normally `<bracketed>`; a bare leading token is accepted too.
fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let entry = entry.trim();
    if let Some(open) = entry.find('<')
        && let Some(len) = entry[open + 1..].find('>')
    {
        let target = entry[open + 1..open + 1 + len].trim();
        let params = &entry[open + 1 + len + 1..];
        return Some((target, params));
    }

    let target = BARE_TARGET.find(entry)?;
    Some((target.as_str(), &entry[target.end()..]))
}
