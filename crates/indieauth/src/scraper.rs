//! Link relation scraping
//!
//! Turns an HTML document into `relation -> [absolute URL]` lists. Discovery
//! only needs `<link rel>` and `<a rel>` elements, so the default
//! [`HtmlRelScraper`] is a tag scanner rather than a full HTML parser. Hosts
//! that already parse markup can plug in their own [`RelScraper`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Relation name -> absolute URLs in document order
pub type RelMap = HashMap<String, Vec<String>>;

/// Injected markup capability
pub trait RelScraper: Send + Sync + std::fmt::Debug {
    /// Extract link relations from `html`, resolving hrefs against `base`
    fn scrape(&self, html: &str, base: &Url) -> RelMap;
}

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(link|a|base)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("tag pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("attribute pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|amp|lt|gt|quot|apos);")
        .expect("entity pattern is valid")
});

/// `<link>`/`<a>` scraper honoring `<base href>`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRelScraper;

impl HtmlRelScraper {
    /// Create a scraper
    pub fn new() -> Self {
        Self
    }
}

impl RelScraper for HtmlRelScraper {
    fn scrape(&self, html: &str, base: &Url) -> RelMap {
        let html = COMMENT.replace_all(html, "");
        let mut base = base.clone();
        let mut seen_base = false;
        let mut rels = RelMap::new();

        for tag in TAG.captures_iter(&html) {
            let name = tag[1].to_ascii_lowercase();
            let attributes = parse_attributes(&tag[2]);

            let Some(href) = attributes.get("href") else {
                continue;
            };

            if name == "base" {
                // Only the first <base href> counts
                if !seen_base {
                    seen_base = true;
                    if let Ok(rebased) = base.join(href) {
                        base = rebased;
                    }
                }
                continue;
            }

            let Some(rel) = attributes.get("rel") else {
                continue;
            };
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            let resolved = String::from(resolved);

            for relation in rel.split_ascii_whitespace() {
                let urls = rels.entry(relation.to_ascii_lowercase()).or_default();
                if !urls.contains(&resolved) {
                    urls.push(resolved.clone());
                }
            }
        }

        rels
    }
}

fn parse_attributes(raw: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for attr in ATTRIBUTE.captures_iter(raw) {
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());
        attributes
            .entry(attr[1].to_ascii_lowercase())
            .or_insert_with(|| decode_entities(value.trim()));
    }
    attributes
}

/// Decode character references: numeric ones and the named ones URLs carry
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    ENTITY
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let reference = &caps[1];
            let decoded = match reference {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => numeric_reference(reference),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn numeric_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/about/").unwrap()
    }

    #[test]
    fn test_link_and_anchor_relations() {
        let html = r#"
            <html><head>
              <link rel="authorization_endpoint" href="https://indieauth.com/auth">
              <link rel='token_endpoint' href='/token'>
            </head><body>
              <a href="micropub" rel="micropub">post</a>
            </body></html>
        "#;

        let rels = HtmlRelScraper.scrape(html, &base());
        assert_eq!(rels["authorization_endpoint"], vec!["https://indieauth.com/auth"]);
        assert_eq!(rels["token_endpoint"], vec!["https://example.com/token"]);
        assert_eq!(rels["micropub"], vec!["https://example.com/about/micropub"]);
    }

    #[test]
    fn test_multiple_relations_and_case() {
        let html = r#"<LINK REL="Me Authorization_Endpoint" HREF="https://auth.example/">"#;
        let rels = HtmlRelScraper.scrape(html, &base());

        assert_eq!(rels["me"], vec!["https://auth.example/"]);
        assert_eq!(rels["authorization_endpoint"], vec!["https://auth.example/"]);
    }

    #[test]
    fn test_document_order_and_dedup() {
        let html = r#"
            <link rel="authorization_endpoint" href="https://first.example/">
            <link rel="authorization_endpoint" href="https://second.example/">
            <a rel="authorization_endpoint" href="https://first.example/">again</a>
        "#;
        let rels = HtmlRelScraper.scrape(html, &base());
        assert_eq!(
            rels["authorization_endpoint"],
            vec!["https://first.example/", "https://second.example/"]
        );
    }

    #[test]
    fn test_base_href_rebases() {
        let html = r#"
            <base href="https://cdn.example.net/site/">
            <link rel="token_endpoint" href="token">
        "#;
        let rels = HtmlRelScraper.scrape(html, &base());
        assert_eq!(rels["token_endpoint"], vec!["https://cdn.example.net/site/token"]);
    }

    #[test]
    fn test_comments_and_entities() {
        let html = r#"
            <!-- <link rel="authorization_endpoint" href="https://hidden.example/"> -->
            <link rel="authorization_endpoint" href="https://auth.example/?a=1&amp;b=2">
        "#;
        let rels = HtmlRelScraper.scrape(html, &base());
        assert_eq!(
            rels["authorization_endpoint"],
            vec!["https://auth.example/?a=1&b=2"]
        );
    }

    #[test]
    fn test_numeric_character_references() {
        let html = r#"
            <link rel="authorization_endpoint" href="https://example.com/auth?a=1&#038;b=2">
            <link rel="token_endpoint" href="https://example.com/token?a=1&#x26;b=&#X32;">
        "#;
        let rels = HtmlRelScraper.scrape(html, &base());

        assert_eq!(
            rels["authorization_endpoint"],
            vec!["https://example.com/auth?a=1&b=2"]
        );
        assert_eq!(rels["token_endpoint"], vec!["https://example.com/token?a=1&b=2"]);
    }

    #[test]
    fn test_unknown_or_invalid_references_are_kept() {
        assert_eq!(decode_entities("a&copy;b"), "a&copy;b");
        assert_eq!(decode_entities("a&#0;b"), "a&#0;b");
        assert_eq!(decode_entities("a&#xD800;b"), "a&#xD800;b");
        assert_eq!(decode_entities("a&b"), "a&b");
    }

    #[test]
    fn test_angle_bracket_inside_quoted_attribute() {
        let html = r#"
            <link title="a > b" rel="authorization_endpoint" href="https://auth.example/">
            <a data-note='x > y' href="/micropub" rel="micropub">post</a>
        "#;
        let rels = HtmlRelScraper.scrape(html, &base());

        assert_eq!(rels["authorization_endpoint"], vec!["https://auth.example/"]);
        assert_eq!(rels["micropub"], vec!["https://example.com/micropub"]);
    }

    #[test]
    fn test_elements_without_rel_or_href_are_ignored() {
        let html = r#"<link href="/style.css"><a rel="nofollow">x</a><abbr rel="me" href="/x">"#;
        let rels = HtmlRelScraper.scrape(html, &base());
        assert!(rels.is_empty());
    }
}
