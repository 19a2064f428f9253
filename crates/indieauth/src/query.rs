//! `application/x-www-form-urlencoded` helpers

use std::collections::HashMap;

use url::form_urlencoded;

/// Encode pairs in order
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Decode a query or form body; repeated keys keep the first value
pub fn decode_query(input: &str) -> HashMap<String, String> {
    let mut decoded = HashMap::new();
    for (key, value) in form_urlencoded::parse(input.trim().as_bytes()) {
        decoded
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    decoded
}

/// Append an encoded query to a URL that may already carry one
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = match url.find('?') {
        None => "?",
        Some(i) if i + 1 == url.len() || url.ends_with('&') => "",
        Some(_) => "&",
    };
    format!("{url}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let encoded = encode_query([("me", "https://martymcgui.re/"), ("scope", "create update")]);
        assert_eq!(encoded, "me=https%3A%2F%2Fmartymcgui.re%2F&scope=create+update");
    }

    #[test]
    fn test_decode() {
        let decoded = decode_query("me=http%3A%2F%2Fexample.com&scope=create+update&me=other\n");
        assert_eq!(decoded["me"], "http://example.com");
        assert_eq!(decoded["scope"], "create update");
    }

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("https://a.example/auth", "x=1"), "https://a.example/auth?x=1");
        assert_eq!(append_query("https://a.example/auth?v=2", "x=1"), "https://a.example/auth?v=2&x=1");
        assert_eq!(append_query("https://a.example/auth?", "x=1"), "https://a.example/auth?x=1");
        assert_eq!(append_query("https://a.example/auth", ""), "https://a.example/auth");
    }
}
