//! `Link` header pagination

use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use std::sync::OnceLock;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]*)>\s*;\s*rel="([^"]*)""#).expect("link pattern is valid")
    })
}

/// Find the URL for a given relation in a `Link` header value
pub fn find_rel(link: &str, rel: &str) -> Option<String> {
    link_pattern()
        .captures_iter(link)
        .find(|caps| caps[2].split_whitespace().any(|r| r == rel))
        .map(|caps| caps[1].to_string())
}

/// URL of the next page, if the response has one
pub fn next_page(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .and_then(|link| find_rel(link, "next"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const LINK_HEADER: &str = r#"<https://api.github.com/repositories/1300192/forks?page=2>; rel="next", <https://api.github.com/repositories/1300192/forks?page=5>; rel="last""#;

    #[test]
    fn test_find_next() {
        assert_eq!(
            find_rel(LINK_HEADER, "next"),
            Some("https://api.github.com/repositories/1300192/forks?page=2".to_string())
        );
        assert_eq!(
            find_rel(LINK_HEADER, "last"),
            Some("https://api.github.com/repositories/1300192/forks?page=5".to_string())
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let link = r#"<https://api.github.com/repositories/1/forks?page=1>; rel="prev", <https://api.github.com/repositories/1/forks?page=1>; rel="first""#;
        assert_eq!(find_rel(link, "next"), None);
    }

    #[test]
    fn test_next_page_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page(&headers), None);

        headers.insert(LINK, HeaderValue::from_static(LINK_HEADER));
        assert!(next_page(&headers).unwrap().ends_with("page=2"));
    }
}
