//! Text clean-up helpers

use std::sync::OnceLock;

use regex::Regex;

fn url_pattern() -> &'static Regex {
    static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
    URL_PATTERN.get_or_init(|| {
        Regex::new(r"https?://\S+|www\.\S+").expect("URL pattern is a valid regex")
    })
}

/// Strip http(s) and www links from text
pub fn remove_urls(text: &str) -> String {
    url_pattern().replace_all(text, "").into_owned()
}

/// Flatten text onto one line, as the embedding endpoint is fed
pub fn single_line(text: &str) -> String {
    text.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_urls() {
        assert_eq!(
            remove_urls("watch https://example.com/v?id=1 now"),
            "watch  now"
        );
        assert_eq!(remove_urls("see www.example.org."), "see ");
        assert_eq!(remove_urls("no links here"), "no links here");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\nb\nc"), "a b c");
    }
}
