//! Final-segment extraction from object keys.

/// Returns the last non-empty `/`-separated segment of `key`, ignoring any query or
/// fragment suffix.
///
/// Returns `None` if the key has no usable segment (empty, only slashes, `.` or `..`).
pub fn final_segment(key: &str) -> Option<&str> {
    let path = key.split(['?', '#']).next().unwrap_or("");
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            final_segment("crawl-data/CC-MAIN-2024-10/segments/1/wet/a.warc.wet.gz"),
            Some("a.warc.wet.gz")
        );
        assert_eq!(final_segment("single.gz"), Some("single.gz"));
    }

    #[test]
    fn trailing_slash_uses_last_named_segment() {
        assert_eq!(final_segment("p/q/"), Some("q"));
    }

    #[test]
    fn empty_or_reserved() {
        assert_eq!(final_segment(""), None);
        assert_eq!(final_segment("///"), None);
        assert_eq!(final_segment("a/.."), None);
        assert_eq!(final_segment("."), None);
    }

    #[test]
    fn with_query() {
        assert_eq!(final_segment("p/file.gz?token=abc"), Some("file.gz"));
        assert_eq!(final_segment("p/file.gz#frag"), Some("file.gz"));
    }
}
