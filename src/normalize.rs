// src/normalize.rs
//! Candidate name normalization
//!
//! Raw names from certificate records arrive mixed-case, wildcarded, and
//! sometimes plain broken. `normalize` turns one raw candidate into its
//! canonical form or rejects it. It is a pure function and idempotent, so
//! equality on normalized names is plain string equality.

/// Characters that disqualify a candidate outright (HTML fragments and
/// quoting artifacts that show up in malformed certificate records)
const JUNK_CHARS: [char; 5] = ['<', '>', '\\', '"', '\''];

/// Normalize a raw candidate into a canonical domain name.
///
/// Strips surrounding whitespace and any leading wildcard labels, lowercases,
/// and validates the result. Returns `None` for anything that does not look
/// like a domain: empty strings, names without a dot, names with empty
/// labels, embedded whitespace/control characters, or junk characters.
pub fn normalize(raw: &str) -> Option<String> {
    let mut name = raw.trim();

    // A record can carry stacked wildcards ("*.*.example.com"); strip them
    // all so a second pass is a no-op
    while let Some(rest) = name.strip_prefix("*.") {
        name = rest;
    }

    let name = name.to_ascii_lowercase();

    if name.is_empty() || !name.contains('.') {
        return None;
    }

    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '*' || JUNK_CHARS.contains(&c))
    {
        return None;
    }

    // No empty labels: rejects "foo..bar", ".foo.com", "foo.com."
    if name.split('.').any(|label| label.is_empty()) {
        return None;
    }

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize("  Example.COM  "), Some("example.com".to_string()));
    }

    #[test]
    fn test_strips_leading_wildcard() {
        assert_eq!(normalize("*.example.com"), Some("example.com".to_string()));
    }

    #[test]
    fn test_strips_stacked_wildcards() {
        assert_eq!(normalize("*.*.example.com"), Some("example.com".to_string()));
    }

    #[test]
    fn test_wildcard_collapses_onto_plain_form() {
        // The wildcard and plain forms must normalize identically so the
        // dedup gate, not the normalizer, decides which one survives
        assert_eq!(normalize("*.Example.COM"), normalize("example.com"));
    }

    #[test]
    fn test_rejects_empty_and_dotless() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("localhost"), None);
        assert_eq!(normalize("*."), None);
    }

    #[test]
    fn test_rejects_embedded_whitespace_and_control() {
        assert_eq!(normalize("exa mple.com"), None);
        assert_eq!(normalize("example\t.com"), None);
        assert_eq!(normalize("example.com\u{0}"), None);
    }

    #[test]
    fn test_rejects_junk_characters() {
        assert_eq!(normalize("<script>.com"), None);
        assert_eq!(normalize("exam\"ple.com"), None);
        assert_eq!(normalize("exam'ple.com"), None);
        assert_eq!(normalize("exam\\ple.com"), None);
    }

    #[test]
    fn test_rejects_interior_wildcard() {
        assert_eq!(normalize("foo.*.example.com"), None);
    }

    #[test]
    fn test_rejects_empty_labels() {
        assert_eq!(normalize("foo..com"), None);
        assert_eq!(normalize(".example.com"), None);
        assert_eq!(normalize("example.com."), None);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "  Example.COM  ",
            "*.example.com",
            "*.*.Deep.Sub.Example.ORG",
            "api.test.io",
        ];

        for raw in inputs {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_accepts_multi_label_subdomains() {
        assert_eq!(
            normalize("deep.sub.example.co.uk"),
            Some("deep.sub.example.co.uk".to_string())
        );
    }
}
