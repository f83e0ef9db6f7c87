/// CCF-A venues whose appearance in an arXiv comment is worth calling out.
const TOP_VENUES: &[&str] = &[
    // security and cryptography
    "CCS",
    "CRYPTO",
    "EUROCRYPT",
    "S&P",
    "USENIX Security",
    // architecture, HPC, storage
    "ASPLOS",
    "ISCA",
    "MICRO",
    "HPCA",
    // networking
    "SIGCOMM",
    "NSDI",
    // databases and data mining
    "SIGMOD",
    "VLDB",
    "ICDE",
    // software engineering and languages
    "ICSE",
    "ESEC/FSE",
    "ASE",
    "ISSTA",
    // artificial intelligence
    "AAAI",
    "IJCAI",
    "ICML",
    "NeurIPS",
];

/// True iff the lowercased text contains any lowercased keyword as a
/// substring. No tokenization, no stemming.
pub fn contains_keywords<K: AsRef<str>>(text: &str, keywords: &[K]) -> bool {
    let text_lower = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| text_lower.contains(&keyword.as_ref().to_lowercase()))
}

/// Whether a free-text venue comment names a CCF-A conference or journal.
pub fn is_top_venue(venue: &str) -> bool {
    contains_keywords(venue, TOP_VENUES)
}

/// Caps `input` at `max` bytes, backing up to a char boundary, with an
/// ellipsis suffix when anything was cut. Not sentence-aware.
pub fn truncate_chars(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let mut end = max;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = input[..end].to_string();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive_substrings() {
        let keywords = ["Blockchain", "smart contract"];
        assert!(contains_keywords("A BLOCKCHAIN protocol", &keywords));
        assert!(contains_keywords("novel smart contracts at scale", &keywords));
        assert!(!contains_keywords("a consensus primer", &keywords));
    }

    #[test]
    fn empty_keyword_set_never_matches() {
        let keywords: [&str; 0] = [];
        assert!(!contains_keywords("anything at all", &keywords));
    }

    #[test]
    fn venue_comments_match_loosely() {
        assert!(is_top_venue("Accepted to USENIX Security 2026"));
        assert!(is_top_venue("to appear at sigcomm"));
        assert!(!is_top_venue("14 pages, 3 figures"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 4), "abcd...");
        // 是 is three bytes; a cut inside it must back up
        assert_eq!(truncate_chars("是是", 4), "是...");
    }
}
