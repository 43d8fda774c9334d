//! Text measurement helpers.
//!
//! Word and character counts are denormalized onto project rows and into the
//! usage ledger, so every write path must agree on how they are computed.

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}

/// Count Unicode scalar values (not bytes).
pub fn count_chars(text: &str) -> i64 {
    text.chars().count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("hello world"), 2);
        assert_eq!(count_words("  spaced   out  "), 2);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("one\ntwo\tthree"), 3);
    }

    #[test]
    fn test_count_chars() {
        assert_eq!(count_chars("hello world"), 11);
        assert_eq!(count_chars(""), 0);
        // Multibyte characters count once each
        assert_eq!(count_chars("café"), 4);
    }
}
