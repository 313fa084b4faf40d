/// Token counting for cost attribution. Counts are estimates, not exact;
/// the trait exists so the approximation can be swapped for a real
/// tokenizer without touching pipeline logic.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> u32;
}

/// Whitespace-split word count. A rough estimate of model tokens, kept
/// deliberately simple since the counts only feed cost logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count(&self, text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_counts_zero() {
        let counter = WhitespaceTokenCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("   \n\t "), 0);
    }

    #[test]
    fn words_are_counted_across_whitespace_kinds() {
        let counter = WhitespaceTokenCounter;
        assert_eq!(counter.count("one two three"), 3);
        assert_eq!(counter.count("one\ntwo\t three  four"), 4);
    }
}
