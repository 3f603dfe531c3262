//! Context budgeting for the answer tiers.

/// Heuristic cost of one whitespace-separated word, as a `(numerator, denominator)`
/// pair: each word counts as 1.5 tokens.
const TOKENS_PER_WORD: (usize, usize) = (3, 2);

/// Keep leading words while the running heuristic token count stays within
/// `max_tokens`. Words are rejoined with single spaces.
pub fn truncate_context(text: &str, max_tokens: usize) -> String {
    let (num, den) = TOKENS_PER_WORD;
    let max_words = max_tokens * den / num;
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_text() {
        assert_eq!(truncate_context("access is restricted", 3000), "access is restricted");
    }

    #[test]
    fn budget_counts_one_and_a_half_per_word() {
        let text = "a b c d e f g";
        // 3 tokens fit two words; a third would cost 4.5.
        assert_eq!(truncate_context(text, 3), "a b");
        assert_eq!(truncate_context(text, 4), "a b");
        assert_eq!(truncate_context(text, 5), "a b c");
        assert_eq!(truncate_context(text, 300), text);
    }

    #[test]
    fn never_exceeds_budget() {
        let text = "word ".repeat(5000);
        for budget in [0, 1, 2, 299, 300, 3000] {
            let out = truncate_context(&text, budget);
            let words = out.split_whitespace().count();
            assert!(words * 3 <= budget * 2, "budget {budget}: {words} words");
        }
    }

    #[test]
    fn collapses_whitespace_and_newlines() {
        assert_eq!(truncate_context("one\n\ntwo   three\tfour", 3000), "one two three four");
    }

    #[test]
    fn zero_budget_is_empty() {
        assert_eq!(truncate_context("anything at all", 0), "");
    }
}
