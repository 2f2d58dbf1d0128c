//! Keyword relevance scoring over stored chunks.

use std::collections::HashSet;

/// Return the IDs of up to `k` chunks most relevant to `query`.
///
/// The query is lowercased, punctuation is deleted in place, and the result
/// is split on whitespace into deduplicated tokens; tokens of 3 characters
/// or fewer are ignored. Punctuation removal collapses joined words, so
/// "zero-down" tokenizes as "zerodown", not as two words. Each chunk scores
/// the total number of whole-word occurrences of any token in its content
/// (chunk words are delimited by any non-alphanumeric character). Zero-score
/// chunks are dropped. Ties are broken by input order, which callers supply
/// in ascending chunk-ID order.
///
/// This is lexical overlap, not semantic similarity — a query sharing no
/// long words with any chunk returns nothing.
pub fn top_chunks(query: &str, k: usize, chunks: &[(i64, &str)]) -> Vec<i64> {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let tokens: HashSet<&str> = cleaned.split_whitespace().filter(|t| t.len() > 3).collect();

    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(i64, usize)> = chunks
        .iter()
        .map(|(id, content)| {
            let score = content
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|word| tokens.contains(*word))
                .count();
            (*id, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect();

    // Stable sort: equal scores keep ascending-ID input order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    tracing::debug!("keyword search matched {} chunk(s)", scored.len());
    scored.into_iter().take(k).map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNKS: &[(i64, &str)] = &[
        (1, "We offer zero-down financing and PACE financing for qualified properties."),
        (2, "Elastomeric roof coatings extend roof life and reflect heat."),
        (3, "Our solar installation crews are licensed, bonded, and insured."),
        (4, "Financing your solar installation is easier than most homeowners expect."),
    ];

    #[test]
    fn no_shared_words_returns_nothing() {
        assert!(top_chunks("quantum entanglement", 3, CHUNKS).is_empty());
    }

    #[test]
    fn short_tokens_are_ignored() {
        // "offer" matches; "we" and "do" are too short to count.
        assert_eq!(top_chunks("do we offer", 3, CHUNKS), vec![1]);
    }

    #[test]
    fn unique_match_comes_back_first() {
        let result = top_chunks("tell me about coatings", 3, CHUNKS);
        assert_eq!(result.first(), Some(&2));
    }

    #[test]
    fn repeated_words_raise_the_score() {
        // "financing" appears twice in chunk 1 and once in chunk 4.
        let result = top_chunks("financing", 3, CHUNKS);
        assert_eq!(result, vec![1, 4]);
    }

    #[test]
    fn hyphenated_query_words_collapse_to_one_token() {
        // Stripping punctuation joins "zero-down" into "zerodown", which
        // never matches the separate words "zero" and "down".
        assert!(top_chunks("zero-down", 3, &[(1, "zero down payment options")]).is_empty());
    }

    #[test]
    fn punctuation_around_a_word_does_not_hide_it() {
        assert_eq!(top_chunks("coatings?", 3, CHUNKS), vec![2]);
    }

    #[test]
    fn whole_word_matching_only() {
        // "roofing" must not match "roof".
        assert!(top_chunks("roofing", 3, CHUNKS).is_empty());
    }

    #[test]
    fn k_caps_the_result() {
        let result = top_chunks("solar installation financing", 1, CHUNKS);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn growing_k_preserves_the_prefix() {
        let small = top_chunks("solar installation financing", 1, CHUNKS);
        let large = top_chunks("solar installation financing", 3, CHUNKS);
        assert_eq!(&large[..small.len()], &small[..]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let chunks: &[(i64, &str)] = &[
            (7, "panels panels"),
            (3, "panels panels"),
        ];
        // Equal scores keep the caller-supplied input order.
        assert_eq!(top_chunks("panels", 2, chunks), vec![7, 3]);
    }
}
