//! Document chunker: paragraph-first splitting with sentence and word fallbacks.

/// Split `text` into chunks of at most `max_size` bytes, in reading order.
///
/// Blank-line-delimited paragraphs are accumulated into a running buffer,
/// which is flushed whenever the next paragraph would overflow it. A
/// paragraph that alone exceeds the limit is subdivided by sentence, and an
/// oversized sentence by whitespace-delimited words. A chunk never breaks
/// mid-word; the only allowed size violation is a single word longer than
/// `max_size`, which is emitted whole.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buf = String::new();

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if para.len() > max_size {
            flush(&mut buf, &mut chunks);
            split_paragraph(para, max_size, &mut chunks);
        } else if !buf.is_empty() && buf.len() + 2 + para.len() > max_size {
            flush(&mut buf, &mut chunks);
            buf.push_str(para);
        } else {
            if !buf.is_empty() {
                buf.push_str("\n\n");
            }
            buf.push_str(para);
        }
    }
    flush(&mut buf, &mut chunks);
    chunks
}

fn flush(buf: &mut String, chunks: &mut Vec<String>) {
    if !buf.is_empty() {
        chunks.push(std::mem::take(buf));
    }
}

/// Pack the sentences of an oversized paragraph into chunks.
fn split_paragraph(para: &str, max_size: usize, chunks: &mut Vec<String>) {
    let mut buf = String::new();
    for sentence in split_sentences(para) {
        if sentence.len() > max_size {
            flush(&mut buf, chunks);
            split_words(sentence, max_size, chunks);
        } else if !buf.is_empty() && buf.len() + 1 + sentence.len() > max_size {
            flush(&mut buf, chunks);
            buf.push_str(sentence);
        } else {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(sentence);
        }
    }
    flush(&mut buf, chunks);
}

/// Greedily pack whitespace-delimited words into chunks.
fn split_words(sentence: &str, max_size: usize, chunks: &mut Vec<String>) {
    let mut buf = String::new();
    for word in sentence.split_whitespace() {
        if word.len() > max_size {
            flush(&mut buf, chunks);
            chunks.push(word.to_string());
        } else if !buf.is_empty() && buf.len() + 1 + word.len() > max_size {
            flush(&mut buf, chunks);
            buf.push_str(word);
        } else {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(word);
        }
    }
    flush(&mut buf, chunks);
}

/// Naive sentence splitter: a sentence ends at a `.`/`!`/`?` run followed by
/// whitespace. A paragraph with no terminator comes back as one sentence.
fn split_sentences(para: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut after_terminator = false;
    for (i, c) in para.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            after_terminator = true;
        } else if after_terminator && c.is_whitespace() {
            let sentence = para[start..i].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = i;
            after_terminator = false;
        } else {
            after_terminator = false;
        }
    }
    let tail = para[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    if out.is_empty() { vec![para] } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 1000).is_empty());
        assert!(chunk_text("\n\n  \n\n", 1000).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("Solar panels save money.", 1000);
        assert_eq!(chunks, vec!["Solar panels save money."]);
    }

    #[test]
    fn paragraphs_accumulate_until_the_limit() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(40), "b".repeat(40), "c".repeat(40));
        let chunks = chunk_text(&text, 90);
        // First two paragraphs fit together (40 + 2 + 40 = 82), the third spills.
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("aaa") && chunks[0].contains("bbb"));
        assert_eq!(chunks[1], "c".repeat(40));
    }

    #[test]
    fn every_chunk_respects_the_limit() {
        let sentence = "Reflective roof coatings lower attic temperatures in summer. ";
        let text = sentence.repeat(100);
        for chunk in chunk_text(&text, 200) {
            assert!(chunk.len() <= 200, "chunk of {} bytes", chunk.len());
        }
    }

    #[test]
    fn oversized_paragraph_splits_on_sentences() {
        let text = "First sentence about panels. Second sentence about coatings! Third one about financing?";
        let chunks = chunk_text(text, 40);
        assert!(chunks.len() >= 3);
        assert_eq!(chunks[0], "First sentence about panels.");
    }

    #[test]
    fn sentence_without_terminator_falls_back_to_words() {
        let text = "one two three four five six seven eight nine ten".repeat(3);
        let chunks = chunk_text(&text, 20);
        for chunk in &chunks {
            assert!(chunk.len() <= 20);
            // No mid-word breaks.
            for word in chunk.split_whitespace() {
                assert!(text.contains(word));
            }
        }
    }

    #[test]
    fn giant_word_is_emitted_whole() {
        let giant = "x".repeat(50);
        let text = format!("small words {giant} more small words");
        let chunks = chunk_text(&text, 20);
        assert!(chunks.iter().any(|c| c == &giant));
        for chunk in &chunks {
            assert!(chunk.len() <= 20 || chunk == &giant);
        }
    }

    #[test]
    fn chunks_reconstruct_the_text_modulo_whitespace() {
        let text = "PACE financing is available for qualified properties.\n\n\
                    We install photovoltaic systems and elastomeric roof coatings. \
                    Our crews are licensed and bonded. Ask about zero-down loans!\n\n\
                    Schedule a free energy audit today.";
        for max in [30, 80, 1000] {
            let chunks = chunk_text(text, max);
            assert_eq!(normalize(&chunks.join(" ")), normalize(text), "max={max}");
        }
    }
}
