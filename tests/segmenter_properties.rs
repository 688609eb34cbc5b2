use journal_sentiment::sentiment::{Segmenter, segment, split_sentences};
use std::num::NonZeroUsize;

fn entry(sentences: usize) -> String {
    (1..=sentences)
        .map(|i| format!("Entry line number {i} went well."))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn chunk_count_is_ceiling_of_sentences_over_size() {
    for n in 0..=10 {
        let text = entry(n);
        assert_eq!(split_sentences(&text).len(), n);
        for k in 1..=4 {
            let chunks = segment(&text, NonZeroUsize::new(k).unwrap());
            assert_eq!(chunks.len(), n.div_ceil(k), "n={n} k={k}");
        }
    }
}

#[test]
fn chunks_cover_every_sentence_in_order() {
    let text = entry(7);
    let sentences = split_sentences(&text);
    let chunks = Segmenter::new(3).unwrap().segment(&text);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2], sentences[6]);
    assert_eq!(chunks.join(" "), sentences.join(" "));
    for chunk in &chunks {
        assert!(!chunk.trim().is_empty());
        assert_eq!(chunk.as_str(), chunk.trim());
    }
}

#[test]
fn no_chunk_exceeds_the_limit() {
    let text = entry(9);
    for k in 1..=5 {
        for chunk in Segmenter::new(k).unwrap().segment(&text) {
            assert!(split_sentences(&chunk).len() <= k);
        }
    }
}

#[test]
fn whitespace_only_yields_no_chunks() {
    assert!(Segmenter::default().segment(" \n\t ").is_empty());
}
