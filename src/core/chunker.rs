//! Sentence-preserving text chunker
//!
//! Text is cut on the literal `.` and greedily regrouped into chunks that
//! stay under a character budget. A chunk never ends mid-fragment, so a
//! single fragment larger than the budget becomes its own oversized chunk.

/// Default maximum chunk size in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 6000;

const SEPARATOR: char = '.';

/// Split `text` into chunks of at most `max_chunk_size` characters.
///
/// The size test is `len(acc) + len(fragment) >= max_chunk_size`, evaluated
/// before appending and without counting the `.` joiner. A fragment is only
/// appended when the sum is below the budget, so with the joiner a chunk of
/// several fragments reaches `max_chunk_size` at most. Only a single
/// fragment longer than the budget yields a longer chunk.
pub fn split(text: &str, max_chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;

    for fragment in text.split(SEPARATOR) {
        let fragment_len = fragment.chars().count();

        if !chunk.is_empty() && chunk_len + fragment_len >= max_chunk_size {
            chunks.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }

        if !chunk.is_empty() {
            chunk.push(SEPARATOR);
            chunk_len += 1;
        }
        chunk.push_str(fragment);
        chunk_len += fragment_len;
    }

    if !chunk.is_empty() {
        chunks.push(chunk);
    }

    chunks
}
