//! Splitting documents into overlapping segments.
//!
//! Sizes and offsets are measured in characters, not bytes, so multi-byte
//! text such as `€` is never cut inside a code point.

use crate::document::{Document, Segment};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into segments.
pub trait Chunker: Send + Sync {
    /// Split a document into segments.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Segment>;
}

/// Splits text into fixed-size character windows with configurable overlap.
///
/// Segment IDs are generated as `{document_id}_{segment_index}`. A text no
/// longer than `chunk_size` yields a single segment equal to the text.
///
/// # Example
///
/// ```rust,ignore
/// use evqa_rag::CharacterChunker;
///
/// let chunker = CharacterChunker::new(1000, 200)?;
/// for segment in chunker.segments(&document) {
///     println!("{} @ {}", segment.id, segment.offset);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CharacterChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterChunker {
    /// Create a new `CharacterChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per segment
    /// * `chunk_overlap` — number of characters shared by consecutive segments
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] unless `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Maximum characters per segment.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive segments.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Lazily iterate over the segments of a document.
    ///
    /// The iterator is finite and cheap to clone; a clone restarts from the
    /// clone point.
    pub fn segments<'a>(&self, document: &'a Document) -> Segments<'a> {
        Segments {
            document,
            chunk_size: self.chunk_size,
            step: self.chunk_size - self.chunk_overlap,
            start_byte: 0,
            start_char: 0,
            index: 0,
            done: document.text.is_empty(),
        }
    }
}

impl Chunker for CharacterChunker {
    fn chunk(&self, document: &Document) -> Vec<Segment> {
        self.segments(document).collect()
    }
}

/// Iterator over the segments of one document. See [`CharacterChunker::segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    document: &'a Document,
    chunk_size: usize,
    step: usize,
    start_byte: usize,
    start_char: usize,
    index: usize,
    done: bool,
}

/// Byte position `chars` characters past `from`, clamped to the end of `text`.
fn advance(text: &str, from: usize, chars: usize) -> usize {
    text[from..].char_indices().nth(chars).map(|(i, _)| from + i).unwrap_or(text.len())
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.done {
            return None;
        }

        let text = self.document.text.as_str();
        let end_byte = advance(text, self.start_byte, self.chunk_size);

        let segment = Segment {
            id: format!("{}_{}", self.document.id, self.index),
            text: text[self.start_byte..end_byte].to_string(),
            document_id: self.document.id.clone(),
            record_index: self.document.record_index,
            offset: self.start_char,
        };

        if end_byte == text.len() {
            self.done = true;
        } else {
            self.start_byte = advance(text, self.start_byte, self.step);
            self.start_char += self.step;
            self.index += 1;
        }

        Some(segment)
    }
}

impl std::iter::FusedIterator for Segments<'_> {}
