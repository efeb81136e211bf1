/// A contiguous text segment of the knowledge document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    /// Position of this chunk within its document.
    pub index: usize,
    /// Character offset of the chunk start in the original text.
    pub start_offset: usize,
}

/// Greedy fixed-size character windows over a document.
///
/// With zero overlap the chunks are disjoint and concatenating them
/// reconstructs the input exactly. No sentence or paragraph awareness.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            // An overlap as large as the window would never advance.
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            rest: text,
            chunk_size: self.chunk_size,
            step: self.chunk_size - self.overlap,
            index: 0,
            offset: 0,
        }
    }
}

/// Iterator over the chunks of one document. Finite and restartable:
/// calling `split` again yields the same sequence.
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
    step: usize,
    index: usize,
    offset: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.rest.is_empty() {
            return None;
        }

        let take = byte_len_of_chars(self.rest, self.chunk_size);
        let chunk = Chunk {
            text: self.rest[..take].to_string(),
            index: self.index,
            start_offset: self.offset,
        };
        self.index += 1;

        if take == self.rest.len() {
            // Window reached the end of the document; an overlapping
            // step would only re-emit an already covered tail.
            self.rest = "";
        } else {
            let advance = byte_len_of_chars(self.rest, self.step);
            self.offset += self.rest[..advance].chars().count();
            self.rest = &self.rest[advance..];
        }

        Some(chunk)
    }
}

fn byte_len_of_chars(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
        ChunkSplitter::new(size, overlap).split(text).collect()
    }

    #[test]
    fn concatenation_reconstructs_input_without_overlap() {
        let text = "The refund window is 30 days.\nShipping takes 5 days.";
        let chunks = split(text, 10, 0);

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);

        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.text.chars().count(), 10);
        }
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let chunks = split("short", 500, 0);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(split("", 500, 0).is_empty());
    }

    #[test]
    fn indices_and_offsets_are_sequential() {
        let chunks = split("abcdefghij", 3, 0);

        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);

        let offsets: Vec<usize> = chunks.iter().map(|c| c.start_offset).collect();
        assert_eq!(offsets, vec![0, 3, 6, 9]);
    }

    #[test]
    fn overlap_repeats_window_tails() {
        let chunks = split("abcdefg", 4, 2);

        assert_eq!(chunks[0].text, "abcd");
        assert_eq!(chunks[1].text, "cdef");
        assert_eq!(chunks[2].text, "efg");
    }

    #[test]
    fn splits_on_character_boundaries_not_bytes() {
        let text = "héllo wörld";
        let chunks = split(text, 4, 0);

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(chunks[0].text, "héll");
    }

    #[test]
    fn splitting_twice_yields_identical_sequences() {
        let splitter = ChunkSplitter::new(7, 0);
        let text = "one two three four five";

        let first: Vec<Chunk> = splitter.split(text).collect();
        let second: Vec<Chunk> = splitter.split(text).collect();

        assert_eq!(first, second);
    }
}
