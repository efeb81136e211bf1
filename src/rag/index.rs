use std::cmp::Ordering;

use super::splitter::Chunk;
use super::PipelineError;

/// In-memory nearest-neighbour index over chunk embeddings.
///
/// Built once from all chunks of the knowledge document and read-only
/// afterwards. Search is brute-force cosine similarity, which is plenty
/// for a FAQ-sized corpus.
pub struct VectorIndex {
    entries: Vec<(Vec<f32>, Chunk)>,
}

impl VectorIndex {
    pub fn build(pairs: impl IntoIterator<Item = (Vec<f32>, Chunk)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `k` chunks closest to `query`, nearest first.
    /// Equal scores keep the original chunk order.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<Chunk>, PipelineError> {
        if self.entries.is_empty() {
            return Err(PipelineError::NotInitialized);
        }

        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|(vector, chunk)| (cosine_similarity(query, vector), chunk))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.index.cmp(&b.1.index))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, chunk)| chunk.clone()).collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
