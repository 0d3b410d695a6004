// ============================================================
// Layer 4 - Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<SentimentSample>
// into tensors for one forward pass.
//
//   Input:  N samples, each with S token ids
//   Output: token_ids [N, S] (Int), labels [N] (Int)
//
// Every sample is already padded to the same sequence length by
// the vectorizer, so batching is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentimentSample;

/// A batch of vectorised samples.
#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// Token ids - shape: [batch_size, seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// Class indices - shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SentimentSample, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentSample>) -> SentimentBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.token_ids.len()).unwrap_or(0);

        let ids_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().map(|&id| id as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let token_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SentimentBatch { token_ids, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device = Default::default();
        let batcher = SentimentBatcher::<NdArray>::new(device);

        let batch = batcher.batch(vec![
            SentimentSample { token_ids: vec![4, 5, 0], label: 2 },
            SentimentSample { token_ids: vec![6, 0, 0], label: 0 },
        ]);

        assert_eq!(batch.token_ids.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);

        let ids: Vec<i64> = batch
            .token_ids
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .unwrap();
        assert_eq!(ids, vec![4, 5, 0, 6, 0, 0]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(labels, vec![2, 0]);
    }
}
