use burn::data::dataset::Dataset;

/// One vectorised training sample.
/// `token_ids` is already padded/truncated to the sequence length;
/// `label` is the class index (0, 1 or 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentSample {
    pub token_ids: Vec<u32>,
    pub label:     usize,
}

pub struct SentimentDataset {
    samples: Vec<SentimentSample>,
}

impl SentimentDataset {
    pub fn new(samples: Vec<SentimentSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Samples per class index, for logging the label balance
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_classes];
        for s in &self.samples {
            if let Some(c) = counts.get_mut(s.label) {
                *c += 1;
            }
        }
        counts
    }
}

impl Dataset<SentimentSample> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access_and_counts() {
        let ds = SentimentDataset::new(vec![
            SentimentSample { token_ids: vec![5, 3, 0, 0], label: 2 },
            SentimentSample { token_ids: vec![4, 0, 0, 0], label: 0 },
            SentimentSample { token_ids: vec![7, 8, 9, 0], label: 2 },
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(1).unwrap().label, 0);
        assert!(ds.get(3).is_none());
        assert_eq!(ds.class_counts(3), vec![1, 0, 2]);
    }
}
