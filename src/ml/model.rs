use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation, backend::AutodiffBackend},
};

use crate::infra::vectorizer::PAD_ID;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally. Do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SentimentModelConfig {
    pub vocab_size:    usize,
    pub embedding_dim: usize,
    pub hidden_dim:    usize,
    pub num_classes:   usize,
    pub dropout:       f64,
}

impl SentimentModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentModel<B> {
        SentimentModel {
            embedding: EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device),
            hidden:    LinearConfig::new(self.embedding_dim, self.hidden_dim).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
            output:    LinearConfig::new(self.hidden_dim, self.num_classes).init(device),
        }
    }
}

/// Bag-of-embeddings classifier:
///
///   token ids [batch, seq]
///     → embedding            [batch, seq, emb]
///     → mean over non-pad    [batch, emb]
///     → linear + relu        [batch, hidden]
///     → dropout
///     → linear               [batch, classes]  (logits)
#[derive(Module, Debug)]
pub struct SentimentModel<B: Backend> {
    pub embedding: Embedding<B>,
    pub hidden:    Linear<B>,
    pub dropout:   Dropout,
    pub output:    Linear<B>,
}

impl<B: Backend> SentimentModel<B> {
    /// token_ids: [batch, seq_len] → logits: [batch, num_classes]
    pub fn forward(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let mask = token_ids.clone().not_equal_elem(PAD_ID as i32).float(); // [batch, seq]
        let embedded = self.embedding.forward(token_ids);                   // [batch, seq, emb]
        let [batch_size, seq_len, embedding_dim] = embedded.dims();

        let mask = mask
            .unsqueeze_dim::<3>(2)
            .expand([batch_size, seq_len, embedding_dim]);

        // Padding positions contribute nothing; an all-padding row pools to zeros.
        let summed = (embedded * mask.clone()).sum_dim(1);      // [batch, 1, emb]
        let counts = mask.sum_dim(1).clamp_min(1.0);            // [batch, 1, emb]
        let pooled = (summed / counts).reshape([batch_size, embedding_dim]);

        let x = activation::relu(self.hidden.forward(pooled));
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }

    /// Class probabilities, softmax over the logits.
    pub fn probabilities(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        activation::softmax(self.forward(token_ids), 1)
    }

    pub fn forward_loss(
        &self,
        token_ids: Tensor<B, 2, Int>,
        labels:    Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(token_ids);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);
        (loss, logits)
    }
}

/// Number of rows where arg-max(logits) equals the label.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1]; flatten before comparing with [batch]
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}
