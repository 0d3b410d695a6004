// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here: the architecture, the
// training loop, early stopping and the inference engine.
// The data layer only implements Burn's Dataset/Batcher traits.
//
//   model.rs          - Bag-of-embeddings classifier
//                       embedding → masked mean → dense → 3 logits
//
//   trainer.rs        - Minibatch Adam loop with per-epoch
//                       validation and best-only checkpointing
//
//   early_stopping.rs - Patience tracking on val accuracy
//
//   inferencer.rs     - Loads an artifact, replays its
//                       preprocessing, predicts one pair
//
// The NdArray CPU backend is the default. Building with
// `--features wgpu` switches to the GPU backend.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Backend used for inference and validation
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

/// Autodiff wrapper used while training
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

pub mod early_stopping;

/// Inference engine
pub mod inferencer;
