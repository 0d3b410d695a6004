// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Concerns used by several layers that belong to none of them:
//
//   vectorizer.rs - Word-level vocabulary (tokenizers crate):
//                   fitted on training inputs, stored inside
//                   the artifact so serving uses the same ids
//
//   artifact.rs   - The single model artifact file: header,
//                   preprocessing contract, vocabulary and
//                   weights, written atomically
//
//   metrics.rs    - Per-epoch metrics CSV next to the artifact
//
//   kaggle.rs     - Dataset download and zip extraction
//
//   env_file.rs   - Recording DATA_FOLDER in a .env file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Records)

/// Word-level vocabulary and sequence encoding
pub mod vectorizer;

/// Model artifact saving and loading
pub mod artifact;

/// Training metrics CSV logger
pub mod metrics;

pub mod kaggle;

pub mod env_file;
