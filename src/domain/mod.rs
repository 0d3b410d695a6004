// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types shared by the training and serving paths.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O or network calls
//   - Only structs, enums, constants and traits
//
// Everything the model sees at training time and at serving
// time is defined here once: the label collapse, the prompt
// template, and the shape of a prediction.
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// Label vocabulary, class collapse and CSV column layout
pub mod sentiment;

// The versioned prompt template wrapped around (entity, text)
pub mod prompt;

// Training rows and prediction results
pub mod record;

// Seams implemented by infra/ml and mocked in tests
pub mod traits;
