// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one command (fetch, train, serve).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Download, verify and optionally record the dataset location
pub mod fetch_use_case;

// The training workflow
pub mod train_use_case;

/// Load the artifact and run the HTTP API
pub mod serve_use_case;
