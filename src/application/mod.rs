// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case tells the data,
// ml and infra layers what to do, in order. No tensor math
// and no argument parsing here.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Load → preprocess → train → evaluate → export
pub mod train_use_case;

// Checkpoint → export, no training
pub mod export_use_case;

// Layer table of the network
pub mod summary_use_case;
