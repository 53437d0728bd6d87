//! # Quantum-Chain Interop Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/  # Cross-component flows over shared collaborators
//! │   ├── flows.rs      # Bridge transfer announced over the relay
//! │   └── recovery.rs   # Ledger inspection after a crash between steps
//! └── benches/          # Sharded vs single-lock registries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p interop-tests
//! cargo bench -p interop-tests
//! ```

#[cfg(test)]
mod integration;
