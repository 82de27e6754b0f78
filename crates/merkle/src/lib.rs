//! MintGate Merkle
//!
//! Binary Merkle tree builder and inclusion-proof verification for the
//! allowlist commitment.
//!
//! The `MerkleTree` is used at setup time (to commit an allowlist to a
//! single root and hand each member their proof) and `verify_inclusion`
//! is used by the gate on every claim. Any off-system proof generator
//! must follow the exact construction rules documented in [`merkle`];
//! they are compatibility constants, not configuration.

pub mod merkle;

pub use merkle::{
    hash_pair, leaf_digest, verify_inclusion, MerkleError, MerkleProof, MerkleTree,
};
