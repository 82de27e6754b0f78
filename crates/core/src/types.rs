/// 32-byte account address identifying a claimant
pub type Address = [u8; 32];

/// 32-byte SHA-256 digest (leaf, interior node, or root)
pub type Digest = [u8; 32];

/// Identifier of a minted token
pub type TokenId = u64;

/// Truncated hex rendering of an address or digest for log output.
///
/// Eight bytes is enough to tell entries apart in logs without dumping
/// full 64-character strings everywhere.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(8)])
}
