//! Binary Merkle tree over allowlisted addresses.
//!
//! Construction rules (fixed, shared with any off-system generator):
//! - a leaf is SHA-256 over `0x00 || address`; an interior node is SHA-256
//!   over `0x01 || left || right` (the prefix byte keeps leaves from being
//!   reinterpreted as interior nodes)
//! - the two children of every interior node are sorted ascending by raw
//!   byte value before hashing, so proofs carry no direction bits
//! - a level with an odd node count duplicates its last digest
//! - input addresses are deduplicated and sorted before leaf hashing, so
//!   the root depends only on the set, never on insertion order

use sha2::{Digest as _, Sha256};
use thiserror::Error;

use mintgate_core::{Address, Digest};

/// Domain separator prepended when hashing a leaf.
const LEAF_PREFIX: u8 = 0x00;

/// Domain separator prepended when hashing an interior node.
const NODE_PREFIX: u8 = 0x01;

/// Errors from tree construction and proof generation.
///
/// Both are setup-time errors; verification itself never fails, it only
/// reports a mismatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Cannot build a tree from an empty address set")]
    EmptyInput,

    #[error("Address {0} is not in the tree")]
    UnknownLeaf(String),
}

/// Hash one address into its leaf digest.
///
/// Pure and total. The off-system generator must produce byte-identical
/// leaves or no proof will ever verify.
pub fn leaf_digest(addr: &Address) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(addr);
    hasher.finalize().into()
}

/// Hash two child digests into their parent.
///
/// The pair is sorted ascending by raw byte value first, so
/// `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Fold a leaf through its sibling path and compare against the root.
///
/// All 32 bytes are compared; a proof that is too short or too long simply
/// recomputes to a different digest and is rejected. The empty path is
/// accepted only when the leaf equals the root, which is the genuine
/// single-leaf tree.
pub fn verify_inclusion(leaf: &Digest, siblings: &[Digest], root: &Digest) -> bool {
    let computed = siblings
        .iter()
        .fold(*leaf, |acc, sibling| hash_pair(&acc, sibling));
    computed == *root
}

/// Inclusion proof for one leaf: sibling digests in level order, leaf
/// level first. Ephemeral; handed to the member at setup time and supplied
/// back on every claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling digests from leaf level up to (but excluding) the root
    pub siblings: Vec<Digest>,
}

impl MerkleProof {
    /// Verify this proof for `leaf` against `root`.
    pub fn verify(&self, leaf: &Digest, root: &Digest) -> bool {
        verify_inclusion(leaf, &self.siblings, root)
    }

    /// Number of tree levels this proof spans.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

/// Binary Merkle tree committing to a set of addresses.
///
/// All levels are retained so a proof can be generated for any member
/// after construction. Built once at setup time; the gate only ever sees
/// the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Tree levels, leaves first, the single root digest last
    levels: Vec<Vec<Digest>>,
    /// Sorted, deduplicated members, index-aligned with `levels[0]`
    addresses: Vec<Address>,
}

impl MerkleTree {
    /// Build the tree from an address set.
    ///
    /// Duplicates are dropped and input order does not affect the root.
    /// Fails with `MerkleError::EmptyInput` when given no addresses.
    pub fn from_addresses(addresses: &[Address]) -> Result<Self, MerkleError> {
        if addresses.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut members = addresses.to_vec();
        members.sort_unstable();
        members.dedup();

        let leaves: Vec<Digest> = members.iter().map(leaf_digest).collect();
        let mut levels = vec![leaves];

        while levels[levels.len() - 1].len() > 1 {
            let prev = &levels[levels.len() - 1];
            let mut next = Vec::with_capacity(prev.len().div_ceil(2));
            for pair in prev.chunks(2) {
                let left = &pair[0];
                // Odd level: the lone node is paired with itself
                let right = pair.get(1).unwrap_or(left);
                next.push(hash_pair(left, right));
            }
            levels.push(next);
        }

        Ok(Self {
            levels,
            addresses: members,
        })
    }

    /// The root digest committing to the whole set.
    ///
    /// For a single-member tree this equals the member's leaf.
    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of member addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Whether `addr` is a member of the committed set.
    pub fn contains(&self, addr: &Address) -> bool {
        self.addresses.binary_search(addr).is_ok()
    }

    /// The committed members, sorted.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Generate the inclusion proof for a member address.
    ///
    /// Fails with `MerkleError::UnknownLeaf` for non-members.
    pub fn proof(&self, addr: &Address) -> Result<MerkleProof, MerkleError> {
        let index = self
            .addresses
            .binary_search(addr)
            .map_err(|_| MerkleError::UnknownLeaf(hex::encode(addr)))?;
        Ok(self.proof_at(index))
    }

    /// Proofs for every member, paired with their addresses.
    ///
    /// This is what the off-system distribution step hands out alongside
    /// the root.
    pub fn proofs(&self) -> Vec<(Address, MerkleProof)> {
        self.addresses
            .iter()
            .enumerate()
            .map(|(index, addr)| (*addr, self.proof_at(index)))
            .collect()
    }

    /// Sibling path for the leaf at `index`. The index is known-valid.
    fn proof_at(&self, mut index: usize) -> MerkleProof {
        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = index ^ 1;
            // A lone node at the end of an odd level was hashed with
            // itself, so its own digest is the sibling
            let sibling = level.get(sibling_index).unwrap_or(&level[index]);
            siblings.push(*sibling);
            index /= 2;
        }
        MerkleProof { siblings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn addr(n: u8) -> Address {
        [n; 32]
    }

    fn random_addr() -> Address {
        let mut a = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut a);
        a
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(
            MerkleTree::from_addresses(&[]).unwrap_err(),
            MerkleError::EmptyInput
        );
    }

    #[test]
    fn test_single_leaf_root_equals_leaf() {
        let tree = MerkleTree::from_addresses(&[addr(1)]).unwrap();
        assert_eq!(tree.root(), leaf_digest(&addr(1)));

        let proof = tree.proof(&addr(1)).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(proof.verify(&leaf_digest(&addr(1)), &tree.root()));
    }

    #[test]
    fn test_empty_proof_rejected_unless_leaf_is_root() {
        let tree = MerkleTree::from_addresses(&[addr(1)]).unwrap();

        // Wrong leaf with an empty proof must not pass
        assert!(!verify_inclusion(&leaf_digest(&addr(2)), &[], &tree.root()));

        // Empty proof against a multi-leaf root must not pass either
        let big = MerkleTree::from_addresses(&[addr(1), addr(2), addr(3)]).unwrap();
        assert!(!verify_inclusion(&leaf_digest(&addr(1)), &[], &big.root()));
    }

    #[test]
    fn test_hash_pair_is_order_independent() {
        let a = leaf_digest(&addr(1));
        let b = leaf_digest(&addr(2));
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_leaf_and_node_hashing_are_domain_separated() {
        // Hashing a digest as a leaf must differ from hashing the same
        // bytes inside an interior node
        let d = leaf_digest(&addr(7));
        assert_ne!(leaf_digest(&d), hash_pair(&d, &d));
    }

    #[test]
    fn test_root_independent_of_insertion_order() {
        let forward = MerkleTree::from_addresses(&[addr(1), addr(2), addr(3), addr(4)]).unwrap();
        let shuffled = MerkleTree::from_addresses(&[addr(3), addr(1), addr(4), addr(2)]).unwrap();
        assert_eq!(forward.root(), shuffled.root());
    }

    #[test]
    fn test_duplicates_do_not_change_root() {
        let plain = MerkleTree::from_addresses(&[addr(1), addr(2)]).unwrap();
        let doubled = MerkleTree::from_addresses(&[addr(2), addr(1), addr(2), addr(1)]).unwrap();
        assert_eq!(plain.root(), doubled.root());
        assert_eq!(doubled.len(), 2);
    }

    #[test]
    fn test_every_member_verifies_across_set_sizes() {
        // Covers even levels, odd levels (duplicated last node), and the
        // single-leaf degenerate case
        for size in 1..=8u8 {
            let members: Vec<Address> = (1..=size).map(addr).collect();
            let tree = MerkleTree::from_addresses(&members).unwrap();
            let root = tree.root();

            // With the duplicate-last-node rule every proof spans
            // ceil(log2(size)) levels
            let expected_depth = members.len().next_power_of_two().trailing_zeros() as usize;

            for member in &members {
                let proof = tree.proof(member).unwrap();
                assert_eq!(proof.depth(), expected_depth, "set size {}", size);
                assert!(
                    proof.verify(&leaf_digest(member), &root),
                    "member {} of {} failed to verify",
                    member[0],
                    size,
                );
            }
        }
    }

    #[test]
    fn test_non_member_leaf_rejected() {
        let members: Vec<Address> = (1..=5).map(addr).collect();
        let tree = MerkleTree::from_addresses(&members).unwrap();

        // A member's proof folded from an outsider's leaf must not reach
        // the root
        let proof = tree.proof(&addr(2)).unwrap();
        let outsider = random_addr();
        assert!(!proof.verify(&leaf_digest(&outsider), &tree.root()));
    }

    #[test]
    fn test_unknown_leaf_error() {
        let tree = MerkleTree::from_addresses(&[addr(1), addr(2)]).unwrap();
        let outsider = addr(9);
        assert!(matches!(
            tree.proof(&outsider),
            Err(MerkleError::UnknownLeaf(_))
        ));
    }

    #[test]
    fn test_tampered_sibling_rejected() {
        let members: Vec<Address> = (1..=5).map(addr).collect();
        let tree = MerkleTree::from_addresses(&members).unwrap();
        let root = tree.root();

        let mut proof = tree.proof(&addr(3)).unwrap();
        proof.siblings[0][0] ^= 0x01;
        assert!(!proof.verify(&leaf_digest(&addr(3)), &root));
    }

    #[test]
    fn test_truncated_and_extended_proofs_rejected() {
        let members: Vec<Address> = (1..=8).map(addr).collect();
        let tree = MerkleTree::from_addresses(&members).unwrap();
        let root = tree.root();
        let leaf = leaf_digest(&addr(4));
        let proof = tree.proof(&addr(4)).unwrap();

        let truncated = &proof.siblings[..proof.siblings.len() - 1];
        assert!(!verify_inclusion(&leaf, truncated, &root));

        let mut extended = proof.siblings.clone();
        extended.push([0u8; 32]);
        assert!(!verify_inclusion(&leaf, &extended, &root));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let tree = MerkleTree::from_addresses(&[addr(1), addr(2), addr(3)]).unwrap();
        let other = MerkleTree::from_addresses(&[addr(4), addr(5), addr(6)]).unwrap();

        let proof = tree.proof(&addr(1)).unwrap();
        assert!(!proof.verify(&leaf_digest(&addr(1)), &other.root()));
    }

    #[test]
    fn test_proofs_covers_all_members() {
        let members: Vec<Address> = (1..=7).map(addr).collect();
        let tree = MerkleTree::from_addresses(&members).unwrap();
        let root = tree.root();

        let proofs = tree.proofs();
        assert_eq!(proofs.len(), members.len());
        for (member, proof) in &proofs {
            assert!(proof.verify(&leaf_digest(member), &root));
        }
    }

    #[test]
    fn test_contains() {
        let tree = MerkleTree::from_addresses(&[addr(1), addr(2)]).unwrap();
        assert!(tree.contains(&addr(1)));
        assert!(!tree.contains(&addr(3)));
    }

    #[test]
    fn test_random_sets_member_and_outsider() {
        for _ in 0..10 {
            let members: Vec<Address> = (0..13).map(|_| random_addr()).collect();
            let tree = MerkleTree::from_addresses(&members).unwrap();
            let root = tree.root();

            let proof = tree.proof(&members[5]).unwrap();
            assert!(proof.verify(&leaf_digest(&members[5]), &root));

            let outsider = random_addr();
            assert!(!tree.contains(&outsider));
            assert!(!proof.verify(&leaf_digest(&outsider), &root));
        }
    }
}
