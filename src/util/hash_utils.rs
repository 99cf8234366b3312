use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// How plan hashes are computed. Passed explicitly to every hashing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlanHashMode {
    /// Structure and literals only.
    Legacy,
    /// Also mixes in the kind of every node, so that a continuation token is only
    /// accepted by a structurally identical plan.
    #[default]
    ForContinuation,
}

pub trait PlanHashable {
    fn plan_hash(&self, mode: PlanHashMode) -> u64;
}

// Combines two hashes into one hash
#[inline]
pub(crate) fn combine_hashes(l: u64, r: u64) -> u64 {
    let hash = (17 * 37u64).wrapping_add(l);
    hash.wrapping_mul(37).wrapping_add(r)
}

/// Hash that does not change between processes.
pub(crate) fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    value.hash(&mut hasher);
    hasher.finish()
}

/// Combines the hashes of `children`, prefixed with `kind` in
/// [`PlanHashMode::ForContinuation`].
pub(crate) fn hash_node(mode: PlanHashMode, kind: &str, children: impl IntoIterator<Item = u64>) -> u64 {
    let seed = match mode {
        PlanHashMode::Legacy => 0,
        PlanHashMode::ForContinuation => stable_hash(kind),
    };

    children.into_iter().fold(seed, combine_hashes)
}
