use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_SEED: FixedState = FixedState::with_seed(0x51_7C_C1_B7_27_22_0A_95);

/// A `foldhash` hasher seeded with a constant.
pub type FixedHasher = FoldHasher<'static>;

/// Builds [`FixedHasher`]s, results only depend on the hashed input.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use stow_utils::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("key"), FixedHashState.hash_one("key"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// A hasher that uses the last written `u64` as the hash.
///
/// Only meant for keys that already are well distributed hashes,
/// such as [`TypeId`](core::any::TypeId).
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    /// Folds the input into the state eight bytes at a time.
    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0_u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.hash ^= u64::from_le_bytes(word);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`]s.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hasher};

    use super::{FixedHashState, NoOpHashState};

    #[test]
    fn noop_passes_u64_through() {
        let mut hasher = NoOpHashState.build_hasher();
        hasher.write_u64(0xDEAD_BEEF);
        assert_eq!(hasher.finish(), 0xDEAD_BEEF);
    }

    #[test]
    fn noop_folds_raw_bytes() {
        let mut hasher = NoOpHashState.build_hasher();
        hasher.write(&7_u64.to_le_bytes());
        assert_eq!(hasher.finish(), 7);

        let mut hasher = NoOpHashState.build_hasher();
        hasher.write(&[1, 0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(hasher.finish(), 3);
    }

    #[test]
    fn fixed_is_stable() {
        let a = FixedHashState.hash_one(("owner", 3_u32));
        let b = FixedHashState.hash_one(("owner", 3_u32));
        assert_eq!(a, b);
        assert_ne!(a, FixedHashState.hash_one(("owner", 4_u32)));
    }
}
