use core::fmt;
use core::num::NonZeroU32;
use core::sync::atomic::{AtomicU32, Ordering};

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(0);

/// Process-unique identifier for every object in a model.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Handle>` to be pointer-optimized
/// - handles minted by [`Handle::fresh`] are never reused, even across models
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Mint a handle that no other object in this process has held.
    pub fn fresh() -> Self {
        let index = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        assert!(index < u32::MAX, "handle space exhausted");
        Self::from_index(index)
    }

    /// Create a Handle from a 0-based index by storing index+1.
    ///
    /// Does not reserve the index; only [`Handle::fresh`] guarantees uniqueness.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
