//! Opaque identifier for input elements.

/// Key into an [`InputValueStore`](crate::InputValueStore).
///
/// Hosts convert their own element ids at the boundary:
///
/// ```ignore
/// let id = InputId::from_raw(node.id().0 as u64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputId(u64);

impl InputId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u32> for InputId {
    #[inline]
    fn from(raw: u32) -> Self {
        Self::from_raw(raw as u64)
    }
}
