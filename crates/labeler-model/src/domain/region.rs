/// Anything that occupies a contiguous slice of the keyspace.
///
/// An empty `end_key` means the region extends to the end of the keyspace;
/// an empty `start_key` means it starts at the very beginning.
pub trait KeyRangeRegion {
    fn start_key(&self) -> &[u8];
    fn end_key(&self) -> &[u8];
}

/// Minimal owned region: a `[start_key, end_key)` pair of raw keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    start_key: Vec<u8>,
    end_key: Vec<u8>,
}

impl Region {
    pub fn new(start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self {
            start_key: start_key.into(),
            end_key: end_key.into(),
        }
    }
}

impl KeyRangeRegion for Region {
    #[inline]
    fn start_key(&self) -> &[u8] {
        &self.start_key
    }

    #[inline]
    fn end_key(&self) -> &[u8] {
        &self.end_key
    }
}

impl<R: KeyRangeRegion + ?Sized> KeyRangeRegion for &R {
    fn start_key(&self) -> &[u8] {
        (**self).start_key()
    }

    fn end_key(&self) -> &[u8] {
        (**self).end_key()
    }
}
