//! Single-entry transform cache
//!
//! Consecutive pixels of page content are often identical, so the
//! evaluator remembers the last (input, output) pair. Entries compare
//! bitwise over the full zero-padded vector.

use bytemuck::{Pod, Zeroable};
use parking_lot::Mutex;

/// Fixed-width 16-bit component vector, unused lanes zero
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(transparent)]
pub struct Channels(pub [u16; 16]);

impl Channels {
    #[inline]
    pub fn zeroed() -> Self {
        Zeroable::zeroed()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }
}

impl PartialEq for Channels {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }
}

impl Eq for Channels {}

impl Default for Channels {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Cache policy used by the evaluator's pixel loop
pub trait PixelCache {
    fn lookup(&self, input: &Channels) -> Option<Channels>;
    fn store(&mut self, input: &Channels, output: &Channels);
}

/// Cache that never hits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl PixelCache for NoCache {
    #[inline(always)]
    fn lookup(&self, _input: &Channels) -> Option<Channels> {
        None
    }

    #[inline(always)]
    fn store(&mut self, _input: &Channels, _output: &Channels) {}
}

/// Last (input, output) pair of one execution context
///
/// Tagged with the configuration generation of the evaluator that filled
/// it; meeting another generation drops the entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformCache {
    input: Channels,
    output: Channels,
    valid: bool,
    generation: u64,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Bind to `generation`, dropping an entry from any other
    pub(crate) fn sync(&mut self, generation: u64) {
        if self.generation != generation {
            if self.valid {
                tracing::trace!(from = self.generation, to = generation, "cache invalidated");
            }
            self.valid = false;
            self.generation = generation;
        }
    }
}

impl PixelCache for TransformCache {
    #[inline]
    fn lookup(&self, input: &Channels) -> Option<Channels> {
        (self.valid && self.input == *input).then_some(self.output)
    }

    #[inline]
    fn store(&mut self, input: &Channels, output: &Channels) {
        self.input = *input;
        self.output = *output;
        self.valid = true;
    }
}

/// Cache shared between execution contexts
///
/// A run copies the entry out under the lock, works on its copy, and
/// writes it back when done, so readers never see half an entry.
#[derive(Debug, Default)]
pub struct SharedCache {
    inner: Mutex<TransformCache>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TransformCache {
        *self.inner.lock()
    }

    pub fn commit(&self, cache: TransformCache) {
        *self.inner.lock() = cache;
    }

    pub fn invalidate(&self) {
        self.inner.lock().invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(values: &[u16]) -> Channels {
        let mut c = Channels::zeroed();
        c.0[..values.len()].copy_from_slice(values);
        c
    }

    #[test]
    fn test_bitwise_equality() {
        assert_eq!(channels(&[1, 2, 3]), channels(&[1, 2, 3]));
        assert_ne!(channels(&[1, 2, 3]), channels(&[1, 2, 3, 1]));
        assert_eq!(Channels::default(), Channels::zeroed());
    }

    #[test]
    fn test_lookup_and_store() {
        let mut cache = TransformCache::new();
        let input = channels(&[100, 200, 300]);
        let output = channels(&[7, 8, 9]);
        assert!(cache.lookup(&input).is_none());

        cache.store(&input, &output);
        assert_eq!(cache.lookup(&input), Some(output));
        assert!(cache.lookup(&channels(&[100, 200, 301])).is_none());

        cache.invalidate();
        assert!(cache.lookup(&input).is_none());
    }

    #[test]
    fn test_generation_change_drops_entry() {
        let mut cache = TransformCache::new();
        cache.sync(5);
        let input = channels(&[1]);
        cache.store(&input, &input);

        cache.sync(5);
        assert!(cache.is_valid());
        cache.sync(6);
        assert!(!cache.is_valid());
        assert_eq!(cache.generation(), 6);
    }

    #[test]
    fn test_shared_cache() {
        let shared = SharedCache::new();
        let mut local = shared.snapshot();
        let input = channels(&[4, 5, 6]);
        local.store(&input, &input);
        shared.commit(local);
        assert!(shared.snapshot().is_valid());
        shared.invalidate();
        assert!(!shared.snapshot().is_valid());
    }

    #[test]
    fn test_no_cache() {
        let mut cache = NoCache;
        let input = channels(&[1]);
        cache.store(&input, &input);
        assert!(cache.lookup(&input).is_none());
    }
}
