use core::hash::BuildHasherDefault;
use core::hash::Hasher;

/// A deterministic word-at-a-time hasher.
///
/// Each written word is folded into the state with a rotate and xor, so the
/// hash of a single integer is that integer (sign-extended for signed
/// types). The table's Fibonacci placement multiplies the hash before using
/// its high bits, which is what spreads sequential or low-bit-aliased keys
/// across the table; this hasher deliberately adds no mixing of its own.
///
/// Not resistant to adversarial keys. Use a keyed hasher such as the crate's
/// [`DefaultHashBuilder`](crate::DefaultHashBuilder) for untrusted input.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use shift_hash::hasher::BuildFibHasher;
///
/// let state = BuildFibHasher::default();
/// assert_eq!(state.hash_one(42u32), 42);
/// assert_eq!(state.hash_one(-1i32), u64::MAX);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FibHasher(u64);

impl FibHasher {
    /// Create a hasher whose state starts at `seed`.
    #[inline]
    pub fn with_seed(seed: u64) -> FibHasher {
        FibHasher(seed)
    }

    #[inline(always)]
    fn fold(&mut self, word: u64) {
        self.0 = self.0.rotate_left(26) ^ word;
    }
}

impl Hasher for FibHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut chunks = bytes.chunks_exact(8);
        for chunk in &mut chunks {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            self.fold(u64::from_le_bytes(word));
        }
        let tail = chunks.remainder();
        if !tail.is_empty() {
            let mut word = [0u8; 8];
            word[..tail.len()].copy_from_slice(tail);
            self.fold(u64::from_le_bytes(word));
        }
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.fold(u64::from(i));
    }

    #[inline]
    fn write_u16(&mut self, i: u16) {
        self.fold(u64::from(i));
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.fold(u64::from(i));
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.fold(i);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64);
    }

    #[inline]
    fn write_i8(&mut self, i: i8) {
        self.fold(i as i64 as u64);
    }

    #[inline]
    fn write_i16(&mut self, i: i16) {
        self.fold(i as i64 as u64);
    }

    #[inline]
    fn write_i32(&mut self, i: i32) {
        self.fold(i as i64 as u64);
    }

    #[inline]
    fn write_i64(&mut self, i: i64) {
        self.fold(i as u64);
    }

    #[inline]
    fn write_isize(&mut self, i: isize) {
        self.fold(i as i64 as u64);
    }
}

/// A builder for default [`FibHasher`]s.
pub type BuildFibHasher = BuildHasherDefault<FibHasher>;
