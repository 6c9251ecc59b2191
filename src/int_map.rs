use core::fmt::Debug;
use core::fmt::Display;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FusedIterator;
use core::num::NonZeroI32;
use core::ops::Deref;

use crate::config::DEFAULT_CAPACITY;
use crate::config::LoadFactor;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;
use crate::hasher::FibHasher;

/// Hash of a table key: the sign-extended integer. Placement does the mixing.
#[inline(always)]
fn rehash(key: &NonZeroI32) -> u64 {
    key.get() as i64 as u64
}

/// Where an `i32` key lives in an [`IntMap`].
///
/// Key `0` cannot be stored in the table because the table's slot type has no
/// room for it; it is kept in a dedicated side channel instead.
///
/// ```rust
/// use shift_hash::int_map::Slot;
///
/// assert_eq!(Slot::from(0), Slot::Sentinel);
/// assert!(matches!(Slot::from(-4), Slot::Table(k) if k.get() == -4));
/// assert_eq!(Slot::from(17).key(), 17);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The zero key, held outside the table.
    Sentinel,
    /// Any other key, held in the probed table.
    Table(NonZeroI32),
}

impl Slot {
    /// Returns the `i32` key this slot stands for.
    pub fn key(self) -> i32 {
        match self {
            Slot::Sentinel => 0,
            Slot::Table(key) => key.get(),
        }
    }
}

impl From<i32> for Slot {
    #[inline]
    fn from(key: i32) -> Self {
        match NonZeroI32::new(key) {
            Some(key) => Slot::Table(key),
            None => Slot::Sentinel,
        }
    }
}

/// An unordered map from `i32` keys to values.
///
/// Built on [`HashTable`]: keys are placed by Fibonacci hashing of the integer
/// itself, collisions are resolved by linear probing, and removal shifts later
/// entries back instead of leaving tombstones. Key `0` is held in a side
/// channel next to the table (see [`Slot`]); it counts toward
/// [`len`](IntMap::len) and is always produced first by every iterator.
///
/// Nothing is allocated during steady-state use: `get`, `insert` of an
/// existing key, `remove`, and every iterator work in place. Only growth,
/// [`reserve`](IntMap::reserve), and the shrinking operations reallocate.
///
/// # Examples
///
/// ```rust
/// use shift_hash::IntMap;
///
/// let mut map = IntMap::new();
/// map.insert(0, "zero");
/// map.insert(7, "seven");
/// map.insert(-3, "minus three");
///
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.get(0), Some(&"zero"));
/// assert_eq!(map.get(7), Some(&"seven"));
/// assert_eq!(map.get(8), None);
///
/// assert_eq!(map.remove(7), Some("seven"));
/// assert_eq!(map.remove(7), None);
/// assert_eq!(map.to_string(), "[0=zero, -3=minus three]");
/// ```
#[derive(Clone)]
pub struct IntMap<V> {
    table: HashTable<NonZeroI32, V>,
    zero: Option<V>,
}

impl<V> IntMap<V> {
    /// Creates an empty map that holds [`DEFAULT_CAPACITY`] entries before
    /// growing.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty map that holds `capacity` entries at the default load
    /// factor before growing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` needs a table larger than
    /// [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE) slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            zero: None,
        }
    }

    /// Creates an empty map with the given initial capacity and load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::Error;
    /// use shift_hash::IntMap;
    ///
    /// let map: IntMap<u8> = IntMap::with_capacity_and_load_factor(6, 0.8).unwrap();
    /// assert_eq!(map.capacity(), 8);
    ///
    /// assert_eq!(
    ///     IntMap::<u8>::with_capacity_and_load_factor(6, 1.0).err(),
    ///     Some(Error::InvalidLoadFactor(1.0))
    /// );
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        let load_factor = LoadFactor::new(load_factor)?;
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            zero: None,
        })
    }

    /// Returns the number of entries, including the zero key.
    pub fn len(&self) -> usize {
        self.table.len() + usize::from(self.zero.is_some())
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty() && self.zero.is_none()
    }

    /// Returns the number of table slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the map's load factor.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor().get()
    }

    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// Updating an existing key leaves [`len`](Self::len) unchanged. Inserting
    /// a new non-zero key doubles the table when [`len`](Self::len), zero key
    /// included, reaches the threshold.
    pub fn insert(&mut self, key: i32, value: V) -> Option<V> {
        match Slot::from(key) {
            Slot::Sentinel => self.zero.replace(value),
            Slot::Table(key) => match self.table.entry_counting(
                rehash(&key),
                |k| *k == key,
                rehash,
                usize::from(self.zero.is_some()),
            ) {
                Entry::Occupied(mut entry) => Some(entry.insert(value)),
                Entry::Vacant(entry) => {
                    entry.insert(key, value);
                    None
                }
            },
        }
    }

    /// Returns the value stored under `key`.
    #[inline]
    pub fn get(&self, key: i32) -> Option<&V> {
        match Slot::from(key) {
            Slot::Sentinel => self.zero.as_ref(),
            Slot::Table(key) => self.table.find(rehash(&key), |k| *k == key).map(|(_, v)| v),
        }
    }

    /// Returns the value stored under `key`, or `default` if there is none.
    ///
    /// ```rust
    /// # use shift_hash::IntMap;
    /// let mut map = IntMap::new();
    /// map.insert(1, 10);
    /// assert_eq!(*map.get_or(1, &-1), 10);
    /// assert_eq!(*map.get_or(2, &-1), -1);
    /// ```
    pub fn get_or<'a>(&'a self, key: i32, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: i32) -> Option<&mut V> {
        match Slot::from(key) {
            Slot::Sentinel => self.zero.as_mut(),
            Slot::Table(key) => self
                .table
                .find_mut(rehash(&key), |k| *k == key)
                .map(|(_, v)| v),
        }
    }

    /// Returns `true` if the map holds a value for `key`.
    pub fn contains_key(&self, key: i32) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value.
    ///
    /// Removing an absent key returns `None` and changes nothing.
    pub fn remove(&mut self, key: i32) -> Option<V> {
        match Slot::from(key) {
            Slot::Sentinel => self.zero.take(),
            Slot::Table(key) => self
                .table
                .remove(rehash(&key), |k| *k == key, rehash)
                .map(|(_, v)| v),
        }
    }

    /// Removes every entry. The table keeps its size.
    pub fn clear(&mut self) {
        self.zero = None;
        self.table.clear();
    }

    /// Removes every entry and shrinks the table to the size needed for
    /// `max_capacity` entries if it is larger than that.
    pub fn clear_to(&mut self, max_capacity: usize) -> Result<()> {
        self.table.clear_to(max_capacity)?;
        self.zero = None;
        Ok(())
    }

    /// Grows the table so that `additional` more entries fit without a
    /// further resize.
    ///
    /// ```rust
    /// # use shift_hash::Error;
    /// # use shift_hash::IntMap;
    /// let mut map: IntMap<()> = IntMap::with_capacity(0);
    /// map.reserve(1000).unwrap();
    /// assert!(map.capacity() >= 1024);
    ///
    /// assert_eq!(map.reserve(usize::MAX), Err(Error::CapacityTooLarge(usize::MAX)));
    /// ```
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let additional = additional.saturating_add(usize::from(self.zero.is_some()));
        self.table.reserve(additional, rehash)
    }

    /// Shrinks the table to the size needed for `max_capacity` entries, but
    /// never below what the current entries need.
    pub fn shrink_to(&mut self, max_capacity: usize) -> Result<()> {
        self.table.shrink_to(max_capacity, rehash)
    }

    /// Shrinks the table as much as the current entries allow.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit(rehash);
    }

    /// Copies every entry of `other` into this map, replacing values of keys
    /// present in both.
    ///
    /// Reserves room for all of `other`'s entries first.
    pub fn put_all(&mut self, other: &IntMap<V>) -> Result<()>
    where
        V: Clone,
    {
        self.reserve(other.len())?;
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
        Ok(())
    }

    /// Returns `true` if any entry holds a value equal to `value`.
    ///
    /// Visits every entry.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Returns a key whose value equals `value`, if there is one.
    ///
    /// Visits every entry. The zero key is checked first.
    pub fn find_key(&self, value: &V) -> Option<i32>
    where
        V: PartialEq,
    {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }

    /// Compares two maps entry by entry with `eq` for the values.
    pub fn eq_by<W>(&self, other: &IntMap<W>, eq: impl Fn(&V, &W) -> bool) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| eq(value, theirs)))
    }

    /// Returns an iterator over `(key, &value)`.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            zero: self.zero.as_ref(),
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over `(key, &mut value)`.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            zero: self.zero.as_mut(),
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes and yields every entry. The table keeps its size.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            zero: self.zero.take(),
            inner: self.table.drain(),
        }
    }

    /// Returns a cursor that can remove entries while traversing the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::IntMap;
    ///
    /// let mut map: IntMap<i32> = (-5..=5).map(|k| (k, k * k)).collect();
    ///
    /// let mut cursor = map.cursor();
    /// while let Some((key, value)) = cursor.next() {
    ///     if key < 0 {
    ///         cursor.remove().unwrap();
    ///     } else {
    ///         *value += 1;
    ///     }
    /// }
    ///
    /// assert_eq!(map.len(), 6);
    /// assert_eq!(map.get(0), Some(&1));
    /// assert_eq!(map.get(5), Some(&26));
    /// assert!(!map.contains_key(-5));
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        Cursor {
            zero: &mut self.zero,
            sentinel: SentinelState::Pending,
            inner: self.table.cursor_mut(rehash as fn(&NonZeroI32) -> u64),
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(i32, &mut V) -> bool) {
        if let Some(value) = self.zero.as_mut() {
            if !f(0, value) {
                self.zero = None;
            }
        }
        self.table.retain(rehash, |key, value| f(key.get(), value));
    }

    /// Returns the probe-length distribution of the table entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> hash_table::ProbeHistogram {
        self.table.probe_histogram(rehash)
    }

    /// Returns utilization and probe-length statistics of the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats(rehash)
    }
}

impl<V> IntMap<V>
where
    V: Deref,
{
    /// Compares two maps by pointer identity of the values' targets instead
    /// of by value.
    ///
    /// ```rust
    /// use std::rc::Rc;
    ///
    /// use shift_hash::IntMap;
    ///
    /// let shared = Rc::new(String::from("x"));
    /// let mut a = IntMap::new();
    /// let mut b = IntMap::new();
    /// a.insert(1, Rc::clone(&shared));
    /// b.insert(1, Rc::clone(&shared));
    /// assert!(a.eq_identity(&b));
    ///
    /// b.insert(1, Rc::new(String::from("x")));
    /// assert!(a == b);
    /// assert!(!a.eq_identity(&b));
    /// ```
    pub fn eq_identity(&self, other: &IntMap<V>) -> bool {
        self.eq_by(other, |a, b| core::ptr::eq(&**a, &**b))
    }
}

impl<V> Default for IntMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PartialEq for IntMap<V>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.eq_by(other, |a, b| a == b)
    }
}

impl<V> Eq for IntMap<V> where V: Eq {}

impl<V> Hash for IntMap<V>
where
    V: Hash,
{
    /// Order-independent: entries are digested separately and summed.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        let mut sum = 0u64;
        for (key, value) in self.iter() {
            let mut digest = FibHasher::default();
            key.hash(&mut digest);
            value.hash(&mut digest);
            sum = sum.wrapping_add(digest.finish());
        }
        state.write_u64(sum);
    }
}

impl<V> Debug for IntMap<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Display for IntMap<V>
where
    V: Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("[")?;
        for (n, (key, value)) in self.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("]")
    }
}

impl<V> Extend<(i32, V)> for IntMap<V> {
    fn extend<T: IntoIterator<Item = (i32, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<V> FromIterator<(i32, V)> for IntMap<V> {
    fn from_iter<T: IntoIterator<Item = (i32, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, V> IntoIterator for &'a IntMap<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (i32, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut IntMap<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = (i32, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator over the entries of an [`IntMap`]. The zero key comes first.
pub struct Iter<'a, V> {
    zero: Option<&'a V>,
    inner: hash_table::Iter<'a, NonZeroI32, V>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            zero: self.zero,
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((0, value));
        }
        self.inner.next().map(|(k, v)| (k.get(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + usize::from(self.zero.is_some());
        (len, Some(len))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the entries of an [`IntMap`].
pub struct IterMut<'a, V> {
    zero: Option<&'a mut V>,
    inner: hash_table::IterMut<'a, NonZeroI32, V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i32, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((0, value));
        }
        self.inner.next().map(|(k, v)| (k.get(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + usize::from(self.zero.is_some());
        (len, Some(len))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An iterator over the keys of an [`IntMap`].
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Iterator for Keys<'_, V> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

impl<V> FusedIterator for Keys<'_, V> {}

/// An iterator over the values of an [`IntMap`].
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

impl<V> FusedIterator for Values<'_, V> {}

/// A mutable iterator over the values of an [`IntMap`].
pub struct ValuesMut<'a, V> {
    inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

impl<V> FusedIterator for ValuesMut<'_, V> {}

/// A draining iterator over the entries of an [`IntMap`].
pub struct Drain<'a, V> {
    zero: Option<V>,
    inner: hash_table::Drain<'a, NonZeroI32, V>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = (i32, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((0, value));
        }
        self.inner.next().map(|(k, v)| (k.get(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + usize::from(self.zero.is_some());
        (len, Some(len))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SentinelState {
    /// The zero key has not been offered yet.
    Pending,
    /// The zero key was the last entry produced.
    Current,
    Passed,
}

/// A cursor over an [`IntMap`] that can remove the entry it last produced.
///
/// Created by [`IntMap::cursor`]. Produces the zero key first, then the table
/// entries. Removing an entry never causes another entry to be skipped or
/// produced twice.
pub struct Cursor<'a, V> {
    zero: &'a mut Option<V>,
    sentinel: SentinelState,
    inner: hash_table::CursorMut<'a, NonZeroI32, V, fn(&NonZeroI32) -> u64>,
}

impl<V> Cursor<'_, V> {
    /// Advances to the next entry and returns it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(i32, &mut V)> {
        if self.sentinel == SentinelState::Pending {
            if let Some(value) = self.zero.as_mut() {
                self.sentinel = SentinelState::Current;
                return Some((0, value));
            }
        }
        self.sentinel = SentinelState::Passed;
        self.inner.next().map(|(k, v)| (k.get(), v))
    }

    /// Removes the entry last returned by [`next`](Self::next).
    ///
    /// Fails with [`Error::NoCurrentEntry`] if there is no such entry: `next`
    /// has not been called, returned `None`, or its entry was already
    /// removed.
    pub fn remove(&mut self) -> Result<(i32, V)> {
        if self.sentinel == SentinelState::Current {
            self.sentinel = SentinelState::Passed;
            return self
                .zero
                .take()
                .map(|value| (0, value))
                .ok_or(Error::NoCurrentEntry);
        }
        self.inner.remove().map(|(k, v)| (k.get(), v))
    }

    /// Moves the cursor back before the first entry.
    pub fn reset(&mut self) {
        self.sentinel = SentinelState::Pending;
        self.inner.reset();
    }
}
