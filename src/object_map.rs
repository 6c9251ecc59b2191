use core::borrow::Borrow;
use core::fmt::Debug;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Deref;

use crate::DefaultHashBuilder;
use crate::config::DEFAULT_CAPACITY;
use crate::config::LoadFactor;
use crate::error::Result;
use crate::hash_table;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::Rehash;

/// A hash map for arbitrary `Hash + Eq` keys on the linear-probing
/// [`HashTable`].
///
/// `ObjectMap<K, V, S>` hashes keys with the builder `S`, places them by
/// Fibonacci hashing of that hash, and removes entries by backward shift, so
/// the table never accumulates tombstones. Every key, including the default
/// or zero value of `K`, lives in the table.
///
/// # Performance Characteristics
///
/// - **Memory**: `Option<K>` plus `V` per slot; the slot count is
///   `capacity / load_factor` rounded up to a power of two.
/// - **Hashing**: keys are rehashed when the table resizes and when removal
///   shifts entries, so a fast hasher pays off.
///
/// # Examples
///
/// ```rust
/// use shift_hash::ObjectMap;
///
/// let mut map: ObjectMap<String, u32> = ObjectMap::new();
/// map.insert("apples".to_string(), 3);
/// map.insert("pears".to_string(), 5);
///
/// assert_eq!(map.get("apples"), Some(&3));
/// *map.entry("pears".to_string()).or_insert(0) += 1;
/// assert_eq!(map.get("pears"), Some(&6));
/// assert_eq!(map.remove("apples"), Some(3));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone)]
pub struct ObjectMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<K, V>,
    hash_builder: S,
}

impl<K, V, S> Debug for ObjectMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.table.iter()).finish()
    }
}

impl<K, V, S> Display for ObjectMap<K, V, S>
where
    K: Display,
    V: Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("[")?;
        for (n, (key, value)) in self.table.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("]")
    }
}

impl<K, V, S> ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::ObjectMap;
    /// # use shift_hash::hasher::BuildFibHasher;
    /// #
    /// let map: ObjectMap<u64, String, _> = ObjectMap::with_hasher(BuildFibHasher::default());
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates an empty map that holds `capacity` entries before growing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` needs a table larger than
    /// [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE) slots.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates an empty map with the given capacity, load factor, and hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::Error;
    /// # use shift_hash::ObjectMap;
    /// # use shift_hash::hasher::BuildFibHasher;
    /// #
    /// let map = ObjectMap::<u32, (), _>::with_capacity_load_factor_and_hasher(
    ///     6,
    ///     0.8,
    ///     BuildFibHasher::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(map.capacity(), 8);
    ///
    /// let err = ObjectMap::<u32, (), _>::with_capacity_load_factor_and_hasher(
    ///     6,
    ///     0.0,
    ///     BuildFibHasher::default(),
    /// )
    /// .err();
    /// assert_eq!(err, Some(Error::InvalidLoadFactor(0.0)));
    /// ```
    pub fn with_capacity_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self> {
        let load_factor = LoadFactor::new(load_factor)?;
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            hash_builder,
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of table slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the map's load factor.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor().get()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all entries, keeping the table's size.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all entries and shrinks the table to the size needed for
    /// `max_capacity` entries if it is larger.
    pub fn clear_to(&mut self, max_capacity: usize) -> Result<()> {
        self.table.clear_to(max_capacity)
    }

    /// Shrinks the table as much as the current entries allow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::ObjectMap;
    /// # use shift_hash::hasher::BuildFibHasher;
    /// #
    /// let mut map = ObjectMap::with_capacity_and_hasher(100, BuildFibHasher::default());
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    /// assert!(map.capacity() >= 100);
    ///
    /// map.shrink_to_fit();
    /// assert!(map.capacity() < 100);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        let hash_builder = &self.hash_builder;
        self.table.shrink_to_fit(|k| hash_builder.hash_one(k));
    }

    /// Shrinks the table to the size needed for `max_capacity` entries, but
    /// never below what the current entries need.
    pub fn shrink_to(&mut self, max_capacity: usize) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.table
            .shrink_to(max_capacity, |k| hash_builder.hash_one(k))
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let hash_builder = &self.hash_builder;
        self.table
            .reserve(additional, |k| hash_builder.hash_one(k))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned. If it
    /// did, the value is updated and the old value returned; the stored key
    /// is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        let hash_builder = &self.hash_builder;
        match self
            .table
            .entry(hash, |k| k == &key, |k| hash_builder.hash_one(k))
        {
            TableEntry::Occupied(mut entry) => Some(entry.insert(value)),
            TableEntry::Vacant(entry) => {
                entry.insert(key, value);
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |k| k.borrow() == key)
    }

    /// Returns the value corresponding to the key, or `default` if there is
    /// none.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |k| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        let hash_builder = &self.hash_builder;
        self.table.remove(
            hash,
            |k| k.borrow() == key,
            |k| hash_builder.hash_one(k),
        )
    }

    /// Gets the given key's entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::ObjectMap;
    /// # use shift_hash::hasher::BuildFibHasher;
    /// #
    /// let mut map = ObjectMap::with_hasher(BuildFibHasher::default());
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_builder.hash_one(&key);
        let hash_builder = &self.hash_builder;
        match self
            .table
            .entry(hash, |k| k == &key, |k| hash_builder.hash_one(k))
        {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry {
                entry,
                hash_builder,
            }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns a cursor that can remove entries while traversing the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::ObjectMap;
    /// # use shift_hash::hasher::BuildFibHasher;
    /// #
    /// let mut map = ObjectMap::with_hasher(BuildFibHasher::default());
    /// for word in ["ant", "bee", "cat", "dog"] {
    ///     map.insert(word, word.len());
    /// }
    ///
    /// let mut cursor = map.cursor();
    /// while let Some((key, _)) = cursor.next() {
    ///     if key.starts_with('b') || key.starts_with('d') {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(map.len(), 2);
    /// assert!(map.contains_key("cat"));
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        self.table.cursor_mut(KeyHasher {
            hash_builder: &self.hash_builder,
        })
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        let hash_builder = &self.hash_builder;
        self.table.retain(|k| hash_builder.hash_one(k), f);
    }

    /// Copies every entry of `other` into this map, replacing the values of
    /// keys present in both.
    pub fn put_all<T>(&mut self, other: &ObjectMap<K, V, T>) -> Result<()>
    where
        K: Clone,
        V: Clone,
        T: BuildHasher,
    {
        self.reserve(other.len())?;
        for (key, value) in other.iter() {
            self.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Returns `true` if the two maps hold the same keys and `eq` accepts
    /// every pair of corresponding values.
    pub fn eq_by<W, T>(&self, other: &ObjectMap<K, W, T>, eq: impl Fn(&V, &W) -> bool) -> bool
    where
        T: BuildHasher,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| eq(value, theirs)))
    }

    /// Returns the probe-length distribution of the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> hash_table::ProbeHistogram {
        self.table
            .probe_histogram(|k| self.hash_builder.hash_one(k))
    }

    /// Returns utilization and probe-length statistics of the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats(|k| self.hash_builder.hash_one(k))
    }
}

impl<K, V, S> ObjectMap<K, V, S> {
    /// Returns an iterator over the key-value pairs of the map, in slot
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable access to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs.
    ///
    /// After calling `drain()`, the map is empty; its table keeps its size.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
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
    /// Visits every entry.
    pub fn find_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }
}

impl<K, V, S> ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: Deref,
    S: BuildHasher,
{
    /// Compares two maps by pointer identity of the values' targets.
    pub fn eq_identity<T>(&self, other: &ObjectMap<K, V, T>) -> bool
    where
        T: BuildHasher,
    {
        self.eq_by(other, |a, b| core::ptr::eq(&**a, &**b))
    }
}

impl<K, V, S> ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty map using the default hasher builder.
    ///
    /// ```rust
    /// # use shift_hash::ObjectMap;
    /// let map: ObjectMap<i32, String> = ObjectMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> PartialEq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.eq_by(other, |a, b| a == b)
    }
}

impl<K, V, S> Eq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ObjectMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ObjectMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`ObjectMap`].
///
/// [`entry`]: ObjectMap::entry
pub enum Entry<'a, K, V, S> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: hash_table::VacantEntry<'a, K, V>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.entry.insert(self.key, value)
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, S> {
    entry: hash_table::OccupiedEntry<'a, K, V>,
    hash_builder: &'a S,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        self.entry.key()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.entry.get()
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.entry.get_mut()
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        self.entry.into_mut()
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        self.entry.insert(value)
    }
}

impl<K, V, S> OccupiedEntry<'_, K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        let hash_builder = self.hash_builder;
        self.entry.remove(|k| hash_builder.hash_one(k))
    }
}

/// A cursor over an `ObjectMap` that can remove the entry it last yielded.
///
/// Created by [`ObjectMap::cursor`].
pub type Cursor<'a, K, V, S> = hash_table::CursorMut<'a, K, V, KeyHasher<'a, S>>;

/// Hashes keys with a map's hasher builder when a [`Cursor`] shifts entries.
pub struct KeyHasher<'a, S> {
    hash_builder: &'a S,
}

impl<K, S> Rehash<K> for KeyHasher<'_, S>
where
    K: Hash,
    S: BuildHasher,
{
    fn rehash(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }
}

/// An iterator over the key-value pairs of an `ObjectMap`.
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of an `ObjectMap`.
pub struct IterMut<'a, K, V> {
    inner: hash_table::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of an `ObjectMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of an `ObjectMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of an `ObjectMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of an `ObjectMap`.
pub struct Drain<'a, K, V> {
    inner: hash_table::Drain<'a, K, V>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::Error;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to the same ideal slot.
    #[derive(Clone, Default)]
    struct Colliding;

    struct ZeroHasher;

    impl core::hash::Hasher for ZeroHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _: &[u8]) {}
    }

    impl BuildHasher for Colliding {
        type Hasher = ZeroHasher;

        fn build_hasher(&self) -> Self::Hasher {
            ZeroHasher
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: ObjectMap<i32, String, SipHashBuilder> = ObjectMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        let map2 = ObjectMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let map: ObjectMap<i32, String, SipHashBuilder> = ObjectMap::with_capacity(100);
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2 =
            ObjectMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);
        assert!(map2.is_empty());

        let err = ObjectMap::<i32, String, _>::with_capacity_load_factor_and_hasher(
            10,
            1.2,
            SipHashBuilder::default(),
        )
        .err();
        assert_eq!(err, Some(Error::InvalidLoadFactor(1.2)));
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
        assert_eq!(map.get_or(&2, &"none".to_string()), "none");
    }

    #[test]
    fn test_default_key_lives_in_table() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.insert(0, "zero"), None);
        assert_eq!(map.insert(0, "also zero"), Some("zero"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&0), Some(&"also zero"));
        assert_eq!(map.debug_stats().populated, 1);
    }

    #[test]
    fn test_get_mut() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_remove() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.remove_entry(&2), Some((2, "world".to_string())));
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_and_sizing() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        for i in 0..500 {
            map.insert(i, i);
        }
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);

        map.insert(1, 1);
        map.clear_to(4).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 8);

        map.reserve(1000).unwrap();
        assert!(map.capacity() >= 1024);
        map.insert(5, 5);
        map.shrink_to(0).unwrap();
        assert_eq!(map.capacity(), 2);
        assert_eq!(map.get(&5), Some(&5));
        assert_eq!(
            map.reserve(usize::MAX),
            Err(Error::CapacityTooLarge(usize::MAX))
        );
    }

    #[test]
    fn test_entry_api() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn test_entry_or_default() {
        let mut map: ObjectMap<i32, Vec<i32>, SipHashBuilder> =
            ObjectMap::with_hasher(SipHashBuilder::default());

        map.entry(1).or_default().push(42);
        assert_eq!(map.get(&1), Some(&vec![42]));

        map.entry(1).or_default().push(24);
        assert_eq!(map.get(&1), Some(&vec![42, 24]));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                assert_eq!(entry.get(), &"world".to_string());

                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());
                assert_eq!(entry.get(), &"new".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
    }

    #[test]
    fn test_entry_remove_in_collision_chain() {
        let mut map = ObjectMap::with_capacity_and_hasher(16, Colliding);
        for i in 0..10 {
            map.insert(i, i * 10);
        }
        match map.entry(3) {
            Entry::Occupied(entry) => assert_eq!(entry.remove(), 30),
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }
        assert_eq!(map.len(), 9);
        for i in 0..10 {
            let expected = (i != 3).then_some(i * 10);
            assert_eq!(map.get(&i).copied(), expected);
        }
        assert_eq!(map.probe_histogram().max_probe_length(), 8);
    }

    #[test]
    fn test_iterators() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&1), Some(&"one".to_string()));
        assert_eq!(pairs.get(&2), Some(&"two".to_string()));
        assert_eq!(pairs.get(&3), Some(&"three".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&1));
        assert!(keys.contains(&2));
        assert!(keys.contains(&3));

        for value in map.values_mut() {
            value.push('!');
        }
        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains("one!"));
        assert!(values.contains("two!"));
        assert!(values.contains("three!"));
        assert_eq!(map.iter().len(), 3);
    }

    #[test]
    fn test_drain() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());

        assert_eq!(drained.get(&1), Some(&"one".to_string()));
        assert_eq!(drained.get(&2), Some(&"two".to_string()));
        assert_eq!(drained.get(&3), Some(&"three".to_string()));
    }

    #[test]
    fn test_cursor_and_retain() {
        let mut map = ObjectMap::with_capacity_and_hasher(64, Colliding);
        for i in 0..40 {
            map.insert(i, i);
        }

        let mut visited = 0;
        let mut cursor: Cursor<'_, i32, i32, Colliding> = map.cursor();
        while let Some((key, value)) = cursor.next() {
            visited += 1;
            *value += 1000;
            if key % 5 == 0 {
                cursor.remove().unwrap();
            }
        }
        assert_eq!(cursor.table_len(), 32);
        assert_eq!(visited, 40);
        assert_eq!(map.len(), 32);
        assert!(map.iter().all(|(k, v)| k % 5 != 0 && *v == k + 1000));

        map.retain(|k, _| k % 2 == 0);
        assert_eq!(map.len(), 16);
        assert!(map.keys().all(|k| k % 2 == 0 && k % 5 != 0));
    }

    #[test]
    fn test_collision_handling() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());

        for i in 0..1000 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 1000);

        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..1000).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }

        assert_eq!(map.len(), 500);

        for i in (1..1000).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn test_string_keys_borrowed_lookup() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        map.insert("rust".to_string(), 3);

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.get("world"), Some(&2));
        assert_eq!(map.get(&"rust".to_string()), Some(&3));
        assert_eq!(map.get("missing"), None);
        assert_eq!(
            map.get_key_value("rust"),
            Some((&"rust".to_string(), &3))
        );
        assert_eq!(map.remove("world"), Some(2));
        assert!(!map.contains_key("world"));
    }

    #[test]
    fn test_value_queries_and_put_all() {
        let mut a: ObjectMap<String, i32, SipHashBuilder> =
            [("x".to_string(), 1), ("y".to_string(), 2)].into_iter().collect();
        let b: ObjectMap<String, i32, SipHashBuilder> =
            [("y".to_string(), 20), ("z".to_string(), 30)].into_iter().collect();

        assert!(a.contains_value(&2));
        assert!(!a.contains_value(&30));
        assert_eq!(a.find_key(&1).map(String::as_str), Some("x"));
        assert_eq!(a.find_key(&99), None);

        a.put_all(&b).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.get("y"), Some(&20));
        assert_eq!(a.get("z"), Some(&30));

        let mut c = ObjectMap::with_hasher(crate::hasher::BuildFibHasher::default());
        c.insert("w".to_string(), 0);
        c.put_all(&a).unwrap();
        assert_eq!(c.len(), 4);
        assert_eq!(c.get("x"), Some(&1));
        assert_eq!(c.get("z"), Some(&30));
    }

    #[test]
    fn test_iterators_report_exact_lengths() {
        let mut map: ObjectMap<i32, i32, SipHashBuilder> = (0..10).map(|i| (i, i * i)).collect();

        assert_eq!(map.iter().len(), 10);
        assert_eq!(map.keys().len(), 10);
        assert_eq!(map.values().len(), 10);
        assert_eq!(map.iter_mut().len(), 10);
        assert_eq!(map.values_mut().len(), 10);

        let mut keys = map.keys();
        assert!(keys.nth(3).is_some());
        assert_eq!(keys.len(), 6);
        assert_eq!(keys.size_hint(), (6, Some(6)));

        let mut values = map.values();
        assert_eq!(values.by_ref().count(), 10);
        assert_eq!(values.next(), None);
        assert_eq!(values.next(), None);

        let mut drain = map.drain();
        assert_eq!(drain.len(), 10);
        assert!(drain.next().is_some());
        assert_eq!(drain.len(), 9);
        drop(drain);
        assert!(map.is_empty());
    }

    #[test]
    fn test_equality() {
        let a: ObjectMap<i32, i32, SipHashBuilder> = (0..100).map(|i| (i, i)).collect();
        let mut b = ObjectMap::with_capacity_and_hasher(1000, SipHashBuilder::default());
        for i in (0..100).rev() {
            b.insert(i, i);
        }
        assert_eq!(a, b);
        b.insert(7, 8);
        assert_ne!(a, b);
        b.insert(7, 7);
        b.remove(&99);
        assert_ne!(a, b);

        let shared = Rc::new(5);
        let mut c = ObjectMap::with_hasher(SipHashBuilder::default());
        let mut d = ObjectMap::with_hasher(SipHashBuilder::default());
        c.insert(1, Rc::clone(&shared));
        d.insert(1, Rc::clone(&shared));
        assert!(c.eq_identity(&d));
        d.insert(1, Rc::new(5));
        assert!(c == d);
        assert!(!c.eq_identity(&d));
    }

    #[test]
    fn test_formatting() {
        let mut map = ObjectMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.to_string(), "[]");
        map.insert("k", 1);
        assert_eq!(map.to_string(), "[k=1]");
        assert_eq!(format!("{map:?}"), r#"{"k": 1}"#);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_matches_std_hashmap() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut map = ObjectMap::with_capacity_and_hasher(0, SipHashBuilder::default());
        let mut oracle = std::collections::HashMap::new();

        for step in 0..20_000u32 {
            let key = format!("k{}", rng.random_range(0..400u32));
            match rng.random_range(0..6) {
                0..=2 => assert_eq!(map.insert(key.clone(), step), oracle.insert(key, step)),
                3..=4 => assert_eq!(map.remove(&key), oracle.remove(&key)),
                _ => assert_eq!(map.get(&key), oracle.get(&key)),
            }
            assert_eq!(map.len(), oracle.len());
        }
        for (key, value) in &oracle {
            assert_eq!(map.get(key), Some(value));
        }
    }

    #[test]
    fn test_default_trait() {
        let map: ObjectMap<i32, String, SipHashBuilder> = ObjectMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        let map: ObjectMap<i32, String> = ObjectMap::default();
        assert_eq!(map.capacity(), 64);
    }
}
