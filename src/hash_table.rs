use alloc::boxed::Box;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;
use core::mem::MaybeUninit;

use crate::config::LoadFactor;
use crate::error::Error;
use crate::error::Result;

/// 2^64 divided by the golden ratio, rounded to an odd number.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline(always)]
fn cyclic_distance(from: usize, to: usize, mask: usize) -> usize {
    to.wrapping_sub(from) & mask
}

fn vacant_keys<K>(table_size: usize) -> Box<[Option<K>]> {
    core::iter::repeat_with(|| None).take(table_size).collect()
}

/// Derived sizing state for a table of a given power-of-two size.
#[derive(Clone, Copy, Debug)]
struct Geometry {
    mask: usize,
    shift: u32,
    threshold: usize,
}

impl Geometry {
    fn new(table_size: usize, load_factor: LoadFactor) -> Self {
        debug_assert!(table_size.is_power_of_two() && table_size >= 2);
        let mask = table_size - 1;
        Geometry {
            mask,
            shift: (mask as u64).leading_zeros(),
            threshold: load_factor.threshold(table_size),
        }
    }

    /// Fibonacci hashing: the high bits of `hash * 2^64/phi` select the slot.
    #[inline(always)]
    fn place(self, hash: u64) -> usize {
        (hash.wrapping_mul(GOLDEN_GAMMA) >> self.shift) as usize
    }

    #[inline(always)]
    fn next(self, index: usize) -> usize {
        (index + 1) & self.mask
    }
}

enum Probe {
    Occupied(usize),
    Vacant(usize),
}

/// An open-addressing hash table using linear probing, Fibonacci placement,
/// and backward-shift deletion.
///
/// `HashTable<K, V>` stores keys and values in two index-aligned slot arrays
/// whose length is a power of two. Like a raw table, it never hashes keys on
/// its own: every operation receives the key's 64-bit hash and an equality
/// predicate, and operations that may relocate entries (insertion that grows
/// the table, removal, resizing) also receive a `hasher` that recomputes the
/// hash of a stored key. The hasher must agree with the hashes passed in.
///
/// Removal never leaves tombstones. The entries following a removed one in
/// its probe run are shifted back into the gap whenever leaving them in
/// place would break their probe sequence, so lookup cost does not degrade
/// under churn.
///
/// ## Performance Characteristics
///
/// - **Memory**: one `Option<K>` and one `V` per slot; slots are
///   `capacity / load_factor` rounded up to a power of two.
/// - **Lookups**: expected O(1); a miss stops at the first empty slot.
///
/// ## Example
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use shift_hash::hash_table::Entry;
/// use shift_hash::hash_table::HashTable;
/// use shift_hash::hasher::BuildFibHasher;
///
/// let state = BuildFibHasher::default();
/// let hasher = |k: &u64| state.hash_one(k);
///
/// let mut table: HashTable<u64, &str> = HashTable::with_capacity(16);
/// match table.entry(hasher(&7), |k| *k == 7, hasher) {
///     Entry::Vacant(entry) => {
///         entry.insert(7, "seven");
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hasher(&7), |k| *k == 7), Some((&7, &"seven")));
/// assert_eq!(table.remove(hasher(&7), |k| *k == 7, hasher), Some((7, "seven")));
/// assert!(table.is_empty());
/// ```
pub struct HashTable<K, V> {
    keys: Box<[Option<K>]>,
    /// `values[i]` is initialized exactly when `keys[i]` is `Some`.
    values: Box<[MaybeUninit<V>]>,

    populated: usize,
    geometry: Geometry,
    load_factor: LoadFactor,
}

impl<K, V> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;
        use alloc::vec::Vec;

        f.debug_struct("HashTable")
            .field(
                "occupancy",
                &self
                    .keys
                    .chunks(16)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .map(|k| if k.is_some() { '#' } else { '.' })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("capacity", &self.keys.len())
            .field("threshold", &self.geometry.threshold)
            .finish()
    }
}

impl<K, V> Clone for HashTable<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut values = Box::new_uninit_slice(self.values.len());
        for (index, key) in self.keys.iter().enumerate() {
            if key.is_some() {
                // SAFETY: a present key marks its value slot as initialized.
                let value = unsafe { self.values[index].assume_init_ref() };
                values[index].write(value.clone());
            }
        }

        Self {
            keys: self.keys.clone(),
            values,
            populated: self.populated,
            geometry: self.geometry,
            load_factor: self.load_factor,
        }
    }
}

impl<K, V> Drop for HashTable<K, V> {
    fn drop(&mut self) {
        if mem::needs_drop::<V>() {
            for (key, value) in self.keys.iter().zip(self.values.iter_mut()) {
                if key.is_some() {
                    // SAFETY: a present key marks its value slot as initialized,
                    // and the table is never touched again.
                    unsafe { value.assume_init_drop() };
                }
            }
        }
    }
}

impl<K, V> HashTable<K, V> {
    /// Creates a new hash table that can hold `capacity` entries at the
    /// default load factor before growing.
    ///
    /// # Panics
    ///
    /// Panics if the table would need more than
    /// [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE) slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64, String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert!(table.threshold() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::with_capacity_and_load_factor(capacity, LoadFactor::default()) {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a new hash table with the given capacity and load factor.
    ///
    /// Fails with [`Error::CapacityTooLarge`] if the table would need more
    /// than [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE) slots.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: LoadFactor) -> Result<Self> {
        let table_size = load_factor.table_size(capacity)?;
        Ok(Self::allocate(table_size, load_factor))
    }

    fn allocate(table_size: usize, load_factor: LoadFactor) -> Self {
        Self {
            keys: vacant_keys(table_size),
            values: Box::new_uninit_slice(table_size),
            populated: 0,
            geometry: Geometry::new(table_size, load_factor),
            load_factor,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Returns the entry count at which the table doubles.
    pub fn threshold(&self) -> usize {
        self.geometry.threshold
    }

    /// Returns the table's load factor.
    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }

    #[inline]
    fn probe(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Probe {
        let mut index = self.geometry.place(hash);
        // Terminates: the load factor keeps at least one slot empty.
        loop {
            match &self.keys[index] {
                None => return Probe::Vacant(index),
                Some(key) if eq(key) => return Probe::Occupied(index),
                Some(_) => index = self.geometry.next(index),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn ideal_slot(&self, hash: u64) -> usize {
        self.geometry.place(hash)
    }

    #[cfg(test)]
    pub(crate) fn slot_index(&self, eq: impl Fn(&K) -> bool) -> Option<usize> {
        self.keys.iter().position(|k| k.as_ref().is_some_and(&eq))
    }

    #[inline]
    fn vacant_slot(&self, hash: u64) -> usize {
        let mut index = self.geometry.place(hash);
        while self.keys[index].is_some() {
            index = self.geometry.next(index);
        }
        index
    }

    #[inline]
    fn slot(&self, index: usize) -> Option<(&K, &V)> {
        let key = self.keys[index].as_ref()?;
        // SAFETY: a present key marks its value slot as initialized.
        Some((key, unsafe { self.values[index].assume_init_ref() }))
    }

    #[inline]
    fn slot_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        let key = self.keys[index].as_ref()?;
        // SAFETY: a present key marks its value slot as initialized.
        Some((key, unsafe { self.values[index].assume_init_mut() }))
    }

    /// Places an entry whose key is known to be absent. Never grows.
    fn insert_unique(&mut self, hash: u64, key: K, value: V) {
        let index = self.vacant_slot(hash);
        self.keys[index] = Some(key);
        self.values[index].write(value);
    }

    /// Finds the entry matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<char, i32> = HashTable::with_capacity(4);
    /// table.entry(1, |k| *k == 'a', |_| 1).or_insert('a', 10);
    ///
    /// assert_eq!(table.find(1, |k| *k == 'a'), Some((&'a', &10)));
    /// assert_eq!(table.find(1, |k| *k == 'b'), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &V)> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => self.slot(index),
            Probe::Vacant(_) => None,
        }
    }

    /// Finds the entry matching `hash` and `eq`, with mutable access to its
    /// value.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &mut V)> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => self.slot_mut(index),
            Probe::Vacant(_) => None,
        }
    }

    /// Gets the entry for `hash` and `eq` for in-place insertion or update.
    ///
    /// If the key is absent and inserting it would make the entry count
    /// reach the threshold, the table doubles before the vacant slot is
    /// chosen, so the returned [`VacantEntry`] always has room.
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u64,
    ) -> Entry<'_, K, V> {
        self.entry_counting(hash, eq, hasher, 0)
    }

    /// Like [`entry`](Self::entry), but the grow decision also counts
    /// `outside` entries the owner keeps beside the table.
    pub(crate) fn entry_counting(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u64,
        outside: usize,
    ) -> Entry<'_, K, V> {
        match self.probe(hash, &eq) {
            Probe::Occupied(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant(index) => {
                let index = if self.populated + outside + 1 >= self.geometry.threshold {
                    self.resize(self.keys.len() << 1, hasher);
                    self.vacant_slot(hash)
                } else {
                    index
                };
                Entry::Vacant(VacantEntry { table: self, index })
            }
        }
    }

    /// Removes and returns the entry matching `hash` and `eq`.
    ///
    /// Returns `None`, leaving the table untouched, when no entry matches.
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&K) -> bool,
        hasher: impl Fn(&K) -> u64,
    ) -> Option<(K, V)> {
        match self.probe(hash, eq) {
            // SAFETY: `probe` only reports occupied slots as `Occupied`.
            Probe::Occupied(index) => Some(unsafe { self.remove_at(index, hasher) }),
            Probe::Vacant(_) => None,
        }
    }

    /// Takes the entry at `index` out of the table and closes the gap.
    ///
    /// # Safety
    ///
    /// `index` must refer to an occupied slot.
    unsafe fn remove_at(&mut self, index: usize, hasher: impl Fn(&K) -> u64) -> (K, V) {
        // SAFETY: the caller guarantees the slot is occupied.
        let key = unsafe { self.keys[index].take().unwrap_unchecked() };
        // SAFETY: the key was present, so the value is initialized. The slot
        // is vacant now and will not be read again before being rewritten.
        let value = unsafe { self.values[index].assume_init_read() };
        self.populated -= 1;
        self.close_gap(index, hasher);
        (key, value)
    }

    /// Backward-shift deletion.
    ///
    /// Walks the run after `hole`. An entry whose ideal slot is cyclically
    /// farther from it than the hole is moved into the hole, which then moves
    /// to the entry's old slot. The first empty slot ends the run.
    fn close_gap(&mut self, mut hole: usize, hasher: impl Fn(&K) -> u64) {
        let geometry = self.geometry;
        let mut next = geometry.next(hole);
        loop {
            let Some(key) = &self.keys[next] else {
                break;
            };
            let ideal = geometry.place(hasher(key));
            if cyclic_distance(ideal, next, geometry.mask)
                > cyclic_distance(ideal, hole, geometry.mask)
            {
                self.keys[hole] = self.keys[next].take();
                // SAFETY: `next` held a key, so its value is initialized; its
                // key is gone now so the value is only reachable from `hole`.
                // `hole` was vacant, so nothing is overwritten.
                let value = unsafe { self.values[next].assume_init_read() };
                self.values[hole].write(value);
                hole = next;
            }
            next = geometry.next(next);
        }
    }

    fn resize(&mut self, table_size: usize, hasher: impl Fn(&K) -> u64) {
        log::debug!(
            "rehashing {} entries from {} to {} slots",
            self.populated,
            self.keys.len(),
            table_size
        );

        let old_keys = mem::replace(&mut self.keys, vacant_keys(table_size));
        let mut old_values = mem::replace(&mut self.values, Box::new_uninit_slice(table_size));
        self.geometry = Geometry::new(table_size, self.load_factor);

        if self.populated == 0 {
            return;
        }

        for (key, value) in old_keys.into_vec().into_iter().zip(old_values.iter_mut()) {
            let Some(key) = key else {
                continue;
            };
            let hash = hasher(&key);
            // SAFETY: the key was present, so the value is initialized. The
            // old slots are `MaybeUninit` and never drop their contents.
            let value = unsafe { value.assume_init_read() };
            self.insert_unique(hash, key, value);
        }
    }

    /// Grows the table so that at least `additional` more entries fit under
    /// the threshold. Does nothing if they already fit.
    ///
    /// Fails with [`Error::CapacityTooLarge`], without touching the table,
    /// if the required table exceeds
    /// [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE).
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&K) -> u64) -> Result<()> {
        let table_size = self
            .load_factor
            .table_size(self.populated.saturating_add(additional))?;
        if self.keys.len() < table_size {
            self.resize(table_size, hasher);
        }
        Ok(())
    }

    /// Shrinks the table to the size needed for `max_capacity` entries, or
    /// for the current entry count if that is larger. Does nothing if the
    /// table is already that small.
    pub fn shrink_to(&mut self, max_capacity: usize, hasher: impl Fn(&K) -> u64) -> Result<()> {
        let table_size = self
            .load_factor
            .table_size(max_capacity.max(self.populated))?;
        if self.keys.len() > table_size {
            self.resize(table_size, hasher);
        } else {
            log::trace!(
                "shrink to {} slots skipped, table has {}",
                table_size,
                self.keys.len()
            );
        }
        Ok(())
    }

    /// Shrinks the table as much as the current entry count allows.
    pub fn shrink_to_fit(&mut self, hasher: impl Fn(&K) -> u64) {
        if let Ok(table_size) = self.load_factor.table_size(self.populated) {
            if self.keys.len() > table_size {
                self.resize(table_size, hasher);
            }
        }
    }

    /// Removes all entries, keeping the allocated slots.
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }

        for (key, value) in self.keys.iter_mut().zip(self.values.iter_mut()) {
            if key.take().is_some() {
                // SAFETY: the key was present, so the value is initialized;
                // the slot is marked vacant before the value is dropped.
                unsafe { value.assume_init_drop() };
            }
        }
        self.populated = 0;
    }

    /// Removes all entries and, if the table is larger than needed for
    /// `max_capacity` entries, reallocates it at that size.
    pub fn clear_to(&mut self, max_capacity: usize) -> Result<()> {
        let table_size = self.load_factor.table_size(max_capacity)?;
        self.clear();
        if self.keys.len() > table_size {
            log::debug!(
                "reallocating cleared table from {} to {} slots",
                self.keys.len(),
                table_size
            );
            self.keys = vacant_keys(table_size);
            self.values = Box::new_uninit_slice(table_size);
            self.geometry = Geometry::new(table_size, self.load_factor);
        }
        Ok(())
    }

    /// Returns an iterator over all entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.keys.iter(),
            values: self.values.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over all entries with mutable access to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            keys: self.keys.iter(),
            values: self.values.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields every entry, leaving the
    /// table empty with its capacity intact.
    ///
    /// Dropping the iterator early removes the remaining entries. Leaking it
    /// leaves the table memory-safe but with unspecified contents.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Returns a cursor that can remove entries while traversing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use shift_hash::hash_table::HashTable;
    /// #
    /// let hasher = |k: &u32| u64::from(*k);
    /// let mut table: HashTable<u32, u32> = HashTable::with_capacity(8);
    /// for k in 1..=6u32 {
    ///     table.entry(hasher(&k), |x| *x == k, hasher).or_insert(k, k * 10);
    /// }
    ///
    /// let mut cursor = table.cursor_mut(hasher);
    /// while let Some((key, _)) = cursor.next() {
    ///     if key % 2 == 0 {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    /// assert_eq!(table.len(), 3);
    /// ```
    pub fn cursor_mut<H>(&mut self, hasher: H) -> CursorMut<'_, K, V, H>
    where
        H: Rehash<K>,
    {
        // Scan starting just after an empty slot: runs never straddle it, so
        // backward shifts only ever move entries toward the cursor.
        let origin = self.keys.iter().position(Option::is_none).unwrap_or(0);
        CursorMut {
            table: self,
            hasher,
            origin,
            offset: 0,
            current: None,
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain(&mut self, hasher: impl Fn(&K) -> u64, mut f: impl FnMut(&K, &mut V) -> bool) {
        let mut cursor = self.cursor_mut(hasher);
        while let Some((key, value)) = cursor.next() {
            let keep = f(key, value);
            if !keep {
                cursor.remove_current();
            }
        }
    }

    /// Returns how many entries sit at each distance from their ideal slot.
    ///
    /// `bins[d]` counts the entries found `d` probes after `place(hash)`.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&K) -> u64) -> ProbeHistogram {
        let mut bins = alloc::vec::Vec::new();
        for (index, key) in self.keys.iter().enumerate() {
            if let Some(key) = key {
                let ideal = self.geometry.place(hasher(key));
                let distance = cyclic_distance(ideal, index, self.geometry.mask);
                if bins.len() <= distance {
                    bins.resize(distance + 1, 0);
                }
                bins[distance] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns utilization and probe-length statistics for the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self, hasher: impl Fn(&K) -> u64) -> DebugStats {
        let histogram = self.probe_histogram(hasher);
        let total_slots = self.keys.len();
        let total_probes: usize = histogram
            .bins
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.populated,
            threshold: self.geometry.threshold,
            total_slots,
            load_factor: self.populated as f64 / total_slots as f64,
            max_probe_length: histogram.max_probe_length(),
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_probes as f64 / self.populated as f64
            },
            total_bytes: total_slots * (mem::size_of::<Option<K>>() + mem::size_of::<V>()),
        }
    }
}

/// Probe-length distribution of a table.
///
/// Compiled with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `bins[d]` is the number of entries stored `d` slots past their ideal
    /// slot.
    pub bins: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Longest displacement of any entry.
    pub fn max_probe_length(&self) -> usize {
        self.bins.len().saturating_sub(1)
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    _ => '▉',
                };
                bar.push(ch);
            }
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Compiled with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Entry count at which the table doubles
    pub threshold: usize,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Occupied fraction of the slots
    pub load_factor: f64,
    /// Longest distance of any entry from its ideal slot
    pub max_probe_length: usize,
    /// Average distance of an entry from its ideal slot
    pub mean_probe_length: f64,
    /// Bytes held by the slot arrays
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% of slots, grows at {})",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0,
            self.threshold
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry - the key is not present in the table
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry - the key is present in the table
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `key` and `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    ///
    /// An occupied entry keeps its key and value; `key` and `default` are
    /// dropped.
    pub fn or_insert(self, key: K, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(key, default),
        }
    }
}

/// A view into a vacant slot of the hash table.
///
/// [`HashTable::entry`] has already grown the table if needed, so inserting
/// never triggers a resize.
pub struct VacantEntry<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    index: usize,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Inserts the entry and returns a mutable reference to its value.
    ///
    /// `key` must be the key the entry was looked up with; the table does not
    /// rehash it.
    pub fn insert(self, key: K, value: V) -> &'a mut V {
        let VacantEntry { table, index } = self;
        table.keys[index] = Some(key);
        table.populated += 1;
        table.values[index].write(value)
    }
}

/// A view into an occupied slot of the hash table.
pub struct OccupiedEntry<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    index: usize,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the stored key.
    pub fn key(&self) -> &K {
        // SAFETY: the entry was created for an occupied slot and holds the
        // only borrow of the table.
        unsafe { self.table.keys[self.index].as_ref().unwrap_unchecked() }
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        // SAFETY: the slot is occupied, so its value is initialized.
        unsafe { self.table.values[self.index].assume_init_ref() }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: the slot is occupied, so its value is initialized.
        unsafe { self.table.values[self.index].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference to the value with the
    /// lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        // SAFETY: the slot is occupied, so its value is initialized.
        unsafe { table.values[index].assume_init_mut() }
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the table, shifting later entries of its probe
    /// run back as needed.
    pub fn remove(self, hasher: impl Fn(&K) -> u64) -> (K, V) {
        // SAFETY: the slot is occupied.
        unsafe { self.table.remove_at(self.index, hasher) }
    }
}

/// Recomputes the hash of a stored key.
///
/// Implemented for every `Fn(&K) -> u64`. Named types implement it where a
/// cursor has to be returned from a function without an opaque type.
pub trait Rehash<K> {
    /// Returns the hash `key` was inserted with.
    fn rehash(&self, key: &K) -> u64;
}

impl<K, F> Rehash<K> for F
where
    F: Fn(&K) -> u64,
{
    fn rehash(&self, key: &K) -> u64 {
        self(key)
    }
}

/// A cursor over a [`HashTable`] that can remove the entry it last yielded.
///
/// Created by [`HashTable::cursor_mut`]. The cursor is before the first
/// entry when created, positioned after each successful [`next`], and
/// exhausted once [`next`] returns `None`. [`remove`] takes out the entry
/// the cursor is positioned at; entries that backward-shift deletion moves
/// into the vacated slot are still produced later, and no entry is produced
/// twice.
///
/// [`next`]: CursorMut::next
/// [`remove`]: CursorMut::remove
pub struct CursorMut<'a, K, V, H> {
    table: &'a mut HashTable<K, V>,
    hasher: H,
    /// An empty slot; the scan covers the `capacity` slots after it.
    origin: usize,
    offset: usize,
    current: Option<usize>,
}

impl<K, V, H> CursorMut<'_, K, V, H>
where
    H: Rehash<K>,
{
    /// Advances to the next entry and returns it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let table_size = self.table.keys.len();
        while self.offset < table_size {
            let index = (self.origin + 1 + self.offset) & self.table.geometry.mask;
            self.offset += 1;
            if self.table.keys[index].is_some() {
                self.current = Some(index);
                return self.table.slot_mut(index);
            }
        }
        self.current = None;
        None
    }

    /// Removes the entry last returned by [`next`](Self::next).
    ///
    /// Fails with [`Error::NoCurrentEntry`] if `next` has not produced an
    /// entry since the cursor was created, reset, or last removed one.
    pub fn remove(&mut self) -> Result<(K, V)> {
        self.remove_current().ok_or(Error::NoCurrentEntry)
    }

    pub(crate) fn remove_current(&mut self) -> Option<(K, V)> {
        let index = self.current.take()?;
        // A later member of the run may shift into `index`; scan it again.
        self.offset -= 1;
        let hasher = &self.hasher;
        // SAFETY: `current` only names a slot `next` found occupied, and the
        // cursor's exclusive borrow keeps it that way until now.
        Some(unsafe { self.table.remove_at(index, |k| hasher.rehash(k)) })
    }

    /// Moves the cursor back before the first entry.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.current = None;
    }

    /// Returns the number of entries left in the table.
    pub fn table_len(&self) -> usize {
        self.table.populated
    }
}

/// An iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter`]. Yields `(&K, &V)` in slot order.
pub struct Iter<'a, K, V> {
    keys: core::slice::Iter<'a, Option<K>>,
    values: core::slice::Iter<'a, MaybeUninit<V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let key = self.keys.next()?;
            let value = self.values.next()?;
            if let Some(key) = key {
                self.remaining -= 1;
                // SAFETY: a present key marks its value slot as initialized.
                return Some((key, unsafe { value.assume_init_ref() }));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, K, V> {
    keys: core::slice::Iter<'a, Option<K>>,
    values: core::slice::IterMut<'a, MaybeUninit<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let key = self.keys.next()?;
            let value = self.values.next()?;
            if let Some(key) = key {
                self.remaining -= 1;
                // SAFETY: a present key marks its value slot as initialized.
                return Some((key, unsafe { value.assume_init_mut() }));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// A draining iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::drain`]. Yields owned `(K, V)` pairs and empties
/// the table as it iterates.
pub struct Drain<'a, K, V> {
    table: &'a mut HashTable<K, V>,
    index: usize,
}

impl<K, V> Drop for Drain<'_, K, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.table.populated > 0 && self.index < self.table.keys.len() {
            let index = self.index;
            self.index += 1;
            if let Some(key) = self.table.keys[index].take() {
                self.table.populated -= 1;
                // SAFETY: the key was present, so the value is initialized;
                // the slot is now vacant and will not be read again.
                let value = unsafe { self.table.values[index].assume_init_read() };
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}
