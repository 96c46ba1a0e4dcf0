use rustc_hash::FxHashSet;

/// Free-list allocator of fixed-size `f32` records in one contiguous array.
///
/// Backs the packed geometry containers: a record holds the interleaved
/// vertices of one primitive slot, and the whole array is uploaded as-is.
/// Freed records are zeroed and recycled last-in first-out, so a slot freed
/// just now is the next one handed out.
///
/// Freeing a slot that is already free is a caller error and is not
/// checked.
///
/// # Example
///
/// ```ignore
/// let mut slots = SlotAllocator::new(4);
/// let a = slots.allocate();  // 0
/// let b = slots.allocate();  // 1
/// slots.free(a);             // record 0 zeroed, 0 is now available
/// let c = slots.allocate();  // 0 (recycled)
/// ```
pub struct SlotAllocator {
    record_len: usize,
    data: Vec<f32>,
    free_list: Vec<u32>,
    len: u32,
}

impl SlotAllocator {
    /// Create an empty allocator of `record_len`-float records
    pub fn new(record_len: usize) -> Self {
        debug_assert!(record_len > 0, "records must hold at least one float");
        Self {
            record_len,
            data: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Allocate one record
    ///
    /// Pops the most recently freed slot, or grows the array by exactly one
    /// record when the free list is empty.
    pub fn allocate(&mut self) -> u32 {
        self.len += 1;
        match self.free_list.pop() {
            Some(index) => index,
            None => self.grow(1),
        }
    }

    /// Allocate two adjacent records `(i, i + 1)` and return `i`
    ///
    /// Best effort: the free list is searched for an adjacent pair before
    /// growing the array by two records. Any pair found is acceptable; it
    /// need not be the lowest or most recently freed one.
    pub fn allocate_pair(&mut self) -> u32 {
        self.len += 2;
        match self.find_free_pair() {
            Some(first) => {
                self.free_list.retain(|&index| index != first && index != first + 1);
                first
            }
            None => self.grow(2),
        }
    }

    /// Zero the record at `index` and make it available again
    pub fn free(&mut self, index: u32) {
        debug_assert!(index < self.record_count(), "freeing an unallocated slot: {}", index);
        self.record_mut(index).fill(0.0);
        self.len -= 1;
        self.free_list.push(index);
    }

    /// Drop every record and the free list
    pub fn clear(&mut self) {
        self.data.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// Floats of the record at `index`
    pub fn record(&self, index: u32) -> &[f32] {
        let start = index as usize * self.record_len;
        &self.data[start..start + self.record_len]
    }

    /// Mutable floats of the record at `index`
    pub fn record_mut(&mut self, index: u32) -> &mut [f32] {
        let start = index as usize * self.record_len;
        &mut self.data[start..start + self.record_len]
    }

    /// The whole backing array, free records included
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The backing array as bytes, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Floats per record
    pub fn record_len(&self) -> usize {
        self.record_len
    }

    /// Records in the backing array, live or free
    pub fn record_count(&self) -> u32 {
        (self.data.len() / self.record_len) as u32
    }

    /// Free slot indices, most recently freed last
    pub fn free_slots(&self) -> &[u32] {
        &self.free_list
    }

    /// Number of live records
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no records are live
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn grow(&mut self, records: u32) -> u32 {
        let first = self.record_count();
        self.data.resize(self.data.len() + records as usize * self.record_len, 0.0);
        first
    }

    fn find_free_pair(&self) -> Option<u32> {
        if self.free_list.len() < 2 {
            return None;
        }
        let free: FxHashSet<u32> = self.free_list.iter().copied().collect();
        self.free_list
            .iter()
            .rev()
            .copied()
            .find(|&index| index.checked_add(1).is_some_and(|next| free.contains(&next)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
