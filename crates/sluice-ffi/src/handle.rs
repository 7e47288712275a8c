//! Generation-checked handle table for scratch buffers owned across the C
//! boundary.
//!
//! A handle packs a generation (upper 32 bits) and an entry index (lower 32
//! bits). Generations start at 1, so the all-zero handle a C caller gets
//! from zero-initialised memory never resolves. Destroying a handle bumps
//! the entry's generation, which makes every copy of the old handle stale.

const INDEX_BITS: u32 = 32;

fn pack(index: u32, generation: u32) -> u64 {
    ((generation as u64) << INDEX_BITS) | index as u64
}

fn unpack(handle: u64) -> (u32, u32) {
    (handle as u32, (handle >> INDEX_BITS) as u32)
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Maps opaque `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value`, reusing a vacant entry when one exists.
    pub fn insert(&mut self, value: T) -> u64 {
        match self.vacant.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.value = Some(value);
                pack(index, entry.generation)
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: 1,
                    value: Some(value),
                });
                pack(index, 1)
            }
        }
    }

    /// The value behind `handle`, or `None` for stale and unknown handles.
    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = unpack(handle);
        let entry = self.entries.get(index as usize)?;
        if entry.generation != generation {
            return None;
        }
        entry.value.as_ref()
    }

    /// Take the value out and invalidate `handle`.
    ///
    /// An entry whose generation would wrap to 0 is retired instead of
    /// reused, so a stale handle can never match a later value.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle);
        let entry = self.entries.get_mut(index as usize)?;
        if entry.generation != generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(index);
        }
        Some(value)
    }

    /// Number of live values.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}
