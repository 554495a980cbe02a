//! Fixed-capacity memory pool accounting.
//!
//! The target boards run the GUI out of a fixed heap region. Every object
//! instance, style payload and dynamic array the core owns is charged against a
//! [`MemPool`] so exhaustion surfaces as [`GuiError::OutOfMemory`] instead of an
//! allocator abort, and so tests can verify that teardown releases every block
//! exactly once.

use alloc::vec::Vec;
use core::mem::size_of;

use crate::ui::error::{GuiError, GuiResult};

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemStats {
    /// Total bytes the pool may hand out.
    pub capacity: usize,
    /// Bytes currently allocated.
    pub used: usize,
    /// High-water mark of `used`.
    pub peak: usize,
    /// Blocks currently alive.
    pub live_blocks: usize,
    /// Lifetime number of allocations.
    pub allocs: u32,
    /// Lifetime number of frees.
    pub frees: u32,
}

/// A live allocation. Freeing consumes the token, so a block cannot be
/// returned to the pool twice.
#[derive(Debug)]
#[must_use = "a block must be returned with MemPool::free"]
pub struct Block {
    size: usize,
}

impl Block {
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Byte-budget allocator bookkeeping.
#[derive(Debug)]
pub struct MemPool {
    capacity: usize,
    used: usize,
    peak: usize,
    live_blocks: usize,
    allocs: u32,
    frees: u32,
}

impl MemPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: 0,
            peak: 0,
            live_blocks: 0,
            allocs: 0,
            frees: 0,
        }
    }

    /// Bytes still available.
    pub fn available(&self) -> usize {
        self.capacity - self.used
    }

    pub fn alloc(&mut self, size: usize) -> GuiResult<Block> {
        if size > self.available() {
            return Err(GuiError::OutOfMemory);
        }
        self.used += size;
        self.peak = self.peak.max(self.used);
        self.live_blocks += 1;
        self.allocs = self.allocs.wrapping_add(1);
        Ok(Block { size })
    }

    /// Resize a block in place. Shrinking never fails.
    pub fn realloc(&mut self, block: &mut Block, size: usize) -> GuiResult<()> {
        if size > block.size {
            let grow = size - block.size;
            if grow > self.available() {
                return Err(GuiError::OutOfMemory);
            }
            self.used += grow;
            self.peak = self.peak.max(self.used);
        } else {
            self.used -= block.size - size;
        }
        block.size = size;
        Ok(())
    }

    pub fn free(&mut self, block: Block) {
        self.used -= block.size;
        self.live_blocks -= 1;
        self.frees = self.frees.wrapping_add(1);
    }

    pub fn stats(&self) -> MemStats {
        MemStats {
            capacity: self.capacity,
            used: self.used,
            peak: self.peak,
            live_blocks: self.live_blocks,
            allocs: self.allocs,
            frees: self.frees,
        }
    }
}

/// Pool-accounted dynamic array.
///
/// Grows by exactly one element per push and shrinks immediately on removal,
/// so the charged size always equals `len * size_of::<T>()`. An empty array
/// holds no block at all.
#[derive(Debug)]
pub struct PoolVec<T> {
    items: Vec<T>,
    block: Option<Block>,
}

impl<T> Default for PoolVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PoolVec<T> {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            block: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn push(&mut self, pool: &mut MemPool, item: T) -> GuiResult<()> {
        let new_size = (self.items.len() + 1) * size_of::<T>();
        match self.block.as_mut() {
            Some(block) => pool.realloc(block, new_size)?,
            None => self.block = Some(pool.alloc(new_size)?),
        }
        if self.items.try_reserve_exact(1).is_err() {
            self.sync_block(pool);
            return Err(GuiError::OutOfMemory);
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove the element at `idx`, compacting the tail down and shrinking
    /// the allocation to the new length.
    pub fn remove(&mut self, pool: &mut MemPool, idx: usize) -> T {
        let item = self.items.remove(idx);
        self.items.shrink_to_fit();
        self.sync_block(pool);
        item
    }

    /// Drop the whole array and return its contents.
    pub fn release(&mut self, pool: &mut MemPool) -> Vec<T> {
        let items = core::mem::take(&mut self.items);
        if let Some(block) = self.block.take() {
            pool.free(block);
        }
        items
    }

    fn sync_block(&mut self, pool: &mut MemPool) {
        if self.items.is_empty() {
            if let Some(block) = self.block.take() {
                pool.free(block);
            }
        } else if let Some(block) = self.block.as_mut() {
            pool.realloc(block, self.items.len() * size_of::<T>()).ok();
        }
    }
}

impl<T: PartialEq> PoolVec<T> {
    pub fn position(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|x| x == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_respects_capacity() {
        let mut pool = MemPool::new(64);
        let a = pool.alloc(40).unwrap();
        assert_eq!(pool.alloc(32).unwrap_err(), GuiError::OutOfMemory);
        let b = pool.alloc(24).unwrap();
        assert_eq!(pool.available(), 0);
        pool.free(a);
        pool.free(b);

        let stats = pool.stats();
        assert_eq!(stats.used, 0);
        assert_eq!(stats.peak, 64);
        assert_eq!(stats.live_blocks, 0);
        assert_eq!(stats.allocs, stats.frees);
    }

    #[test]
    fn test_pool_vec_grows_by_one_and_shrinks_on_remove() {
        let mut pool = MemPool::new(1024);
        let mut v: PoolVec<u32> = PoolVec::new();
        for i in 0..4 {
            v.push(&mut pool, i).unwrap();
            assert_eq!(pool.stats().used, (i as usize + 1) * 4);
        }
        assert_eq!(pool.stats().live_blocks, 1);

        assert_eq!(v.remove(&mut pool, 1), 1);
        assert_eq!(v.as_slice(), &[0, 2, 3]);
        assert_eq!(pool.stats().used, 12);

        let rest = v.release(&mut pool);
        assert_eq!(rest, [0, 2, 3]);
        assert!(v.is_empty());
        assert_eq!(pool.stats().used, 0);
        assert_eq!(pool.stats().live_blocks, 0);
    }

    #[test]
    fn test_pool_vec_push_failure_leaves_array_untouched() {
        let mut pool = MemPool::new(8);
        let mut v: PoolVec<u32> = PoolVec::new();
        v.push(&mut pool, 7).unwrap();
        v.push(&mut pool, 8).unwrap();
        assert_eq!(v.push(&mut pool, 9).unwrap_err(), GuiError::OutOfMemory);
        assert_eq!(v.as_slice(), &[7, 8]);
        assert_eq!(pool.stats().used, 8);
    }

    #[test]
    fn test_removing_last_element_frees_block() {
        let mut pool = MemPool::new(64);
        let mut v: PoolVec<u16> = PoolVec::new();
        v.push(&mut pool, 1).unwrap();
        v.remove(&mut pool, 0);
        assert_eq!(pool.stats().live_blocks, 0);
        assert_eq!(pool.stats().frees, 1);
    }
}
