//! Two-tier bump arena
//!
//! A bump-allocated memory pool for JSON documents (spec §4.C): a small
//! buffer embedded directly in the arena object (`STATIC` bytes) backed by a
//! chain of heap-allocated dynamic blocks once the static area is exhausted.
//! There is no `free` — the whole arena is released at once via `clear()` or
//! `Drop`. Zero external dependencies (beyond `common`'s error type).
//!
//! Allocations are returned as opaque [`ArenaRef`] handles rather than raw
//! pointers/references: a raw-pointer bump allocator needs either
//! self-referential lifetimes or unsafe lifetime extension to let callers
//! hold many live allocations against a `&Arena`, and this codebase reaches
//! for neither. Indexing through `&self` keeps the whole crate safe.

#![forbid(unsafe_code)]

use common::OutOfMemory;

pub const DEFAULT_STATIC: usize = 32 * 1024;
pub const DEFAULT_DYNAMIC: usize = 32 * 1024;

/// A handle to a byte range allocated from an [`Arena`].
///
/// `block == None` means the static area; `block == Some(i)` means dynamic
/// block `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaRef {
    block: Option<u32>,
    offset: u32,
    len: u32,
}

impl ArenaRef {
    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

struct Block {
    data: Vec<u8>,
    used: usize,
}

impl Block {
    fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![0u8; cap],
            used: 0,
        }
    }

    /// Bump-allocate `len` bytes at the next position aligned to `align`.
    /// Returns the (alignment-rounded) offset, or `None` if it doesn't fit.
    fn bump(&mut self, len: usize, align: usize) -> Option<usize> {
        let aligned = round_up(self.used, align);
        let end = aligned.checked_add(len)?;
        if end > self.data.len() {
            return None;
        }
        self.used = end;
        Some(aligned)
    }
}

fn round_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// The two-tier bump arena itself.
pub struct Arena {
    align: usize,
    dynamic_default_cap: usize,
    static_block: Block,
    dynamic_blocks: Vec<Block>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Create an arena with the default `STATIC = 32 KiB`,
    /// `DYNAMIC = 32 KiB`, `ALIGN = size_of::<usize>()`.
    pub fn new() -> Self {
        Self::with_capacities(DEFAULT_STATIC, DEFAULT_DYNAMIC, std::mem::size_of::<usize>())
            .expect("default arena parameters are always valid")
    }

    /// Create an arena with custom static/dynamic capacities and alignment.
    /// `align` must be a power of two (may be 1). `static_cap`/`dynamic_cap`
    /// may be zero.
    pub fn with_capacities(static_cap: usize, dynamic_cap: usize, align: usize) -> Result<Self, OutOfMemory> {
        if align == 0 || !align.is_power_of_two() {
            return Err(OutOfMemory);
        }
        Ok(Self {
            align,
            dynamic_default_cap: dynamic_cap,
            static_block: Block::with_capacity(static_cap),
            dynamic_blocks: Vec::new(),
        })
    }

    /// Allocate `len` zeroed bytes, aligned to the arena's configured
    /// alignment. Only fails if `align` was invalid at construction time
    /// (impossible by construction) — the dynamic tier always grows a new
    /// block to fit a request larger than its default size.
    pub fn alloc(&mut self, len: usize) -> Result<ArenaRef, OutOfMemory> {
        if let Some(offset) = self.static_block.bump(len, self.align) {
            return Ok(ArenaRef {
                block: None,
                offset: offset as u32,
                len: len as u32,
            });
        }

        if let Some(last) = self.dynamic_blocks.last_mut() {
            if let Some(offset) = last.bump(len, self.align) {
                let block = (self.dynamic_blocks.len() - 1) as u32;
                return Ok(ArenaRef {
                    block: Some(block),
                    offset: offset as u32,
                    len: len as u32,
                });
            }
        }

        let cap = self.dynamic_default_cap.max(len);
        let mut block = Block::with_capacity(cap);
        let offset = block
            .bump(len, self.align)
            .expect("freshly allocated block sized to fit this request");
        self.dynamic_blocks.push(block);
        let block_id = (self.dynamic_blocks.len() - 1) as u32;
        Ok(ArenaRef {
            block: Some(block_id),
            offset: offset as u32,
            len: len as u32,
        })
    }

    pub fn get(&self, r: ArenaRef) -> &[u8] {
        let block = match r.block {
            None => &self.static_block,
            Some(i) => &self.dynamic_blocks[i as usize],
        };
        &block.data[r.offset as usize..r.offset as usize + r.len as usize]
    }

    pub fn get_mut(&mut self, r: ArenaRef) -> &mut [u8] {
        let block = match r.block {
            None => &mut self.static_block,
            Some(i) => &mut self.dynamic_blocks[i as usize],
        };
        &mut block.data[r.offset as usize..r.offset as usize + r.len as usize]
    }

    /// Release every dynamic block; the static area is reused from its start.
    pub fn clear(&mut self) {
        self.dynamic_blocks.clear();
        self.static_block.used = 0;
    }

    /// Number of heap-allocated dynamic blocks currently live.
    pub fn dynamic_block_count(&self) -> usize {
        self.dynamic_blocks.len()
    }
}
