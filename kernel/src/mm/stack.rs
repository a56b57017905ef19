//! Арена стеков процессов / Process stack arena
//!
//! Один непрерывный блок памяти, из которого стеки раздаются сверху вниз.
//! Курсор только уменьшается, поэтому выданные области никогда не пересекаются.
//! One contiguous block handed out top-down. The cursor only moves down,
//! so regions handed out never overlap.

use crate::error::{BootError, BootResult};

/// Стек одного слота: [base, top). `esp` стартует с `top`.
/// One slot's stack: [base, top). `esp` starts at `top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRegion {
    pub base: u32,
    pub top:  u32,
}

impl StackRegion {
    pub const fn size(&self) -> u32 {
        self.top - self.base
    }

    pub const fn overlaps(&self, other: &StackRegion) -> bool {
        self.base < other.top && other.base < self.top
    }
}

#[derive(Debug)]
pub struct StackArena {
    bottom: u32,
    cursor: u32,
}

impl StackArena {
    pub fn new(bottom: u32, size: u32) -> BootResult<Self> {
        let top = bottom
            .checked_add(size)
            .ok_or(BootError::InvalidConfig("stack arena wraps the address space"))?;
        Ok(Self { bottom, cursor: top })
    }

    /// Отрезать `size` байт под курсором / Carve `size` bytes below the cursor.
    pub fn alloc(&mut self, size: u32) -> BootResult<StackRegion> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(BootError::StackArenaExhausted { requested: size, remaining });
        }
        let top = self.cursor;
        self.cursor -= size;
        Ok(StackRegion { base: self.cursor, top })
    }

    pub const fn remaining(&self) -> u32 {
        self.cursor - self.bottom
    }

    pub const fn cursor(&self) -> u32 {
        self.cursor
    }
}
