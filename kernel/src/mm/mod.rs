//! Memory Management subsystem
//!
//! Ядру здесь нужно немного / The core needs very little here:
//!   stack — арена стеков процессов / process stack arena
//!   KernelImage — где лежит загруженный образ ядра / where the loaded kernel image sits

pub mod stack;

pub use stack::{StackArena, StackRegion};

/// Сдвиг для лимита с гранулярностью 4KB / Shift for 4KB-granular limits.
pub const PAGE_SHIFT: u32 = 12;

/// Физический адрес / Physical address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PhysAddr(pub u32);

impl PhysAddr {
    pub const fn new(addr: u32) -> Self { Self(addr) }
    pub const fn as_u32(self) -> u32   { self.0 }
}

/// Карта загруженного образа ядра: база и лимит (последний байт — base + limit).
/// Map of the loaded kernel image: base and limit (last byte is base + limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelImage {
    pub base:  PhysAddr,
    pub limit: u32,
}

impl KernelImage {
    pub const fn new(base: u32, limit: u32) -> Self {
        Self { base: PhysAddr::new(base), limit }
    }

    /// Последний байт образа / Last byte of the image.
    pub const fn last_byte(&self) -> u32 {
        self.base.as_u32() + self.limit
    }

    /// Лимит в 4KB страницах для дескриптора, покрывающего 0..=last_byte.
    /// Limit in 4KB pages for a descriptor covering 0..=last_byte.
    pub const fn page_limit(&self) -> u32 {
        self.last_byte() >> PAGE_SHIFT
    }
}
