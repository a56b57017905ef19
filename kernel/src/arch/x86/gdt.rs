//! Global Descriptor Table (GDT) — i386
//!
//! Структура GDT ядра / Kernel GDT layout:
//!
//!  Индекс / Index  Сегмент / Segment
//!  ─────────────────────────────────
//!  0               Null descriptor (обязателен / required)
//!  1               Flat Code   (ring 0, 0..4GB, execute/read)
//!  2               Flat Data   (ring 0, 0..4GB, read/write)
//!  3               Video       (ring 3, 0xB8000)
//!
//! Каждый процесс получает свою LDT из двух дескрипторов (код и данные),
//! селекторы процесса всегда указывают в LDT (TI = 1).
//! Every process owns a two-entry LDT (code and data); process selectors
//! always resolve through the LDT (TI = 1).

use bitflags::bitflags;
use core::mem::size_of;

// ── Индексы / Indices ─────────────────────────────────────────────────────────
pub const INDEX_FLAT_C:  u16 = 1;
pub const INDEX_FLAT_RW: u16 = 2;
pub const INDEX_VIDEO:   u16 = 3;

pub const INDEX_LDT_C:  u16 = 0;
pub const INDEX_LDT_RW: u16 = 1;
pub const LDT_SIZE:     usize = 2;

// ── Селекторы сегментов / Segment selectors ───────────────────────────────────
pub const KERNEL_CS: Selector = Selector::new(INDEX_FLAT_C, TableIndicator::Gdt, Privilege::Kernel);
pub const KERNEL_DS: Selector = Selector::new(INDEX_FLAT_RW, TableIndicator::Gdt, Privilege::Kernel);
pub const VIDEO:     Selector = Selector::new(INDEX_VIDEO, TableIndicator::Gdt, Privilege::User);
pub const KERNEL_GS: Selector = VIDEO;

/// Кольцо защиты / Protection ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Privilege {
    /// Ring 0 — само ядро / the kernel proper
    Kernel = 0,
    /// Ring 1 — системные задачи (TTY, FS, ...) / system tasks
    Task = 1,
    /// Ring 3 — пользовательские процессы / user processes
    User = 3,
}

impl Privilege {
    pub const fn ring(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// Атрибуты дескриптора (access byte + старшие флаги)
    /// Descriptor attributes (access byte + high flags)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescAttr: u16 {
        /// Present, read/write data
        const DRW      = 0x92;
        /// Present, execute-only code
        const C        = 0x98;
        /// Present, execute/read code
        const CR       = 0x9A;
        /// Descriptor privilege level field
        const DPL_MASK = 0x60;
        /// 32-bit default operand size
        const DB_32    = 0x4000;
        /// Limit counted in 4KB pages
        const LIMIT_4K = 0x8000;
    }
}

impl DescAttr {
    /// DPL, сдвинутый в биты 5–6 / DPL shifted into bits 5–6.
    pub const fn dpl(privilege: Privilege) -> Self {
        Self::from_bits_retain((privilege.ring() as u16) << 5)
    }
}

/// Сегментный дескриптор (8 байт) / Segment descriptor (8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Descriptor {
    limit_low:        u16,
    base_low:         u16,
    base_mid:         u8,
    attr1:            u8,
    limit_high_attr2: u8,
    base_high:        u8,
}

const _: () = assert!(size_of::<Descriptor>() == 8);

impl Descriptor {
    pub const fn null() -> Self {
        Self { limit_low: 0, base_low: 0, base_mid: 0,
               attr1: 0, limit_high_attr2: 0, base_high: 0 }
    }

    /// `limit` — 20 бит, в байтах или в 4KB страницах (LIMIT_4K).
    /// `limit` is 20 bits, in bytes or 4KB pages (LIMIT_4K).
    pub const fn new(base: u32, limit: u32, attr: DescAttr) -> Self {
        let attr = attr.bits();
        Self {
            limit_low:        (limit & 0xFFFF) as u16,
            base_low:         (base & 0xFFFF) as u16,
            base_mid:         ((base >> 16) & 0xFF) as u8,
            attr1:            (attr & 0xFF) as u8,
            limit_high_attr2: (((limit >> 16) & 0x0F) as u8) | (((attr >> 8) & 0xF0) as u8),
            base_high:        ((base >> 24) & 0xFF) as u8,
        }
    }

    pub const fn base(&self) -> u32 {
        (self.base_low as u32)
            | ((self.base_mid as u32) << 16)
            | ((self.base_high as u32) << 24)
    }

    /// Сырой 20-битный лимит / Raw 20-bit limit.
    pub const fn limit(&self) -> u32 {
        (self.limit_low as u32) | (((self.limit_high_attr2 & 0x0F) as u32) << 16)
    }

    pub const fn attr(&self) -> DescAttr {
        DescAttr::from_bits_retain(
            (self.attr1 as u16) | (((self.limit_high_attr2 & 0xF0) as u16) << 8),
        )
    }

    /// Access byte without the DPL bits.
    pub const fn kind(&self) -> u8 {
        self.attr1 & !(DescAttr::DPL_MASK.bits() as u8)
    }

    pub const fn dpl(&self) -> u8 {
        (self.attr1 >> 5) & 0b11
    }

    /// Заменить access byte, сохранив базу, лимит и флаги.
    /// Replace the access byte, keeping base, limit and high flags.
    pub fn set_access(&mut self, access: DescAttr) {
        self.attr1 = (access.bits() & 0xFF) as u8;
    }

    /// Last byte addressable through this descriptor.
    pub const fn last_byte(&self) -> u64 {
        let base = self.base() as u64;
        if self.attr().contains(DescAttr::LIMIT_4K) {
            base + ((self.limit() as u64) << 12) + 0xFFF
        } else {
            base + self.limit() as u64
        }
    }
}

/// Таблица, через которую разрешается селектор / Table a selector resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableIndicator {
    Gdt,
    Ldt,
}

/// Селектор сегмента: index << 3 | TI | RPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Selector(pub u16);

impl Selector {
    pub const RPL_MASK: u16 = 0b011;
    pub const TI_LDT:   u16 = 0b100;

    pub const fn new(index: u16, table: TableIndicator, rpl: Privilege) -> Self {
        let ti = match table {
            TableIndicator::Gdt => 0,
            TableIndicator::Ldt => Self::TI_LDT,
        };
        Self((index << 3) | ti | rpl.ring() as u16)
    }

    pub const fn index(self) -> u16 {
        self.0 >> 3
    }

    pub const fn table(self) -> TableIndicator {
        if self.0 & Self::TI_LDT != 0 {
            TableIndicator::Ldt
        } else {
            TableIndicator::Gdt
        }
    }

    pub const fn rpl(self) -> u8 {
        (self.0 & Self::RPL_MASK) as u8
    }

    /// Тот же сегмент с другим RPL / Same segment with a different RPL.
    pub const fn with_rpl(self, rpl: Privilege) -> Self {
        Self((self.0 & !Self::RPL_MASK) | rpl.ring() as u16)
    }
}

/// Плоские сегменты ядра, которые копируются в LDT обычных процессов.
/// Flat kernel segments copied into the LDT of ordinary processes.
pub static GDT: [Descriptor; 4] = [
    Descriptor::null(),
    Descriptor::new(0, 0xF_FFFF,
                    DescAttr::CR.union(DescAttr::DB_32).union(DescAttr::LIMIT_4K)),
    Descriptor::new(0, 0xF_FFFF,
                    DescAttr::DRW.union(DescAttr::DB_32).union(DescAttr::LIMIT_4K)),
    Descriptor::new(0xB_8000, 0xFFFF, DescAttr::DRW.union(DescAttr::dpl(Privilege::User))),
];

/// Дескриптор GDT по селектору / GDT entry named by a selector.
pub fn gdt_entry(selector: Selector) -> Descriptor {
    GDT[selector.index() as usize]
}
