//! i386 protected mode: сегменты, селекторы, начальный кадр регистров
//! i386 protected mode: segments, selectors, initial register frame

pub mod gdt;
pub mod regs;

pub use gdt::{DescAttr, Descriptor, Privilege, Selector, TableIndicator};
pub use regs::{EFlags, StackFrame};
