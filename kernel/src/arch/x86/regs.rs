//! Начальный контекст процесса / Initial process context
//!
//! Порядок полей совпадает с тем, что кладёт на стек обработчик прерывания
//! перед `iretd`, поэтому `restart` может загрузить кадр как есть.
//! Field order matches what the interrupt entry pushes before `iretd`,
//! so `restart` can load the frame as is.

use bitflags::bitflags;

use super::gdt::Privilege;

bitflags! {
    /// EFLAGS
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EFlags: u32 {
        /// Бит 1 всегда равен 1 / Bit 1 always reads as 1
        const RESERVED_1 = 1 << 1;
        /// Interrupt enable
        const IF         = 1 << 9;
        const IOPL_1     = 1 << 12;
        const IOPL_MASK  = 0b11 << 12;
    }
}

impl EFlags {
    /// Системные задачи могут выполнять in/out (IOPL = 1).
    /// System tasks may execute in/out (IOPL = 1).
    pub const fn initial(privilege: Privilege) -> Self {
        match privilege {
            Privilege::User => Self::RESERVED_1.union(Self::IF),
            Privilege::Kernel | Privilege::Task => {
                Self::RESERVED_1.union(Self::IF).union(Self::IOPL_1)
            }
        }
    }

    pub const fn iopl(self) -> u8 {
        ((self.bits() & Self::IOPL_MASK.bits()) >> 12) as u8
    }
}

/// Сохранённые регистры процесса / Saved process registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct StackFrame {
    pub gs:         u32,
    pub fs:         u32,
    pub es:         u32,
    pub ds:         u32,
    pub edi:        u32,
    pub esi:        u32,
    pub ebp:        u32,
    pub kernel_esp: u32,
    pub ebx:        u32,
    pub edx:        u32,
    pub ecx:        u32,
    pub eax:        u32,
    pub retaddr:    u32,
    pub eip:        u32,
    pub cs:         u32,
    pub eflags:     u32,
    pub esp:        u32,
    pub ss:         u32,
}
