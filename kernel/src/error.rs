//! Ошибки ядра / Kernel errors
//!
//! BootError  — фатальные ошибки конфигурации при загрузке.
//!              Fatal boot-time configuration errors.
//! AdminError — отклонённые административные команды; таблица не меняется.
//!              Rejected administrative commands; the table is left untouched.

use core::fmt;

/// Fatal configuration defects detected while building the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// More templates than reserved slots in a region.
    TooManyTemplates {
        region:   &'static str,
        supplied: usize,
        reserved: usize,
    },
    /// The declared stacks do not fit into the stack arena.
    StackArenaExhausted {
        requested: u32,
        remaining: u32,
    },
    /// Two templates share a name, so lookup by name would be ambiguous.
    DuplicateName(&'static str),
    /// A `BootConfig` field is out of range.
    InvalidConfig(&'static str),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::TooManyTemplates { region, supplied, reserved } => write!(
                f,
                "{} templates supplied for {} {} slots",
                supplied, reserved, region
            ),
            BootError::StackArenaExhausted { requested, remaining } => write!(
                f,
                "stack arena exhausted: requested {:#x} bytes, {:#x} left",
                requested, remaining
            ),
            BootError::DuplicateName(name) => write!(f, "duplicate process name {:?}", name),
            BootError::InvalidConfig(what) => write!(f, "invalid boot config: {}", what),
        }
    }
}

/// Reasons an administrative command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminError {
    /// Slot index past the end of the table.
    NoSuchSlot(usize),
    /// Slot exists but holds no process.
    FreeSlot(usize),
    /// No populated slot carries this name.
    UnknownProcess,
    /// Discipline name not recognised.
    UnknownDiscipline,
    /// Priority is already at the administrative ceiling.
    PriorityAtCeiling { priority: u32, ceiling: u32 },
    /// Priority is already at the administrative floor.
    PriorityAtFloor { priority: u32, floor: u32 },
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::NoSuchSlot(slot) => write!(f, "slot {} does not exist", slot),
            AdminError::FreeSlot(slot) => write!(f, "slot {} is free", slot),
            AdminError::UnknownProcess => f.write_str("no such process"),
            AdminError::UnknownDiscipline => f.write_str("unknown schedule method"),
            AdminError::PriorityAtCeiling { priority, ceiling } => write!(
                f,
                "priority {} cannot be raised past {}",
                priority, ceiling
            ),
            AdminError::PriorityAtFloor { priority, floor } => write!(
                f,
                "priority {} cannot be lowered past {}",
                priority, floor
            ),
        }
    }
}

pub type BootResult<T> = core::result::Result<T, BootError>;
pub type AdminResult<T> = core::result::Result<T, AdminError>;
