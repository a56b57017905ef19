//! Таблица процессов / Process table
//!
//! Слоты создаются один раз при загрузке и живут всё время работы системы.
//! Слот без процесса — свободный, он никогда не выбирается планировщиком.
//! Slots are created once at boot and live for the lifetime of the system.
//! A slot without a process is free and is never picked by the scheduler.

pub mod builder;

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::arch::x86::gdt::{INDEX_LDT_C, INDEX_LDT_RW, LDT_SIZE};
use crate::arch::x86::{Descriptor, Privilege, StackFrame};
use crate::error::{AdminError, AdminResult};
use crate::ipc::MessageState;
use crate::mm::StackRegion;

/// Размер таблицы открытых файлов процесса / Per-process open-file table size.
pub const NR_FILES: usize = 64;

/// Стабильный номер слота / Stable slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

impl SlotId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessClass {
    /// Системная задача (TTY, FS, ...) / System task
    Task,
    /// Пользовательский процесс / User process
    User,
}

impl ProcessClass {
    pub const fn privilege(self) -> Privilege {
        match self {
            ProcessClass::Task => Privilege::Task,
            ProcessClass::User => Privilege::User,
        }
    }
}

/// Шаблон процесса из каталога загрузки / Boot catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTemplate {
    pub name:       &'static str,
    pub entry:      u32,
    pub stack_size: u32,
    pub class:      ProcessClass,
}

/// Дескриптор открытого файла; принадлежит слою ФС.
/// Open file reference, owned by the filesystem layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(pub u32);

/// Process control block.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub name:      String,
    pub parent:    Option<SlotId>,
    pub class:     ProcessClass,
    pub privilege: Privilege,
    /// Локальная таблица дескрипторов: [код, данные] / [code, data]
    pub ldt:       [Descriptor; LDT_SIZE],
    pub regs:      StackFrame,
    pub stack:     StackRegion,
    /// Оставшийся квант / Remaining quantum
    pub ticks:     u32,
    /// Значение, к которому сбрасывается `ticks` / Value `ticks` resets to
    pub priority:  u32,
    pub runnable:  bool,
    pub ipc:       MessageState,
    pub files:     [Option<FileHandle>; NR_FILES],
}

impl Pcb {
    pub fn code_descriptor(&self) -> &Descriptor {
        &self.ldt[INDEX_LDT_C as usize]
    }

    pub fn data_descriptor(&self) -> &Descriptor {
        &self.ldt[INDEX_LDT_RW as usize]
    }

    /// Restore the quantum to the full priority.
    pub fn refill(&mut self) {
        self.ticks = self.priority;
    }
}

/// Таблица процессов: регион задач, затем регион пользовательских процессов.
/// Process table: the task region followed by the user process region.
#[derive(Debug, Clone)]
pub struct ProcTable {
    slots:    Vec<Option<Pcb>>,
    nr_tasks: usize,
}

impl ProcTable {
    /// Таблица из одних свободных слотов / A table of free slots only.
    pub(crate) fn new(nr_tasks: usize, nr_slots: usize) -> Self {
        let mut slots = Vec::with_capacity(nr_slots);
        slots.resize_with(nr_slots, || None);
        Self { slots, nr_tasks }
    }

    pub(crate) fn install(&mut self, slot: SlotId, pcb: Pcb) {
        self.slots[slot.index()] = Some(pcb);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn task_slots(&self) -> Range<usize> {
        0..self.nr_tasks
    }

    pub fn user_slots(&self) -> Range<usize> {
        self.nr_tasks..self.slots.len()
    }

    pub fn get(&self, slot: SlotId) -> Option<&Pcb> {
        self.slots.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Pcb> {
        self.slots.get_mut(slot.index()).and_then(Option::as_mut)
    }

    /// Как `get`, но объясняет отказ / Like `get`, but says why it failed.
    pub fn pcb(&self, slot: SlotId) -> AdminResult<&Pcb> {
        match self.slots.get(slot.index()) {
            None => Err(AdminError::NoSuchSlot(slot.index())),
            Some(None) => Err(AdminError::FreeSlot(slot.index())),
            Some(Some(pcb)) => Ok(pcb),
        }
    }

    pub fn pcb_mut(&mut self, slot: SlotId) -> AdminResult<&mut Pcb> {
        match self.slots.get_mut(slot.index()) {
            None => Err(AdminError::NoSuchSlot(slot.index())),
            Some(None) => Err(AdminError::FreeSlot(slot.index())),
            Some(Some(pcb)) => Ok(pcb),
        }
    }

    pub fn is_free(&self, slot: SlotId) -> bool {
        self.get(slot).is_none()
    }

    pub fn populated(&self) -> impl Iterator<Item = (SlotId, &Pcb)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, pcb)| pcb.as_ref().map(|pcb| (SlotId(i), pcb)))
    }

    pub fn populated_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut Pcb)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, pcb)| pcb.as_mut().map(|pcb| (SlotId(i), pcb)))
    }

    /// Найти слот по имени процесса / Resolve a process name to its slot.
    pub fn lookup(&self, name: &str) -> AdminResult<SlotId> {
        self.populated()
            .find(|(_, pcb)| pcb.name == name)
            .map(|(slot, _)| slot)
            .ok_or(AdminError::UnknownProcess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::BootConfig;

    fn table() -> ProcTable {
        builder::build(&BootConfig::default(), catalog::TASKS, catalog::USER_PROCS).unwrap()
    }

    #[test]
    fn lookup_resolves_names_to_slots() {
        let table = table();
        assert_eq!(table.lookup("TTY"), Ok(SlotId(0)));
        assert_eq!(table.lookup("INIT"), Ok(SlotId(5)));
        assert_eq!(table.lookup("TestC"), Ok(SlotId(8)));
        assert_eq!(table.lookup("snake"), Err(AdminError::UnknownProcess));
    }

    #[test]
    fn pcb_distinguishes_free_and_missing_slots() {
        let table = table();
        assert!(table.pcb(SlotId(6)).is_ok());
        assert_eq!(table.pcb(SlotId(9)).err(), Some(AdminError::FreeSlot(9)));
        assert_eq!(table.pcb(SlotId(37)).err(), Some(AdminError::NoSuchSlot(37)));
    }

    #[test]
    fn regions_partition_the_table() {
        let table = table();
        assert_eq!(table.task_slots(), 0..5);
        assert_eq!(table.user_slots(), 5..37);
        assert_eq!(table.populated().count(), 9);
    }
}
