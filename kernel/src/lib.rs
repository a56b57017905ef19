//! Mandarin kernel core — таблица процессов и планировщик
//! Mandarin kernel core — process table and scheduler
//!
//! Два компонента / Two components:
//!   proc  — построение PCB: привилегии, LDT, регистры, стеки
//!           PCB construction: privilege, LDT, registers, stacks
//!   sched — выбор следующего процесса (RR / PRIO)
//!           picks the next process to run (RR / PRIO)
//!
//! Оболочка, файловый менеджер и таймер — внешние клиенты этого крейта.
//! The shell, file manager and timer are external clients of this crate.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

// Box, Vec, String
extern crate alloc;

pub mod arch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ipc;
pub mod mm;
pub mod proc;
pub mod sched;

pub use config::BootConfig;
pub use error::{AdminError, AdminResult, BootError, BootResult};
pub use proc::{ProcTable, ProcessClass, ProcessTemplate, SlotId};
pub use sched::{Discipline, Scheduler, SharedScheduler};

/// Построить таблицу из встроенного каталога и передать её планировщику.
/// Build the table from the built-in catalogue and hand it to the scheduler.
pub fn boot(config: &BootConfig) -> BootResult<Scheduler> {
    let table = proc::builder::build(config, catalog::TASKS, catalog::USER_PROCS)?;
    Ok(Scheduler::new(table, config))
}
