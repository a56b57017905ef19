//! Встроенный каталог загрузки / Built-in boot catalogue
//!
//! Точки входа — адреса в образе ядра; их подставляет линкер загрузочного
//! образа, здесь они фиксированы для сборки на хосте.
//! Entry points are addresses inside the kernel image; the boot image's
//! linker provides them, here they are fixed so the host build has values.

use crate::config::{BOOTSTRAP_NAME as INIT, STACK_SIZE_DEFAULT};
use crate::proc::{ProcessClass, ProcessTemplate};

const fn task(name: &'static str, entry: u32) -> ProcessTemplate {
    ProcessTemplate { name, entry, stack_size: STACK_SIZE_DEFAULT, class: ProcessClass::Task }
}

const fn user(name: &'static str, entry: u32) -> ProcessTemplate {
    ProcessTemplate { name, entry, stack_size: STACK_SIZE_DEFAULT, class: ProcessClass::User }
}

pub static TASKS: &[ProcessTemplate] = &[
    task("TTY", 0x0003_1000),
    task("SYS", 0x0003_2000),
    task("HD",  0x0003_3000),
    task("FS",  0x0003_4000),
    task("MM",  0x0003_5000),
];

pub static USER_PROCS: &[ProcessTemplate] = &[
    user(INIT,    0x0003_6000),
    user("TestA", 0x0003_7000),
    user("TestB", 0x0003_8000),
    user("TestC", 0x0003_9000),
];
