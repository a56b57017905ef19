//! Построение таблицы процессов при загрузке
//! Boot-time process table construction
//!
//! Для каждого шаблона / For every template:
//!   1. привилегия и квант по классу / privilege and quantum by class
//!   2. LDT: копия плоских сегментов ядра с DPL процесса,
//!      либо для INIT — сегменты 0..конец образа ядра
//!      LDT: the flat kernel segments re-tagged with the process DPL,
//!      or for INIT segments 0..end of the kernel image
//!   3. селекторы LDT + RPL / LDT selectors + RPL
//!   4. стек из общей арены / stack from the shared arena
//!   5. IPC и файлы обнулены, runnable = false

use alloc::string::String;

use crate::arch::x86::gdt::{self, INDEX_LDT_C, INDEX_LDT_RW, KERNEL_CS, KERNEL_DS, KERNEL_GS};
use crate::arch::x86::{DescAttr, Descriptor, EFlags, Privilege, Selector, StackFrame, TableIndicator};
use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::ipc::MessageState;
use crate::mm::{KernelImage, StackArena, StackRegion};

use super::{Pcb, ProcTable, ProcessClass, ProcessTemplate, SlotId, NR_FILES};

/// Построить таблицу. Любая ошибка фатальна: таблица не создаётся.
/// Build the table. Any error is fatal: no table is produced.
pub fn build(
    config: &BootConfig,
    tasks: &[ProcessTemplate],
    procs: &[ProcessTemplate],
) -> BootResult<ProcTable> {
    config.validate()?;
    check_region("task", tasks, config.nr_tasks, ProcessClass::Task)?;
    check_region("user process", procs, config.nr_procs, ProcessClass::User)?;
    check_unique_names(tasks, procs)?;

    let mut arena = StackArena::new(config.stack_arena_base, config.stack_arena_size)?;
    let mut table = ProcTable::new(config.nr_tasks, config.nr_slots());

    let slots = tasks
        .iter()
        .enumerate()
        .chain(procs.iter().enumerate().map(|(i, t)| (config.nr_tasks + i, t)));

    for (index, template) in slots {
        if template.stack_size == 0 {
            return Err(BootError::InvalidConfig("template declares an empty stack"));
        }
        let stack = arena.alloc(template.stack_size)?;
        let pcb = build_pcb(config, template, stack);
        log::debug!(
            "[proc] slot {:2} {:<6} ring {} eip={:#x} esp={:#x}",
            index, pcb.name, pcb.privilege.ring(), pcb.regs.eip, pcb.regs.esp
        );
        table.install(SlotId(index), pcb);
    }

    log::info!(
        "[proc] table ready: {} of {} slots populated, {:#x} bytes of stack arena left",
        tasks.len() + procs.len(),
        table.len(),
        arena.remaining()
    );
    Ok(table)
}

fn check_region(
    region: &'static str,
    templates: &[ProcessTemplate],
    reserved: usize,
    class: ProcessClass,
) -> BootResult<()> {
    if templates.len() > reserved {
        return Err(BootError::TooManyTemplates { region, supplied: templates.len(), reserved });
    }
    if templates.iter().any(|t| t.class != class) {
        return Err(BootError::InvalidConfig("template class does not match its region"));
    }
    Ok(())
}

fn check_unique_names(tasks: &[ProcessTemplate], procs: &[ProcessTemplate]) -> BootResult<()> {
    let all = || tasks.iter().chain(procs.iter());
    for (i, template) in all().enumerate() {
        if all().skip(i + 1).any(|other| other.name == template.name) {
            return Err(BootError::DuplicateName(template.name));
        }
    }
    Ok(())
}

fn build_pcb(config: &BootConfig, template: &ProcessTemplate, stack: StackRegion) -> Pcb {
    let privilege = template.class.privilege();
    let quantum = match template.class {
        ProcessClass::Task => config.task_quantum,
        ProcessClass::User => config.user_quantum,
    };

    let ldt = if template.name == config.bootstrap {
        bootstrap_ldt(config.kernel_image, privilege)
    } else {
        shared_ldt(privilege)
    };

    let code = Selector::new(INDEX_LDT_C, TableIndicator::Ldt, privilege).0 as u32;
    let data = Selector::new(INDEX_LDT_RW, TableIndicator::Ldt, privilege).0 as u32;

    let regs = StackFrame {
        cs:     code,
        ds:     data,
        es:     data,
        fs:     data,
        ss:     data,
        gs:     KERNEL_GS.with_rpl(privilege).0 as u32,
        eip:    template.entry,
        esp:    stack.top,
        eflags: EFlags::initial(privilege).bits(),
        ..StackFrame::default()
    };

    Pcb {
        name: String::from(template.name),
        parent: None,
        class: template.class,
        privilege,
        ldt,
        regs,
        stack,
        ticks: quantum,
        priority: quantum,
        runnable: false,
        ipc: MessageState::new(),
        files: [None; NR_FILES],
    }
}

/// Плоские сегменты ядра с DPL процесса; база и лимит общие для всех.
/// The flat kernel segments with the process DPL; base and limit are shared.
fn shared_ldt(privilege: Privilege) -> [Descriptor; 2] {
    let mut code = gdt::gdt_entry(KERNEL_CS);
    let mut data = gdt::gdt_entry(KERNEL_DS);
    code.set_access(DescAttr::C | DescAttr::dpl(privilege));
    data.set_access(DescAttr::DRW | DescAttr::dpl(privilege));
    [code, data]
}

/// INIT видит память с нуля до конца образа ядра, но с пониженной привилегией.
/// INIT sees memory from zero to the end of the kernel image, at reduced privilege.
fn bootstrap_ldt(image: KernelImage, privilege: Privilege) -> [Descriptor; 2] {
    let flags = DescAttr::DB_32 | DescAttr::LIMIT_4K | DescAttr::dpl(privilege);
    let limit = image.page_limit();
    [
        Descriptor::new(0, limit, flags | DescAttr::C),
        Descriptor::new(0, limit, flags | DescAttr::DRW),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::{STACK_ARENA_BASE, STACK_SIZE_DEFAULT};

    fn build_default() -> ProcTable {
        build(&BootConfig::default(), catalog::TASKS, catalog::USER_PROCS).unwrap()
    }

    fn user(name: &'static str, stack_size: u32) -> ProcessTemplate {
        ProcessTemplate { name, entry: 0x1000, stack_size, class: ProcessClass::User }
    }

    #[test]
    fn stacks_are_disjoint_and_top_down() {
        let table = build_default();
        let stacks: alloc::vec::Vec<_> = table.populated().map(|(_, p)| p.stack).collect();
        for (i, a) in stacks.iter().enumerate() {
            assert_eq!(a.size(), STACK_SIZE_DEFAULT);
            for b in &stacks[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
                assert!(b.top <= a.base);
            }
        }
        let first = table.get(SlotId(0)).unwrap();
        assert_eq!(first.regs.esp, STACK_ARENA_BASE + BootConfig::default().stack_arena_size);
        assert_eq!(first.regs.esp, first.stack.top);
    }

    #[test]
    fn descriptor_dpl_matches_class() {
        let table = build_default();
        for (_, pcb) in table.populated() {
            let ring = pcb.privilege.ring();
            assert_eq!(pcb.code_descriptor().dpl(), ring, "{}", pcb.name);
            assert_eq!(pcb.data_descriptor().dpl(), ring, "{}", pcb.name);
            assert_eq!(pcb.code_descriptor().kind(), 0x98);
            assert_eq!(pcb.data_descriptor().kind(), 0x92);
        }
    }

    #[test]
    fn tasks_share_identical_descriptors() {
        let table = build_default();
        let tty = table.get(SlotId(0)).unwrap().ldt;
        for slot in table.task_slots() {
            assert_eq!(table.get(SlotId(slot)).unwrap().ldt, tty);
        }
        assert_eq!(tty[0].base(), 0);
        assert_eq!(tty[0].last_byte(), 0xFFFF_FFFF);
    }

    #[test]
    fn init_spans_the_kernel_image() {
        let config = BootConfig::default();
        let table = build_default();
        let init = table.get(table.lookup("INIT").unwrap()).unwrap();
        let last = config.kernel_image.last_byte() as u64;
        for desc in &init.ldt {
            assert_eq!(desc.base(), 0);
            assert!(desc.last_byte() >= last);
            // округление только до границы страницы / rounded only to the page end
            assert!(desc.last_byte() < last + 0x1000);
            assert_eq!(desc.dpl(), 3);
        }
        let test_a = table.get(table.lookup("TestA").unwrap()).unwrap();
        assert_ne!(test_a.ldt, init.ldt);
    }

    #[test]
    fn selectors_and_flags_follow_ring() {
        let table = build_default();
        let tty = table.get(SlotId(0)).unwrap();
        assert_eq!(tty.regs.cs, 0x05);
        assert_eq!(tty.regs.ds, 0x0D);
        assert_eq!(tty.regs.ss, 0x0D);
        assert_eq!(tty.regs.gs, 0x19);
        assert_eq!(tty.regs.eflags, 0x1202);

        let test_a = table.get(SlotId(6)).unwrap();
        assert_eq!(test_a.regs.cs, 0x07);
        assert_eq!(test_a.regs.es, 0x0F);
        assert_eq!(test_a.regs.gs, 0x1B);
        assert_eq!(test_a.regs.eflags, 0x202);
        assert_eq!(test_a.regs.eip, 0x0003_7000);
    }

    #[test]
    fn fresh_slots_are_idle_and_not_runnable() {
        let table = build_default();
        for (_, pcb) in table.populated() {
            assert!(!pcb.runnable);
            assert!(pcb.parent.is_none());
            assert!(pcb.ipc.is_idle());
            assert!(pcb.files.iter().all(Option::is_none));
            assert_eq!(pcb.ticks, pcb.priority);
        }
        assert_eq!(table.get(SlotId(0)).unwrap().priority, 15);
        assert_eq!(table.get(SlotId(5)).unwrap().priority, 5);
        assert!(table.is_free(SlotId(9)));
        assert!(table.is_free(SlotId(36)));
    }

    #[test]
    fn short_catalogue_leaves_trailing_slots_free() {
        let table = build(&BootConfig::default(), &catalog::TASKS[..3], catalog::USER_PROCS).unwrap();
        assert!(!table.is_free(SlotId(2)));
        assert!(table.is_free(SlotId(3)));
        assert!(table.is_free(SlotId(4)));
        assert_eq!(table.lookup("INIT"), Ok(SlotId(5)));
        assert_eq!(table.populated().count(), 7);
    }

    #[test]
    fn too_many_templates_is_fatal() {
        let config = BootConfig { nr_procs: 3, ..Default::default() };
        assert_eq!(
            build(&config, catalog::TASKS, catalog::USER_PROCS).err(),
            Some(BootError::TooManyTemplates { region: "user process", supplied: 4, reserved: 3 })
        );
    }

    #[test]
    fn stack_demand_beyond_arena_is_fatal() {
        let config = BootConfig { stack_arena_size: 0x5000, ..Default::default() };
        let procs = [user("A", 0x3000), user("B", 0x3000)];
        assert_eq!(
            build(&config, &[], &procs).err(),
            Some(BootError::StackArenaExhausted { requested: 0x3000, remaining: 0x2000 })
        );
    }

    #[test]
    fn duplicate_names_and_misplaced_classes_are_fatal() {
        let config = BootConfig::default();
        let procs = [user("A", 0x1000), user("A", 0x1000)];
        assert_eq!(build(&config, &[], &procs).err(), Some(BootError::DuplicateName("A")));
        assert!(build(&config, &procs[..1], &[]).is_err());
    }
}
