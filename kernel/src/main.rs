//! Mandarin — загрузочный образ / boot image
//!
//! Связывает ядро с железом: UART, куча, таблица процессов, цикл тиков.
//! Wires the core to the hardware: UART, heap, process table, tick loop.

#![no_std]
#![no_main]
#![deny(unsafe_op_in_unsafe_fn)]

use core::panic::PanicInfo;

use mandarin_kernel::{BootConfig, Discipline};

mod boot;
mod drivers;
mod heap;

/// Пользовательские процессы, которые запускает команда `run`.
/// User processes admitted by the `run` command.
const DEMO_PROCS: [&str; 3] = ["TestA", "TestB", "TestC"];

/// Тиков на одну дисциплину в демонстрационном цикле.
/// Ticks per discipline in the demo loop.
const TICKS_PER_ROUND: u32 = 60;

/// Точка входа ядра — вызывается из `_start`.
/// Kernel entry point — called from `_start`.
#[no_mangle]
pub extern "C" fn kernel_main() -> ! {
    // 0. UART — первым делом / first of all
    drivers::uart::init();
    drivers::uart::init_logger(log::LevelFilter::Debug);
    kprintln!("Mandarin booting...");

    // 1. Kernel Heap — после этого работают Vec<T>, String
    //    Kernel Heap — after this Vec<T>, String work
    heap::init();

    // 2. Таблица процессов / Process table
    let config = BootConfig { kernel_image: boot::kernel_image(), ..Default::default() };
    let mut sched = match mandarin_kernel::boot(&config) {
        Ok(sched) => sched,
        Err(err) => panic!("[proc] cannot build process table: {}", err),
    };

    // 3. `run`: допустить тестовые процессы / admit the test processes
    for name in DEMO_PROCS {
        if let Err(err) = sched.lookup(name).and_then(|slot| sched.resume(slot)) {
            log::warn!("[boot] {}: {}", name, err);
        }
    }

    kprintln!("");
    kprintln!("  Kernel ready. Scheduling...");
    kprintln!("");

    // 4. Тики: по очереди RR и PRIO, печатаем последнюю букву имени
    //    Ticks: alternate RR and PRIO, print the last letter of each name
    let mut discipline = Discipline::RoundRobin;
    loop {
        sched.set_discipline(discipline);
        kprint!("{:>4}: ", discipline);
        for _ in 0..TICKS_PER_ROUND {
            if let Some(pcb) = sched.on_tick().and_then(|slot| sched.table().get(slot)) {
                kprint!("{}", pcb.name.chars().last().unwrap_or('?'));
            }
        }
        kprintln!("");
        for row in sched.describe() {
            log::debug!(
                "[sched] {:<6} prio {:3} ticks {:3} {}",
                row.name,
                row.priority,
                row.ticks,
                if row.runnable { "running" } else { "suspended" }
            );
        }
        discipline = match discipline {
            Discipline::RoundRobin => Discipline::Priority,
            Discipline::Priority => Discipline::RoundRobin,
        };
    }
}

/// Panic handler — выводим в UART и halt.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    kprintln!("\n[KERNEL PANIC] {}", info);
    loop {
        core::hint::spin_loop();
    }
}
