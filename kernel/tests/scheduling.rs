//! End-to-end: boot the built-in catalogue and drive the scheduler the way
//! the process manager screen and the tick source do.

use mandarin_kernel::{boot, AdminError, BootConfig, Discipline, Scheduler, SharedScheduler, SlotId};

/// (slot, name, priority, ticks, runnable) для каждого заселённого слота.
type Snapshot = Vec<(SlotId, String, u32, u32, bool)>;

fn booted() -> (Scheduler, [SlotId; 3]) {
    let sched = boot(&BootConfig::default()).expect("default catalogue boots");
    let abc = ["TestA", "TestB", "TestC"].map(|name| sched.lookup(name).unwrap());
    (sched, abc)
}

fn set_ticks(sched: &mut Scheduler, slot: SlotId, ticks: u32, priority: u32) {
    let pcb = sched.table_mut().get_mut(slot).unwrap();
    pcb.ticks = ticks;
    pcb.priority = priority;
}

fn ticks_of(sched: &Scheduler, slot: SlotId) -> u32 {
    sched.table().get(slot).unwrap().ticks
}

fn snapshot(sched: &Scheduler) -> Snapshot {
    sched
        .describe()
        .map(|r| (r.slot, r.name.to_string(), r.priority, r.ticks, r.runnable))
        .collect()
}

/// Все слоты, кроме `target`, не изменились / Every slot but `target` is unchanged.
fn assert_only_touched(before: &Snapshot, after: &Snapshot, target: Option<SlotId>) {
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(after) {
        if Some(old.0) != target {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn boot_then_resume_all_admits_the_test_processes() {
    let (mut sched, [a, b, c]) = booted();
    assert_eq!(sched.resume_all(), 3);
    let runnable: Vec<_> = sched.describe().filter(|r| r.runnable).map(|r| r.slot).collect();
    assert_eq!(runnable, [a, b, c]);

    sched.set_discipline(Discipline::Priority);
    let picks: Vec<_> = (0..5).map(|_| sched.pick_next().unwrap()).collect();
    assert!(picks.iter().all(|slot| [a, b, c].contains(slot)));
    assert!([a, b, c].iter().all(|slot| picks.contains(slot)));
}

#[test]
fn round_robin_cycles_regardless_of_priority() {
    let (mut sched, [a, b, c]) = booted();
    for slot in [a, b, c] {
        sched.resume(slot).unwrap();
    }
    sched.raise_priority(c).unwrap();
    sched.raise_priority(c).unwrap();

    let picks: Vec<_> = (0..7).map(|_| sched.on_tick().unwrap()).collect();
    assert_eq!(picks, [a, b, c, a, b, c, a]);
    // RR не тратит тики
    assert_eq!(ticks_of(&sched, c), 25);
    assert_eq!(sched.elapsed_ticks(), 7);
}

#[test]
fn priority_drains_then_starts_a_new_epoch() {
    let (mut sched, [a, b, c]) = booted();
    sched.set_discipline(Discipline::Priority);
    for slot in [a, b, c] {
        sched.resume(slot).unwrap();
    }
    set_ticks(&mut sched, a, 5, 5);
    set_ticks(&mut sched, b, 8, 15);
    set_ticks(&mut sched, c, 0, 25);

    assert_eq!(sched.pick_next(), Some(b));
    assert_eq!([ticks_of(&sched, a), ticks_of(&sched, b), ticks_of(&sched, c)], [5, 7, 0]);

    // осталось 12 тиков у A и B; C не выбирается, пока у неё 0
    for _ in 0..12 {
        let picked = sched.pick_next().unwrap();
        assert_ne!(picked, c);
    }
    assert_eq!([ticks_of(&sched, a), ticks_of(&sched, b), ticks_of(&sched, c)], [0, 0, 0]);

    assert_eq!(sched.pick_next(), Some(c));
    assert_eq!([ticks_of(&sched, a), ticks_of(&sched, b), ticks_of(&sched, c)], [5, 15, 24]);
}

#[test]
fn priority_ties_go_to_the_lowest_slot() {
    let (mut sched, [a, b, c]) = booted();
    sched.set_discipline(Discipline::Priority);
    for slot in [a, b, c] {
        sched.resume(slot).unwrap();
    }
    // все с priority 5 и ticks 5 после загрузки
    let picks: Vec<_> = (0..6).map(|_| sched.pick_next().unwrap()).collect();
    assert_eq!(picks, [a, b, c, a, b, c]);
}

#[test]
fn paused_slot_is_never_selected() {
    for discipline in [Discipline::RoundRobin, Discipline::Priority] {
        let (mut sched, [a, b, c]) = booted();
        sched.set_discipline(discipline);
        sched.resume_all();
        sched.pause(b).unwrap();
        for _ in 0..50 {
            assert_ne!(sched.on_tick(), Some(b), "{}", discipline);
        }
        sched.resume(b).unwrap();
        let seen: Vec<_> = (0..50).filter_map(|_| sched.on_tick()).collect();
        assert!(seen.contains(&b), "{}", discipline);
        assert!(seen.contains(&a) && seen.contains(&c));
    }
}

#[test]
fn bounds_reject_without_mutation() {
    let (mut sched, [a, ..]) = booted();
    let floor = sched.bounds().floor;
    assert_eq!(
        sched.lower_priority(a),
        Err(AdminError::PriorityAtFloor { priority: floor, floor })
    );

    let mut last = 0;
    while let Ok(priority) = sched.raise_priority(a) {
        last = priority;
    }
    assert_eq!(last, 795);
    set_ticks(&mut sched, a, 3, 795);
    assert_eq!(
        sched.raise_priority(a),
        Err(AdminError::PriorityAtCeiling { priority: 795, ceiling: 800 })
    );
    let pcb = sched.table().get(a).unwrap();
    assert_eq!((pcb.priority, pcb.ticks), (795, 3));
}

#[test]
fn switching_discipline_keeps_ticks_and_priorities() {
    let (mut sched, _) = booted();
    sched.resume_all();
    sched.set_discipline(Discipline::Priority);
    sched.pick_next();
    sched.pick_next();

    let before: Vec<_> = sched.describe().map(|r| (r.priority, r.ticks)).collect();
    sched.set_discipline_by_name("RR").unwrap();
    let after: Vec<_> = sched.describe().map(|r| (r.priority, r.ticks)).collect();
    assert_eq!(before, after);
    assert!(sched.describe().all(|r| r.discipline == Discipline::RoundRobin));

    assert_eq!(sched.set_discipline_by_name("SJF"), Err(AdminError::UnknownDiscipline));
    assert_eq!(sched.discipline(), Discipline::RoundRobin);
}

#[test]
fn shared_scheduler_serialises_admin_and_ticks() {
    let (sched, [a, b, c]) = booted();
    let shared = SharedScheduler::new(sched);
    shared.lock().resume_all();

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..200 {
                shared.lock().on_tick();
            }
        });
        s.spawn(|| {
            for i in 0..100 {
                let mut sched = shared.lock();
                if i % 2 == 0 {
                    sched.set_discipline(Discipline::Priority);
                } else {
                    sched.set_discipline(Discipline::RoundRobin);
                }
            }
        });
    });

    let sched = shared.lock();
    assert_eq!(sched.elapsed_ticks(), 200);
    for slot in [a, b, c] {
        let pcb = sched.table().get(slot).unwrap();
        assert!(pcb.ticks <= pcb.priority);
    }
}

#[test]
fn admin_commands_touch_only_their_target() {
    let (mut sched, [a, b, c]) = booted();
    sched.resume(b).unwrap();

    // отказы ничего не меняют / rejections change nothing
    let before = snapshot(&sched);
    assert!(sched.lower_priority(a).is_err());
    assert_eq!(sched.resume(SlotId(20)), Err(AdminError::FreeSlot(20)));
    assert_eq!(sched.pause(SlotId(99)), Err(AdminError::NoSuchSlot(99)));
    assert_eq!(sched.raise_priority(SlotId(20)), Err(AdminError::FreeSlot(20)));
    assert_eq!(sched.lookup("snake"), Err(AdminError::UnknownProcess));
    assert!(sched.set_discipline_by_name("SJF").is_err());
    assert_only_touched(&before, &snapshot(&sched), None);

    while sched.raise_priority(c).is_ok() {}
    let before = snapshot(&sched);
    assert!(sched.raise_priority(c).is_err());
    assert_only_touched(&before, &snapshot(&sched), None);

    // успешные команды меняют только свой слот / successful ones change only their slot
    let before = snapshot(&sched);
    sched.raise_priority(a).unwrap();
    assert_only_touched(&before, &snapshot(&sched), Some(a));

    let before = snapshot(&sched);
    sched.pause(b).unwrap();
    let after = snapshot(&sched);
    assert_only_touched(&before, &after, Some(b));
    assert_ne!(before, after);
}
