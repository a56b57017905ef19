//! Дисциплины выбора / Selection disciplines
//!
//! Обе функции смотрят только на слоты из `eligible` и только на runnable.
//! Both functions only look at slots inside `eligible` that are runnable.

use core::ops::Range;

use crate::proc::{ProcTable, SlotId};

fn is_runnable(table: &ProcTable, index: usize) -> bool {
    table.get(SlotId(index)).is_some_and(|pcb| pcb.runnable)
}

/// Первый runnable слот после `current`, по кругу. Тики не тратятся.
/// First runnable slot after `current`, wrapping around. No tick accounting.
pub(super) fn round_robin(table: &ProcTable, eligible: Range<usize>, current: SlotId) -> Option<SlotId> {
    let len = eligible.len();
    if len == 0 {
        return None;
    }
    let start = if eligible.contains(&current.index()) {
        current.index() - eligible.start + 1
    } else {
        0
    };
    (0..len)
        .map(|k| eligible.start + (start + k) % len)
        .find(|&index| is_runnable(table, index))
        .map(SlotId)
}

/// Все runnable слоты по одному разу, в порядке номеров.
/// Every runnable slot once, in slot order.
pub(super) fn round_robin_pass(
    table: &ProcTable,
    eligible: Range<usize>,
) -> impl Iterator<Item = SlotId> + '_ {
    eligible.filter(move |&index| is_runnable(table, index)).map(SlotId)
}

/// Runnable слот со строго наибольшим `ticks > 0`; при равенстве — меньший номер.
/// Runnable slot with the strictly greatest `ticks > 0`; ties go to the lower index.
fn greatest_ticks(table: &ProcTable, eligible: Range<usize>) -> Option<SlotId> {
    let mut best: Option<(SlotId, u32)> = None;
    for index in eligible {
        let Some(pcb) = table.get(SlotId(index)) else { continue };
        if pcb.runnable && pcb.ticks > best.map_or(0, |(_, ticks)| ticks) {
            best = Some((SlotId(index), pcb.ticks));
        }
    }
    best.map(|(slot, _)| slot)
}

/// Приоритетная дисциплина с эпохами / Priority discipline with epochs.
///
/// Если ни у одного runnable слота не осталось тиков, всем runnable слотам
/// возвращается `ticks = priority` и поиск повторяется. Выбранный слот
/// теряет один тик.
/// If no runnable slot has ticks left, every runnable slot gets
/// `ticks = priority` back and the scan is repeated. The chosen slot loses
/// one tick.
pub(super) fn priority(table: &mut ProcTable, eligible: Range<usize>) -> Option<SlotId> {
    let chosen = match greatest_ticks(table, eligible.clone()) {
        Some(slot) => slot,
        None => {
            let mut refilled = 0;
            for index in eligible.clone() {
                if let Some(pcb) = table.get_mut(SlotId(index)) {
                    if pcb.runnable {
                        pcb.refill();
                        refilled += 1;
                    }
                }
            }
            if refilled == 0 {
                return None;
            }
            log::debug!("[sched] epoch reset, {} slots refilled", refilled);
            greatest_ticks(table, eligible)?
        }
    };

    let pcb = table.get_mut(chosen)?;
    pcb.ticks -= 1;
    Some(chosen)
}
