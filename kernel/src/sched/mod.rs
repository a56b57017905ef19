//! Scheduler — Round-Robin + Priority
//!
//! Две дисциплины за одной точкой входа `pick_next`:
//! Two disciplines behind one entry point, `pick_next`:
//!   RR   — следующий runnable слот по кругу, тики не тратятся
//!          next runnable slot around the ring, ticks untouched
//!   PRIO — слот с наибольшим остатком тиков; когда у всех 0 — новая эпоха
//!          slot with the most ticks left; when all are 0 — a new epoch
//!
//! Планировщик владеет таблицей процессов. В многопоточном окружении весь
//! планировщик живёт под одним `spin::Mutex` (см. `SharedScheduler`).
//! The scheduler owns the process table. On a multi-threaded host the whole
//! scheduler lives behind one `spin::Mutex` (see `SharedScheduler`).

mod policy;

use core::fmt;
use core::ops::Range;
use core::str::FromStr;

use crate::config::BootConfig;
use crate::error::{AdminError, AdminResult};
use crate::proc::{Pcb, ProcTable, SlotId};

/// Одна критическая секция на всю таблицу / One critical section for the whole table.
pub type SharedScheduler = spin::Mutex<Scheduler>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Discipline {
    #[default]
    RoundRobin,
    Priority,
}

impl FromStr for Discipline {
    type Err = AdminError;

    /// Имена из командного слоя: "RR" и "PRIO".
    fn from_str(name: &str) -> AdminResult<Self> {
        if name.eq_ignore_ascii_case("RR") {
            Ok(Discipline::RoundRobin)
        } else if name.eq_ignore_ascii_case("PRIO") {
            Ok(Discipline::Priority)
        } else {
            Err(AdminError::UnknownDiscipline)
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Discipline::RoundRobin => "RR",
            Discipline::Priority => "PRIO",
        })
    }
}

/// Границы административного изменения приоритета.
/// Bounds for administrative priority changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityBounds {
    pub step:    u32,
    pub floor:   u32,
    pub ceiling: u32,
}

/// Строка для экрана управления процессами; форматирует вызывающий.
/// One row for the process manager screen; the caller formats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo<'a> {
    pub slot:       SlotId,
    pub name:       &'a str,
    pub priority:   u32,
    pub ticks:      u32,
    pub runnable:   bool,
    pub discipline: Discipline,
}

pub struct Scheduler {
    table:      ProcTable,
    discipline: Discipline,
    /// Текущий выбранный слот; после загрузки — первый заселённый
    current:    SlotId,
    eligible:   Range<usize>,
    bounds:     PriorityBounds,
    /// Сколько раз вызывался источник тиков / Tick source invocations
    elapsed:    u64,
}

impl Scheduler {
    pub fn new(table: ProcTable, config: &BootConfig) -> Self {
        let eligible = admitted_range(&table, config.bootstrap);
        let current = table.populated().next().map_or(SlotId(0), |(slot, _)| slot);
        log::info!(
            "[sched] {} slots, eligible {:?}, discipline {}",
            table.len(),
            eligible,
            Discipline::default()
        );
        Self {
            table,
            discipline: Discipline::default(),
            current,
            eligible,
            bounds: PriorityBounds {
                step:    config.priority_step,
                floor:   config.priority_floor,
                ceiling: config.priority_ceiling,
            },
            elapsed: 0,
        }
    }

    /// Заменить диапазон выбора / Replace the selection range.
    pub fn with_eligible(mut self, eligible: Range<usize>) -> Self {
        let end = eligible.end.min(self.table.len());
        self.eligible = eligible.start.min(end)..end;
        self
    }

    pub fn table(&self) -> &ProcTable {
        &self.table
    }

    /// Для слоёв IPC и ФС, которым принадлежат свои поля PCB.
    /// For the IPC and FS layers that own their own PCB fields.
    pub fn table_mut(&mut self) -> &mut ProcTable {
        &mut self.table
    }

    pub fn eligible(&self) -> Range<usize> {
        self.eligible.clone()
    }

    pub fn bounds(&self) -> PriorityBounds {
        self.bounds
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Вступает в силу со следующего выбора; тики и приоритеты не трогает.
    /// Takes effect on the next arbitration; ticks and priorities stay as they are.
    pub fn set_discipline(&mut self, discipline: Discipline) {
        if self.discipline != discipline {
            log::info!("[sched] discipline {} -> {}", self.discipline, discipline);
        }
        self.discipline = discipline;
    }

    pub fn set_discipline_by_name(&mut self, name: &str) -> AdminResult<Discipline> {
        let discipline = name.parse::<Discipline>().map_err(|err| {
            log::warn!("[sched] unknown discipline {:?}", name);
            err
        })?;
        self.set_discipline(discipline);
        Ok(discipline)
    }

    pub fn current(&self) -> SlotId {
        self.current
    }

    pub fn current_pcb(&self) -> Option<&Pcb> {
        self.table.get(self.current)
    }

    /// Кто выполняется следующим. `None` — нет ни одного runnable слота,
    /// текущий выбор не меняется.
    /// Who runs next. `None` means nothing is runnable; the current
    /// selection is left as is.
    pub fn pick_next(&mut self) -> Option<SlotId> {
        let next = match self.discipline {
            Discipline::RoundRobin => {
                policy::round_robin(&self.table, self.eligible.clone(), self.current)
            }
            Discipline::Priority => policy::priority(&mut self.table, self.eligible.clone()),
        };
        if let Some(slot) = next {
            log::trace!("[sched] {} picked slot {}", self.discipline, slot.index());
            self.current = slot;
        }
        next
    }

    /// Вход для источника тиков / Entry point for the tick source.
    pub fn on_tick(&mut self) -> Option<SlotId> {
        self.elapsed += 1;
        self.pick_next()
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed
    }

    /// Все runnable слоты по одному разу в порядке номеров, без учёта тиков.
    /// Every runnable slot once in slot order, without tick accounting.
    pub fn round_robin_pass(&self) -> impl Iterator<Item = SlotId> + '_ {
        policy::round_robin_pass(&self.table, self.eligible.clone())
    }

    pub fn lookup(&self, name: &str) -> AdminResult<SlotId> {
        self.table.lookup(name)
    }

    pub fn resume(&mut self, slot: SlotId) -> AdminResult<()> {
        self.set_runnable(slot, true)
    }

    pub fn pause(&mut self, slot: SlotId) -> AdminResult<()> {
        self.set_runnable(slot, false)
    }

    fn set_runnable(&mut self, slot: SlotId, runnable: bool) -> AdminResult<()> {
        let pcb = self.table.pcb_mut(slot).map_err(|err| {
            log::warn!("[sched] {}", err);
            err
        })?;
        pcb.runnable = runnable;
        log::debug!(
            "[sched] {} {}",
            if runnable { "resumed" } else { "paused" },
            pcb.name
        );
        Ok(())
    }

    /// Возобновить все заселённые слоты в допустимом диапазоне.
    /// Resume every populated slot in the eligible range. Returns the count.
    pub fn resume_all(&mut self) -> usize {
        self.set_all_runnable(true)
    }

    pub fn pause_all(&mut self) -> usize {
        self.set_all_runnable(false)
    }

    fn set_all_runnable(&mut self, runnable: bool) -> usize {
        let eligible = self.eligible.clone();
        let mut count = 0;
        for (slot, pcb) in self.table.populated_mut() {
            if eligible.contains(&slot.index()) {
                pcb.runnable = runnable;
                count += 1;
            }
        }
        count
    }

    /// Поднять приоритет на шаг; `ticks` сбрасывается в новый приоритет.
    /// Raise priority by one step; `ticks` resets to the new priority.
    pub fn raise_priority(&mut self, slot: SlotId) -> AdminResult<u32> {
        let bounds = self.bounds;
        let pcb = self.table.pcb_mut(slot)?;
        let raised = pcb.priority.saturating_add(bounds.step);
        if raised > bounds.ceiling {
            let err = AdminError::PriorityAtCeiling { priority: pcb.priority, ceiling: bounds.ceiling };
            log::warn!("[sched] {}: {}", pcb.name, err);
            return Err(err);
        }
        pcb.priority = raised;
        pcb.refill();
        log::debug!("[sched] {} priority -> {}", pcb.name, raised);
        Ok(raised)
    }

    /// Понизить приоритет на шаг; `ticks` сбрасывается в новый приоритет.
    /// Lower priority by one step; `ticks` resets to the new priority.
    pub fn lower_priority(&mut self, slot: SlotId) -> AdminResult<u32> {
        let bounds = self.bounds;
        let pcb = self.table.pcb_mut(slot)?;
        let lowered = match pcb.priority.checked_sub(bounds.step) {
            Some(lowered) if lowered >= bounds.floor => lowered,
            _ => {
                let err = AdminError::PriorityAtFloor { priority: pcb.priority, floor: bounds.floor };
                log::warn!("[sched] {}: {}", pcb.name, err);
                return Err(err);
            }
        };
        pcb.priority = lowered;
        pcb.refill();
        log::debug!("[sched] {} priority -> {}", pcb.name, lowered);
        Ok(lowered)
    }

    /// Снимок всех заселённых слотов для экрана управления.
    /// Слоты вне допустимого диапазона тоже видны, но не выбираются.
    /// Snapshot of every populated slot for the management screen.
    pub fn describe(&self) -> impl Iterator<Item = SlotInfo<'_>> + '_ {
        let discipline = self.discipline;
        self.table.populated().map(move |(slot, pcb)| SlotInfo {
            slot,
            name: &pcb.name,
            priority: pcb.priority,
            ticks: pcb.ticks,
            runnable: pcb.runnable,
            discipline,
        })
    }
}

/// Выбираются только процессы после bootstrap (`INIT`) до конца
/// пользовательского региона; задачи и сам bootstrap не участвуют.
/// Only processes after the bootstrap (`INIT`) up to the end of the user
/// region are selected; tasks and the bootstrap itself are left out.
fn admitted_range(table: &ProcTable, bootstrap: &str) -> Range<usize> {
    let users = table.user_slots();
    match table.lookup(bootstrap) {
        Ok(slot) if users.contains(&slot.index()) => slot.index() + 1..users.end,
        _ => users,
    }
}
