//! Параметры загрузки / Boot parameters
//!
//! Все настраиваемые числа ядра собраны в одном месте.
//! Every kernel tunable lives in one place.

use crate::error::{BootError, BootResult};
use crate::mm::KernelImage;

/// Слотов под системные задачи / Slots reserved for system tasks.
pub const NR_TASKS: usize = 5;
/// Слотов под пользовательские процессы / Slots reserved for user processes.
pub const NR_PROCS: usize = 32;

/// Процесс, которому видно весь образ ядра / Process that sees the whole kernel image.
pub const BOOTSTRAP_NAME: &str = "INIT";

pub const STACK_SIZE_DEFAULT: u32 = 0x4000;

/// Арена стеков: по умолчанию хватает на все слоты со стеком по умолчанию.
/// Stack arena: by default big enough for every slot at the default size.
pub const STACK_ARENA_BASE: u32 = 0x0040_0000;
pub const STACK_ARENA_SIZE: u32 = STACK_SIZE_DEFAULT * (NR_TASKS + NR_PROCS) as u32;

/// Образ ядра, загружаемый на 0x30400 / Kernel image loaded at 0x30400.
pub const KERNEL_IMAGE_BASE:  u32 = 0x0003_0400;
pub const KERNEL_IMAGE_LIMIT: u32 = 0x0002_0000;

pub const TASK_QUANTUM: u32 = 15;
pub const USER_QUANTUM: u32 = 5;

pub const PRIORITY_STEP:    u32 = 10;
pub const PRIORITY_FLOOR:   u32 = 5;
pub const PRIORITY_CEILING: u32 = 800;

#[derive(Debug, Clone)]
pub struct BootConfig {
    pub nr_tasks:         usize,
    pub nr_procs:         usize,
    pub stack_arena_base: u32,
    pub stack_arena_size: u32,
    pub kernel_image:     KernelImage,
    pub bootstrap:        &'static str,
    pub task_quantum:     u32,
    pub user_quantum:     u32,
    pub priority_step:    u32,
    pub priority_floor:   u32,
    pub priority_ceiling: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            nr_tasks:         NR_TASKS,
            nr_procs:         NR_PROCS,
            stack_arena_base: STACK_ARENA_BASE,
            stack_arena_size: STACK_ARENA_SIZE,
            kernel_image:     KernelImage::new(KERNEL_IMAGE_BASE, KERNEL_IMAGE_LIMIT),
            bootstrap:        BOOTSTRAP_NAME,
            task_quantum:     TASK_QUANTUM,
            user_quantum:     USER_QUANTUM,
            priority_step:    PRIORITY_STEP,
            priority_floor:   PRIORITY_FLOOR,
            priority_ceiling: PRIORITY_CEILING,
        }
    }
}

impl BootConfig {
    pub const fn nr_slots(&self) -> usize {
        self.nr_tasks + self.nr_procs
    }

    /// Проверить согласованность; вызывается построителем до любых аллокаций.
    /// Check consistency; the builder calls this before allocating anything.
    pub fn validate(&self) -> BootResult<()> {
        // priority 0 никогда не выбирается планировщиком
        if self.priority_floor == 0 {
            return Err(BootError::InvalidConfig("priority floor must be positive"));
        }
        if self.priority_floor > self.priority_ceiling {
            return Err(BootError::InvalidConfig("priority floor above ceiling"));
        }
        if self.priority_step == 0 {
            return Err(BootError::InvalidConfig("priority step must be positive"));
        }
        let bounds = self.priority_floor..=self.priority_ceiling;
        if !bounds.contains(&self.task_quantum) || !bounds.contains(&self.user_quantum) {
            return Err(BootError::InvalidConfig("default quantum outside priority bounds"));
        }
        if self.stack_arena_size == 0 {
            return Err(BootError::InvalidConfig("stack arena is empty"));
        }
        if self.kernel_image.base.as_u32().checked_add(self.kernel_image.limit).is_none() {
            return Err(BootError::InvalidConfig("kernel image wraps the address space"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BootConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.nr_slots(), 37);
    }

    #[test]
    fn zero_floor_is_rejected() {
        let config = BootConfig { priority_floor: 0, user_quantum: 0, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(BootError::InvalidConfig("priority floor must be positive"))
        );
    }

    #[test]
    fn quantum_must_fit_bounds() {
        let config = BootConfig { task_quantum: 900, ..Default::default() };
        assert!(config.validate().is_err());
        let config = BootConfig { priority_step: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
