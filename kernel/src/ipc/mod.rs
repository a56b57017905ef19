//! IPC — поля сообщений в PCB
//! IPC — message fields of the PCB
//!
//! Семантика send/receive живёт в слое IPC ниже этого крейта.
//! Здесь только состояние, которое тот слой хранит в каждом слоте.
//! Send/receive semantics live in the IPC layer below this crate; this is
//! only the per-slot state that layer keeps in the table.

use crate::proc::SlotId;

/// Адрес сообщения в адресном пространстве процесса.
/// Address of a message in the owning process's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePtr(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageState {
    /// Сообщение, которое процесс отправляет или ждёт
    pub msg:           Option<MessagePtr>,
    pub recv_from:     Option<SlotId>,
    pub send_to:       Option<SlotId>,
    /// Прерывание пришло, пока процесс не ждал его
    pub has_int_msg:   bool,
    /// Голова очереди отправителей к этому процессу / head of senders queue
    pub q_sending:     Option<SlotId>,
    /// Следующий в чужой очереди отправителей / next in someone's senders queue
    pub next_sending:  Option<SlotId>,
}

impl MessageState {
    pub const fn new() -> Self {
        Self {
            msg: None,
            recv_from: None,
            send_to: None,
            has_int_msg: false,
            q_sending: None,
            next_sending: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::new()
    }
}
