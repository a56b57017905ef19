//! Kernel Heap — `Vec` и `String` в таблице процессов живут здесь
//! Kernel Heap — the process table's `Vec` and `String` live here

use linked_list_allocator::LockedHeap;

const HEAP_SIZE: usize = 64 * 1024;

static mut HEAP_SPACE: [u8; HEAP_SIZE] = [0; HEAP_SIZE];

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

pub fn init() {
    // Вызывается один раз до первой аллокации / Called once before the first allocation
    unsafe {
        ALLOCATOR
            .lock()
            .init(core::ptr::addr_of_mut!(HEAP_SPACE) as *mut u8, HEAP_SIZE);
    }
    crate::kprintln!("[heap] {} KB ready", HEAP_SIZE / 1024);
}
