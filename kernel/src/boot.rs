//! i386 boot entry point
//!
//! Загрузчик передаёт управление сюда в защищённом режиме с выключенными
//! прерываниями. Ставим стек, обнуляем BSS, вызываем kernel_main.
//! The loader jumps here in protected mode with interrupts off. We set up
//! the boot stack, zero BSS, then call kernel_main.

use core::arch::global_asm;

global_asm!(
    r#"
.section .text
.global _start
_start:
    cli

    movl $boot_stack_top, %esp
    andl $-16, %esp

    /* Zero BSS: edi = __bss_start, ecx = byte count, al = 0 */
    movl $__bss_start, %edi
    movl $__bss_end,   %ecx
    subl %edi, %ecx
    xorl %eax, %eax
    rep stosb

    call kernel_main

.hang:
    cli
    hlt
    jmp .hang

.section .bss
.balign 16
boot_stack_bottom:
    .skip 16384
boot_stack_top:
"#,
    options(att_syntax)
);

extern "C" {
    static __kernel_start: u8;
    static __kernel_end: u8;
}

/// Карта образа ядра из символов линкера / Kernel image map from linker symbols.
pub fn kernel_image() -> mandarin_kernel::mm::KernelImage {
    let start = unsafe { core::ptr::addr_of!(__kernel_start) } as u32;
    let end = unsafe { core::ptr::addr_of!(__kernel_end) } as u32;
    mandarin_kernel::mm::KernelImage::new(start, end.saturating_sub(start + 1))
}
