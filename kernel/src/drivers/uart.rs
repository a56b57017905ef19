//! UART Serial driver — COM1 (0x3F8)
//!
//! Весь вывод ядра, включая записи `log`, идёт сюда.
//! All kernel output, `log` records included, goes here.
//!
//! Запуск / Run:
//!   qemu-system-i386 -serial stdio ...

use core::fmt;
use spin::Mutex;

const COM1: u16 = 0x3F8;

#[inline]
unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val,
                         options(nomem, nostack, preserves_flags));
    }
}

#[inline]
unsafe fn inb(port: u16) -> u8 {
    let val: u8;
    unsafe {
        core::arch::asm!("in al, dx", out("al") val, in("dx") port,
                         options(nomem, nostack, preserves_flags));
    }
    val
}

struct Uart {
    port: u16,
}

impl Uart {
    /// 115200 baud, 8N1, FIFO.
    fn init(&mut self) {
        unsafe {
            outb(self.port + 1, 0x00); // Отключить прерывания / Disable interrupts
            outb(self.port + 3, 0x80); // DLAB
            outb(self.port,     0x01); // Делитель 1 → 115200 baud
            outb(self.port + 1, 0x00);
            outb(self.port + 3, 0x03); // 8 бит, нет чётности, 1 стоп-бит
            outb(self.port + 2, 0xC7); // FIFO, clear, 14-byte threshold
            outb(self.port + 4, 0x0B);
        }
    }

    fn send_byte(&mut self, byte: u8) {
        // Ждём пока THR пуст (бит 5 LSR) / Wait until THR empty (LSR bit 5)
        while unsafe { inb(self.port + 5) } & 0x20 == 0 {
            core::hint::spin_loop();
        }
        unsafe { outb(self.port, byte) };
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.send_byte(b'\r');
            }
            self.send_byte(byte);
        }
        Ok(())
    }
}

static UART: Mutex<Uart> = Mutex::new(Uart { port: COM1 });

pub fn init() {
    UART.lock().init();
}

/// Внутренняя функция для макроса kprint!
/// Internal function for kprint! macro
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;
    UART.lock().write_fmt(args).ok();
}

// ── log backend ───────────────────────────────────────────────────────────────

struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            crate::kprintln!("[{:5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

/// Подключить `log` к COM1. Повторный вызов ничего не делает.
/// Route `log` to COM1. Calling it twice is a no-op.
pub fn init_logger(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
