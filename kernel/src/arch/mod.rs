//! HAL — Hardware Abstraction Layer
//!
//! Описания сегментов и начальный контекст — это данные, а не инструкции,
//! поэтому модуль собирается на любой хост-архитектуре (в том числе для тестов).
//! Segment descriptors and initial contexts are plain data, not instructions,
//! so this module builds on any host architecture (tests included).

pub mod x86;
