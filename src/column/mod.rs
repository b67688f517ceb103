//! Дескриптор типа колонки и его разбор.

pub mod column_type;
pub mod enum_def;
mod parser;
pub mod timezone;

// Публичный экспорт
pub use column_type::*;
pub use enum_def::EnumDef;
pub use timezone::TimeZone;
