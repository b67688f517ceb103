//! Байтовая граница: чтение и запись RowBinary поверх `std::io`.

pub mod input;
pub mod output;
pub mod varint;

// Публичный экспорт
pub use input::*;
pub use output::*;
pub use varint::*;
