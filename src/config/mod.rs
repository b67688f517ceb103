pub mod settings;

// Публичный экспорт
pub use settings::*;
