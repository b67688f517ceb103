/// Column type descriptors: parsing and canonical names.
pub mod column;
/// Data layer configuration loading.
pub mod config;
/// Logging setup (formatting, filters).
pub mod logging;
/// Data processor: per-column codecs and the multi-column RowBinary stream.
pub mod processor;
/// Byte boundary: read/write extensions over `std::io`.
pub mod stream;
/// Fixed-width unsigned integers over signed storage.
pub mod unsigned;
/// Typed column values and their conversion contract.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Error crate re-export: `DataResult`, `StackError`, `StatusCode`.
pub use chdata_error;
pub use chdata_error::{DataResult, StackError, StatusCode};
/// Column type descriptors.
pub use column::{Column, ColumnType, EnumDef, Field, TimeZone};
/// config
pub use config::{DataConfig, DataConfigBuilder, DataFormat, Settings};
/// Logging setup.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Processor entry points.
pub use processor::{DataProcessor, Deserializer, RowBinaryReader, RowBinaryWriter, Serializer};
/// Stream extensions.
pub use stream::{ByteInput, ByteOutput, CountingReader, CountingWriter};
/// Unsigned integer types.
pub use unsigned::{UInt16, UInt32, UInt64, UInt8};
/// Typed values and their application-side projection.
pub use value::{ArrayObject, BigDecimal, Object, Value};
