pub mod record;
pub mod value;

pub use record::{FieldValue, Record, RecordRef};
pub use value::DataValue;
