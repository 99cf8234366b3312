pub(crate) mod descriptor;
pub(crate) mod index;
pub(crate) mod schema;

pub use descriptor::{
    Cardinality, FieldDescriptor, FieldLabel, FieldType, RecordDescriptor, RecordDescriptorRef,
};
pub use index::{IndexDescriptor, IndexRef};
pub use schema::SchemaCatalog;
