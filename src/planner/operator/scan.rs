use crate::catalog::IndexRef;
use crate::types::value::DataValue;
use itertools::Itertools;
use std::fmt;
use std::fmt::Formatter;

/// Reads every stored record of the given record types.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ScanOperator {
    pub record_types: Vec<String>,
}

impl ScanOperator {
    pub fn new(record_types: Vec<String>) -> Self {
        ScanOperator { record_types }
    }
}

/// Equality lookup on a value index.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct IndexScanOperator {
    pub index: IndexRef,
    pub key: DataValue,
}

impl fmt::Display for ScanOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Scan [{}]", self.record_types.iter().join(", "))
    }
}

impl fmt::Display for IndexScanOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "IndexScan {} By {} = {}",
            self.index.name(),
            self.index.path_display(),
            self.key
        )
    }
}
