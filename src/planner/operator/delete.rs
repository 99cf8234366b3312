use crate::planner::quantifier::Quantifier;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct DeleteOperator {
    pub inner: Quantifier,
    pub record_type: String,
}

/// Drops rows whose primary key was already produced.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct DistinctOperator {
    pub inner: Quantifier,
}

impl fmt::Display for DeleteOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Delete {}", self.record_type)
    }
}

impl fmt::Display for DistinctOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "UnorderedPrimaryKeyDistinct")
    }
}
