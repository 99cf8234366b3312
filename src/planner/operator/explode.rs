use crate::planner::quantifier::CorrelationIdentifier;
use itertools::Itertools;
use std::fmt;
use std::fmt::Formatter;

/// Produces one row per element of the repeated field at `path`, read from the
/// row currently bound to `source`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ExplodeOperator {
    pub source: CorrelationIdentifier,
    pub path: Vec<String>,
}

impl fmt::Display for ExplodeOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Explode {}.{}", self.source, self.path.iter().join("."))
    }
}
