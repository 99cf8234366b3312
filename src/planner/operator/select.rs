use crate::planner::predicate::BoundPredicate;
use crate::planner::quantifier::{CorrelationIdentifier, Quantifier};
use itertools::Itertools;
use std::fmt;
use std::fmt::Formatter;

/// Filters the cross product of its for-each quantifiers, returning the row bound
/// to `result`. Existential quantifiers only feed `Exists` predicates.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SelectOperator {
    pub quantifiers: Vec<Quantifier>,
    pub predicates: Vec<BoundPredicate>,
    pub result: CorrelationIdentifier,
}

impl SelectOperator {
    /// The single for-each quantifier, if there is exactly one.
    pub fn for_each(&self) -> Option<&Quantifier> {
        self.quantifiers
            .iter()
            .filter(|quantifier| quantifier.is_for_each())
            .exactly_one()
            .ok()
    }

    pub fn existentials(&self) -> impl Iterator<Item = &Quantifier> {
        self.quantifiers
            .iter()
            .filter(|quantifier| quantifier.is_existential())
    }

    pub fn has_existentials(&self) -> bool {
        self.existentials().next().is_some()
    }
}

/// Physical counterpart of a simple select: iterates `inner` and keeps rows on
/// which every predicate holds. Existential sub-plans run once per row.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct FilterOperator {
    pub inner: Quantifier,
    pub existentials: Vec<Quantifier>,
    pub predicates: Vec<BoundPredicate>,
}

impl fmt::Display for SelectOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Select {} From [{}]",
            self.result,
            self.quantifiers.iter().join(", ")
        )?;
        if !self.predicates.is_empty() {
            write!(f, " Where {}", self.predicates.iter().join(" AND "))?;
        }

        Ok(())
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Filter {}", self.predicates.iter().join(" AND "))
    }
}
