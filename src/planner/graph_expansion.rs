use crate::planner::operator::select::SelectOperator;
use crate::planner::predicate::{BoundPredicate, Compensation, FieldPath};
use crate::planner::quantifier::Quantifier;

/// The partial query graph a predicate expands into: quantifiers to add to the
/// enclosing select, and predicates to conjoin to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphExpansion {
    quantifiers: Vec<Quantifier>,
    predicates: Vec<BoundPredicate>,
}

impl GraphExpansion {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of_predicate(predicate: BoundPredicate) -> Self {
        GraphExpansion {
            quantifiers: vec![],
            predicates: vec![predicate],
        }
    }

    pub fn of_quantifier(quantifier: Quantifier) -> Self {
        GraphExpansion {
            quantifiers: vec![quantifier],
            predicates: vec![],
        }
    }

    /// An existential quantifier together with the `Exists` test over it.
    pub fn of_exists(
        existential: Quantifier,
        unknown_if_missing: Option<FieldPath>,
        compensation: Option<Compensation>,
    ) -> Self {
        let predicate = BoundPredicate::Exists {
            existential: existential.alias(),
            unknown_if_missing,
            compensation,
        };

        GraphExpansion {
            quantifiers: vec![existential],
            predicates: vec![predicate],
        }
    }

    pub fn of_others(others: Vec<GraphExpansion>) -> Self {
        others
            .into_iter()
            .fold(GraphExpansion::empty(), |mut expansion, other| {
                expansion.quantifiers.extend(other.quantifiers);
                expansion.predicates.extend(other.predicates);
                expansion
            })
    }

    pub fn quantifiers(&self) -> &[Quantifier] {
        &self.quantifiers
    }

    pub fn predicates(&self) -> &[BoundPredicate] {
        &self.predicates
    }

    /// Splits into the quantifiers and a single predicate conjoining all predicates.
    pub fn seal(self) -> (Vec<Quantifier>, BoundPredicate) {
        (self.quantifiers, BoundPredicate::and(self.predicates))
    }

    /// A select ranging over `quantifier` (plus every quantifier of this expansion)
    /// and returning its rows.
    pub fn build_simple_select_over_quantifier(self, quantifier: Quantifier) -> SelectOperator {
        let result = quantifier.alias();
        let mut quantifiers = Vec::with_capacity(self.quantifiers.len() + 1);
        quantifiers.push(quantifier);
        quantifiers.extend(self.quantifiers);

        SelectOperator {
            quantifiers,
            predicates: self.predicates,
            result,
        }
    }
}
