pub mod delete;
pub mod explode;
pub mod scan;
pub mod select;

use self::{
    delete::{DeleteOperator, DistinctOperator},
    explode::ExplodeOperator,
    scan::{IndexScanOperator, ScanOperator},
    select::{FilterOperator, SelectOperator},
};
use crate::planner::quantifier::{CorrelationIdentifier, Quantifier};
use ahash::HashMap;
use itertools::Itertools;
use std::fmt;
use std::fmt::Formatter;

pub(crate) type AliasTranslation = HashMap<CorrelationIdentifier, CorrelationIdentifier>;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Operator {
    Scan(ScanOperator),
    Select(SelectOperator),
    Explode(ExplodeOperator),
    // DML
    Delete(DeleteOperator),
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum PhysicalOperator {
    Scan(ScanOperator),
    IndexScan(IndexScanOperator),
    Explode(ExplodeOperator),
    Filter(FilterOperator),
    UnorderedPrimaryKeyDistinct(DistinctOperator),
    // DML
    Delete(DeleteOperator),
}

fn translate(translation: &AliasTranslation, alias: CorrelationIdentifier) -> CorrelationIdentifier {
    translation.get(&alias).copied().unwrap_or(alias)
}

fn rebase_quantifier(translation: &AliasTranslation, quantifier: &Quantifier) -> Quantifier {
    Quantifier {
        alias: translate(translation, quantifier.alias),
        kind: quantifier.kind,
        reference: quantifier.reference,
    }
}

impl Operator {
    pub fn quantifiers(&self) -> Vec<&Quantifier> {
        match self {
            Operator::Scan(_) | Operator::Explode(_) => vec![],
            Operator::Select(op) => op.quantifiers.iter().collect_vec(),
            Operator::Delete(op) => vec![&op.inner],
        }
    }

    pub(crate) fn rebase(&self, translation: &AliasTranslation) -> Operator {
        match self {
            Operator::Scan(op) => Operator::Scan(op.clone()),
            Operator::Select(op) => Operator::Select(SelectOperator {
                quantifiers: op
                    .quantifiers
                    .iter()
                    .map(|quantifier| rebase_quantifier(translation, quantifier))
                    .collect_vec(),
                predicates: op
                    .predicates
                    .iter()
                    .map(|predicate| predicate.rebase(translation))
                    .collect_vec(),
                result: translate(translation, op.result),
            }),
            Operator::Explode(op) => Operator::Explode(ExplodeOperator {
                source: translate(translation, op.source),
                path: op.path.clone(),
            }),
            Operator::Delete(op) => Operator::Delete(DeleteOperator {
                inner: rebase_quantifier(translation, &op.inner),
                record_type: op.record_type.clone(),
            }),
        }
    }
}

impl PhysicalOperator {
    /// Child quantifiers, in the order a [`PhysicalPlan`](crate::planner::PhysicalPlan)
    /// lays out its children.
    pub fn quantifiers(&self) -> Vec<&Quantifier> {
        match self {
            PhysicalOperator::Scan(_)
            | PhysicalOperator::IndexScan(_)
            | PhysicalOperator::Explode(_) => vec![],
            PhysicalOperator::Filter(op) => std::iter::once(&op.inner)
                .chain(op.existentials.iter())
                .collect_vec(),
            PhysicalOperator::UnorderedPrimaryKeyDistinct(op) => vec![&op.inner],
            PhysicalOperator::Delete(op) => vec![&op.inner],
        }
    }

    pub(crate) fn rebase(&self, translation: &AliasTranslation) -> PhysicalOperator {
        match self {
            PhysicalOperator::Scan(op) => PhysicalOperator::Scan(op.clone()),
            PhysicalOperator::IndexScan(op) => PhysicalOperator::IndexScan(op.clone()),
            PhysicalOperator::Explode(op) => PhysicalOperator::Explode(ExplodeOperator {
                source: translate(translation, op.source),
                path: op.path.clone(),
            }),
            PhysicalOperator::Filter(op) => PhysicalOperator::Filter(FilterOperator {
                inner: rebase_quantifier(translation, &op.inner),
                existentials: op
                    .existentials
                    .iter()
                    .map(|quantifier| rebase_quantifier(translation, quantifier))
                    .collect_vec(),
                predicates: op
                    .predicates
                    .iter()
                    .map(|predicate| predicate.rebase(translation))
                    .collect_vec(),
            }),
            PhysicalOperator::UnorderedPrimaryKeyDistinct(op) => {
                PhysicalOperator::UnorderedPrimaryKeyDistinct(DistinctOperator {
                    inner: rebase_quantifier(translation, &op.inner),
                })
            }
            PhysicalOperator::Delete(op) => PhysicalOperator::Delete(DeleteOperator {
                inner: rebase_quantifier(translation, &op.inner),
                record_type: op.record_type.clone(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Operator::Scan(op) => write!(f, "{}", op),
            Operator::Select(op) => write!(f, "{}", op),
            Operator::Explode(op) => write!(f, "{}", op),
            Operator::Delete(op) => write!(f, "{}", op),
        }
    }
}

impl fmt::Display for PhysicalOperator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PhysicalOperator::Scan(op) => write!(f, "{}", op),
            PhysicalOperator::IndexScan(op) => write!(f, "{}", op),
            PhysicalOperator::Explode(op) => write!(f, "{}", op),
            PhysicalOperator::Filter(op) => write!(f, "{}", op),
            PhysicalOperator::UnorderedPrimaryKeyDistinct(op) => write!(f, "{}", op),
            PhysicalOperator::Delete(op) => write!(f, "{}", op),
        }
    }
}
