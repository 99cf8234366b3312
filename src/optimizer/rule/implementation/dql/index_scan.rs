use crate::catalog::IndexRef;
use crate::errors::PlannerError;
use crate::expression::{Comparison, ComparisonType};
use crate::optimizer::core::bindings::BindingKey;
use crate::optimizer::core::memo::Memo;
use crate::optimizer::core::pattern::{
    for_each_quantifier_over_ref, members, scan_expression, simple_select_expression,
    BindingMatcher, ExpressionMatcher,
};
use crate::optimizer::core::rule::{CascadesRule, MatchPattern, RuleCall};
use crate::planner::operator::delete::DistinctOperator;
use crate::planner::operator::scan::IndexScanOperator;
use crate::planner::operator::select::{FilterOperator, SelectOperator};
use crate::planner::operator::{Operator, PhysicalOperator};
use crate::planner::predicate::BoundPredicate;
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use crate::types::value::DataValue;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const SELECT: BindingKey<RelationalExpression> = BindingKey::new("select");
const INNER: BindingKey<Quantifier> = BindingKey::new("inner");
const SCAN: BindingKey<RelationalExpression> = BindingKey::new("scan");

static INDEX_SCAN_PATTERN: LazyLock<ExpressionMatcher> = LazyLock::new(|| {
    simple_select_expression(
        SELECT,
        for_each_quantifier_over_ref(INNER, members(scan_expression(SCAN))),
    )
});

/// Answers one equality predicate of a select over a scan with a value index.
///
/// A predicate is sargable when it compares a field of the scanned record, or
/// tests that some element of a repeated field has a field equal to a
/// constant. The latter reads a fan-out index and is wrapped in a primary key
/// distinct. Predicates the index does not answer stay in a filter above it.
pub struct IndexScanImplementation;

impl MatchPattern for IndexScanImplementation {
    fn pattern(&self) -> &dyn BindingMatcher<RelationalExpression> {
        &*INDEX_SCAN_PATTERN
    }
}

impl CascadesRule for IndexScanImplementation {
    fn name(&self) -> &'static str {
        "ImplementIndexScan"
    }

    fn on_match(
        &self,
        call: &mut RuleCall<'_>,
    ) -> Result<Vec<RelationalExpression>, PlannerError> {
        let (
            RelationalExpression::Logical(Operator::Select(select)),
            RelationalExpression::Logical(Operator::Scan(scan)),
        ) = (call.get(&SELECT)?, call.get(&SCAN)?)
        else {
            return Ok(vec![]);
        };
        let inner = call.get(&INNER)?;
        if select.result != inner.alias() || call.indexes().is_empty() {
            return Ok(vec![]);
        }
        let mut predicates = select.predicates.clone();

        let record_type = match scan.record_types.as_slice() {
            [record_type] => record_type.clone(),
            record_types => {
                let Some((position, name)) =
                    predicates
                        .iter()
                        .enumerate()
                        .find_map(|(position, predicate)| match predicate {
                            BoundPredicate::RecordType { alias, name }
                                if *alias == inner.alias() && record_types.contains(name) =>
                            {
                                Some((position, name.clone()))
                            }
                            _ => None,
                        })
                else {
                    return Ok(vec![]);
                };
                predicates.remove(position);
                name
            }
        };
        let Some((position, index, key)) =
            predicates
                .iter()
                .enumerate()
                .find_map(|(position, predicate)| {
                    sargable(call.memo(), call.indexes(), &record_type, select, inner, predicate)
                        .map(|(index, key)| (position, index, key))
                })
        else {
            return Ok(vec![]);
        };
        predicates.remove(position);

        let select = select.clone();
        let inner = inner.clone();
        let index_scan = RelationalExpression::Physical(PhysicalOperator::IndexScan(
            IndexScanOperator {
                index: index.clone(),
                key,
            },
        ));
        let rows = if index.is_fan_out() {
            let index_ref = call.memoize_plan(index_scan);

            RelationalExpression::Physical(PhysicalOperator::UnorderedPrimaryKeyDistinct(
                DistinctOperator {
                    inner: inner.morph_physical(index_ref),
                },
            ))
        } else {
            index_scan
        };
        if predicates.is_empty() {
            return Ok(vec![rows]);
        }
        let rows_ref = call.memoize_plan(rows);

        let correlated = predicates
            .iter()
            .flat_map(BoundPredicate::correlated_to)
            .collect::<BTreeSet<_>>();
        let existentials = select
            .existentials()
            .filter(|quantifier| correlated.contains(&quantifier.alias()))
            .cloned()
            .collect_vec();

        Ok(vec![RelationalExpression::Physical(PhysicalOperator::Filter(
            FilterOperator {
                inner: inner.morph_physical(rows_ref),
                existentials,
                predicates,
            },
        ))])
    }
}

fn equality_key(comparison: &Comparison) -> Option<DataValue> {
    let is_equality = matches!(comparison.comparison_type(), ComparisonType::Equals);

    (is_equality && !comparison.operand().is_null()).then(|| comparison.operand().clone())
}

fn sargable(
    memo: &Memo,
    indexes: &[IndexRef],
    record_type: &str,
    select: &SelectOperator,
    inner: &Quantifier,
    predicate: &BoundPredicate,
) -> Option<(IndexRef, DataValue)> {
    let (path, key, fan_out) = match predicate {
        BoundPredicate::Value { field, comparison } if field.alias == inner.alias() => {
            (field.path.clone(), equality_key(comparison)?, false)
        }
        BoundPredicate::Exists { existential, .. } => {
            let quantifier = select
                .existentials()
                .find(|quantifier| quantifier.alias() == *existential)?;
            let (path, key) = memo
                .members(quantifier.reference())
                .ok()?
                .iter()
                .find_map(|member| exploded_equality(memo, inner, member))?;

            (path, key, true)
        }
        _ => return None,
    };

    indexes
        .iter()
        .find(|index| {
            index.record_type() == record_type
                && index.path() == path.as_slice()
                && index.is_fan_out() == fan_out
        })
        .map(|index| (index.clone(), key))
}

/// The indexed path and key when `member` selects the elements of a repeated
/// field of `inner` whose field equals a constant.
fn exploded_equality(
    memo: &Memo,
    inner: &Quantifier,
    member: &RelationalExpression,
) -> Option<(Vec<String>, DataValue)> {
    let RelationalExpression::Logical(Operator::Select(select)) = member else {
        return None;
    };
    let for_each = select.for_each()?;
    if select.has_existentials() || select.result != for_each.alias() {
        return None;
    }
    let [BoundPredicate::Value { field, comparison }] = select.predicates.as_slice() else {
        return None;
    };
    if field.alias != for_each.alias() {
        return None;
    }
    let key = equality_key(comparison)?;

    memo.members(for_each.reference())
        .ok()?
        .iter()
        .find_map(|member| match member {
            RelationalExpression::Logical(Operator::Explode(explode))
                if explode.source == inner.alias() =>
            {
                Some((
                    explode.path.iter().chain(&field.path).cloned().collect_vec(),
                    key.clone(),
                ))
            }
            _ => None,
        })
}
