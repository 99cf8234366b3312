use crate::optimizer::core::bindings::{Bindable, BindingKey, PlannerBindings};
use crate::optimizer::core::memo::{Memo, ReferenceId};
use crate::optimizer::core::partition::PlanPartition;
use crate::optimizer::core::property::PlanProperty;
use crate::planner::operator::Operator;
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use itertools::Itertools;

/// A structural pattern over `T`. Matching yields one binding map per way the
/// pattern fits; no bindings means no match.
pub trait BindingMatcher<T>: Send + Sync {
    fn bind_matches(&self, memo: &Memo, subject: &T) -> Vec<PlannerBindings>;

    /// Every key a successful match binds.
    fn keys(&self, keys: &mut Vec<&'static str>);
}

pub enum PatternChildrenPredicate {
    /// children are not looked at
    None,
    /// the expression's only for-each quantifier must match
    ForEach(Box<dyn BindingMatcher<Quantifier>>),
}

/// Matches one expression by predicate, then (optionally) its for-each quantifier.
pub struct ExpressionMatcher {
    key: &'static str,
    /// The root node predicate, not contains the children.
    predicate: fn(&RelationalExpression) -> bool,
    children: PatternChildrenPredicate,
}

impl BindingMatcher<RelationalExpression> for ExpressionMatcher {
    fn bind_matches(&self, memo: &Memo, subject: &RelationalExpression) -> Vec<PlannerBindings> {
        if !(self.predicate)(subject) {
            return vec![];
        }
        let bindings = PlannerBindings::of(self.key, Bindable::Expression(subject.clone()));

        match &self.children {
            PatternChildrenPredicate::None => vec![bindings],
            PatternChildrenPredicate::ForEach(matcher) => {
                let Ok(for_each) = subject
                    .quantifiers()
                    .into_iter()
                    .filter(|quantifier| quantifier.is_for_each())
                    .exactly_one()
                else {
                    return vec![];
                };

                matcher
                    .bind_matches(memo, for_each)
                    .into_iter()
                    .map(|child| bindings.clone().merged_with(child))
                    .collect_vec()
            }
        }
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        keys.push(self.key);
        if let PatternChildrenPredicate::ForEach(matcher) = &self.children {
            matcher.keys(keys);
        }
    }
}

/// Matches a quantifier by predicate, then (optionally) the reference it ranges over.
pub struct QuantifierMatcher {
    key: &'static str,
    predicate: fn(&Quantifier) -> bool,
    reference: Option<Box<dyn BindingMatcher<ReferenceId>>>,
}

impl BindingMatcher<Quantifier> for QuantifierMatcher {
    fn bind_matches(&self, memo: &Memo, subject: &Quantifier) -> Vec<PlannerBindings> {
        if !(self.predicate)(subject) {
            return vec![];
        }
        let bindings = PlannerBindings::of(self.key, Bindable::Quantifier(subject.clone()));

        match &self.reference {
            None => vec![bindings],
            Some(matcher) => matcher
                .bind_matches(memo, &subject.reference())
                .into_iter()
                .map(|child| bindings.clone().merged_with(child))
                .collect_vec(),
        }
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        keys.push(self.key);
        if let Some(matcher) = &self.reference {
            matcher.keys(keys);
        }
    }
}

/// Fans out over a snapshot of the reference's members: one match per member
/// the child matcher accepts.
pub struct MembersMatcher {
    child: Box<dyn BindingMatcher<RelationalExpression>>,
}

impl BindingMatcher<ReferenceId> for MembersMatcher {
    fn bind_matches(&self, memo: &Memo, subject: &ReferenceId) -> Vec<PlannerBindings> {
        let Ok(members) = memo.members_snapshot(*subject) else {
            return vec![];
        };

        members
            .iter()
            .flat_map(|member| self.child.bind_matches(memo, member))
            .collect_vec()
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        self.child.keys(keys);
    }
}

/// Partitions the reference's physical members and hands the partitions on.
pub struct PlanPartitionsMatcher {
    properties: Vec<PlanProperty>,
    child: Box<dyn BindingMatcher<Vec<PlanPartition>>>,
}

impl BindingMatcher<ReferenceId> for PlanPartitionsMatcher {
    fn bind_matches(&self, memo: &Memo, subject: &ReferenceId) -> Vec<PlannerBindings> {
        match memo.partition_by(*subject, &self.properties) {
            Ok(partitions) => self.child.bind_matches(memo, &partitions),
            Err(_) => vec![],
        }
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        self.child.keys(keys);
    }
}

pub struct FilterPartitionsMatcher {
    predicate: fn(&PlanPartition) -> bool,
    child: Box<dyn BindingMatcher<Vec<PlanPartition>>>,
}

impl BindingMatcher<Vec<PlanPartition>> for FilterPartitionsMatcher {
    fn bind_matches(&self, memo: &Memo, subject: &Vec<PlanPartition>) -> Vec<PlannerBindings> {
        let partitions = subject
            .iter()
            .filter(|partition| (self.predicate)(partition))
            .cloned()
            .collect_vec();

        self.child.bind_matches(memo, &partitions)
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        self.child.keys(keys);
    }
}

/// One match per partition.
pub struct AnyPartitionMatcher {
    key: &'static str,
}

impl BindingMatcher<Vec<PlanPartition>> for AnyPartitionMatcher {
    fn bind_matches(&self, _: &Memo, subject: &Vec<PlanPartition>) -> Vec<PlannerBindings> {
        subject
            .iter()
            .map(|partition| PlannerBindings::of(self.key, Bindable::Partition(partition.clone())))
            .collect_vec()
    }

    fn keys(&self, keys: &mut Vec<&'static str>) {
        keys.push(self.key);
    }
}

pub fn scan_expression(key: BindingKey<RelationalExpression>) -> ExpressionMatcher {
    ExpressionMatcher {
        key: key.name(),
        predicate: |expression| {
            matches!(expression, RelationalExpression::Logical(Operator::Scan(_)))
        },
        children: PatternChildrenPredicate::None,
    }
}

pub fn explode_expression(key: BindingKey<RelationalExpression>) -> ExpressionMatcher {
    ExpressionMatcher {
        key: key.name(),
        predicate: |expression| {
            matches!(expression, RelationalExpression::Logical(Operator::Explode(_)))
        },
        children: PatternChildrenPredicate::None,
    }
}

/// A logical select with exactly one for-each quantifier.
pub fn simple_select_expression(
    key: BindingKey<RelationalExpression>,
    for_each: impl BindingMatcher<Quantifier> + 'static,
) -> ExpressionMatcher {
    ExpressionMatcher {
        key: key.name(),
        predicate: |expression| match expression {
            RelationalExpression::Logical(Operator::Select(select)) => select.for_each().is_some(),
            _ => false,
        },
        children: PatternChildrenPredicate::ForEach(Box::new(for_each)),
    }
}

pub fn delete_expression(
    key: BindingKey<RelationalExpression>,
    for_each: impl BindingMatcher<Quantifier> + 'static,
) -> ExpressionMatcher {
    ExpressionMatcher {
        key: key.name(),
        predicate: |expression| {
            matches!(expression, RelationalExpression::Logical(Operator::Delete(_)))
        },
        children: PatternChildrenPredicate::ForEach(Box::new(for_each)),
    }
}

pub fn for_each_quantifier(key: BindingKey<Quantifier>) -> QuantifierMatcher {
    QuantifierMatcher {
        key: key.name(),
        predicate: Quantifier::is_for_each,
        reference: None,
    }
}

pub fn for_each_quantifier_over_ref(
    key: BindingKey<Quantifier>,
    reference: impl BindingMatcher<ReferenceId> + 'static,
) -> QuantifierMatcher {
    QuantifierMatcher {
        key: key.name(),
        predicate: Quantifier::is_for_each,
        reference: Some(Box::new(reference)),
    }
}

pub fn members(child: impl BindingMatcher<RelationalExpression> + 'static) -> MembersMatcher {
    MembersMatcher {
        child: Box::new(child),
    }
}

pub fn plan_partitions(
    properties: Vec<PlanProperty>,
    child: impl BindingMatcher<Vec<PlanPartition>> + 'static,
) -> PlanPartitionsMatcher {
    PlanPartitionsMatcher {
        properties,
        child: Box::new(child),
    }
}

pub fn filter_plan_partitions(
    predicate: fn(&PlanPartition) -> bool,
    child: impl BindingMatcher<Vec<PlanPartition>> + 'static,
) -> FilterPartitionsMatcher {
    FilterPartitionsMatcher {
        predicate,
        child: Box::new(child),
    }
}

pub fn any_plan_partition(key: BindingKey<PlanPartition>) -> AnyPartitionMatcher {
    AnyPartitionMatcher { key: key.name() }
}

#[cfg(test)]
mod tests {
    use crate::errors::PlannerError;
    use crate::optimizer::core::bindings::BindingKey;
    use crate::optimizer::core::memo::Memo;
    use crate::optimizer::core::partition::PlanPartition;
    use crate::optimizer::core::pattern::{
        any_plan_partition, delete_expression, for_each_quantifier_over_ref, members,
        plan_partitions, scan_expression, BindingMatcher,
    };
    use crate::optimizer::core::property::PlanProperty;
    use crate::planner::operator::delete::DeleteOperator;
    use crate::planner::operator::scan::ScanOperator;
    use crate::planner::operator::{Operator, PhysicalOperator};
    use crate::planner::quantifier::Quantifier;
    use crate::planner::RelationalExpression;

    const DELETE: BindingKey<RelationalExpression> = BindingKey::new("delete");
    const INNER: BindingKey<Quantifier> = BindingKey::new("inner");
    const SCAN: BindingKey<RelationalExpression> = BindingKey::new("scan");
    const PARTITION: BindingKey<PlanPartition> = BindingKey::new("partition");

    fn scan(physical: bool) -> RelationalExpression {
        scan_of("Order", physical)
    }

    fn scan_of(record_type: &str, physical: bool) -> RelationalExpression {
        let op = ScanOperator::new(vec![record_type.to_string()]);
        if physical {
            RelationalExpression::Physical(PhysicalOperator::Scan(op))
        } else {
            RelationalExpression::Logical(Operator::Scan(op))
        }
    }

    #[test]
    fn test_members_fan_out() {
        let mut memo = Memo::new();
        let reference = memo.initial_of(scan(false));
        let alias = memo.new_alias();
        let delete = RelationalExpression::Logical(Operator::Delete(DeleteOperator {
            inner: Quantifier::for_each(alias, reference),
            record_type: "Order".to_string(),
        }));

        let over_members = delete_expression(
            DELETE,
            for_each_quantifier_over_ref(INNER, members(scan_expression(SCAN))),
        );
        let bindings = over_members.bind_matches(&memo, &delete);
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].contains_key("delete"));
        assert!(bindings[0].contains_key("inner"));
        assert!(bindings[0].contains_key("scan"));

        let mut keys = vec![];
        over_members.keys(&mut keys);
        assert_eq!(keys, vec!["delete", "inner", "scan"]);

        // no physical member yet: no partition to bind
        let over_partitions = delete_expression(
            DELETE,
            for_each_quantifier_over_ref(
                INNER,
                plan_partitions(vec![PlanProperty::StoredRecord], any_plan_partition(PARTITION)),
            ),
        );
        assert!(over_partitions.bind_matches(&memo, &delete).is_empty());

        let _ = memo.insert_or_find_equivalent(reference, scan(true));
        let bindings = over_partitions.bind_matches(&memo, &delete);
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].contains_key("partition"));
        // the logical scan is not a delete
        assert!(over_partitions.bind_matches(&memo, &scan(false)).is_empty());
    }

    #[test]
    fn test_members_fan_out_over_alternatives() -> Result<(), PlannerError> {
        let mut memo = Memo::new();
        let reference = memo.from_members(vec![
            scan_of("Order", false),
            scan_of("Item", false),
            scan_of("Order", true),
        ])?;

        let bindings = members(scan_expression(SCAN)).bind_matches(&memo, &reference);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].get(&SCAN)?, &scan_of("Order", false));
        assert_eq!(bindings[1].get(&SCAN)?, &scan_of("Item", false));

        let partitions = plan_partitions(vec![], any_plan_partition(PARTITION))
            .bind_matches(&memo, &reference);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].get(&PARTITION)?.plans(), &[scan_of("Order", true)]);

        Ok(())
    }
}
