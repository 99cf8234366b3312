use crate::expression::{EmptyMode, Predicate};
use crate::optimizer::core::memo::Memo;
use crate::planner::graph_expansion::GraphExpansion;
use crate::planner::operator::explode::ExplodeOperator;
use crate::planner::operator::Operator;
use crate::planner::predicate::{BoundPredicate, Compensation, FieldPath};
use crate::planner::quantifier::Quantifier;
use crate::planner::RelationalExpression;
use itertools::Itertools;

impl Predicate {
    /// Expands this predicate into quantifiers and bound predicates over `base`.
    ///
    /// `prefix` is the path of nested fields already crossed below `base`. Each
    /// repeated-field quantification opens a new scope: an explode over the
    /// accumulated path, a select over it, and an existential quantifier over that
    /// select. `outer` supplies the quantifier of the stored record itself.
    pub fn expand(
        &self,
        base: &Quantifier,
        outer: &dyn Fn() -> Quantifier,
        prefix: &[String],
        memo: &mut Memo,
    ) -> GraphExpansion {
        match self {
            Predicate::Field { name, comparison } => {
                GraphExpansion::of_predicate(BoundPredicate::Value {
                    field: FieldPath::new(base.alias(), with_name(prefix, name)),
                    comparison: comparison.clone(),
                })
            }
            Predicate::And(children) => GraphExpansion::of_others(
                children
                    .iter()
                    .map(|child| child.expand(base, outer, prefix, memo))
                    .collect_vec(),
            ),
            Predicate::Or(children) => {
                let mut quantifiers = Vec::new();
                let mut predicates = Vec::with_capacity(children.len());

                for child in children {
                    let (child_quantifiers, predicate) =
                        child.expand(base, outer, prefix, memo).seal();
                    quantifiers.extend(child_quantifiers);
                    predicates.push(predicate);
                }

                GraphExpansion::of_others(
                    quantifiers
                        .into_iter()
                        .map(GraphExpansion::of_quantifier)
                        .chain([GraphExpansion::of_predicate(BoundPredicate::Or(predicates))])
                        .collect_vec(),
                )
            }
            Predicate::Not(child) => {
                let (quantifiers, predicate) = child.expand(base, outer, prefix, memo).seal();

                GraphExpansion::of_others(
                    quantifiers
                        .into_iter()
                        .map(GraphExpansion::of_quantifier)
                        .chain([GraphExpansion::of_predicate(BoundPredicate::Not(
                            Box::new(predicate),
                        ))])
                        .collect_vec(),
                )
            }
            Predicate::Nested { name, child } => {
                child.expand(base, outer, &with_name(prefix, name), memo)
            }
            Predicate::OneOfThem {
                name,
                empty_mode,
                child,
            } => self.expand_repeated(base, prefix, name, *empty_mode, memo, |child_base, memo| {
                child.expand(child_base, outer, &[], memo)
            }),
            Predicate::OneOfThemValue {
                name,
                empty_mode,
                comparison,
            } => self.expand_repeated(base, prefix, name, *empty_mode, memo, |child_base, _| {
                GraphExpansion::of_predicate(BoundPredicate::Value {
                    field: FieldPath::new(child_base.alias(), vec![]),
                    comparison: comparison.clone(),
                })
            }),
            Predicate::RecordType(name) => GraphExpansion::of_predicate(BoundPredicate::RecordType {
                alias: outer().alias(),
                name: name.clone(),
            }),
        }
    }

    fn expand_repeated(
        &self,
        base: &Quantifier,
        prefix: &[String],
        name: &str,
        empty_mode: EmptyMode,
        memo: &mut Memo,
        expand_child: impl FnOnce(&Quantifier, &mut Memo) -> GraphExpansion,
    ) -> GraphExpansion {
        let explode = ExplodeOperator {
            source: base.alias(),
            path: with_name(prefix, name),
        };
        let explode_ref = memo.memoize(RelationalExpression::Logical(Operator::Explode(explode)));
        let child_base = Quantifier::for_each(memo.new_alias(), explode_ref);

        let select = expand_child(&child_base, memo).build_simple_select_over_quantifier(child_base);
        let select_ref = memo.memoize(RelationalExpression::Logical(Operator::Select(select)));
        let existential = Quantifier::existential(memo.new_alias(), select_ref);

        // the same predicate, re-anchored at `base`
        let component = prefix
            .iter()
            .rev()
            .fold(self.clone(), |predicate, name| {
                Predicate::nested(name.clone(), predicate)
            });
        let unknown_if_missing = match empty_mode {
            EmptyMode::Unknown => Some(FieldPath::new(base.alias(), prefix.to_vec())),
            EmptyMode::NoMatches => None,
        };

        GraphExpansion::of_exists(
            existential,
            unknown_if_missing,
            Some(Compensation::new(base.alias(), component)),
        )
    }
}

fn with_name(prefix: &[String], name: &str) -> Vec<String> {
    let mut path = Vec::with_capacity(prefix.len() + 1);
    path.extend_from_slice(prefix);
    path.push(name.to_string());
    path
}
