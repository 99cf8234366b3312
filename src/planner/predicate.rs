use crate::expression::{Comparison, Predicate};
use crate::planner::quantifier::CorrelationIdentifier;
use crate::util::hash_utils::{hash_node, stable_hash, PlanHashMode, PlanHashable};
use ahash::HashMap;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Formatter;

/// A field path read from the row bound to `alias`. An empty path is the row itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub(crate) alias: CorrelationIdentifier,
    pub(crate) path: Vec<String>,
}

impl FieldPath {
    pub fn new(alias: CorrelationIdentifier, path: Vec<String>) -> Self {
        FieldPath { alias, path }
    }
}

/// The declarative form of an existential predicate, anchored at the row bound to
/// `alias`. Re-applied as a residual filter when the existential sub-plan is not used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compensation {
    pub(crate) alias: CorrelationIdentifier,
    pub(crate) component: Predicate,
}

impl Compensation {
    pub fn new(alias: CorrelationIdentifier, component: Predicate) -> Self {
        Compensation { alias, component }
    }

    pub fn component(&self) -> &Predicate {
        &self.component
    }
}

/// A predicate over quantifier-bound rows, as it lives inside the expression graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoundPredicate {
    Value {
        field: FieldPath,
        comparison: Comparison,
    },
    And(Vec<BoundPredicate>),
    Or(Vec<BoundPredicate>),
    Not(Box<BoundPredicate>),
    /// True iff the existential quantifier `existential` produces at least one row.
    /// Unknown instead when `unknown_if_missing` is set and that message is missing.
    Exists {
        existential: CorrelationIdentifier,
        unknown_if_missing: Option<FieldPath>,
        compensation: Option<Compensation>,
    },
    RecordType {
        alias: CorrelationIdentifier,
        name: String,
    },
    Residual(Compensation),
}

impl BoundPredicate {
    pub fn and(mut predicates: Vec<BoundPredicate>) -> BoundPredicate {
        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            BoundPredicate::And(predicates)
        }
    }

    /// Aliases this predicate reads from.
    pub fn correlated_to(&self) -> BTreeSet<CorrelationIdentifier> {
        fn collect(predicate: &BoundPredicate, aliases: &mut BTreeSet<CorrelationIdentifier>) {
            match predicate {
                BoundPredicate::Value { field, .. } => {
                    aliases.insert(field.alias);
                }
                BoundPredicate::And(predicates) | BoundPredicate::Or(predicates) => {
                    for predicate in predicates {
                        collect(predicate, aliases);
                    }
                }
                BoundPredicate::Not(predicate) => collect(predicate, aliases),
                BoundPredicate::Exists {
                    existential,
                    unknown_if_missing,
                    compensation,
                } => {
                    aliases.insert(*existential);
                    if let Some(container) = unknown_if_missing {
                        aliases.insert(container.alias);
                    }
                    if let Some(compensation) = compensation {
                        aliases.insert(compensation.alias);
                    }
                }
                BoundPredicate::RecordType { alias, .. } => {
                    aliases.insert(*alias);
                }
                BoundPredicate::Residual(compensation) => {
                    aliases.insert(compensation.alias);
                }
            }
        }
        let mut aliases = BTreeSet::new();
        collect(self, &mut aliases);
        aliases
    }

    /// Renames every alias found in `translation`, leaving others untouched.
    pub fn rebase(
        &self,
        translation: &HashMap<CorrelationIdentifier, CorrelationIdentifier>,
    ) -> BoundPredicate {
        let translate = |alias: &CorrelationIdentifier| *translation.get(alias).unwrap_or(alias);
        let rebase_compensation = |compensation: &Compensation| Compensation {
            alias: translate(&compensation.alias),
            component: compensation.component.clone(),
        };

        match self {
            BoundPredicate::Value { field, comparison } => BoundPredicate::Value {
                field: FieldPath::new(translate(&field.alias), field.path.clone()),
                comparison: comparison.clone(),
            },
            BoundPredicate::And(predicates) => BoundPredicate::And(
                predicates
                    .iter()
                    .map(|predicate| predicate.rebase(translation))
                    .collect_vec(),
            ),
            BoundPredicate::Or(predicates) => BoundPredicate::Or(
                predicates
                    .iter()
                    .map(|predicate| predicate.rebase(translation))
                    .collect_vec(),
            ),
            BoundPredicate::Not(predicate) => {
                BoundPredicate::Not(Box::new(predicate.rebase(translation)))
            }
            BoundPredicate::Exists {
                existential,
                unknown_if_missing,
                compensation,
            } => BoundPredicate::Exists {
                existential: translate(existential),
                unknown_if_missing: unknown_if_missing.as_ref().map(|container| {
                    FieldPath::new(translate(&container.alias), container.path.clone())
                }),
                compensation: compensation.as_ref().map(rebase_compensation),
            },
            BoundPredicate::RecordType { alias, name } => BoundPredicate::RecordType {
                alias: translate(alias),
                name: name.clone(),
            },
            BoundPredicate::Residual(compensation) => {
                BoundPredicate::Residual(rebase_compensation(compensation))
            }
        }
    }

    /// Replaces every `Exists` by its compensation. `None` if some `Exists` has none.
    pub fn with_compensations(&self) -> Option<BoundPredicate> {
        Some(match self {
            BoundPredicate::And(predicates) => BoundPredicate::And(
                predicates
                    .iter()
                    .map(BoundPredicate::with_compensations)
                    .collect::<Option<Vec<_>>>()?,
            ),
            BoundPredicate::Or(predicates) => BoundPredicate::Or(
                predicates
                    .iter()
                    .map(BoundPredicate::with_compensations)
                    .collect::<Option<Vec<_>>>()?,
            ),
            BoundPredicate::Not(predicate) => {
                BoundPredicate::Not(Box::new(predicate.with_compensations()?))
            }
            BoundPredicate::Exists { compensation, .. } => {
                BoundPredicate::Residual(compensation.clone()?)
            }
            predicate => predicate.clone(),
        })
    }

    pub fn contains_exists(&self) -> bool {
        match self {
            BoundPredicate::Exists { .. } => true,
            BoundPredicate::And(predicates) | BoundPredicate::Or(predicates) => {
                predicates.iter().any(BoundPredicate::contains_exists)
            }
            BoundPredicate::Not(predicate) => predicate.contains_exists(),
            _ => false,
        }
    }
}

/// Aliases are left out, so the hash does not depend on how quantifiers were named.
impl PlanHashable for BoundPredicate {
    fn plan_hash(&self, mode: PlanHashMode) -> u64 {
        match self {
            BoundPredicate::Value { field, comparison } => hash_node(
                mode,
                "Value",
                [stable_hash(&field.path), comparison.plan_hash(mode)],
            ),
            BoundPredicate::And(predicates) => hash_node(
                mode,
                "And",
                predicates.iter().map(|predicate| predicate.plan_hash(mode)),
            ),
            BoundPredicate::Or(predicates) => hash_node(
                mode,
                "Or",
                predicates.iter().map(|predicate| predicate.plan_hash(mode)),
            ),
            BoundPredicate::Not(predicate) => hash_node(mode, "Not", [predicate.plan_hash(mode)]),
            BoundPredicate::Exists {
                unknown_if_missing,
                compensation,
                ..
            } => hash_node(
                mode,
                "Exists",
                [
                    stable_hash(&unknown_if_missing.as_ref().map(|container| &container.path)),
                    compensation
                        .as_ref()
                        .map_or(0, |compensation| compensation.component.plan_hash(mode)),
                ],
            ),
            BoundPredicate::RecordType { name, .. } => {
                hash_node(mode, "RecordType", [stable_hash(name)])
            }
            BoundPredicate::Residual(compensation) => {
                hash_node(mode, "Residual", [compensation.component.plan_hash(mode)])
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.alias)
        } else {
            write!(f, "{}.{}", self.alias, self.path.iter().join("."))
        }
    }
}

impl fmt::Display for BoundPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BoundPredicate::Value { field, comparison } => write!(f, "{} {}", field, comparison),
            BoundPredicate::And(predicates) => {
                write!(f, "({})", predicates.iter().join(" AND "))
            }
            BoundPredicate::Or(predicates) => write!(f, "({})", predicates.iter().join(" OR ")),
            BoundPredicate::Not(predicate) => write!(f, "NOT {}", predicate),
            BoundPredicate::Exists { existential, .. } => write!(f, "EXISTS {}", existential),
            BoundPredicate::RecordType { alias, name } => {
                write!(f, "{}.record_type = {}", alias, name)
            }
            BoundPredicate::Residual(compensation) => {
                write!(f, "{} MATCHES {}", compensation.alias, compensation.component)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::{Comparison, Predicate};
    use crate::planner::predicate::{BoundPredicate, Compensation, FieldPath};
    use crate::planner::quantifier::AliasGenerator;
    use ahash::HashMap;

    #[test]
    fn test_rebase_and_compensate() {
        let mut aliases = AliasGenerator::default();
        let base = aliases.next_alias();
        let existential = aliases.next_alias();
        let renamed = aliases.next_alias();

        let component = Predicate::one_of_them(
            "tags",
            Predicate::field("name", Comparison::equals("x")),
        );
        let predicate = BoundPredicate::Or(vec![
            BoundPredicate::Value {
                field: FieldPath::new(base, vec!["id".to_string()]),
                comparison: Comparison::equals(1i64),
            },
            BoundPredicate::Exists {
                existential,
                unknown_if_missing: Some(FieldPath::new(base, vec![])),
                compensation: Some(Compensation::new(base, component.clone())),
            },
        ]);
        assert!(predicate.contains_exists());
        assert_eq!(
            predicate.correlated_to().into_iter().collect::<Vec<_>>(),
            vec![base, existential]
        );

        let mut translation = HashMap::default();
        translation.insert(base, renamed);
        let rebased = predicate.rebase(&translation);
        assert!(!rebased.correlated_to().contains(&base));

        let compensated = rebased.with_compensations();
        assert_eq!(
            compensated,
            Some(BoundPredicate::Or(vec![
                BoundPredicate::Value {
                    field: FieldPath::new(renamed, vec!["id".to_string()]),
                    comparison: Comparison::equals(1i64),
                },
                BoundPredicate::Residual(Compensation::new(renamed, component)),
            ]))
        );

        let uncompensated = BoundPredicate::Exists {
            existential,
            unknown_if_missing: None,
            compensation: None,
        };
        assert_eq!(uncompensated.with_compensations(), None);
    }
}
