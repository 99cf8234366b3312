pub mod evaluator;
pub mod expansion;
pub mod validate;

use crate::types::value::DataValue;
use crate::util::hash_utils::{hash_node, stable_hash, PlanHashMode, PlanHashable};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    StartsWith,
    IsNull,
    NotNull,
}

impl ComparisonType {
    /// Whether the comparison tests nullness rather than comparing a value.
    pub fn is_unary(&self) -> bool {
        matches!(self, ComparisonType::IsNull | ComparisonType::NotNull)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparison {
    pub(crate) ty: ComparisonType,
    pub(crate) operand: DataValue,
}

impl Comparison {
    pub fn new(ty: ComparisonType, operand: impl Into<DataValue>) -> Self {
        Comparison {
            ty,
            operand: operand.into(),
        }
    }

    pub fn equals(operand: impl Into<DataValue>) -> Self {
        Self::new(ComparisonType::Equals, operand)
    }

    pub fn not_equals(operand: impl Into<DataValue>) -> Self {
        Self::new(ComparisonType::NotEquals, operand)
    }

    pub fn less_than(operand: impl Into<DataValue>) -> Self {
        Self::new(ComparisonType::LessThan, operand)
    }

    pub fn greater_than(operand: impl Into<DataValue>) -> Self {
        Self::new(ComparisonType::GreaterThan, operand)
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::new(ComparisonType::StartsWith, prefix.into())
    }

    pub fn is_null() -> Self {
        Comparison {
            ty: ComparisonType::IsNull,
            operand: DataValue::Null,
        }
    }

    pub fn not_null() -> Self {
        Comparison {
            ty: ComparisonType::NotNull,
            operand: DataValue::Null,
        }
    }

    pub fn comparison_type(&self) -> ComparisonType {
        self.ty
    }

    pub fn operand(&self) -> &DataValue {
        &self.operand
    }

    /// Three-valued: `None` when either side is null (or the two are incomparable),
    /// except for the nullness tests which always decide.
    pub fn eval(&self, value: &DataValue) -> Option<bool> {
        match self.ty {
            ComparisonType::IsNull => return Some(value.is_null()),
            ComparisonType::NotNull => return Some(!value.is_null()),
            _ => (),
        }
        if value.is_null() || self.operand.is_null() {
            return None;
        }
        if self.ty == ComparisonType::StartsWith {
            return Some(value.as_str()?.starts_with(self.operand.as_str()?));
        }
        let ordering = value.compare(&self.operand)?;

        Some(match self.ty {
            ComparisonType::Equals => ordering == Ordering::Equal,
            ComparisonType::NotEquals => ordering != Ordering::Equal,
            ComparisonType::LessThan => ordering == Ordering::Less,
            ComparisonType::LessThanOrEquals => ordering != Ordering::Greater,
            ComparisonType::GreaterThan => ordering == Ordering::Greater,
            ComparisonType::GreaterThanOrEquals => ordering != Ordering::Less,
            ComparisonType::StartsWith | ComparisonType::IsNull | ComparisonType::NotNull => {
                unreachable!()
            }
        })
    }
}

/// How a repeated-field quantification treats a missing enclosing message.
///
/// An absent or empty repeated field never matches, whatever the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmptyMode {
    /// Missing container propagates as unknown.
    #[default]
    Unknown,
    /// Missing container is simply no match.
    NoMatches,
}

/// A declarative filter over a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    Field {
        name: String,
        comparison: Comparison,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Applies `child` to the nested message held by singular field `name`.
    Nested {
        name: String,
        child: Box<Predicate>,
    },
    /// Satisfied if some element of repeated message field `name` satisfies `child`.
    OneOfThem {
        name: String,
        empty_mode: EmptyMode,
        child: Box<Predicate>,
    },
    /// Satisfied if some element of repeated scalar field `name` satisfies `comparison`.
    OneOfThemValue {
        name: String,
        empty_mode: EmptyMode,
        comparison: Comparison,
    },
    RecordType(String),
}

impl Predicate {
    pub fn field(name: impl Into<String>, comparison: Comparison) -> Self {
        Predicate::Field {
            name: name.into(),
            comparison,
        }
    }

    pub fn and(children: Vec<Predicate>) -> Self {
        Predicate::And(children)
    }

    pub fn or(children: Vec<Predicate>) -> Self {
        Predicate::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }

    pub fn nested(name: impl Into<String>, child: Predicate) -> Self {
        Predicate::Nested {
            name: name.into(),
            child: Box::new(child),
        }
    }

    pub fn one_of_them(name: impl Into<String>, child: Predicate) -> Self {
        Self::one_of_them_with_mode(name, EmptyMode::default(), child)
    }

    pub fn one_of_them_with_mode(
        name: impl Into<String>,
        empty_mode: EmptyMode,
        child: Predicate,
    ) -> Self {
        Predicate::OneOfThem {
            name: name.into(),
            empty_mode,
            child: Box::new(child),
        }
    }

    pub fn one_of_them_value(name: impl Into<String>, comparison: Comparison) -> Self {
        Predicate::OneOfThemValue {
            name: name.into(),
            empty_mode: EmptyMode::default(),
            comparison,
        }
    }

    pub fn record_type(name: impl Into<String>) -> Self {
        Predicate::RecordType(name.into())
    }
}

impl PlanHashable for Comparison {
    fn plan_hash(&self, mode: PlanHashMode) -> u64 {
        hash_node(
            mode,
            "Comparison",
            [stable_hash(&self.ty), stable_hash(&self.operand.to_string())],
        )
    }
}

impl PlanHashable for Predicate {
    fn plan_hash(&self, mode: PlanHashMode) -> u64 {
        match self {
            Predicate::Field { name, comparison } => hash_node(
                mode,
                "Field",
                [stable_hash(name), comparison.plan_hash(mode)],
            ),
            Predicate::And(children) => hash_node(
                mode,
                "And",
                children.iter().map(|child| child.plan_hash(mode)),
            ),
            Predicate::Or(children) => hash_node(
                mode,
                "Or",
                children.iter().map(|child| child.plan_hash(mode)),
            ),
            Predicate::Not(child) => hash_node(mode, "Not", [child.plan_hash(mode)]),
            Predicate::Nested { name, child } => {
                hash_node(mode, "Nested", [stable_hash(name), child.plan_hash(mode)])
            }
            Predicate::OneOfThem {
                name,
                empty_mode,
                child,
            } => hash_node(
                mode,
                "OneOfThem",
                [
                    stable_hash(name),
                    stable_hash(empty_mode),
                    child.plan_hash(mode),
                ],
            ),
            Predicate::OneOfThemValue {
                name,
                empty_mode,
                comparison,
            } => hash_node(
                mode,
                "OneOfThemValue",
                [
                    stable_hash(name),
                    stable_hash(empty_mode),
                    comparison.plan_hash(mode),
                ],
            ),
            Predicate::RecordType(name) => hash_node(mode, "RecordType", [stable_hash(name)]),
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            ComparisonType::Equals => "EQUALS",
            ComparisonType::NotEquals => "NOT_EQUALS",
            ComparisonType::LessThan => "LESS_THAN",
            ComparisonType::LessThanOrEquals => "LESS_THAN_OR_EQUALS",
            ComparisonType::GreaterThan => "GREATER_THAN",
            ComparisonType::GreaterThanOrEquals => "GREATER_THAN_OR_EQUALS",
            ComparisonType::StartsWith => "STARTS_WITH",
            ComparisonType::IsNull => "IS_NULL",
            ComparisonType::NotNull => "NOT_NULL",
        };

        write!(f, "{}", name)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.ty.is_unary() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.ty, self.operand)
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Predicate::Field { name, comparison } => write!(f, "{} {}", name, comparison),
            Predicate::And(children) => write!(f, "And([{}])", children.iter().join(", ")),
            Predicate::Or(children) => write!(f, "Or([{}])", children.iter().join(", ")),
            Predicate::Not(child) => write!(f, "Not({})", child),
            Predicate::Nested { name, child } => write!(f, "{}/{{{}}}", name, child),
            Predicate::OneOfThem { name, child, .. } => {
                write!(f, "one of {}/{{{}}}", name, child)
            }
            Predicate::OneOfThemValue {
                name, comparison, ..
            } => write!(f, "one of {} {}", name, comparison),
            Predicate::RecordType(name) => write!(f, "RecordType({})", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::{Comparison, Predicate};
    use crate::types::value::DataValue;
    use crate::util::hash_utils::{PlanHashMode, PlanHashable};

    #[test]
    fn test_comparison_eval() {
        assert_eq!(Comparison::equals("x").eval(&DataValue::from("x")), Some(true));
        assert_eq!(Comparison::equals("x").eval(&DataValue::from("y")), Some(false));
        assert_eq!(Comparison::equals("x").eval(&DataValue::Null), None);
        assert_eq!(Comparison::is_null().eval(&DataValue::Null), Some(true));
        assert_eq!(Comparison::not_null().eval(&DataValue::Null), Some(false));
        assert_eq!(
            Comparison::greater_than(1i64).eval(&DataValue::from(1.5)),
            Some(true)
        );
        assert_eq!(
            Comparison::starts_with("ab").eval(&DataValue::from("abc")),
            Some(true)
        );
        assert_eq!(Comparison::equals(1i64).eval(&DataValue::from("1")), None);
    }

    #[test]
    fn test_display_and_plan_hash() {
        let predicate = Predicate::one_of_them(
            "tags",
            Predicate::field("name", Comparison::equals("x")),
        );
        assert_eq!(predicate.to_string(), "one of tags/{name EQUALS \"x\"}");

        let other = Predicate::one_of_them(
            "tags",
            Predicate::field("name", Comparison::equals("y")),
        );
        for mode in [PlanHashMode::Legacy, PlanHashMode::ForContinuation] {
            assert_eq!(predicate.plan_hash(mode), predicate.clone().plan_hash(mode));
            assert_ne!(predicate.plan_hash(mode), other.plan_hash(mode));
        }
        assert_ne!(
            predicate.plan_hash(PlanHashMode::Legacy),
            predicate.plan_hash(PlanHashMode::ForContinuation)
        );
    }
}
