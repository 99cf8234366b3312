use crate::catalog::{Cardinality, FieldDescriptor, RecordDescriptor};
use crate::errors::PlannerError;
use crate::expression::{Comparison, Predicate};

impl Predicate {
    /// Checks field names, cardinalities and operand types against `descriptor`.
    /// Must succeed before the predicate is evaluated or expanded.
    pub fn validate(&self, descriptor: &RecordDescriptor) -> Result<(), PlannerError> {
        self.validate_in_scope(descriptor, true)
    }

    fn validate_in_scope(
        &self,
        descriptor: &RecordDescriptor,
        top_level: bool,
    ) -> Result<(), PlannerError> {
        match self {
            Predicate::Field { name, comparison } => {
                let field = descriptor.resolve_field(name, Cardinality::Singular)?;

                validate_comparison(field, comparison)
            }
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.validate_in_scope(descriptor, top_level)?;
                }
                Ok(())
            }
            Predicate::Not(child) => child.validate_in_scope(descriptor, top_level),
            Predicate::Nested { name, child } => {
                let field = descriptor.resolve_field(name, Cardinality::Singular)?;

                child.validate_in_scope(field.message_type()?, false)
            }
            Predicate::OneOfThem { name, child, .. } => {
                let field = descriptor.resolve_field(name, Cardinality::Repeated)?;

                child.validate_in_scope(field.message_type()?, false)
            }
            Predicate::OneOfThemValue {
                name, comparison, ..
            } => {
                let field = descriptor.resolve_field(name, Cardinality::Repeated)?;

                validate_comparison(field, comparison)
            }
            Predicate::RecordType(_) => {
                if top_level {
                    Ok(())
                } else {
                    Err(PlannerError::UnsupportedOperation(
                        "record type predicate below a nested or repeated field",
                    ))
                }
            }
        }
    }
}

fn validate_comparison(
    field: &FieldDescriptor,
    comparison: &Comparison,
) -> Result<(), PlannerError> {
    if comparison.comparison_type().is_unary() {
        return Ok(());
    }
    let ty = field.field_type();

    if ty.is_message() || !comparison.operand().is_comparable_to(ty) {
        return Err(PlannerError::TypeMismatch {
            field: field.name().to_string(),
            expected: ty.to_string(),
            actual: comparison.operand().type_name().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptor};
    use crate::errors::PlannerError;
    use crate::expression::{Comparison, Predicate};
    use std::sync::Arc;

    fn order_descriptor() -> RecordDescriptor {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new(
                "name",
                FieldLabel::Optional,
                FieldType::String,
            )],
        ));
        let customer = Arc::new(RecordDescriptor::new(
            "Customer",
            vec![FieldDescriptor::new(
                "name",
                FieldLabel::Optional,
                FieldType::String,
            )],
        ));

        RecordDescriptor::new(
            "Order",
            vec![
                FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                FieldDescriptor::new("tags", FieldLabel::Repeated, FieldType::Message(tag)),
                FieldDescriptor::new("labels", FieldLabel::Repeated, FieldType::String),
                FieldDescriptor::new(
                    "customer",
                    FieldLabel::Optional,
                    FieldType::Message(customer),
                ),
            ],
        )
        .with_primary_key("id")
    }

    #[test]
    fn test_validate() -> Result<(), PlannerError> {
        let descriptor = order_descriptor();

        Predicate::and(vec![
            Predicate::record_type("Order"),
            Predicate::one_of_them("tags", Predicate::field("name", Comparison::equals("x"))),
            Predicate::one_of_them_value("labels", Comparison::starts_with("a")),
            Predicate::nested("customer", Predicate::field("name", Comparison::not_null())),
        ])
        .validate(&descriptor)?;

        Ok(())
    }

    #[test]
    fn test_validate_rejects_singular_field() {
        let descriptor = order_descriptor();

        assert_eq!(
            Predicate::one_of_them("customer", Predicate::field("name", Comparison::equals("x")))
                .validate(&descriptor),
            Err(PlannerError::NotRepeatedField("customer".to_string()))
        );
        assert!(matches!(
            Predicate::field("tags", Comparison::is_null()).validate(&descriptor),
            Err(PlannerError::RepeatedFieldNotAllowed(..))
        ));
        assert!(matches!(
            Predicate::one_of_them("labels", Predicate::field("name", Comparison::equals("x")))
                .validate(&descriptor),
            Err(PlannerError::NotMessageField(_))
        ));
        assert!(matches!(
            Predicate::one_of_them("tags", Predicate::field("missing", Comparison::equals("x")))
                .validate(&descriptor),
            Err(PlannerError::FieldNotFound(..))
        ));
        assert!(matches!(
            Predicate::field("id", Comparison::equals("1")).validate(&descriptor),
            Err(PlannerError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Predicate::one_of_them("tags", Predicate::record_type("Tag")).validate(&descriptor),
            Err(PlannerError::UnsupportedOperation(_))
        ));
    }
}
