use crate::catalog::FieldLabel;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("rule: {rule} did not bind: {missing:?}")]
    IncompleteBindings {
        rule: &'static str,
        missing: Vec<&'static str>,
    },
    #[error("binding: {0} is bound to a different kind of value")]
    BindingTypeMismatch(&'static str),
    #[error("duplicate primary key: {0}")]
    DuplicatePrimaryKey(String),
    #[error("a reference must hold at least one expression")]
    EmptyReference,
    #[error("field: {0} not found in record type: {1}")]
    FieldNotFound(String, String),
    #[error("expression does not belong to reference: {0}")]
    ForeignMember(usize),
    #[error("physical operator: {0} has no input plan")]
    MissingInput(&'static str),
    #[error("no such binding: {0}")]
    NoSuchBinding(&'static str),
    #[error("no physical plan found for reference: {0}")]
    NoPlanFound(usize),
    #[error("field: {0} is not a message field")]
    NotMessageField(String),
    #[error("field: {0} is not repeated")]
    NotRepeatedField(String),
    #[error("record type: {0} has no primary key")]
    PrimaryKeyNotFound(String),
    #[error("record type: {0} not found")]
    RecordTypeNotFound(String),
    #[error("reference: {0} not found")]
    ReferenceNotFound(usize),
    #[error("field: {0} is {1:?} and cannot be used here")]
    RepeatedFieldNotAllowed(String, FieldLabel),
    #[error("field: {field} expects {expected} but got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("alias: {0} is not bound to a row")]
    UnboundAlias(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
