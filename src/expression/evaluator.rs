use crate::expression::{EmptyMode, Predicate};
use crate::types::record::{FieldValue, Record};
use crate::types::value::DataValue;

/// Three-valued conjunction.
pub(crate) fn and_all(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut result = Some(true);

    for value in values {
        match value {
            Some(false) => return Some(false),
            None => result = None,
            Some(true) => (),
        }
    }
    result
}

/// Three-valued disjunction.
pub(crate) fn or_any(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut result = Some(false);

    for value in values {
        match value {
            Some(true) => return Some(true),
            None => result = None,
            Some(false) => (),
        }
    }
    result
}

impl Predicate {
    /// Evaluates against `record`, `None` standing for a missing message.
    ///
    /// Unknown results propagate through `And`/`Or`/`Not`. A repeated-field
    /// quantification is a semi-join: it is true iff some element satisfies the
    /// child, false otherwise (including when the field is absent or empty).
    pub fn eval(&self, record: Option<&Record>) -> Option<bool> {
        match self {
            Predicate::Field { name, comparison } => {
                let record = record?;
                let value = match record.get_by_name(name) {
                    Some(FieldValue::Single(value)) => value.clone(),
                    Some(FieldValue::Repeated(_)) | None => DataValue::Null,
                };

                comparison.eval(&value)
            }
            Predicate::And(children) => and_all(children.iter().map(|child| child.eval(record))),
            Predicate::Or(children) => or_any(children.iter().map(|child| child.eval(record))),
            Predicate::Not(child) => child.eval(record).map(|value| !value),
            Predicate::Nested { name, child } => {
                // a missing message is handed down, so quantifiers below apply their empty mode
                let nested = record.and_then(|record| match record.get_by_name(name) {
                    Some(FieldValue::Single(DataValue::Message(nested))) => Some(nested.as_ref()),
                    _ => None,
                });

                child.eval(nested)
            }
            Predicate::OneOfThem {
                name,
                empty_mode,
                child,
            } => {
                let elements = match Self::repeated_elements(record, name, *empty_mode) {
                    Ok(elements) => elements,
                    Err(result) => return result,
                };

                Some(elements.iter().any(|element| {
                    child.eval(element.as_message().map(|message| message.as_ref())) == Some(true)
                }))
            }
            Predicate::OneOfThemValue {
                name,
                empty_mode,
                comparison,
            } => {
                let elements = match Self::repeated_elements(record, name, *empty_mode) {
                    Ok(elements) => elements,
                    Err(result) => return result,
                };

                Some(
                    elements
                        .iter()
                        .any(|element| comparison.eval(element) == Some(true)),
                )
            }
            Predicate::RecordType(name) => Some(record?.record_type() == name),
        }
    }

    /// Elements of repeated field `name`, or the decided result when there are none
    /// to look at.
    fn repeated_elements<'a>(
        record: Option<&'a Record>,
        name: &str,
        empty_mode: EmptyMode,
    ) -> Result<&'a [DataValue], Option<bool>> {
        let Some(record) = record else {
            return Err(match empty_mode {
                EmptyMode::Unknown => None,
                EmptyMode::NoMatches => Some(false),
            });
        };

        match record.get_by_name(name) {
            Some(FieldValue::Repeated(elements)) => Ok(elements.as_slice()),
            Some(FieldValue::Single(_)) | None => Err(Some(false)),
        }
    }
}
