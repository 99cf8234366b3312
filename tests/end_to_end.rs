use kip_cascades::catalog::{FieldDescriptor, FieldLabel, FieldType, RecordDescriptor};
use kip_cascades::db::{DataBaseBuilder, Database, RecordQuery};
use kip_cascades::errors::PlannerError;
use kip_cascades::expression::{Comparison, EmptyMode, Predicate};
use kip_cascades::optimizer::core::cost::{CostModel, DefaultCostModel};
use kip_cascades::planner::operator::PhysicalOperator;
use kip_cascades::planner::predicate::BoundPredicate;
use kip_cascades::storage::memory::InMemoryStorage;
use kip_cascades::types::{DataValue, FieldValue, Record, RecordRef};
use std::sync::Arc;

struct Fixture {
    tag: Arc<RecordDescriptor>,
    detail: Arc<RecordDescriptor>,
    order: Arc<RecordDescriptor>,
}

impl Fixture {
    fn new() -> Self {
        let tag = Arc::new(RecordDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new("name", FieldLabel::Optional, FieldType::String)],
        ));
        let detail = Arc::new(RecordDescriptor::new(
            "Detail",
            vec![FieldDescriptor::new(
                "tags",
                FieldLabel::Repeated,
                FieldType::Message(tag.clone()),
            )],
        ));
        let order = Arc::new(
            RecordDescriptor::new(
                "Order",
                vec![
                    FieldDescriptor::new("id", FieldLabel::Required, FieldType::Int64),
                    FieldDescriptor::new(
                        "tags",
                        FieldLabel::Repeated,
                        FieldType::Message(tag.clone()),
                    ),
                    FieldDescriptor::new(
                        "detail",
                        FieldLabel::Optional,
                        FieldType::Message(detail.clone()),
                    ),
                    FieldDescriptor::new(
                        "details",
                        FieldLabel::Repeated,
                        FieldType::Message(detail.clone()),
                    ),
                ],
            )
            .with_primary_key("id"),
        );

        Fixture { tag, detail, order }
    }

    fn tags(&self, names: &[&str]) -> Result<FieldValue, PlannerError> {
        let tags = names
            .iter()
            .map(|name| {
                Ok(DataValue::Message(Arc::new(Record::new(
                    self.tag.clone(),
                    vec![("name", FieldValue::from(*name))],
                )?)))
            })
            .collect::<Result<Vec<_>, PlannerError>>()?;

        Ok(FieldValue::Repeated(tags))
    }

    fn order(&self, id: i64, tags: &[&str]) -> Result<RecordRef, PlannerError> {
        Ok(Arc::new(Record::new(
            self.order.clone(),
            vec![("id", FieldValue::from(id)), ("tags", self.tags(tags)?)],
        )?))
    }

    fn order_with_detail(&self, id: i64, tags: &[&str]) -> Result<RecordRef, PlannerError> {
        let detail = Arc::new(Record::new(
            self.detail.clone(),
            vec![("tags", self.tags(tags)?)],
        )?);

        Ok(Arc::new(Record::new(
            self.order.clone(),
            vec![("id", FieldValue::from(id)), ("detail", FieldValue::from(detail))],
        )?))
    }

    fn order_with_details(&self, id: i64, details: &[&[&str]]) -> Result<RecordRef, PlannerError> {
        let details = details
            .iter()
            .map(|tags| {
                Ok(DataValue::Message(Arc::new(Record::new(
                    self.detail.clone(),
                    vec![("tags", self.tags(tags)?)],
                )?)))
            })
            .collect::<Result<Vec<_>, PlannerError>>()?;

        Ok(Arc::new(Record::new(
            self.order.clone(),
            vec![("id", FieldValue::from(id)), ("details", FieldValue::Repeated(details))],
        )?))
    }

    fn database(&self, indexed: bool) -> Result<Database<InMemoryStorage>, PlannerError> {
        let mut builder = DataBaseBuilder::new().register_record_type(self.order.clone());
        if indexed {
            builder = builder.register_index(
                "by_tag",
                "Order",
                vec!["tags".to_string(), "name".to_string()],
            );
        }

        builder.build()
    }
}

fn tagged(name: &str) -> Predicate {
    Predicate::one_of_them("tags", Predicate::field("name", Comparison::equals(name)))
}

fn expected_ids(records: &[RecordRef], filter: &Predicate) -> Vec<i64> {
    records
        .iter()
        .filter(|record| filter.eval(Some(record.as_ref())) == Some(true))
        .filter_map(|record| match record.primary_key()? {
            DataValue::Int64(id) => Some(*id),
            _ => None,
        })
        .collect()
}

/// Prefers re-applying declarative predicates over running existential sub-plans.
struct ResidualFirst;

impl ResidualFirst {
    fn has_residual(predicate: &BoundPredicate) -> bool {
        match predicate {
            BoundPredicate::Residual(_) => true,
            BoundPredicate::And(predicates) | BoundPredicate::Or(predicates) => {
                predicates.iter().any(Self::has_residual)
            }
            BoundPredicate::Not(predicate) => Self::has_residual(predicate),
            _ => false,
        }
    }
}

impl CostModel for ResidualFirst {
    fn cost(&self, op: &PhysicalOperator) -> f64 {
        match op {
            PhysicalOperator::Filter(filter) if filter.predicates.iter().any(Self::has_residual) => {
                0.0
            }
            PhysicalOperator::Filter(filter) if !filter.existentials.is_empty() => 1e5,
            op => DefaultCostModel.cost(op),
        }
    }
}

fn ids(database: &Database<InMemoryStorage>, query: &RecordQuery) -> Result<Vec<i64>, PlannerError> {
    Ok(database
        .run(query)?
        .filter_map(|row| match row.as_message()?.primary_key()? {
            DataValue::Int64(id) => Some(*id),
            _ => None,
        })
        .collect())
}

#[test]
fn test_one_of_them_tags() -> Result<(), PlannerError> {
    let fixture = Fixture::new();
    let database = fixture.database(false)?;
    database.insert(fixture.order(1, &["y", "x"])?)?;
    database.insert(fixture.order(2, &[])?)?;
    database.insert(fixture.order(3, &["y"])?)?;

    let query = RecordQuery::new("Order").filter(tagged("x"));
    assert_eq!(ids(&database, &query)?, vec![1]);

    // without an index the repeated field is searched by an existential sub-plan
    let explain = database.explain(&query)?;
    assert!(explain.contains("EXISTS"), "{}", explain);
    assert!(explain.contains("Explode"), "{}", explain);
    assert!(!explain.contains("MATCHES"), "{}", explain);

    Ok(())
}

#[test]
fn test_index_scan_over_repeated_field() -> Result<(), PlannerError> {
    let fixture = Fixture::new();
    let database = fixture.database(true)?;
    database.insert(fixture.order(1, &["x", "x"])?)?;
    database.insert(fixture.order(2, &["y"])?)?;
    database.insert(fixture.order(3, &["y", "x"])?)?;

    let query = RecordQuery::new("Order").filter(tagged("x"));
    let explain = database.explain(&query)?;
    assert!(explain.contains("IndexScan by_tag"), "{}", explain);
    assert!(explain.contains("UnorderedPrimaryKeyDistinct"), "{}", explain);

    // the index yields order 1 twice, the distinct keeps it once
    assert_eq!(ids(&database, &query)?, vec![1, 3]);

    Ok(())
}

#[test]
fn test_plans_agree_with_declarative_evaluation() -> Result<(), PlannerError> {
    let fixture = Fixture::new();
    let records = vec![
        fixture.order(1, &["y", "x"])?,
        fixture.order(2, &[])?,
        fixture.order(3, &["y"])?,
        fixture.order_with_detail(4, &["x"])?,
        fixture.order_with_detail(5, &[])?,
    ];
    let filters = vec![
        tagged("x"),
        Predicate::not(tagged("x")),
        Predicate::or(vec![tagged("y"), Predicate::field("id", Comparison::equals(2i64))]),
        Predicate::nested("detail", tagged("x")),
        Predicate::not(Predicate::nested("detail", tagged("x"))),
        Predicate::not(Predicate::nested(
            "detail",
            Predicate::one_of_them_with_mode(
                "tags",
                EmptyMode::NoMatches,
                Predicate::field("name", Comparison::equals("x")),
            ),
        )),
        Predicate::and(vec![tagged("y"), Predicate::not(tagged("x"))]),
    ];

    for indexed in [false, true] {
        let database = fixture.database(indexed)?;
        for record in &records {
            database.insert(record.clone())?;
        }

        for filter in &filters {
            let query = RecordQuery::new("Order").filter(filter.clone());

            assert_eq!(ids(&database, &query)?, expected_ids(&records, filter), "{}", filter);
        }
    }

    Ok(())
}

#[test]
fn test_residual_plans_agree_with_declarative_evaluation() -> Result<(), PlannerError> {
    let fixture = Fixture::new();
    let records = vec![
        fixture.order(1, &["y", "x"])?,
        fixture.order(2, &[])?,
        fixture.order_with_detail(3, &["x"])?,
        fixture.order_with_detail(4, &[])?,
        fixture.order_with_details(5, &[&["y"], &["x", "z"]])?,
        fixture.order_with_details(6, &[&["y"], &[]])?,
        fixture.order_with_details(7, &[])?,
    ];
    let database = DataBaseBuilder::new()
        .register_record_type(fixture.order.clone())
        .cost_model(Arc::new(ResidualFirst))
        .build()?;
    for record in &records {
        database.insert(record.clone())?;
    }

    let filters = vec![
        Predicate::one_of_them("details", tagged("x")),
        Predicate::not(Predicate::one_of_them("details", tagged("y"))),
        Predicate::not(Predicate::nested("detail", tagged("x"))),
        Predicate::nested(
            "detail",
            Predicate::not(Predicate::one_of_them_with_mode(
                "tags",
                EmptyMode::NoMatches,
                Predicate::field("name", Comparison::equals("x")),
            )),
        ),
        Predicate::or(vec![
            Predicate::not(tagged("x")),
            Predicate::field("id", Comparison::equals(1i64)),
        ]),
    ];

    for filter in &filters {
        let query = RecordQuery::new("Order").filter(filter.clone());
        let explain = database.explain(&query)?;
        assert!(explain.contains("MATCHES"), "{}", explain);
        assert!(!explain.contains("EXISTS"), "{}", explain);

        assert_eq!(ids(&database, &query)?, expected_ids(&records, filter), "{}", filter);
    }

    Ok(())
}

#[test]
fn test_delete_matching_records() -> Result<(), PlannerError> {
    let fixture = Fixture::new();
    let database = fixture.database(true)?;
    database.insert(fixture.order(1, &["x", "x"])?)?;
    database.insert(fixture.order(2, &["y"])?)?;
    database.insert(fixture.order(3, &["x"])?)?;

    let query = RecordQuery::new("Order").filter(tagged("x"));
    assert_eq!(database.delete(&query)?, 2);
    assert_eq!(ids(&database, &query)?, Vec::<i64>::new());
    assert_eq!(ids(&database, &RecordQuery::new("Order"))?, vec![2]);
    assert_eq!(database.delete(&query)?, 0);

    Ok(())
}
