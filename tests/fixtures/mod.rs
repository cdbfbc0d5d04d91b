//! Employee model shared by the integration and contract tests.

#![allow(dead_code)]

use filterbind::catalog::{Catalog, EnumTypeSchema, MemberDef, StructuredTypeSchema};
use filterbind::clause::{BinaryOperatorKind, ClauseNode, FilterClause};
use filterbind::{BinderContext, DataType, Element, FilterBinder, Predicate, Result, Value};

pub const EMPLOYEE: &str = "Employee";

pub fn employee_type() -> DataType {
    DataType::Structured(EMPLOYEE.to_string())
}

fn enum_type(name: &str, members: &[(&str, i64)], is_flags: bool) -> EnumTypeSchema {
    EnumTypeSchema::new(
        name.to_string(),
        members
            .iter()
            .map(|(member, value)| ((*member).to_string(), *value))
            .collect(),
        is_flags,
    )
    .expect("valid enum")
}

fn member(name: &str, data_type: DataType, nullable: bool) -> MemberDef {
    MemberDef::new(name.to_string(), data_type, nullable).expect("valid member")
}

/// Creates the catalog: `Employee` keyed by `ID`, the `FavoriteSports`
/// complex type and the `Skill`, `Gender`, `AccessLevel` and `Sport` enums.
pub fn employee_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .create_enum_type(enum_type(
            "Skill",
            &[("CSharp", 0), ("Sql", 1), ("Web", 2)],
            false,
        ))
        .unwrap();
    catalog
        .create_enum_type(enum_type("Gender", &[("Male", 0), ("Female", 1)], false))
        .unwrap();
    catalog
        .create_enum_type(enum_type(
            "AccessLevel",
            &[("Read", 1), ("Write", 2), ("Execute", 4)],
            true,
        ))
        .unwrap();
    catalog
        .create_enum_type(enum_type(
            "Sport",
            &[("Pingpong", 1), ("Basketball", 2)],
            true,
        ))
        .unwrap();

    let sport = DataType::Enum("Sport".to_string());
    catalog
        .create_structured_type(
            StructuredTypeSchema::new(
                "FavoriteSports".to_string(),
                vec![
                    member("LikeMost", sport.clone(), false),
                    member("Like", DataType::collection_of(sport), false),
                ],
                vec![],
            )
            .unwrap(),
        )
        .unwrap();

    catalog
        .create_structured_type(
            StructuredTypeSchema::new(
                EMPLOYEE.to_string(),
                vec![
                    member("ID", DataType::Int32, false),
                    member("Name", DataType::String, true),
                    member(
                        "SkillSet",
                        DataType::collection_of(DataType::Enum("Skill".to_string())),
                        false,
                    ),
                    member("Gender", DataType::Enum("Gender".to_string()), false),
                    member("AccessLevel", DataType::Enum("AccessLevel".to_string()), false),
                    member(
                        "FavoriteSports",
                        DataType::Structured("FavoriteSports".to_string()),
                        true,
                    ),
                    member("Salary", DataType::Float64, true),
                    member("Birthday", DataType::Date, true),
                ],
                vec!["ID".to_string()],
            )
            .unwrap(),
        )
        .unwrap();
    catalog
}

pub fn enum_value(type_name: &str, value: i64) -> Value {
    Value::Enum {
        type_name: type_name.to_string(),
        value,
    }
}

fn skills(values: &[i64]) -> Value {
    Value::Collection(values.iter().map(|v| enum_value("Skill", *v)).collect())
}

fn sports(like_most: i64, like: &[i64]) -> Element {
    Element::new()
        .with("LikeMost", enum_value("Sport", like_most))
        .with(
            "Like",
            Value::Collection(like.iter().map(|v| enum_value("Sport", *v)).collect()),
        )
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

/// Five employees. Employee 4 has no name, salary or favorite sports;
/// employee 2 has an empty skill set.
pub fn employees() -> Vec<Element> {
    vec![
        Element::new()
            .with("ID", 1)
            .with("Name", "Name1")
            .with("SkillSet", skills(&[0, 1]))
            .with("Gender", enum_value("Gender", 1))
            .with("AccessLevel", enum_value("AccessLevel", 4))
            .with("FavoriteSports", sports(1, &[1, 2]))
            .with("Salary", 5200.0)
            .with("Birthday", date(1990, 4, 12)),
        Element::new()
            .with("ID", 2)
            .with("Name", "Name2")
            .with("SkillSet", skills(&[]))
            .with("Gender", enum_value("Gender", 1))
            .with("AccessLevel", enum_value("AccessLevel", 1))
            .with("FavoriteSports", sports(1, &[1, 2]))
            .with("Salary", 4100.5),
        Element::new()
            .with("ID", 3)
            .with("Name", "Name3")
            .with("SkillSet", skills(&[2, 1]))
            .with("Gender", enum_value("Gender", 1))
            .with("AccessLevel", enum_value("AccessLevel", 3))
            .with("FavoriteSports", sports(3, &[1, 2]))
            .with("Salary", 6100.0)
            .with("Birthday", date(1985, 11, 3)),
        Element::new()
            .with("ID", 4)
            .with("SkillSet", skills(&[1]))
            .with("Gender", enum_value("Gender", 0))
            .with("AccessLevel", enum_value("AccessLevel", 1)),
        Element::new()
            .with("ID", 5)
            .with("Name", "Sam")
            .with("SkillSet", skills(&[0]))
            .with("Gender", enum_value("Gender", 0))
            .with("AccessLevel", enum_value("AccessLevel", 2))
            .with("FavoriteSports", sports(2, &[]))
            .with("Salary", 4100.5)
            .with("Birthday", date(1990, 7, 30)),
    ]
}

/// Shorthand for a binary clause node.
pub fn op(kind: &str, left: ClauseNode, right: ClauseNode) -> ClauseNode {
    let kind = BinaryOperatorKind::parse(kind).expect("known operator");
    ClauseNode::binary(kind, left, right)
}

pub fn prop(path: &str) -> ClauseNode {
    ClauseNode::property(path)
}

pub fn lit(value: impl Into<Value>) -> ClauseNode {
    ClauseNode::literal(value)
}

/// Binds a filter over `Employee`.
pub fn bind_filter(catalog: &Catalog, expression: ClauseNode) -> Result<Predicate> {
    let binder = FilterBinder::new();
    let mut ctx = BinderContext::new(catalog, employee_type());
    binder.bind(Some(&FilterClause::new(expression)), Some(&mut ctx))
}

/// IDs of the employees the predicate accepts.
pub fn matching_ids(predicate: &Predicate) -> Vec<i32> {
    employees()
        .iter()
        .filter(|e| predicate.matches(e).expect("evaluates"))
        .map(id_of)
        .collect()
}

pub fn id_of(element: &Element) -> i32 {
    match element.member("ID") {
        Value::Int32(id) => *id,
        other => panic!("Unexpected ID {other:?}"),
    }
}
