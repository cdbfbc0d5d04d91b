//! Built-in function table: names, overloads and result types.

use serde::{Deserialize, Serialize};

use crate::catalog::ConversionTable;
use crate::error::{BindError, Result};
use crate::types::{DataType, TypeRef};

/// Built-in functions callable from a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinFunction {
    Contains,
    StartsWith,
    EndsWith,
    Length,
    IndexOf,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    Concat,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Date,
    Round,
    Floor,
    Ceiling,
}

const ALL_FUNCTIONS: [BuiltinFunction; 20] = [
    BuiltinFunction::Contains,
    BuiltinFunction::StartsWith,
    BuiltinFunction::EndsWith,
    BuiltinFunction::Length,
    BuiltinFunction::IndexOf,
    BuiltinFunction::Substring,
    BuiltinFunction::ToLower,
    BuiltinFunction::ToUpper,
    BuiltinFunction::Trim,
    BuiltinFunction::Concat,
    BuiltinFunction::Year,
    BuiltinFunction::Month,
    BuiltinFunction::Day,
    BuiltinFunction::Hour,
    BuiltinFunction::Minute,
    BuiltinFunction::Second,
    BuiltinFunction::Date,
    BuiltinFunction::Round,
    BuiltinFunction::Floor,
    BuiltinFunction::Ceiling,
];

/// One overload of a built-in function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<DataType>,
    pub result: DataType,
}

fn sig(params: &[DataType], result: DataType) -> Signature {
    Signature {
        params: params.to_vec(),
        result,
    }
}

impl BuiltinFunction {
    /// Returns the name of this function as written in a query.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFunction::Contains => "contains",
            BuiltinFunction::StartsWith => "startswith",
            BuiltinFunction::EndsWith => "endswith",
            BuiltinFunction::Length => "length",
            BuiltinFunction::IndexOf => "indexof",
            BuiltinFunction::Substring => "substring",
            BuiltinFunction::ToLower => "tolower",
            BuiltinFunction::ToUpper => "toupper",
            BuiltinFunction::Trim => "trim",
            BuiltinFunction::Concat => "concat",
            BuiltinFunction::Year => "year",
            BuiltinFunction::Month => "month",
            BuiltinFunction::Day => "day",
            BuiltinFunction::Hour => "hour",
            BuiltinFunction::Minute => "minute",
            BuiltinFunction::Second => "second",
            BuiltinFunction::Date => "date",
            BuiltinFunction::Round => "round",
            BuiltinFunction::Floor => "floor",
            BuiltinFunction::Ceiling => "ceiling",
        }
    }

    /// Looks up a function by name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        ALL_FUNCTIONS.into_iter().find(|f| f.name() == name)
    }

    /// Returns the overloads of this function.
    #[must_use]
    pub fn signatures(&self) -> Vec<Signature> {
        use DataType::{Bool, DateTimeOffset, Float32, Float64, Int32, String};

        match self {
            BuiltinFunction::Contains | BuiltinFunction::StartsWith | BuiltinFunction::EndsWith => {
                vec![sig(&[String, String], Bool)]
            }
            BuiltinFunction::Length => vec![sig(&[String], Int32)],
            BuiltinFunction::IndexOf => vec![sig(&[String, String], Int32)],
            BuiltinFunction::Substring => vec![
                sig(&[String, Int32], String),
                sig(&[String, Int32, Int32], String),
            ],
            BuiltinFunction::ToLower | BuiltinFunction::ToUpper | BuiltinFunction::Trim => {
                vec![sig(&[String], String)]
            }
            BuiltinFunction::Concat => vec![sig(&[String, String], String)],
            BuiltinFunction::Year | BuiltinFunction::Month | BuiltinFunction::Day => vec![
                sig(&[DataType::Date], Int32),
                sig(&[DateTimeOffset], Int32),
            ],
            BuiltinFunction::Hour | BuiltinFunction::Minute | BuiltinFunction::Second => {
                vec![sig(&[DateTimeOffset], Int32)]
            }
            BuiltinFunction::Date => vec![sig(&[DateTimeOffset], DataType::Date)],
            BuiltinFunction::Round | BuiltinFunction::Floor | BuiltinFunction::Ceiling => vec![
                sig(&[Float64], Float64),
                sig(&[Float32], Float32),
            ],
        }
    }
}

/// Picks the overload of `name` matching the argument types.
///
/// An overload whose parameters equal the argument types wins; otherwise the
/// first overload every argument promotes to. An untyped null matches any
/// parameter.
///
/// # Errors
///
/// Returns `UnknownFunction` for an unknown name and `TypeMismatch` when no
/// overload accepts the arguments.
pub fn resolve(
    name: &str,
    args: &[TypeRef],
    conversions: &ConversionTable,
) -> Result<(BuiltinFunction, Signature)> {
    let function =
        BuiltinFunction::lookup(name).ok_or_else(|| BindError::UnknownFunction(name.to_string()))?;

    let candidates: Vec<Signature> = function
        .signatures()
        .into_iter()
        .filter(|s| s.params.len() == args.len())
        .collect();

    let exact = candidates.iter().find(|s| {
        s.params
            .iter()
            .zip(args)
            .all(|(param, arg)| &arg.data_type == param)
    });
    let chosen = exact.or_else(|| {
        candidates.iter().find(|s| {
            s.params.iter().zip(args).all(|(param, arg)| {
                arg.is_null_type() || conversions.can_promote(&arg.data_type, param)
            })
        })
    });

    match chosen {
        Some(signature) => Ok((function, signature.clone())),
        None => Err(BindError::type_mismatch(name, args)),
    }
}
