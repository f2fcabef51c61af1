/// A loosely-typed value as it arrives from or returns to a caller that
/// doesn't carry YDB's own type tags — e.g. a topic message metadata map
/// built from plain Rust literals. [`crate::Value::from_dynamic`] infers the
/// tightest matching [`crate::Type`]; [`crate::Value::to_dynamic`] is its
/// inverse.
#[derive(Clone, Debug, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Dynamic>),
    Object(Vec<(String, Dynamic)>),
}
