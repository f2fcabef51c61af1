#[derive(thiserror::Error, Debug)]
pub enum ValueError {
    #[error("type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch { expected: crate::Type, actual: crate::Type },

    #[error("cannot decode {0}: truncated wire payload")]
    Truncated(&'static str),
}
