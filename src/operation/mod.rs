//! Record operations.
//!
//! Operations are the only way to mutate the record graph. Each one is an
//! immutable, serializable description of a single mutation intent; a
//! [`Transform`] groups several of them into one atomic unit.

mod operations;
mod serialization;
mod validation;

pub use operations::{RecordOperation, Transform};

pub use serialization::{from_json, operation_from_json, to_json_pretty};
pub use validation::MAX_NAME_LEN;
