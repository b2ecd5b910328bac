//! Repository layer — table-scoped database operations.
//!
//! All public functions are re-exported here.

mod symptom;
mod symptom_log;

pub use symptom::*;
pub use symptom_log::*;
