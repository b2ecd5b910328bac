pub mod draft;
pub mod enums;
pub mod symptom;

pub use draft::*;
pub use symptom::*;
