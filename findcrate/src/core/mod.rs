pub mod traits;

pub use traits::{CriteriaRepository, PrimaryKeyValue};
