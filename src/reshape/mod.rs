//! Reshaping stages: feature identifiers, projection, transposition, row
//! selection and metadata merging.

pub mod feature_id;
pub mod merge;
pub mod project;
pub mod select;
pub mod transpose;

pub use feature_id::{
    add_feature_ids, feature_id, FEATURE_ID_COLUMN, FEATURE_ID_PREFIX, FEATURE_ID_SEPARATOR,
    MZ_ALIASES, RT_ALIASES,
};
pub use merge::merge;
pub use project::{project, select_feature_columns};
pub use select::{mask_any, mask_none, select_rows, CompareOp, Predicate};
pub use transpose::{transpose, transpose_with, DuplicatePolicy, SAMPLE_INDEX_NAME};
