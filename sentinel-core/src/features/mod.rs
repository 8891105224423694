//! Feature schema, parsing, and validation

pub mod layout;
pub mod vector;

pub use layout::{
    feature_index, feature_name, layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION,
};
pub use vector::{FeatureVector, NormalizedVector};
