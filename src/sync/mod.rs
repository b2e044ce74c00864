pub mod aggregate;
pub mod labels;
pub mod lookup;
pub mod metadata;
pub mod normalize;
pub mod range;
pub mod reconcile;
