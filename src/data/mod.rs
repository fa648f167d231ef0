//! Input shaping: snapshot loading, prop parsing and market normalization

pub mod normalizer;
pub mod props;
pub mod snapshot_loader;

// Re-export commonly used types
pub use normalizer::{normalize, normalize_matchup};
pub use props::{parse_props, PropRecord};
pub use snapshot_loader::load_slate;
