//! Model cache - lazily loaded, reloadable serving model

mod model_cache;
mod source;

pub use model_cache::{CachePhase, CacheStatus, ModelCache};
pub use source::ModelSource;
