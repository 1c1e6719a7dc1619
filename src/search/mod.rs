//! Word search: translate the query into the corpus language, then fetch
//! example sentences and the word's translation side by side.

mod pipeline;
mod state;

pub use pipeline::{AnnotatedSearch, SearchPipeline, SearchQuery};
pub use state::{SearchRequestResult, SearchStage};
