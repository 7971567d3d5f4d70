mod queries;
mod responses;

pub use queries::SearchQuery;
pub use responses::{Content, RequestFilePayload};
