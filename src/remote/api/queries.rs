use serde::Serialize;

/// Query string for `GET /search`.
#[derive(Debug, Serialize)]
pub struct SearchQuery<'a> {
    pub query: &'a str,
}
