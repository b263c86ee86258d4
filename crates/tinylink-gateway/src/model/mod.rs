mod link;

pub use link::{CreateLinkRequest, CreateLinkResponse, LinkResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
