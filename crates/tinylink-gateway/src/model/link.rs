use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tinylink_core::{Link, ShortCode};

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub short_code: ShortCode,
    pub short_url: String,
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub short_code: ShortCode,
    pub original_url: String,
    pub created_at: Timestamp,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            created_at: link.created_at,
        }
    }
}
