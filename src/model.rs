use serde::{Deserialize, Serialize};

/// One row of the links table, keyed by `short_code`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShortLinkRecord {
    pub short_code: String,
    pub long_url: String,
    pub created_at: i64, // epoch seconds
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub last_accessed: Option<i64>,
}

impl ShortLinkRecord {
    pub fn new(short_code: String, long_url: String, created_at: i64) -> Self {
        Self {
            short_code,
            long_url,
            created_at,
            clicks: 0,
            last_accessed: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShortenResp {
    pub short_code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResp {
    pub error: String,
}
