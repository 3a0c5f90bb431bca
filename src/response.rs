//! Gateway-shaped response documents.
//!
//! The gateway expects `{statusCode, headers, body}` with a string body; direct
//! invocations get the same document back.

use std::collections::BTreeMap;

use askama::Template;
use serde::{Deserialize, Serialize};

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("Access-Control-Allow-Origin", "*"),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains",
    ),
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    fn new(status_code: u16, content_type: &str, body: String) -> Self {
        let mut headers: BTreeMap<String, String> = SECURITY_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        headers.insert("Content-Type".into(), content_type.into());
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

pub fn json_response<T: Serialize>(status: u16, v: &T) -> GatewayResponse {
    let body = serde_json::to_string(v).unwrap_or_else(|e| {
        tracing::error!(err=%e, "response serialization failed");
        String::from("{}")
    });
    GatewayResponse::new(status, "application/json", body)
}

/// Meta-refresh page; `.html` templates escape `target` in every position.
#[derive(Template)]
#[template(path = "redirect.html")]
struct RedirectPage<'a> {
    target: &'a str,
}

/// A 200 carrying both a `Location` header and a meta-refresh page, since the
/// gateway integration does not forward native 3xx redirects.
pub fn redirect_response(target: &str) -> Result<GatewayResponse, askama::Error> {
    let body = RedirectPage { target }.render()?;
    let mut resp = GatewayResponse::new(200, "text/html", body);
    resp.headers.insert("Location".into(), target.to_string());
    Ok(resp)
}
