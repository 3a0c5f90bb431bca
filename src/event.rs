//! Pulling inputs out of invocation events.
//!
//! A handler can be invoked directly (`{"code": ".."}`), through a gateway route
//! with path parameters, through a catch-all route where only the raw path is
//! known, or with a JSON body. Each shape is one extractor; the first one that
//! matches wins.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use serde_json::Value as Json;

type Extractor = fn(&Json) -> Option<String>;

static PATH_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/r/([A-Z0-9]{6})/?$").expect("static regex"));

const CODE_EXTRACTORS: [Extractor; 4] = [
    code_field,
    short_code_field,
    path_parameter_code,
    raw_path_code,
];

const LONG_URL_EXTRACTORS: [Extractor; 2] = [long_url_field, body_long_url];

/// Short code carried by a redirect event, or `""` if none of the shapes match.
pub fn read_code(event: &Json) -> String {
    first_match(&CODE_EXTRACTORS, event)
}

/// Target URL carried by a shorten event, or `""`.
pub fn read_long_url(event: &Json) -> String {
    first_match(&LONG_URL_EXTRACTORS, event)
}

fn first_match(chain: &[Extractor], event: &Json) -> String {
    chain.iter().find_map(|f| f(event)).unwrap_or_default()
}

// Presence decides the match, not the value: `{"code": ""}` stops the chain.
fn as_text(v: &Json) -> String {
    match v {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First of `keys` whose value is present and not null/empty.
fn first_present<'a>(event: &'a Json, keys: &[&str]) -> Option<&'a Json> {
    keys.iter().filter_map(|k| event.get(*k)).find(|v| match v {
        Json::Null => false,
        Json::String(s) => !s.is_empty(),
        Json::Object(m) => !m.is_empty(),
        _ => true,
    })
}

fn code_field(event: &Json) -> Option<String> {
    event.get("code").map(as_text)
}

fn short_code_field(event: &Json) -> Option<String> {
    event.get("short_code").map(as_text)
}

fn path_parameter_code(event: &Json) -> Option<String> {
    first_present(event, &["pathParameters", "path_parameters"])?
        .as_object()?
        .get("code")
        .map(as_text)
}

fn raw_path_code(event: &Json) -> Option<String> {
    let path = first_present(event, &["rawPath", "path"])?.as_str()?;
    PATH_CODE
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn long_url_field(event: &Json) -> Option<String> {
    event.get("long_url").map(as_text)
}

/// A string body always ends the chain; anything unreadable in it is `""`.
fn body_long_url(event: &Json) -> Option<String> {
    let body = event.get("body")?.as_str()?;
    let encoded = event
        .get("isBase64Encoded")
        .and_then(Json::as_bool)
        .unwrap_or(false);
    Some(parse_body_long_url(body, encoded).unwrap_or_default())
}

fn parse_body_long_url(body: &str, encoded: bool) -> Option<String> {
    let parsed: Json = if encoded {
        let raw = STANDARD.decode(body).ok()?;
        serde_json::from_slice(&raw).ok()?
    } else {
        serde_json::from_str(body).ok()?
    };
    parsed.get("long_url").map(as_text)
}
