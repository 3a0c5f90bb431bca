use std::sync::LazyLock;

use regex::Regex;

pub const MAX_URL_LEN: usize = 3000;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.-]+(?::[0-9]+)?(?:/\S*)?$").expect("static regex")
});

/// Cheap structural check on a shortening target. No DNS, no fetch.
pub fn valid_url(u: &str) -> bool {
    if u.chars().count() > MAX_URL_LEN {
        return false;
    }
    if !(u.starts_with("http://") || u.starts_with("https://")) {
        return false;
    }
    URL_SHAPE.is_match(u)
}

pub fn epoch_now() -> i64 {
    chrono::Utc::now().timestamp()
}
