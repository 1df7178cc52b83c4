//! Shared validation helpers used by the section validators.

use std::sync::OnceLock;

use regex::Regex;

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error unless `value` is an absolute http(s) URL with a host.
pub(crate) fn validate_http_url(errors: &mut Vec<String>, name: &str, value: &str) {
    static URL: OnceLock<Regex> = OnceLock::new();
    let re = URL.get_or_init(|| {
        Regex::new(r"^https?://[A-Za-z0-9._~\-\[\]:]+(/\S*)?$").expect("static regex")
    });
    if !re.is_match(value) {
        errors.push(format!("{name} = {value:?} is not an http(s) URL"));
    }
}

/// Push an error if `value` is blank.
pub(crate) fn validate_not_blank(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}
