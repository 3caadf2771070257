//! Endpoint path templating
//!
//! Paths are written with `:name` placeholders, e.g. `/traceroute/:host`.
//! Parameters with a matching placeholder are substituted into the path and
//! everything else is appended to the query string in the order given.

use std::fmt;

/// A single request parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Build an endpoint path from a template and its parameters
pub fn endpoint(path: &str, params: &[(&str, ParamValue)]) -> String {
    let mut url = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);
    if !url.ends_with('/') {
        url.push('/');
    }

    let mut query: Vec<String> = Vec::new();

    for (name, value) in params {
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        let placeholder = format!("/:{}/", name);

        if url.contains(&placeholder) {
            url = url.replacen(&placeholder, &format!("/{}/", encoded), 1);
        } else {
            query.push(format!("{}={}", urlencoding::encode(name), encoded));
        }
    }

    // Drop the slash added for placeholder matching
    url.pop();

    if query.is_empty() {
        url
    } else {
        format!("{}?{}", url, query.join("&"))
    }
}
