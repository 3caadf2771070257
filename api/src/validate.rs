//! Input validation, applied before any request is issued

use crate::error::ApiError;
use std::net::IpAddr;

/// Hostname or IP address: trimmed, must not be empty
pub fn host(input: &str) -> Result<String, ApiError> {
    let host = input.trim();
    if host.is_empty() {
        return Err(ApiError::Validation(
            "A hostname or IP address is required".to_string(),
        ));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(ApiError::Validation(
            "A valid hostname or IP address must be provided".to_string(),
        ));
    }
    Ok(host.to_string())
}

/// IP address only
pub fn ip(input: &str) -> Result<IpAddr, ApiError> {
    let ip = input.trim();
    if ip.is_empty() {
        return Err(ApiError::Validation("An IP address is required".to_string()));
    }
    ip.parse::<IpAddr>()
        .map_err(|_| ApiError::Validation("A valid IP address must be provided".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host() {
        assert_eq!(host("  example.com ").unwrap(), "example.com");
        assert!(host("").is_err());
        assert!(host("   ").is_err());
        assert!(host("exa mple.com").is_err());
    }

    #[test]
    fn test_ip() {
        assert!(ip("1.1.1.1").unwrap().is_ipv4());
        assert!(ip("2606:4700:4700::1111").unwrap().is_ipv6());
        assert!(ip("").is_err());
        assert!(ip("example.com").is_err());
    }
}
