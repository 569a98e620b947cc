//! Argument validation helpers shared by the configuration types

use url::Url;

use crate::error::{Error, Result};

/// Rejects blank values with a message naming the offending field.
pub(crate) fn ensure_not_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::configuration(format!("{} cannot be blank.", name)));
    }
    Ok(())
}

/// A host must be an absolute http or https URL.
pub(crate) fn ensure_valid_host(host: &str) -> Result<()> {
    ensure_not_blank(host, "host")?;
    let parsed = Url::parse(host).map_err(|_| invalid_host(host))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid_host(host));
    }
    Ok(())
}

fn invalid_host(host: &str) -> Error {
    Error::configuration(format!("Host [{}] is not a valid URI.", host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_value_rejected() {
        let err = ensure_not_blank("   ", "username").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: username cannot be blank."
        );
        assert!(ensure_not_blank("user", "username").is_ok());
    }

    #[test]
    fn test_valid_hosts_accepted() {
        assert!(ensure_valid_host("https://example.com").is_ok());
        assert!(ensure_valid_host("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_blank_host_rejected() {
        let err = ensure_valid_host("").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: host cannot be blank.");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = ensure_valid_host("asd://example.com").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Host [asd://example.com] is not a valid URI."
        );
    }

    #[test]
    fn test_unparsable_host_rejected() {
        let err = ensure_valid_host("not a url").unwrap_err();
        assert!(err.to_string().contains("is not a valid URI."));
    }
}
