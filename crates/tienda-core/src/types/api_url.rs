//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Hosts that may be reached over plain HTTP.
///
/// `10.0.2.2` is the Android emulator's alias for the development machine.
const PLAIN_HTTP_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]", "10.0.2.2"];

/// A validated base URL for the marketplace REST API.
///
/// The URL must be absolute and use HTTPS; plain HTTP is accepted only for
/// loopback hosts and the emulator host alias.
///
/// # Example
///
/// ```
/// use tienda_core::ApiUrl;
///
/// let api = ApiUrl::new("https://shop.example.com/api/").unwrap();
/// assert_eq!(api.endpoint("/products/7"), "https://shop.example.com/api/products/7");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: s.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path relative to the base.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let Some(host) = url.host_str() else {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        };

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && PLAIN_HTTP_HOSTS.contains(&host)) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for local hosts)".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://shop.example.com/api").unwrap();
        assert_eq!(api.host(), Some("shop.example.com"));
    }

    #[test]
    fn plain_http_for_local_hosts() {
        assert!(ApiUrl::new("http://localhost:8080/api").is_ok());
        assert!(ApiUrl::new("http://127.0.0.1:8080/api").is_ok());
        assert!(ApiUrl::new("http://10.0.2.2:8080/api").is_ok());
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let api = ApiUrl::new("http://localhost:8080/api/").unwrap();
        assert_eq!(api.endpoint("/auth/login"), "http://localhost:8080/api/auth/login");
        assert_eq!(api.endpoint("orderItems"), "http://localhost:8080/api/orderItems");
    }

    #[test]
    fn endpoint_on_root_base() {
        let api = ApiUrl::new("https://shop.example.com").unwrap();
        assert_eq!(api.endpoint("dashboard"), "https://shop.example.com/dashboard");
    }

    #[test]
    fn invalid_http_non_local() {
        assert!(ApiUrl::new("http://shop.example.com/api").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/products").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ApiUrl::new("https://shop.example.com/api?debug=1").is_err());
    }
}
