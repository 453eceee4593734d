//! Cloud provider tags

use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Amazon,
    Google,
    OpenStack,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Amazon => write!(f, "amazon"),
            Provider::Google => write!(f, "google"),
            Provider::OpenStack => write!(f, "openstack"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amazon" => Ok(Provider::Amazon),
            "google" => Ok(Provider::Google),
            "openstack" => Ok(Provider::OpenStack),
            other => Err(NetworkError::bad_request(format!(
                "unknown provider: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roundtrip() {
        for provider in [Provider::Amazon, Provider::Google, Provider::OpenStack] {
            let parsed: Provider = provider.to_string().parse().unwrap();
            assert_eq!(parsed, provider);
        }

        assert!("azure".parse::<Provider>().is_err());
    }
}
