//! Error types for network synchronization

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised at the provider SDK boundary.
///
/// SDK clients surface their failures through this type; the controller
/// wraps them into the operation-specific `NetworkError` variants.
#[derive(Debug, Error)]
pub enum CloudApiError {
    #[error("Provider API call failed: {message}")]
    Call { message: String },

    #[error("Malformed provider response: {message}")]
    Response { message: String },

    #[error("{call} is not supported by this provider")]
    Unsupported { call: &'static str },
}

/// Main error type for network and subnet operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Required parameter missing: {parameter}")]
    MissingParameter { parameter: String },

    #[error("Network {title} with network_id {network_id} not found")]
    NetworkNotFound { title: String, network_id: String },

    #[error("Subnet {title} with subnet_id {subnet_id} not found")]
    SubnetNotFound { title: String, subnet_id: String },

    #[error("Network {title} already exists")]
    NetworkExists { title: String },

    #[error("Subnet {title} already exists")]
    SubnetExists { title: String },

    #[error("Network creation failed: {source}")]
    NetworkCreation { source: CloudApiError },

    #[error("Subnet creation failed: {source}")]
    SubnetCreation { source: CloudApiError },

    #[error("Network listing failed: {source}")]
    NetworkListing { source: CloudApiError },

    #[error("Subnet listing failed: {source}")]
    SubnetListing { source: CloudApiError },

    #[error("Network deletion failed: {source}")]
    NetworkDeletion { source: CloudApiError },

    #[error("Subnet deletion failed: {source}")]
    SubnetDeletion { source: CloudApiError },

    #[error("Store operation failed: {message}")]
    Store { message: String },
}

impl NetworkError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        NetworkError::BadRequest {
            message: message.into(),
        }
    }
}
