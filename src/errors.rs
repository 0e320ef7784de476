use std::{error::Error, fmt::Debug};
use thiserror::Error;

use crate::JsonRpcError;

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// All clients can return [`JsonRpcError`] responses, as well as serde
/// deserialization errors. However, because client errors are typically
/// type-erased via the [`FeeSuggestionError`], the error info can be
/// difficult to access. This trait provides convenient access to the
/// underlying error types.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying JSON-RPC error (if any)
    ///
    /// Attempts to access an underlying [`JsonRpcError`]. If the underlying
    /// error is not a JSON-RPC error response, this function will return
    /// `None`.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Access an underlying `serde_json` error (if any)
    ///
    /// Attempts to access an underlying [`serde_json::Error`]. If the
    /// underlying error is not a serde_json error, this function will return
    /// `None`.
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the underlying error is a serde_json
    /// (de)serialization error
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

#[derive(Debug, Error)]
/// An error thrown when computing fee suggestions.
///
/// Transport failures are passed through unchanged; malformed
/// `eth_feeHistory` payloads get their own variants naming the offending
/// field. Nothing is retried at this layer.
pub enum FeeSuggestionError {
    /// An internal error in the JSON RPC Client
    #[error("{0}")]
    JsonRpcClientError(Box<dyn RpcError + Send + Sync>),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Error in underlying lib `reqwest`
    #[error(transparent)]
    HTTPError(#[from] reqwest::Error),

    /// The `baseFeePerGas` array of the `eth_feeHistory` response was empty
    #[error("`baseFeePerGas` was empty in the eth_feeHistory response")]
    EmptyBaseFees,

    /// The `gasUsedRatio` array of the `eth_feeHistory` response was empty
    #[error("`gasUsedRatio` was empty in the eth_feeHistory response")]
    EmptyGasUsedRatios,

    /// The `reward` array of the `eth_feeHistory` response was empty
    #[error("`reward` was empty in the eth_feeHistory response")]
    EmptyRewards,

    /// No smoothed reward value could be computed at the given percentile
    /// index, e.g. because every sample was rejected as an outlier
    #[error("no reward average could be computed at percentile index {0}")]
    UndefinedRewardAverage(usize),
}

impl RpcError for FeeSuggestionError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let FeeSuggestionError::JsonRpcClientError(err) = self {
            err.as_error_response()
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            FeeSuggestionError::JsonRpcClientError(e) => e.as_serde_error(),
            FeeSuggestionError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}
