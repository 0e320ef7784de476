use crate::{
    errors::{FeeSuggestionError, RpcError},
    transports::{Http, MockProvider},
    types::{BlockNumber, FeeHistory},
    utils,
};

use async_trait::async_trait;
use auto_impl::auto_impl;
use ethereum_types::U256;
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, str::FromStr};
use tracing::trace;
use tracing_futures::Instrument;

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with the
/// Ethereum JSON-RPC provider.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: Into<FeeSuggestionError> + RpcError;

    /// Sends a request with the provided JSON-RPC and parameters serialized as JSON
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}

/// An abstract provider for interacting with the [Ethereum JSON RPC
/// API](https://github.com/ethereum/wiki/wiki/JSON-RPC). Must be instantiated
/// with a data transport which implements the [`JsonRpcClient`] trait
/// (e.g. [HTTP](crate::Http) or [mock](crate::MockProvider)).
///
/// # Example
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use fee_suggestions::{BlockNumber, Http, Provider};
///
/// let provider = Provider::<Http>::try_from(
///     "https://eth.llamarpc.com"
/// ).expect("could not instantiate HTTP Provider");
///
/// let history = provider.fee_history(10u64, BlockNumber::Latest, &[10.0, 45.0]).await?;
/// println!("oldest block covered: {}", history.oldest_block);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self { inner: provider }
    }

    /// Make an RPC request to the underlying transport, wrapped in a tracing
    /// span recording the method and parameters.
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, FeeSuggestionError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        let span =
            tracing::trace_span!("rpc", method = method, params = ?serde_json::to_string(&params)?);
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let res: R = self.inner.request(method, params).await.map_err(Into::into)?;
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, FeeSuggestionError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Queries `eth_feeHistory` for `block_count` blocks ending at
    /// `last_block`, requesting the reward percentiles in
    /// `reward_percentiles` (pass an empty slice to skip rewards).
    pub async fn fee_history<T: Into<U256> + Send + Sync>(
        &self,
        block_count: T,
        last_block: BlockNumber,
        reward_percentiles: &[f64],
    ) -> Result<FeeHistory, FeeSuggestionError> {
        let block_count = block_count.into();
        let last_block = utils::serialize(&last_block);
        let reward_percentiles = utils::serialize(&reward_percentiles);

        // The blockCount param is expected to be an unsigned integer up to
        // geth v1.10.6. Geth v1.10.7 onwards, this has been updated to a hex
        // encoded form. Failure to decode the param from client side would
        // fallback to the old API spec.
        match self
            .request::<_, FeeHistory>(
                "eth_feeHistory",
                [utils::serialize(&block_count), last_block.clone(), reward_percentiles.clone()],
            )
            .await
        {
            success @ Ok(_) => success,
            err @ Err(_) => {
                let fallback = self
                    .request::<_, FeeHistory>(
                        "eth_feeHistory",
                        [utils::serialize(&block_count.as_u64()), last_block, reward_percentiles],
                    )
                    .await;

                if fallback.is_err() {
                    // if the older fallback also resulted in an error, we
                    // return the error from the new API
                    return err
                }

                fallback
            }
        }
    }
}

impl Provider<MockProvider> {
    /// Returns a `Provider` instantiated with an internal "mock" transport.
    ///
    /// # Example
    ///
    /// ```
    /// # use fee_suggestions::{Provider, U256};
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// // Instantiate the provider
    /// let (provider, mock) = Provider::mocked();
    /// // Push the mock response
    /// mock.push(U256::from(2))?;
    /// // Make the call
    /// let price: U256 = provider.request("eth_gasPrice", ()).await?;
    /// // The response is what we pushed
    /// assert_eq!(price, U256::from(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        let mock_clone = mock.clone();
        (Self::new(mock), mock_clone)
    }
}

impl TryFrom<&str> for Provider<Http> {
    type Error = url::ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(Http::from_str(src)?))
    }
}

impl TryFrom<String> for Provider<Http> {
    type Error = url::ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}
