#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # EIP-1559 fee suggestions
//!
//! This crate computes base-fee and priority-fee (miner tip) suggestions for
//! EIP-1559 transactions from raw `eth_feeHistory` data.
//!
//! The base-fee side samples a weighted percentile of recent base fees over
//! several averaging horizons, after smoothing out blocks that were nearly
//! full. The priority-fee side takes outlier-filtered exponential moving
//! averages of historical miner rewards at the 10th/15th/30th/45th
//! percentiles and maps them to `normal`/`fast`/`urgent` tiers as well as to
//! confirmation-time targets.
//!
//! Both suggestions are pure functions of a single [`FeeHistory`] response,
//! so they can be computed offline; the [`Provider`] methods fetch the data
//! and run them concurrently.
//!
//! # Examples
//!
//! ```no_run
//! use fee_suggestions::{Http, Provider};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("https://eth.llamarpc.com")?;
//!
//! let suggestions = provider.suggest_fees().await?;
//! println!(
//!     "base fee: {} wei (trend {:+.3}), urgent tip: {} wei",
//!     suggestions.base_fee_suggestion,
//!     suggestions.base_fee_trend,
//!     suggestions.priority_fee_suggestions.urgent,
//! );
//! # Ok(())
//! # }
//! ```

mod transports;
pub use transports::{ClientError, Http, JsonRpcError, MockError, MockProvider, MockResponse};

mod provider;
pub use provider::{JsonRpcClient, Provider};

mod errors;
pub use errors::{FeeSuggestionError, RpcError};

mod types;
pub use types::{
    BlockNumber, FeeHistory, FeePerGasSuggestions, MaxFeeSuggestions, MaxPriorityFeeSuggestions,
    PriorityFeeSuggestions,
};

mod suggestions;
pub use suggestions::{
    exponential_moving_average, linear_regression_slope, max_base_fee_suggestions,
    max_priority_fee_suggestions, outlier_blocks_to_remove, rewards_filter_outliers,
    sampling_curve, SuggestionParams, DEFAULT_BLOCK_COUNT_HISTORY, GWEI_REWARD_OUTLIER_THRESHOLD,
    MAX_TIME_FACTOR, PRIORITY_FEE_HISTORY_BLOCKS, REWARD_PERCENTILES, SAMPLE_MAX_PERCENTILE,
    SAMPLE_MIN_PERCENTILE,
};

pub mod utils;

pub use ethereum_types::U256;
