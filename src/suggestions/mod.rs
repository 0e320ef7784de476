//! The fee suggestion engine.
//!
//! Everything here is a pure computation over a fetched [`FeeHistory`]
//! (see [`max_base_fee_suggestions`] and [`max_priority_fee_suggestions`]);
//! the [`Provider`] methods only fetch the data and fan the two
//! computations out concurrently.

mod stats;
pub use stats::{exponential_moving_average, linear_regression_slope, sampling_curve};

mod base_fee;
pub use base_fee::max_base_fee_suggestions;

mod priority_fee;
pub use priority_fee::{
    max_priority_fee_suggestions, outlier_blocks_to_remove, rewards_filter_outliers,
};

use futures_util::try_join;

use crate::{
    errors::FeeSuggestionError,
    provider::JsonRpcClient,
    types::{BlockNumber, FeeHistory, FeePerGasSuggestions},
    Provider,
};

/// How many blocks of base-fee history back the base-fee suggestion.
pub const DEFAULT_BLOCK_COUNT_HISTORY: u64 = 25;

/// How many blocks of reward history back the priority-fee suggestion.
pub const PRIORITY_FEE_HISTORY_BLOCKS: u64 = 10;

/// Reward percentiles requested from `eth_feeHistory` for the priority-fee
/// suggestion. The tier and confirmation-time mappings are defined
/// positionally over exactly these four.
pub const REWARD_PERCENTILES: [f64; 4] = [10.0, 15.0, 30.0, 45.0];

/// Blocks whose 10th-percentile reward exceeds this many gwei are treated
/// as outliers and removed from the priority-fee averages.
pub const GWEI_REWARD_OUTLIER_THRESHOLD: f64 = 5.0;

/// Largest averaging horizon evaluated by the base-fee suggestion.
pub const MAX_TIME_FACTOR: u32 = 15;

/// Lower bound of the weighted-percentile band sampled from the ascending
/// base-fee walk.
pub const SAMPLE_MIN_PERCENTILE: f64 = 0.1;

/// Upper bound of the weighted-percentile band.
pub const SAMPLE_MAX_PERCENTILE: f64 = 0.3;

/// Tuning knobs for the suggestion engine.
///
/// [`SuggestionParams::default`] carries the published constants; tests and
/// downstream tuning can override individual fields.
#[derive(Clone, Debug)]
pub struct SuggestionParams {
    /// Blocks of base-fee history to fetch.
    pub block_count_history: u64,
    /// Blocks of reward history to fetch.
    pub priority_fee_blocks: u64,
    /// Reward outlier threshold, in gwei.
    pub reward_outlier_threshold: f64,
    /// Largest time factor evaluated for the base fee.
    pub max_time_factor: u32,
    /// Lower bound of the sampling band.
    pub sample_min_percentile: f64,
    /// Upper bound of the sampling band.
    pub sample_max_percentile: f64,
}

impl Default for SuggestionParams {
    fn default() -> Self {
        Self {
            block_count_history: DEFAULT_BLOCK_COUNT_HISTORY,
            priority_fee_blocks: PRIORITY_FEE_HISTORY_BLOCKS,
            reward_outlier_threshold: GWEI_REWARD_OUTLIER_THRESHOLD,
            max_time_factor: MAX_TIME_FACTOR,
            sample_min_percentile: SAMPLE_MIN_PERCENTILE,
            sample_max_percentile: SAMPLE_MAX_PERCENTILE,
        }
    }
}

impl<P: JsonRpcClient> Provider<P> {
    /// Suggests EIP-1559 fees for the latest block with the default tuning.
    ///
    /// Issues both `eth_feeHistory` queries concurrently; if either fails
    /// the whole call fails, there is no partial result.
    pub async fn suggest_fees(&self) -> Result<FeePerGasSuggestions, FeeSuggestionError> {
        self.suggest_fees_with(BlockNumber::Latest, &SuggestionParams::default()).await
    }

    /// Suggests EIP-1559 fees for the history ending at `from_block`,
    /// with explicit tuning parameters.
    pub async fn suggest_fees_with(
        &self,
        from_block: BlockNumber,
        params: &SuggestionParams,
    ) -> Result<FeePerGasSuggestions, FeeSuggestionError> {
        let (max_fee, priority_fee) = try_join!(
            self.suggest_max_base_fee(from_block, params),
            self.suggest_max_priority_fee(from_block, params),
        )?;
        Ok(FeePerGasSuggestions::from_parts(max_fee, priority_fee))
    }
}
