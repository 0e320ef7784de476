//! Priority-fee (miner tip) suggestion: outlier-filtered exponential moving
//! averages of historical rewards at a handful of percentiles.

use std::collections::BTreeMap;

use ethereum_types::U256;

use crate::{
    errors::FeeSuggestionError,
    provider::JsonRpcClient,
    suggestions::{stats::exponential_moving_average, SuggestionParams, REWARD_PERCENTILES},
    types::{BlockNumber, FeeHistory, MaxPriorityFeeSuggestions, PriorityFeeSuggestions},
    utils::{gwei_to_wei, wei_to_gwei},
    Provider,
};

/// Tier floors in gwei. Near-empty blocks report rewards close to zero,
/// which would otherwise suggest tips too low to be accepted in practice.
const NORMAL_FLOOR_GWEI: f64 = 1.0;
const FAST_FLOOR_GWEI: f64 = 1.5;
const URGENT_FLOOR_GWEI: f64 = 2.0;

impl<P: JsonRpcClient> Provider<P> {
    /// Suggests priority fees from the reward history of
    /// `params.priority_fee_blocks` blocks ending at `from_block`, sampled
    /// at the 10th/15th/30th/45th percentiles.
    ///
    /// A response without rewards is a fatal error; it is surfaced to the
    /// caller and never retried here.
    pub async fn suggest_max_priority_fee(
        &self,
        from_block: BlockNumber,
        params: &SuggestionParams,
    ) -> Result<MaxPriorityFeeSuggestions, FeeSuggestionError> {
        let fee_history = self
            .fee_history(params.priority_fee_blocks, from_block, &REWARD_PERCENTILES)
            .await?;
        max_priority_fee_suggestions(&fee_history, params)
    }
}

/// Computes the priority-fee suggestion from an already-fetched
/// [`FeeHistory`].
///
/// Pure function of its inputs: identical responses always produce identical
/// suggestions.
pub fn max_priority_fee_suggestions(
    fee_history: &FeeHistory,
    params: &SuggestionParams,
) -> Result<MaxPriorityFeeSuggestions, FeeSuggestionError> {
    let block_rewards = &fee_history.reward;
    if block_rewards.is_empty() {
        return Err(FeeSuggestionError::EmptyRewards)
    }

    // outliers are detected at the lowest (most sensitive) percentile and
    // removed from every series
    let outlier_blocks =
        outlier_blocks_to_remove(block_rewards, 0, params.reward_outlier_threshold);

    let mut smoothed = [0.0f64; REWARD_PERCENTILES.len()];
    for (percentile_index, value) in smoothed.iter_mut().enumerate() {
        let rewards = rewards_filter_outliers(block_rewards, &outlier_blocks, percentile_index);
        let ema = exponential_moving_average(&rewards, rewards.len());
        *value = ema
            .last()
            .copied()
            .ok_or(FeeSuggestionError::UndefinedRewardAverage(percentile_index))?;
    }
    let [ema10, ema15, ema30, ema45] = smoothed;

    Ok(MaxPriorityFeeSuggestions {
        priority_fee_suggestions: PriorityFeeSuggestions {
            normal: gwei_to_wei(ema15.max(NORMAL_FLOOR_GWEI)),
            fast: gwei_to_wei(ema30.max(FAST_FLOOR_GWEI)),
            urgent: gwei_to_wei(ema45.max(URGENT_FLOOR_GWEI)),
        },
        // quick confirmation requires outbidding more of the fee market, so
        // shorter targets map to higher observed percentiles
        confirmation_seconds_to_priority_fee: BTreeMap::from([
            (15, gwei_to_wei(ema45)),
            (30, gwei_to_wei(ema30)),
            (45, gwei_to_wei(ema15)),
            (60, gwei_to_wei(ema10)),
        ]),
    })
}

/// Returns the indices of blocks whose reward at `percentile_index` exceeds
/// `threshold_gwei`. A handful of blocks with anomalously high bids (e.g.
/// front-running auctions) would otherwise skew the moving average.
pub fn outlier_blocks_to_remove(
    block_rewards: &[Vec<U256>],
    percentile_index: usize,
    threshold_gwei: f64,
) -> Vec<usize> {
    block_rewards
        .iter()
        .enumerate()
        .filter(|(_, rewards)| {
            rewards.get(percentile_index).map_or(false, |r| wei_to_gwei(*r) > threshold_gwei)
        })
        .map(|(index, _)| index)
        .collect()
}

/// Returns the gwei rewards at `percentile_index`, skipping the blocks in
/// `outlier_blocks`. Chronological order is preserved.
pub fn rewards_filter_outliers(
    block_rewards: &[Vec<U256>],
    outlier_blocks: &[usize],
    percentile_index: usize,
) -> Vec<f64> {
    block_rewards
        .iter()
        .enumerate()
        .filter(|(index, _)| !outlier_blocks.contains(index))
        .filter_map(|(_, rewards)| rewards.get(percentile_index))
        .map(|reward| wei_to_gwei(*reward))
        .collect()
}
