//! Base-fee suggestion: a weighted-percentile estimate over recent base
//! fees, computed for several averaging horizons and clamped to be
//! non-decreasing as the horizon shrinks.

use crate::{
    errors::FeeSuggestionError,
    provider::JsonRpcClient,
    suggestions::{
        stats::{linear_regression_slope, sampling_curve},
        SuggestionParams,
    },
    types::{BlockNumber, FeeHistory, MaxFeeSuggestions},
    utils::{gwei_to_wei, wei_to_gwei},
    Provider,
};

/// Blocks fuller than this ratio inherit the following block's adjusted base
/// fee, since demand pressure was already pushing the fee up.
const FULL_BLOCK_GAS_USED_RATIO: f64 = 0.9;

impl<P: JsonRpcClient> Provider<P> {
    /// Suggests a `maxBaseFee` from the base-fee history of
    /// `params.block_count_history` blocks ending at `from_block`.
    ///
    /// An empty fee history is a fatal error; it is surfaced to the caller
    /// and never retried here.
    pub async fn suggest_max_base_fee(
        &self,
        from_block: BlockNumber,
        params: &SuggestionParams,
    ) -> Result<MaxFeeSuggestions, FeeSuggestionError> {
        let fee_history =
            self.fee_history(params.block_count_history, from_block, &[]).await?;
        max_base_fee_suggestions(&fee_history, params)
    }
}

/// Computes the base-fee suggestion from an already-fetched [`FeeHistory`].
///
/// Pure function of its inputs: identical responses always produce identical
/// suggestions.
pub fn max_base_fee_suggestions(
    fee_history: &FeeHistory,
    params: &SuggestionParams,
) -> Result<MaxFeeSuggestions, FeeSuggestionError> {
    let current_base_fee = fee_history
        .base_fee_per_gas
        .last()
        .copied()
        .ok_or(FeeSuggestionError::EmptyBaseFees)?;
    if fee_history.gas_used_ratio.is_empty() {
        return Err(FeeSuggestionError::EmptyGasUsedRatios)
    }

    let base_fees: Vec<f64> = fee_history.base_fee_per_gas.iter().map(|fee| wei_to_gwei(*fee)).collect();
    let block_indexes: Vec<f64> = (0..base_fees.len()).map(|i| i as f64).collect();
    let base_fee_trend = linear_regression_slope(&base_fees, &block_indexes);

    let base_fees = adjust_base_fees(base_fees, &fee_history.gas_used_ratio);

    // ascending by adjusted fee; sort_by is stable so ties keep block order
    let mut order: Vec<usize> = (0..base_fees.len()).collect();
    order.sort_by(|&a, &b| base_fees[a].total_cmp(&base_fees[b]));

    let series = suggestion_series(&base_fees, &order, params);
    let suggested = series.iter().copied().fold(0.0, f64::max);

    Ok(MaxFeeSuggestions {
        current_base_fee,
        base_fee_suggestion: gwei_to_wei(suggested),
        base_fee_trend,
    })
}

/// Inflates the freshest base fee by 9/8 (a deliberate overestimate, since
/// congestion tends to carry over into the next block) and lets every
/// nearly-full block inherit the following block's adjusted value. The
/// reverse iteration makes a chain of full blocks all take the
/// forward-most adjusted fee.
fn adjust_base_fees(mut base_fees: Vec<f64>, gas_used_ratio: &[f64]) -> Vec<f64> {
    if let Some(newest) = base_fees.last_mut() {
        *newest *= 9.0 / 8.0;
    }
    // clamped in case a node returns mismatched array lengths
    let blocks = gas_used_ratio.len().min(base_fees.len().saturating_sub(1));
    for i in (0..blocks).rev() {
        if gas_used_ratio[i] > FULL_BLOCK_GAS_USED_RATIO {
            base_fees[i] = base_fees[i + 1];
        }
    }
    base_fees
}

/// One suggestion per time factor, indexed by the factor. Suggestions are
/// floor-clamped to the running maximum while walking the factors downward,
/// so allowing a longer wait never suggests a higher fee than an urgent
/// inclusion would.
fn suggestion_series(base_fees: &[f64], order: &[usize], params: &SuggestionParams) -> Vec<f64> {
    let mut series = vec![0.0; params.max_time_factor as usize + 1];
    let mut running_max = 0.0f64;
    for time_factor in (0..=params.max_time_factor).rev() {
        let suggestion = suggest_base_fee(
            base_fees,
            order,
            time_factor as f64,
            params.sample_min_percentile,
            params.sample_max_percentile,
        );
        running_max = running_max.max(suggestion);
        series[time_factor as usize] = running_max;
    }
    series
}

/// Weighted-percentile estimate of the base fee for one averaging horizon.
///
/// Each block gets an exponential decay weight (more recent blocks heavier,
/// larger `time_factor` meaning slower decay, i.e. a longer effective
/// window), normalized so the weights over all blocks sum to 1. Walking the
/// blocks in ascending fee order, the accumulated weight drives the sampling
/// curve, and the fee estimate integrates the curve increments against the
/// fee at each step.
fn suggest_base_fee(
    base_fees: &[f64],
    order: &[usize],
    time_factor: f64,
    sample_min: f64,
    sample_max: f64,
) -> f64 {
    // "suggest for right now": just the freshest adjusted fee
    if time_factor < 1e-6 {
        return base_fees.last().copied().unwrap_or_default()
    }
    let len = base_fees.len() as f64;
    let pending_weight =
        (1.0 - (-1.0 / time_factor).exp()) / (1.0 - (-len / time_factor).exp());

    let mut sum_weight = 0.0;
    let mut result = 0.0;
    let mut curve_prev = 0.0;
    for &idx in order {
        sum_weight += pending_weight * ((idx as f64 + 1.0 - len) / time_factor).exp();
        let curve = sampling_curve(sum_weight, sample_min, sample_max);
        result += (curve - curve_prev) * base_fees[idx];
        if curve >= 1.0 {
            return result
        }
        curve_prev = curve;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::gwei_to_wei;
    use ethereum_types::U256;

    fn history(base_fees_gwei: &[f64], gas_used_ratio: &[f64]) -> FeeHistory {
        FeeHistory {
            base_fee_per_gas: base_fees_gwei.iter().map(|&g| gwei_to_wei(g)).collect(),
            gas_used_ratio: gas_used_ratio.to_vec(),
            oldest_block: U256::from(1_000_000),
            reward: vec![],
        }
    }

    #[test]
    fn zero_time_factor_returns_freshest_adjusted_fee() {
        let base_fees = vec![10.0, 20.0, 30.0];
        let order = vec![0, 1, 2];
        assert_eq!(suggest_base_fee(&base_fees, &order, 0.0, 0.1, 0.3), 30.0);

        // through the public entry point the freshest fee carries the 9/8
        // inflation
        let params = SuggestionParams { max_time_factor: 0, ..Default::default() };
        let result = max_base_fee_suggestions(&history(&[10.0, 20.0, 30.0], &[0.5, 0.5]), &params)
            .unwrap();
        assert_eq!(result.base_fee_suggestion, gwei_to_wei(30.0 * 9.0 / 8.0));
    }

    #[test]
    fn full_blocks_inherit_the_following_adjusted_fee() {
        let adjusted = adjust_base_fees(vec![10.0, 20.0, 32.0], &[0.95, 0.5]);
        assert_eq!(adjusted, vec![20.0, 20.0, 36.0]);

        // a chain of full blocks all take the forward-most value
        let adjusted = adjust_base_fees(vec![10.0, 20.0, 32.0], &[0.95, 0.95]);
        assert_eq!(adjusted, vec![36.0, 36.0, 36.0]);
    }

    #[test]
    fn suggestions_never_decrease_as_time_factor_shrinks() {
        // clearly falling fees make the raw per-factor estimates decrease,
        // so this exercises the running-max clamp
        let base_fees_gwei: Vec<f64> = (0..25).map(|i| 100.0 - 3.0 * i as f64).collect();
        let fee_history = history(&base_fees_gwei, &vec![0.5; 24]);

        let params = SuggestionParams::default();
        let base_fees: Vec<f64> =
            fee_history.base_fee_per_gas.iter().map(|fee| wei_to_gwei(*fee)).collect();
        let base_fees = adjust_base_fees(base_fees, &fee_history.gas_used_ratio);
        let mut order: Vec<usize> = (0..base_fees.len()).collect();
        order.sort_by(|&a, &b| base_fees[a].total_cmp(&base_fees[b]));

        let series = suggestion_series(&base_fees, &order, &params);
        assert_eq!(series.len(), params.max_time_factor as usize + 1);
        // series[tf] for smaller tf must be >= the value at larger tf
        assert!(series.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn upward_trend_tracks_current_base_fee() {
        // 26 base fees rising linearly from 10 to 35 gwei
        let base_fees_gwei: Vec<f64> = (10..=35).map(|g| g as f64).collect();
        let fee_history = history(&base_fees_gwei, &vec![0.5; 25]);

        let result =
            max_base_fee_suggestions(&fee_history, &SuggestionParams::default()).unwrap();

        assert_eq!(result.current_base_fee, gwei_to_wei(35.0));
        assert!(result.base_fee_trend > 0.0);
        assert!(result.base_fee_suggestion >= result.current_base_fee);
    }

    #[test]
    fn downward_trend_has_negative_slope() {
        let base_fees_gwei: Vec<f64> = (0..10).map(|i| 50.0 - 2.0 * i as f64).collect();
        let fee_history = history(&base_fees_gwei, &vec![0.5; 9]);

        let result =
            max_base_fee_suggestions(&fee_history, &SuggestionParams::default()).unwrap();
        assert!(result.base_fee_trend < 0.0);
    }

    #[test]
    fn empty_base_fees_are_fatal() {
        let fee_history = FeeHistory {
            base_fee_per_gas: vec![],
            gas_used_ratio: vec![0.5],
            oldest_block: U256::zero(),
            reward: vec![],
        };
        let err = max_base_fee_suggestions(&fee_history, &SuggestionParams::default()).unwrap_err();
        assert!(matches!(err, FeeSuggestionError::EmptyBaseFees));
    }

    #[test]
    fn empty_gas_used_ratios_are_fatal() {
        let fee_history = FeeHistory {
            base_fee_per_gas: vec![U256::from(1_000_000_000u64)],
            gas_used_ratio: vec![],
            oldest_block: U256::zero(),
            reward: vec![],
        };
        let err = max_base_fee_suggestions(&fee_history, &SuggestionParams::default()).unwrap_err();
        assert!(matches!(err, FeeSuggestionError::EmptyGasUsedRatios));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let base_fees_gwei: Vec<f64> = (10..=35).map(|g| g as f64).collect();
        let fee_history = history(&base_fees_gwei, &vec![0.5; 25]);
        let params = SuggestionParams::default();

        let a = max_base_fee_suggestions(&fee_history, &params).unwrap();
        let b = max_base_fee_suggestions(&fee_history, &params).unwrap();
        assert_eq!(a, b);
    }
}
