use std::{collections::BTreeMap, str::FromStr};

use ethereum_types::U256;
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// A block tag accepted by `eth_feeHistory`'s `newestBlock` parameter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockNumber {
    /// Latest block
    #[default]
    Latest,
    /// Finalized block accepted as canonical
    Finalized,
    /// Safe head block
    Safe,
    /// Earliest block (genesis)
    Earliest,
    /// Pending block (not yet part of the blockchain)
    Pending,
    /// Block by number from canonical chain
    Number(u64),
}

impl From<u64> for BlockNumber {
    fn from(num: u64) -> Self {
        BlockNumber::Number(num)
    }
}

impl Serialize for BlockNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            BlockNumber::Number(ref x) => serializer.serialize_str(&format!("0x{x:x}")),
            BlockNumber::Latest => serializer.serialize_str("latest"),
            BlockNumber::Finalized => serializer.serialize_str("finalized"),
            BlockNumber::Safe => serializer.serialize_str("safe"),
            BlockNumber::Earliest => serializer.serialize_str("earliest"),
            BlockNumber::Pending => serializer.serialize_str("pending"),
        }
    }
}

impl FromStr for BlockNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "latest" => BlockNumber::Latest,
            "finalized" => BlockNumber::Finalized,
            "safe" => BlockNumber::Safe,
            "earliest" => BlockNumber::Earliest,
            "pending" => BlockNumber::Pending,
            n => {
                let n = n.strip_prefix("0x").unwrap_or(n);
                BlockNumber::Number(
                    u64::from_str_radix(n, 16).map_err(|e| format!("invalid block number: {e}"))?,
                )
            }
        })
    }
}

/// The result of an `eth_feeHistory` call.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeHistory {
    /// Per-block base fees in wei, oldest first. Holds one entry more than
    /// `gas_used_ratio`: the last element is the base fee of the *next*
    /// (not yet mined) block.
    pub base_fee_per_gas: Vec<U256>,
    /// How full each historical block was, in `[0, 1]`.
    pub gas_used_ratio: Vec<f64>,
    #[serde(deserialize_with = "from_int_or_hex")]
    /// oldestBlock is returned as an unsigned integer up to geth v1.10.6.
    /// From geth v1.10.7, this has been updated to return in the hex encoded
    /// form. The custom deserializer allows backward compatibility for those
    /// clients not running v1.10.7 yet.
    pub oldest_block: U256,
    /// An (optional) array of effective priority fee per gas data points
    /// from a single block, one inner entry per requested percentile. All
    /// zeroes are returned if the block is empty.
    #[serde(default)]
    pub reward: Vec<Vec<U256>>,
}

fn from_int_or_hex<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrHex {
        Int(u64),
        Hex(String),
    }
    match IntOrHex::deserialize(deserializer)? {
        IntOrHex::Int(n) => Ok(U256::from(n)),
        IntOrHex::Hex(s) => U256::from_str(s.as_str()).map_err(serde::de::Error::custom),
    }
}

/// Base-fee suggestion derived from recent base-fee history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxFeeSuggestions {
    /// The base fee forecast for the next block, in wei, straight from the
    /// fee history response.
    pub current_base_fee: U256,
    /// The suggested `maxBaseFee`, in wei.
    pub base_fee_suggestion: U256,
    /// Least-squares slope of the recent base fees, in gwei per block.
    /// Positive means fees have been rising.
    pub base_fee_trend: f64,
}

/// Named priority-fee (miner tip) tiers, in wei.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityFeeSuggestions {
    pub normal: U256,
    pub fast: U256,
    pub urgent: U256,
}

/// Priority-fee suggestion derived from recent reward percentiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxPriorityFeeSuggestions {
    /// Suggested tips by named tier.
    pub priority_fee_suggestions: PriorityFeeSuggestions,
    /// Suggested tip, in wei, keyed by desired confirmation time in seconds
    /// (15, 30, 45 and 60). Faster confirmation maps to a higher observed
    /// reward percentile.
    pub confirmation_seconds_to_priority_fee: BTreeMap<u64, U256>,
}

/// Combined output of [`crate::Provider::suggest_fees`]: the union of
/// [`MaxFeeSuggestions`] and [`MaxPriorityFeeSuggestions`]. Recomputed on
/// every call, never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePerGasSuggestions {
    pub current_base_fee: U256,
    pub base_fee_suggestion: U256,
    pub base_fee_trend: f64,
    pub priority_fee_suggestions: PriorityFeeSuggestions,
    pub confirmation_seconds_to_priority_fee: BTreeMap<u64, U256>,
}

impl FeePerGasSuggestions {
    pub(crate) fn from_parts(
        max_fee: MaxFeeSuggestions,
        priority_fee: MaxPriorityFeeSuggestions,
    ) -> Self {
        Self {
            current_base_fee: max_fee.current_base_fee,
            base_fee_suggestion: max_fee.base_fee_suggestion,
            base_fee_trend: max_fee.base_fee_trend,
            priority_fee_suggestions: priority_fee.priority_fee_suggestions,
            confirmation_seconds_to_priority_fee: priority_fee
                .confirmation_seconds_to_priority_fee,
        }
    }
}
