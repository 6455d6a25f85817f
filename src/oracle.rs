//! Price Feed Adapter.
//!
//! Turns a Chainlink style aggregator round into a positive integer price in
//! the feed's own fixed point scale (8 decimals for ETH/USD). Every call goes
//! back to the aggregator; nothing is cached.

use alloy_primitives::{I256, U256};

use crate::error::SaleError;

/// Accept a round only if it completed and carries a positive answer
pub fn normalize_round(answer: I256, updated_at: U256) -> Result<U256, SaleError> {
    if updated_at.is_zero() || !answer.is_positive() {
        return Err(SaleError::PriceUnavailable);
    }
    Ok(answer.into_raw())
}

#[cfg(any(target_arch = "wasm32", feature = "export-abi"))]
pub use self::aggregator::ChainlinkFeed;

#[cfg(any(target_arch = "wasm32", feature = "export-abi"))]
mod aggregator {
    use stylus_sdk::{alloy_primitives::{Address, U256}, call::Call, prelude::*};

    use super::normalize_round;
    use crate::{error::SaleError, settlement::PriceFeed};

    sol_interface! {
        interface IAggregatorV3 {
            function latestRoundData() external view returns (uint80, int256, uint256, uint256, uint80);
        }
    }

    /// Aggregator bound by address, queried with a static call
    pub struct ChainlinkFeed {
        aggregator: Address,
    }

    impl ChainlinkFeed {
        pub fn new(aggregator: Address) -> Self {
            Self { aggregator }
        }
    }

    impl PriceFeed for ChainlinkFeed {
        fn get_price(&mut self) -> Result<U256, SaleError> {
            let (_round_id, answer, _started_at, updated_at, _answered_in_round) =
                IAggregatorV3::new(self.aggregator)
                    .latest_round_data(Call::new())
                    .map_err(|_| SaleError::PriceUnavailable)?;

            normalize_round(answer, updated_at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: i64) -> I256 {
        I256::try_from(value).unwrap()
    }

    #[test]
    fn positive_answer_passes_through_unscaled() {
        let answer = price(3_150_42000000);
        assert_eq!(
            normalize_round(answer, U256::from(1_700_000_000u64)),
            Ok(U256::from(3_150_42000000u64))
        );
    }

    #[test]
    fn non_positive_answer_is_unavailable() {
        let now = U256::from(1_700_000_000u64);
        assert_eq!(normalize_round(I256::ZERO, now), Err(SaleError::PriceUnavailable));
        assert_eq!(normalize_round(price(-1), now), Err(SaleError::PriceUnavailable));
        assert_eq!(normalize_round(I256::MIN, now), Err(SaleError::PriceUnavailable));
    }

    #[test]
    fn incomplete_round_is_unavailable() {
        assert_eq!(
            normalize_round(price(2_000_00000000), U256::ZERO),
            Err(SaleError::PriceUnavailable)
        );
    }
}
