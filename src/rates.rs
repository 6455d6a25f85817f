use alloy_primitives::U256;

use crate::{
    constants::{PRE_SALE_RATE, SEED_SALE_RATE},
    error::SaleError,
    stage::SaleStage,
};

/// Divisor used for each stage when converting payment into tokens.
///
/// The pre-sale and seed rates are fixed once the table is built. The final
/// rate starts at zero, which blocks final-stage purchases until an
/// administrator sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTable {
    pre_sale: U256,
    seed_sale: U256,
    final_sale: U256,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new(PRE_SALE_RATE, SEED_SALE_RATE)
    }
}

impl RateTable {
    pub fn new(pre_sale: U256, seed_sale: U256) -> Self {
        Self {
            pre_sale,
            seed_sale,
            final_sale: U256::ZERO,
        }
    }

    /// Rebuild a table from previously persisted values
    pub fn from_parts(pre_sale: U256, seed_sale: U256, final_sale: U256) -> Self {
        Self {
            pre_sale,
            seed_sale,
            final_sale,
        }
    }

    /// Raw stored rate, zero when unset
    pub fn get(&self, stage: SaleStage) -> U256 {
        match stage {
            SaleStage::PreSale => self.pre_sale,
            SaleStage::SeedSale => self.seed_sale,
            SaleStage::FinalSale => self.final_sale,
        }
    }

    /// Rate usable for a purchase in `stage`
    pub fn rate_for(&self, stage: SaleStage) -> Result<U256, SaleError> {
        let rate = self.get(stage);
        if rate.is_zero() {
            return Err(SaleError::RateNotSet);
        }
        Ok(rate)
    }

    /// Replace the final-stage rate, returning the previous value
    pub fn set_final_rate(&mut self, rate: U256) -> Result<U256, SaleError> {
        if rate.is_zero() {
            return Err(SaleError::InvalidRate);
        }
        Ok(core::mem::replace(&mut self.final_sale, rate))
    }
}
