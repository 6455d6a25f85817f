use alloy_primitives::U256;

/// Rate applied during the pre-sale, fixed for the life of the contract
pub const PRE_SALE_RATE: U256 = U256::from_limbs([30_000_000_000_000_000u64, 0, 0, 0]); // 3e16

/// Rate applied during the seed sale, fixed for the life of the contract
pub const SEED_SALE_RATE: U256 = U256::from_limbs([40_000_000_000_000_000u64, 0, 0, 0]); // 4e16

/// Decimals reported by the issuance ledger
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole unit of the native currency (wei per ether)
pub const ONE_NATIVE_UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);
