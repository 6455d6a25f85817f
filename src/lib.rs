//! Staged token sale contract: buyers pay in the native currency, receive tokens priced by the active sale stage
//! and an external price feed, and every payment is forwarded to the beneficiary in the same transaction.
//! The purchase workflow lives in a host agnostic core (`settlement`) that the Stylus entrypoint drives.
//! The program is ABI-equivalent with Solidity, which means you can call it from both Solidity and Rust. To do this, run `cargo stylus export-abi`.

// Allow `cargo stylus export-abi` to generate a main function.
#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: mini_alloc::MiniAlloc = mini_alloc::MiniAlloc::INIT;

pub mod constants;
pub mod error;
pub mod oracle;
pub mod rates;
pub mod settlement;
pub mod stage;

#[cfg(any(target_arch = "wasm32", feature = "export-abi"))]
pub mod ledger;

#[cfg(any(target_arch = "wasm32", feature = "export-abi"))]
mod contract;

#[cfg(any(target_arch = "wasm32", feature = "export-abi"))]
pub use contract::{Errors, StagedTokenSale};

#[cfg(feature = "export-abi")]
pub use contract::print_abi;

#[cfg(test)]
mod testing;

pub use error::SaleError;
pub use rates::RateTable;
pub use settlement::{FundsForwarder, Order, PriceFeed, PurchaseReceipt, Quote, SaleState, TokenLedger};
pub use stage::SaleStage;
