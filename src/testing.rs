//! In-memory collaborators for exercising the settlement workflow off chain.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};

use crate::{
    error::SaleError,
    settlement::{FundsForwarder, PriceFeed, TokenLedger},
};

/// Ledger whose entire supply starts with the sale account
pub struct MemoryLedger {
    holder: Address,
    balances: HashMap<Address, U256>,
}

impl MemoryLedger {
    pub fn new(holder: Address, supply: U256) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder, supply);
        Self { holder, balances }
    }

    fn credit(&mut self, account: Address, amount: U256) {
        *self.balances.entry(account).or_default() += amount;
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), SaleError> {
        let balance = self.balances.entry(account).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(SaleError::InsufficientSupply)?;
        Ok(())
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(&mut self, to: Address, amount: U256) -> Result<(), SaleError> {
        self.debit(self.holder, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn undo_transfer(&mut self, to: Address, amount: U256) {
        if self.debit(to, amount).is_ok() {
            self.credit(self.holder, amount);
        }
    }
}

/// Feed returning a settable price; `None` models a feed with no data
pub struct StaticFeed {
    price: Option<U256>,
    calls: usize,
}

impl StaticFeed {
    pub fn new(price: U256) -> Self {
        Self {
            price: Some(price),
            calls: 0,
        }
    }

    pub fn set_price(&mut self, price: Option<U256>) {
        self.price = price;
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PriceFeed for StaticFeed {
    fn get_price(&mut self) -> Result<U256, SaleError> {
        self.calls += 1;
        self.price
            .filter(|price| !price.is_zero())
            .ok_or(SaleError::PriceUnavailable)
    }
}

/// Native-currency balances credited by forwarded payments
#[derive(Default)]
pub struct MemoryBank {
    balances: HashMap<Address, U256>,
    refusing: HashSet<Address>,
    deliveries: usize,
}

impl MemoryBank {
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Make `account` reject incoming funds
    pub fn refuse(&mut self, account: Address) {
        self.refusing.insert(account);
    }

    pub fn deliveries(&self) -> usize {
        self.deliveries
    }
}

impl FundsForwarder for MemoryBank {
    fn forward(&mut self, to: Address, amount: U256) -> Result<(), SaleError> {
        if self.refusing.contains(&to) {
            return Err(SaleError::TransferFailed);
        }
        *self.balances.entry(to).or_default() += amount;
        self.deliveries += 1;
        Ok(())
    }
}
