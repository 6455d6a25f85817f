//! Issuance ledger embedded in the sale contract.
//!
//! A minimal fungible-token ledger: the full supply is minted to the sale at
//! initialization and leaves it only through purchases or holder transfers.

use alloc::string::String;

use alloy_sol_types::sol;
use stylus_sdk::{
    alloy_primitives::{Address, U256},
    evm, msg,
    prelude::*,
};

use crate::{constants::TOKEN_DECIMALS, error::SaleError, settlement::TokenLedger};

sol_storage! {
    pub struct IssuanceLedger {
        string name;
        string symbol;
        uint256 total_supply;
        mapping(address => uint256) balances;
    }
}

sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);

    error InsufficientBalance(address from, uint256 have, uint256 want);
}

#[derive(SolidityError)]
pub enum LedgerError {
    InsufficientBalance(InsufficientBalance),
}

impl IssuanceLedger {
    /// Set the metadata and mint the whole supply to `holder`
    pub fn initialize(&mut self, name: &str, symbol: &str, supply: U256, holder: Address) {
        self.name.set_str(name);
        self.symbol.set_str(symbol);
        self.total_supply.set(supply);
        self.balances.setter(holder).set(supply);

        evm::log(Transfer {
            from: Address::ZERO,
            to: holder,
            value: supply,
        });
    }

    /// Move `value` between two accounts and log the transfer
    pub fn move_balance(&mut self, from: Address, to: Address, value: U256) -> Result<(), LedgerError> {
        let have = self.balances.get(from);
        if have < value {
            return Err(LedgerError::InsufficientBalance(InsufficientBalance {
                from,
                have,
                want: value,
            }));
        }
        self.balances.setter(from).set(have - value);
        let mut to_balance = self.balances.setter(to);
        let credited = to_balance.get() + value;
        to_balance.set(credited);

        evm::log(Transfer { from, to, value });
        Ok(())
    }
}

#[public]
impl IssuanceLedger {
    pub fn name(&self) -> String {
        self.name.get_string()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_string()
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(account)
    }

    pub fn transfer(&mut self, to: Address, value: U256) -> Result<bool, LedgerError> {
        self.move_balance(msg::sender(), to, value)?;
        Ok(true)
    }
}

/// The sale's view of the ledger: tokens always leave from `holder`
pub struct SaleLedger<'a> {
    ledger: &'a mut IssuanceLedger,
    holder: Address,
}

impl<'a> SaleLedger<'a> {
    pub fn new(ledger: &'a mut IssuanceLedger, holder: Address) -> Self {
        Self { ledger, holder }
    }
}

impl TokenLedger for SaleLedger<'_> {
    fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balances.get(account)
    }

    fn transfer(&mut self, to: Address, amount: U256) -> Result<(), SaleError> {
        self.ledger
            .move_balance(self.holder, to, amount)
            .map_err(|_| SaleError::InsufficientSupply)
    }

    fn undo_transfer(&mut self, to: Address, amount: U256) {
        // cannot fail: `to` was credited `amount` earlier in the same purchase
        let _ =self.ledger.move_balance(to, self.holder, amount);
    }
}
