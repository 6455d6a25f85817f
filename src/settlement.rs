//! Stage aware purchase and settlement.
//!
//! [`SaleState`] owns every mutable field of the sale. Collaborators are passed
//! in per call through the [`TokenLedger`], [`PriceFeed`] and [`FundsForwarder`]
//! traits so the same workflow runs on chain and against in-memory doubles.

use alloy_primitives::{Address, U256};

use crate::{error::SaleError, rates::RateTable, stage::SaleStage};

/// Issuance ledger holding the tokens still available for sale
pub trait TokenLedger {
    fn balance_of(&self, account: Address) -> U256;

    /// Move `amount` tokens from the sale's holdings to `to`.
    /// Fails with [`SaleError::InsufficientSupply`] when the sale holds less.
    fn transfer(&mut self, to: Address, amount: U256) -> Result<(), SaleError>;

    /// Hand back tokens moved by [`TokenLedger::transfer`] within the same purchase
    fn undo_transfer(&mut self, to: Address, amount: U256);
}

/// Source of the quote price (quote currency per unit of native currency)
pub trait PriceFeed {
    fn get_price(&mut self) -> Result<U256, SaleError>;
}

/// Moves the attached payment on to the beneficiary
pub trait FundsForwarder {
    fn forward(&mut self, to: Address, amount: U256) -> Result<(), SaleError>;
}

/// A purchase request. `payment` is the native amount attached to the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub payer: Address,
    pub beneficiary: Address,
    pub payment: U256,
}

/// Audit record of a committed purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub payer: Address,
    pub beneficiary: Address,
    pub payment: U256,
    pub tokens: U256,
    pub stage: SaleStage,
    pub price: U256,
    pub rate: U256,
}

/// Priced payment at the active stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub stage: SaleStage,
    pub price: U256,
    pub rate: U256,
    pub tokens: U256,
}

/// `floor(payment * price / rate)`. Truncation favours the seller.
pub fn token_amount(payment: U256, price: U256, rate: U256) -> Result<U256, SaleError> {
    if rate.is_zero() {
        return Err(SaleError::RateNotSet);
    }
    let gross = payment.checked_mul(price).ok_or(SaleError::Overflow)?;
    Ok(gross / rate)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleState {
    owner: Address,
    beneficiary: Address,
    stage: SaleStage,
    rates: RateTable,
    raised_total: U256,
}

impl SaleState {
    /// Fresh sale in the pre-sale stage with the default rate table
    pub fn new(owner: Address, beneficiary: Address) -> Result<Self, SaleError> {
        Self::with_rates(owner, beneficiary, RateTable::default())
    }

    pub fn with_rates(owner: Address, beneficiary: Address, rates: RateTable) -> Result<Self, SaleError> {
        if beneficiary.is_zero() {
            return Err(SaleError::InvalidBeneficiary);
        }
        Ok(Self {
            owner,
            beneficiary,
            stage: SaleStage::PreSale,
            rates,
            raised_total: U256::ZERO,
        })
    }

    /// Rebuild a state from persisted fields without re-running construction checks
    pub fn from_parts(
        owner: Address,
        beneficiary: Address,
        stage: SaleStage,
        rates: RateTable,
        raised_total: U256,
    ) -> Self {
        Self {
            owner,
            beneficiary,
            stage,
            rates,
            raised_total,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn stage(&self) -> SaleStage {
        self.stage
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn raised_total(&self) -> U256 {
        self.raised_total
    }

    pub fn ensure_owner(&self, caller: Address) -> Result<(), SaleError> {
        if caller != self.owner {
            return Err(SaleError::Unauthorized);
        }
        Ok(())
    }

    /// Switch to any stage, in any order. Returns the stage that was replaced.
    pub fn set_stage(&mut self, caller: Address, index: u8) -> Result<SaleStage, SaleError> {
        self.ensure_owner(caller)?;
        let next = SaleStage::try_from(index)?;
        Ok(core::mem::replace(&mut self.stage, next))
    }

    /// Returns the final rate that was replaced (zero if it was never set)
    pub fn set_final_rate(&mut self, caller: Address, rate: U256) -> Result<U256, SaleError> {
        self.ensure_owner(caller)?;
        self.rates.set_final_rate(rate)
    }

    /// Hand administration to `new_owner`, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<Address, SaleError> {
        self.ensure_owner(caller)?;
        Ok(core::mem::replace(&mut self.owner, new_owner))
    }

    /// Tokens `payment` would buy right now. Queries the feed, changes nothing.
    pub fn quote<F>(&self, payment: U256, feed: &mut F) -> Result<Quote, SaleError>
    where
        F: PriceFeed + ?Sized,
    {
        if payment.is_zero() {
            return Err(SaleError::ZeroPayment);
        }
        self.price_payment(payment, feed)
    }

    /// Run a purchase as one unit: issue tokens, forward the payment, bump the
    /// raised total. Any failure leaves the state and both collaborators as
    /// they were.
    pub fn purchase<L, F, B>(
        &mut self,
        order: Order,
        ledger: &mut L,
        feed: &mut F,
        funds: &mut B,
    ) -> Result<PurchaseReceipt, SaleError>
    where
        L: TokenLedger + ?Sized,
        F: PriceFeed + ?Sized,
        B: FundsForwarder + ?Sized,
    {
        if order.payment.is_zero() {
            return Err(SaleError::ZeroPayment);
        }
        if order.beneficiary.is_zero() {
            return Err(SaleError::InvalidBeneficiary);
        }

        let quote = self.price_payment(order.payment, feed)?;
        let raised_total = self
            .raised_total
            .checked_add(order.payment)
            .ok_or(SaleError::Overflow)?;

        ledger.transfer(order.beneficiary, quote.tokens)?;
        if let Err(err) = funds.forward(self.beneficiary, order.payment) {
            ledger.undo_transfer(order.beneficiary, quote.tokens);
            return Err(err);
        }

        self.raised_total = raised_total;

        Ok(PurchaseReceipt {
            payer: order.payer,
            beneficiary: order.beneficiary,
            payment: order.payment,
            tokens: quote.tokens,
            stage: quote.stage,
            price: quote.price,
            rate: quote.rate,
        })
    }

    fn price_payment<F>(&self, payment: U256, feed: &mut F) -> Result<Quote, SaleError>
    where
        F: PriceFeed + ?Sized,
    {
        let stage = self.stage;
        let rate = self.rates.rate_for(stage)?;
        let price = feed.get_price()?;
        let tokens = token_amount(payment, price, rate)?;
        Ok(Quote {
            stage,
            price,
            rate,
            tokens,
        })
    }
}
