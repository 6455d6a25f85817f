//! Stylus entrypoint for the staged sale.
//!
//! Storage holds the persisted sale fields; each call loads them into a
//! [`SaleState`], runs the settlement core and writes the result back. A
//! returned error reverts the transaction, discarding every write.

use alloc::string::String;

use alloy_sol_types::sol;
use stylus_sdk::{
    alloy_primitives::{aliases::U8, Address, U256},
    call, contract, evm, msg,
    prelude::*,
};

use crate::{
    error::SaleError,
    ledger::{IssuanceLedger, SaleLedger},
    oracle::ChainlinkFeed,
    rates::RateTable,
    settlement::{FundsForwarder, Order, PriceFeed, SaleState},
    stage::SaleStage,
};

sol_storage! {
    #[entrypoint]
    pub struct StagedTokenSale {
        #[borrow]
        IssuanceLedger ledger;                          // Tokens for sale, held by this contract
        bool initialized;                               // Required before contract usage
        address owner;                                  // Administrator allowed to change stage and final rate
        address beneficiary;                            // Receives every payment immediately
        address price_feed;                             // Aggregator queried for the quote price
        uint8 stage;                                    // Active sale stage index
        uint256 pre_sale_rate;
        uint256 seed_sale_rate;
        uint256 final_sale_rate;                        // Zero until configured
        uint256 raised_total;                           // Native currency received across all purchases
    }
}

sol! {
    error NotInitialized();
    error AlreadyInitialized();
    error Unauthorized();
    error ZeroPayment();
    error InvalidBeneficiary();
    error InvalidStage();
    error InvalidRate();
    error RateNotSet();
    error PriceUnavailable();
    error InsufficientSupply();
    error Overflow();
    error TransferFailed();
    error InvalidPriceFeed();
    error InvalidSupply();
    error InvalidOwner();

    event TokensPurchased(address indexed purchaser, address indexed beneficiary, uint256 value, uint256 amount, uint8 stage);
    event StageChanged(uint8 previous, uint8 current);
    event FinalRateUpdated(uint256 previous, uint256 current);
    event OwnershipTransferred(address indexed previous_owner, address indexed new_owner);
}

#[derive(SolidityError)]
pub enum Errors {
    NotInitialized(NotInitialized),
    AlreadyInitialized(AlreadyInitialized),
    Unauthorized(Unauthorized),
    ZeroPayment(ZeroPayment),
    InvalidBeneficiary(InvalidBeneficiary),
    InvalidStage(InvalidStage),
    InvalidRate(InvalidRate),
    RateNotSet(RateNotSet),
    PriceUnavailable(PriceUnavailable),
    InsufficientSupply(InsufficientSupply),
    Overflow(Overflow),
    TransferFailed(TransferFailed),
    InvalidPriceFeed(InvalidPriceFeed),
    InvalidSupply(InvalidSupply),
    InvalidOwner(InvalidOwner),
}

impl From<SaleError> for Errors {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::ZeroPayment => Errors::ZeroPayment(ZeroPayment {}),
            SaleError::InvalidBeneficiary => Errors::InvalidBeneficiary(InvalidBeneficiary {}),
            SaleError::InvalidStage => Errors::InvalidStage(InvalidStage {}),
            SaleError::InvalidRate => Errors::InvalidRate(InvalidRate {}),
            SaleError::RateNotSet => Errors::RateNotSet(RateNotSet {}),
            SaleError::PriceUnavailable => Errors::PriceUnavailable(PriceUnavailable {}),
            SaleError::InsufficientSupply => Errors::InsufficientSupply(InsufficientSupply {}),
            SaleError::Unauthorized => Errors::Unauthorized(Unauthorized {}),
            SaleError::Overflow => Errors::Overflow(Overflow {}),
            SaleError::TransferFailed => Errors::TransferFailed(TransferFailed {}),
        }
    }
}

/// Sends native currency with a plain value transfer
struct NativeForwarder;

impl FundsForwarder for NativeForwarder {
    fn forward(&mut self, to: Address, amount: U256) -> Result<(), SaleError> {
        call::transfer_eth(to, amount).map_err(|_| SaleError::TransferFailed)
    }
}

/// External methods for `StagedTokenSale`
#[public]
#[inherit(IssuanceLedger)]
impl StagedTokenSale {
    /// Initialize the sale and mint the full token supply to this contract.
    /// The caller becomes the administrator.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Ticker of the issued token
    /// * `name` - Display name of the issued token
    /// * `initial_supply` - Token units minted to the sale, the most it can ever issue
    /// * `beneficiary` - Account receiving every payment
    /// * `price_feed` - Aggregator quoting the native currency price
    pub fn init(
        &mut self,
        symbol: String,
        name: String,
        initial_supply: U256,
        beneficiary: Address,
        price_feed: Address,
    ) -> Result<(), Errors> {
        self.validate_initialization()?;
        if price_feed.is_zero() {
            return Err(Errors::InvalidPriceFeed(InvalidPriceFeed {}));
        }
        if initial_supply.is_zero() {
            return Err(Errors::InvalidSupply(InvalidSupply {}));
        }
        let state = SaleState::new(msg::sender(), beneficiary)?;

        self.initialized.set(true);
        self.beneficiary.set(state.beneficiary());
        self.price_feed.set(price_feed);
        self.pre_sale_rate.set(state.rates().get(SaleStage::PreSale));
        self.seed_sale_rate.set(state.rates().get(SaleStage::SeedSale));
        self.store_state(&state);
        self.ledger
            .initialize(&name, &symbol, initial_supply, contract::address());

        evm::log(OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: state.owner(),
        });

        Ok(())
    }

    /// Switch the active stage. Any stage may follow any other.
    pub fn set_stage(&mut self, stage: u8) -> Result<(), Errors> {
        let mut state = self.load_state()?;
        let previous = state.set_stage(msg::sender(), stage)?;
        self.store_state(&state);

        evm::log(StageChanged {
            previous: previous.index(),
            current: stage,
        });
        Ok(())
    }

    /// Price the final stage. May be called again; the last rate wins.
    pub fn set_final_rate(&mut self, rate: U256) -> Result<(), Errors> {
        let mut state = self.load_state()?;
        let previous = state.set_final_rate(msg::sender(), rate)?;
        self.store_state(&state);

        evm::log(FinalRateUpdated {
            previous,
            current: rate,
        });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), Errors> {
        if new_owner.is_zero() {
            return Err(Errors::InvalidOwner(InvalidOwner {}));
        }
        let mut state = self.load_state()?;
        let previous_owner = state.transfer_ownership(msg::sender(), new_owner)?;
        self.store_state(&state);

        evm::log(OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    /// Buy tokens with the attached value. Tokens go to `beneficiary`, the
    /// payment goes straight to the sale beneficiary. Returns the tokens issued.
    #[payable]
    pub fn purchase(&mut self, beneficiary: Address) -> Result<U256, Errors> {
        let mut state = self.load_state()?;
        let order = Order {
            payer: msg::sender(),
            beneficiary,
            payment: msg::value(),
        };
        let mut feed = ChainlinkFeed::new(self.price_feed.get());
        let mut ledger = SaleLedger::new(&mut self.ledger, contract::address());
        let receipt = state.purchase(order, &mut ledger, &mut feed, &mut NativeForwarder)?;
        self.store_state(&state);

        stylus_sdk::console!(
            "purchase: {} wei -> {} tokens (stage {}, price {}, rate {})",
            receipt.payment,
            receipt.tokens,
            receipt.stage.index(),
            receipt.price,
            receipt.rate
        );
        evm::log(TokensPurchased {
            purchaser: receipt.payer,
            beneficiary: receipt.beneficiary,
            value: receipt.payment,
            amount: receipt.tokens,
            stage: receipt.stage.index(),
        });

        Ok(receipt.tokens)
    }

    /// Tokens `payment` would buy at the current stage and price
    pub fn quote(&self, payment: U256) -> Result<U256, Errors> {
        let state = self.load_state()?;
        let mut feed = ChainlinkFeed::new(self.price_feed.get());
        Ok(state.quote(payment, &mut feed)?.tokens)
    }

    /// Current quote price straight from the feed
    pub fn get_price(&self) -> Result<U256, Errors> {
        self.validate_is_initialized()?;
        Ok(ChainlinkFeed::new(self.price_feed.get()).get_price()?)
    }

    pub fn stage(&self) -> u8 {
        self.stage.get().to::<u8>()
    }

    pub fn raised_total(&self) -> U256 {
        self.raised_total.get()
    }

    pub fn pre_sale_rate(&self) -> U256 {
        self.pre_sale_rate.get()
    }

    pub fn seed_sale_rate(&self) -> U256 {
        self.seed_sale_rate.get()
    }

    pub fn final_sale_rate(&self) -> U256 {
        self.final_sale_rate.get()
    }

    pub fn rate_for(&self, stage: u8) -> Result<U256, Errors> {
        let stage = SaleStage::try_from(stage)?;
        Ok(self.rate_table().get(stage))
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary.get()
    }

    pub fn price_feed(&self) -> Address {
        self.price_feed.get()
    }

    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    /// Address of the issuance ledger, which is this contract
    pub fn token(&self) -> Address {
        contract::address()
    }

    /// Token units the sale can still issue
    pub fn tokens_available(&self) -> U256 {
        self.ledger.balance_of(contract::address())
    }
}

// Internal methods for `StagedTokenSale`
impl StagedTokenSale {
    fn validate_is_initialized(&self) -> Result<(), Errors> {
        if !self.initialized.get() {
            return Err(Errors::NotInitialized(NotInitialized {}));
        }
        Ok(())
    }

    fn validate_initialization(&self) -> Result<(), Errors> {
        if self.initialized.get() {
            return Err(Errors::AlreadyInitialized(AlreadyInitialized {}));
        }
        Ok(())
    }

    fn rate_table(&self) -> RateTable {
        RateTable::from_parts(
            self.pre_sale_rate.get(),
            self.seed_sale_rate.get(),
            self.final_sale_rate.get(),
        )
    }

    fn load_state(&self) -> Result<SaleState, Errors> {
        self.validate_is_initialized()?;
        let stage = SaleStage::try_from(self.stage())?;
        Ok(SaleState::from_parts(
            self.owner.get(),
            self.beneficiary.get(),
            stage,
            self.rate_table(),
            self.raised_total.get(),
        ))
    }

    /// Write back the fields a [`SaleState`] may change
    fn store_state(&mut self, state: &SaleState) {
        self.owner.set(state.owner());
        self.stage.set(U8::from(state.stage().index()));
        self.final_sale_rate.set(state.rates().get(SaleStage::FinalSale));
        self.raised_total.set(state.raised_total());
    }
}
