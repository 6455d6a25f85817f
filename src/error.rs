use core::fmt;

/// Reasons a sale operation is rejected. Every variant aborts the whole operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleError {
    ZeroPayment,
    InvalidBeneficiary,
    InvalidStage,
    InvalidRate,
    RateNotSet,
    PriceUnavailable,
    InsufficientSupply,
    Unauthorized,
    /// Checked arithmetic left the 256 bit range
    Overflow,
    /// The beneficiary refused the forwarded funds
    TransferFailed,
}

impl fmt::Display for SaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SaleError::ZeroPayment => "payment must be greater than zero",
            SaleError::InvalidBeneficiary => "beneficiary is the zero address",
            SaleError::InvalidStage => "stage index out of range",
            SaleError::InvalidRate => "rate must be greater than zero",
            SaleError::RateNotSet => "rate for the active stage is not set",
            SaleError::PriceUnavailable => "price feed returned no usable price",
            SaleError::InsufficientSupply => "not enough tokens left for this purchase",
            SaleError::Unauthorized => "caller is not the administrator",
            SaleError::Overflow => "arithmetic overflow",
            SaleError::TransferFailed => "forwarding funds to the beneficiary failed",
        };
        f.write_str(msg)
    }
}
