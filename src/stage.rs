use crate::error::SaleError;

/// Phase of the sale. Each phase prices tokens with its own rate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SaleStage {
    #[default]
    PreSale = 0,
    SeedSale = 1,
    FinalSale = 2,
}

impl SaleStage {
    pub const ALL: [SaleStage; 3] = [SaleStage::PreSale, SaleStage::SeedSale, SaleStage::FinalSale];

    /// ABI index of the stage (0, 1 or 2)
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SaleStage {
    type Error = SaleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SaleStage::PreSale),
            1 => Ok(SaleStage::SeedSale),
            2 => Ok(SaleStage::FinalSale),
            _ => Err(SaleError::InvalidStage),
        }
    }
}

impl From<SaleStage> for u8 {
    fn from(stage: SaleStage) -> u8 {
        stage.index()
    }
}
