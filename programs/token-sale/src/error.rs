use anchor_lang::prelude::*;

#[error_code]
pub enum TokenSaleError {
    #[msg("Sale name must not be empty")]
    EmptySaleName,

    #[msg("Sale name exceeds the maximum length")]
    SaleNameTooLong,

    #[msg("Exchange rate must be greater than zero")]
    InvalidExchangeRate,

    #[msg("Purchase amount must be greater than zero")]
    InvalidPurchaseAmount,

    #[msg("A sale with this name already exists")]
    DuplicateSale,

    #[msg("Admin token balance is below the requested supply")]
    InsufficientFunds,

    #[msg("Not enough tokens left in this sale")]
    InsufficientSupply,

    #[msg("Sale is sold out")]
    SoldOut,

    #[msg("Sale does not exist")]
    SaleNotFound,

    #[msg("Unable to derive an off-curve program address")]
    DerivationExhausted,

    #[msg("Escrow account does not match the address derived from the sale name")]
    InvalidEscrowAddress,

    #[msg("Custody account does not match its derived address")]
    InvalidCustodyAddress,

    #[msg("Token account holds a different mint")]
    TokenMintMismatch,

    #[msg("Token account is not owned by the expected authority")]
    InvalidTokenAccountOwner,

    #[msg("Custody account does not belong to this sale")]
    CustodyMismatch,

    #[msg("Only the sale admin can perform this action")]
    Unauthorized,

    #[msg("Transfer authority did not sign")]
    MissingSignature,

    #[msg("Registry page is full")]
    RegistryPageFull,

    #[msg("Arithmetic overflow occurred")]
    MathOverflow,

    #[msg("CRITICAL: Custody balance does not cover the remaining supply")]
    ConservationViolation,
}
