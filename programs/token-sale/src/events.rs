use anchor_lang::prelude::*;

#[event]
pub struct SaleInitialized {
    pub escrow: Pubkey,

    pub custody: Pubkey,

    pub name: String,

    pub admin: Pubkey,

    pub token_mint: Pubkey,

    pub total_supply: u64,

    pub exchange_rate: u64,

    pub timestamp: i64,
}

#[event]
pub struct TokensPurchased {
    pub escrow: Pubkey,

    pub name: String,

    pub buyer: Pubkey,

    pub amount: u64,

    pub lamports_paid: u64,

    pub remaining_supply: u64,

    pub timestamp: i64,
}

#[event]
pub struct SaleCancelled {
    pub escrow: Pubkey,

    pub name: String,

    pub admin: Pubkey,

    pub tokens_returned: u64,

    pub timestamp: i64,
}
