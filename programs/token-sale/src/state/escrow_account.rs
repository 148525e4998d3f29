use anchor_lang::prelude::*;

use crate::{constants::MAX_NAME_LEN, error::TokenSaleError};

/// One sale. Lives at `["escrow_pda", name]` and is the authority of its custody account.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct EscrowAccount {
    #[max_len(32)]
    pub name: String,
    pub exchange_rate: u64,    // lamports per base unit of the sale token
    pub total_supply: u64,
    pub remaining_supply: u64, // never more than the custody balance
    pub admin: Pubkey,
    pub token_mint: Pubkey,
    pub custody: Pubkey,
    pub registry_page: u32,
    pub bump: u8,
    pub custody_bump: u8,
}

impl EscrowAccount {
    pub const LEN: usize = 8 + EscrowAccount::INIT_SPACE;

    pub fn validate_name(name: &str) -> Result<()> {
        require!(!name.is_empty(), TokenSaleError::EmptySaleName);
        require!(name.len() <= MAX_NAME_LEN, TokenSaleError::SaleNameTooLong);
        Ok(())
    }

    /// Checks initialize arguments before any account is touched.
    pub fn validate_params(name: &str, _total_supply: u64, exchange_rate: u64) -> Result<()> {
        Self::validate_name(name)?;
        require!(exchange_rate > 0, TokenSaleError::InvalidExchangeRate);
        Ok(())
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining_supply == 0
    }

    /// remaining <= total, and custody holds at least what is still for sale.
    /// Anyone can send tokens to the custody account, so a surplus is not an error.
    pub fn verify_conservation(&self, custody_balance: u64) -> Result<()> {
        require!(
            self.remaining_supply <= self.total_supply,
            TokenSaleError::ConservationViolation
        );
        require!(
            custody_balance >= self.remaining_supply,
            TokenSaleError::ConservationViolation
        );
        Ok(())
    }

    /// Takes `amount` base units out of the remaining supply and returns the
    /// lamport price for them. Leaves the record untouched on error.
    pub fn record_purchase(&mut self, amount: u64) -> Result<u64> {
        require!(!self.is_sold_out(), TokenSaleError::SoldOut);
        require!(amount > 0, TokenSaleError::InvalidPurchaseAmount);
        require!(
            amount <= self.remaining_supply,
            TokenSaleError::InsufficientSupply
        );

        let cost = amount
            .checked_mul(self.exchange_rate)
            .ok_or(TokenSaleError::MathOverflow)?;

        self.remaining_supply = self
            .remaining_supply
            .checked_sub(amount)
            .ok_or(TokenSaleError::InsufficientSupply)?;

        Ok(cost)
    }
}
