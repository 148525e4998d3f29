#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod constants;
pub mod custody;
pub mod error;
pub mod events;
pub mod instructions;
pub mod pda;
#[cfg(not(target_os = "solana"))]
pub mod query;
pub mod state;

pub use constants::*;
pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod token_sale {

    use super::*;

    /// Used by the admin to create a named sale and lock its supply in custody
    pub fn initialize(
        ctx: Context<Initialize>,
        name: String,
        total_supply: u64,
        exchange_rate: u64,
    ) -> Result<()> {
        initialize_handler(ctx, name, total_supply, exchange_rate)
    }

    /// Used by a buyer to send SOL to the escrow account and receive tokens
    pub fn exchange(ctx: Context<Exchange>, name: String, amount: u64) -> Result<()> {
        exchange_handler(ctx, name, amount)
    }

    /// Used by the admin to close a sale and take back unsold tokens and proceeds
    pub fn cancel(ctx: Context<Cancel>, name: String) -> Result<()> {
        cancel_handler(ctx, name)
    }
}
