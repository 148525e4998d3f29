use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer as SystemTransfer};
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    constants::ESCROW_SEED,
    custody::{self, TransferAuthority},
    error::TokenSaleError,
    events::TokensPurchased,
    state::EscrowAccount,
};

#[derive(Accounts)]
#[instruction(name: String)]
pub struct Exchange<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    // collects the lamports paid for each purchase
    #[account(
        mut,
        seeds = [ESCROW_SEED, name.as_bytes()],
        bump = escrow_pda.bump,
        constraint = escrow_pda.custody == sale_token_account.key() @ TokenSaleError::CustodyMismatch,
        constraint = escrow_pda.token_mint == mint.key() @ TokenSaleError::TokenMintMismatch
    )]
    pub escrow_pda: Account<'info, EscrowAccount>,

    #[account(mut)]
    pub sale_token_account: Account<'info, TokenAccount>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = buyer_token_account.mint == mint.key() @ TokenSaleError::TokenMintMismatch
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,

    pub token_program: Program<'info, Token>,
}

pub fn exchange_handler(ctx: Context<Exchange>, name: String, amount: u64) -> Result<()> {
    let escrow_key = ctx.accounts.escrow_pda.key();
    let custody_before = ctx.accounts.sale_token_account.amount;
    let cost = ctx.accounts.escrow_pda.record_purchase(amount)?;

    let cpi_ctx = CpiContext::new(
        ctx.accounts.system_program.to_account_info(),
        SystemTransfer {
            from: ctx.accounts.buyer.to_account_info(),
            to: ctx.accounts.escrow_pda.to_account_info(),
        },
    );
    system_program::transfer(cpi_ctx, cost)?;

    let bump = [ctx.accounts.escrow_pda.bump];
    let seeds: &[&[u8]] = &[ESCROW_SEED, name.as_bytes(), &bump];

    custody::transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.sale_token_account,
        &ctx.accounts.buyer_token_account.to_account_info(),
        &ctx.accounts.escrow_pda.to_account_info(),
        TransferAuthority::ProgramDerived(seeds),
        amount,
    )?;

    ctx.accounts.sale_token_account.reload()?;
    let custody_after = ctx.accounts.sale_token_account.amount;
    custody::verify_outflow(custody_before, custody_after, amount)?;

    let escrow = &ctx.accounts.escrow_pda;
    escrow.verify_conservation(custody_after)?;

    msg!("Sale {}: {} tokens sold for {} lamports", name, amount, cost);
    msg!("Remaining supply: {}", escrow.remaining_supply);

    emit!(TokensPurchased {
        escrow: escrow_key,
        name,
        buyer: ctx.accounts.buyer.key(),
        amount,
        lamports_paid: cost,
        remaining_supply: escrow.remaining_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
