use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::{ESCROW_SEED, REGISTRY_PAGE_SEED, REGISTRY_SEED},
    custody::{self, TransferAuthority},
    error::TokenSaleError,
    events::SaleCancelled,
    state::{EscrowAccount, RegistryPage, SaleRegistry},
};

#[derive(Accounts)]
#[instruction(name: String)]
pub struct Cancel<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    // rent and collected proceeds go back to the admin
    #[account(
        mut,
        close = admin,
        seeds = [ESCROW_SEED, name.as_bytes()],
        bump = escrow_pda.bump,
        has_one = admin @ TokenSaleError::Unauthorized,
        constraint = escrow_pda.custody == sale_token_account.key() @ TokenSaleError::CustodyMismatch
    )]
    pub escrow_pda: Account<'info, EscrowAccount>,

    #[account(mut)]
    pub sale_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = admin_token_account.owner == admin.key() @ TokenSaleError::InvalidTokenAccountOwner,
        constraint = admin_token_account.mint == escrow_pda.token_mint @ TokenSaleError::TokenMintMismatch
    )]
    pub admin_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, SaleRegistry>,

    #[account(
        mut,
        seeds = [REGISTRY_PAGE_SEED, escrow_pda.registry_page.to_le_bytes().as_ref()],
        bump = registry_page.bump
    )]
    pub registry_page: Account<'info, RegistryPage>,

    pub token_program: Program<'info, Token>,
}

pub fn cancel_handler(ctx: Context<Cancel>, name: String) -> Result<()> {
    let escrow_key = ctx.accounts.escrow_pda.key();
    // everything in custody goes back, including tokens sent there from outside
    let returned = ctx.accounts.sale_token_account.amount;

    let token_program = ctx.accounts.token_program.to_account_info();
    let escrow_info = ctx.accounts.escrow_pda.to_account_info();
    let custody_info = ctx.accounts.sale_token_account.to_account_info();
    let admin = ctx.accounts.admin.to_account_info();

    let bump = [ctx.accounts.escrow_pda.bump];
    let seeds: &[&[u8]] = &[ESCROW_SEED, name.as_bytes(), &bump];

    if returned > 0 {
        custody::transfer_tokens(
            &token_program,
            &ctx.accounts.sale_token_account,
            &ctx.accounts.admin_token_account.to_account_info(),
            &escrow_info,
            TransferAuthority::ProgramDerived(seeds),
            returned,
        )?;
    }
    custody::close_custody(&token_program, &custody_info, &admin, &escrow_info, seeds)?;

    let removed = ctx.accounts.registry_page.remove(&name)?;
    require_keys_eq!(removed.escrow, escrow_key, TokenSaleError::InvalidEscrowAddress);
    ctx.accounts.registry.note_removed();

    msg!("Sale {} cancelled, {} tokens returned", name, returned);

    emit!(SaleCancelled {
        escrow: escrow_key,
        name,
        admin: admin.key(),
        tokens_returned: returned,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
