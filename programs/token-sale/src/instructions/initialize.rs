use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use std::io::Cursor;

use crate::{
    constants::{CUSTODY_SEED, ESCROW_SEED, REGISTRY_PAGE_SEED, REGISTRY_SEED},
    custody::{self, TransferAuthority},
    error::TokenSaleError,
    events::SaleInitialized,
    pda,
    state::{EscrowAccount, RegistryPage, SaleRegistry},
};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// CHECK: created in the handler at the address derived from the sale name
    #[account(mut)]
    pub escrow_pda: UncheckedAccount<'info>,

    /// CHECK: created in the handler and initialized as a token account owned by `escrow_pda`
    #[account(mut)]
    pub sale_token_account: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        space = SaleRegistry::LEN,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub registry: Account<'info, SaleRegistry>,

    // the page the header currently points at, opened on first use
    #[account(
        init_if_needed,
        payer = admin,
        space = RegistryPage::LEN,
        seeds = [REGISTRY_PAGE_SEED, registry.next_page.to_le_bytes().as_ref()],
        bump
    )]
    pub registry_page: Account<'info, RegistryPage>,

    pub mint: Account<'info, Mint>,

    // the admin's existing account for the sale token
    #[account(
        mut,
        constraint = admin_token_account.owner == admin.key() @ TokenSaleError::InvalidTokenAccountOwner,
        constraint = admin_token_account.mint == mint.key() @ TokenSaleError::TokenMintMismatch
    )]
    pub admin_token_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,

    pub token_program: Program<'info, Token>,
}

/// What the admin is putting up for sale.
#[derive(Debug, Clone, Copy)]
pub struct SaleTerms<'a> {
    pub name: &'a str,
    pub total_supply: u64,
    pub exchange_rate: u64,
}

/// Addresses and amounts for one initialize call, worked out before any
/// account is created. Every rejection happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializePlan {
    pub escrow: Pubkey,
    pub escrow_bump: u8,
    pub custody: Pubkey,
    pub custody_bump: u8,
    pub registry_page: u32,
    pub deposit: u64,
}

impl InitializePlan {
    pub fn prepare(
        terms: &SaleTerms,
        admin: &Pubkey,
        mint: &Pubkey,
        admin_balance: u64,
        page: &RegistryPage,
        program_id: &Pubkey,
    ) -> Result<Self> {
        EscrowAccount::validate_params(terms.name, terms.total_supply, terms.exchange_rate)?;

        let (escrow, escrow_bump) = pda::escrow_address(terms.name, program_id)?;
        let (custody, custody_bump) = pda::custody_address(terms.name, admin, mint, program_id)?;

        page.check_can_register(terms.name)?;
        custody::ensure_sufficient_funds(admin_balance, terms.total_supply)?;

        Ok(Self {
            escrow,
            escrow_bump,
            custody,
            custody_bump,
            registry_page: page.index,
            deposit: terms.total_supply,
        })
    }

    pub fn escrow_record(&self, terms: &SaleTerms, admin: Pubkey, token_mint: Pubkey) -> EscrowAccount {
        EscrowAccount {
            name: terms.name.to_string(),
            exchange_rate: terms.exchange_rate,
            total_supply: terms.total_supply,
            remaining_supply: terms.total_supply,
            admin,
            token_mint,
            custody: self.custody,
            registry_page: self.registry_page,
            bump: self.escrow_bump,
            custody_bump: self.custody_bump,
        }
    }
}

pub fn initialize_handler(
    ctx: Context<Initialize>,
    name: String,
    total_supply: u64,
    exchange_rate: u64,
) -> Result<()> {
    let terms = SaleTerms {
        name: &name,
        total_supply,
        exchange_rate,
    };
    let admin_key = ctx.accounts.admin.key();
    let mint_key = ctx.accounts.mint.key();

    let next_page = ctx.accounts.registry.next_page;
    ctx.accounts.registry.bump = ctx.bumps.registry;
    ctx.accounts.registry_page.bump = ctx.bumps.registry_page;
    ctx.accounts.registry_page.index = next_page;

    let plan = InitializePlan::prepare(
        &terms,
        &admin_key,
        &mint_key,
        ctx.accounts.admin_token_account.amount,
        &ctx.accounts.registry_page,
        ctx.program_id,
    )?;

    require_keys_eq!(
        ctx.accounts.escrow_pda.key(),
        plan.escrow,
        TokenSaleError::InvalidEscrowAddress
    );
    require_keys_eq!(
        ctx.accounts.sale_token_account.key(),
        plan.custody,
        TokenSaleError::InvalidCustodyAddress
    );
    // data at either address means this name was already used
    require!(
        ctx.accounts.escrow_pda.data_is_empty(),
        TokenSaleError::DuplicateSale
    );
    require!(
        ctx.accounts.sale_token_account.data_is_empty(),
        TokenSaleError::DuplicateSale
    );

    let admin = ctx.accounts.admin.to_account_info();
    let escrow_info = ctx.accounts.escrow_pda.to_account_info();
    let custody_info = ctx.accounts.sale_token_account.to_account_info();
    let mint_info = ctx.accounts.mint.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let token_program = ctx.accounts.token_program.to_account_info();

    let custody_bump = [plan.custody_bump];
    let custody_seeds: &[&[u8]] = &[
        CUSTODY_SEED,
        name.as_bytes(),
        admin_key.as_ref(),
        mint_key.as_ref(),
        &custody_bump,
    ];
    custody::open_custody(
        &admin,
        &custody_info,
        &mint_info,
        &escrow_info,
        &system_program,
        &token_program,
        custody_seeds,
    )?;

    custody::transfer_tokens(
        &token_program,
        &ctx.accounts.admin_token_account,
        &custody_info,
        &admin,
        TransferAuthority::ExternalKey(admin_key),
        plan.deposit,
    )?;

    let escrow_bump = [plan.escrow_bump];
    let escrow_seeds: &[&[u8]] = &[ESCROW_SEED, name.as_bytes(), &escrow_bump];
    custody::create_program_account(
        &admin,
        &escrow_info,
        &system_program,
        EscrowAccount::LEN,
        ctx.program_id,
        escrow_seeds,
    )?;

    let record = plan.escrow_record(&terms, admin_key, mint_key);
    {
        let mut data = escrow_info.try_borrow_mut_data()?;
        let dst: &mut [u8] = &mut data;
        let mut writer = Cursor::new(dst);
        record.try_serialize(&mut writer)?;
    }

    ctx.accounts.registry_page.register(&name, plan.escrow)?;
    ctx.accounts
        .registry
        .note_registered(&ctx.accounts.registry_page)?;

    let custody_balance = {
        let data = custody_info.try_borrow_data()?;
        TokenAccount::try_deserialize(&mut &data[..])?.amount
    };
    record.verify_conservation(custody_balance)?;
    // custody was created in this transaction, so nothing else can be in it yet
    require!(
        custody_balance == record.total_supply,
        TokenSaleError::ConservationViolation
    );

    msg!("Token sale initialized");
    msg!("Name: {}", record.name);
    msg!("Escrow: {}", plan.escrow);
    msg!("Custody: {}", plan.custody);
    msg!("Registry page: {}", plan.registry_page);
    msg!("Supply: {} at rate {}", record.total_supply, record.exchange_rate);

    emit!(SaleInitialized {
        escrow: plan.escrow,
        custody: plan.custody,
        name: record.name,
        admin: admin_key,
        token_mint: mint_key,
        total_supply,
        exchange_rate,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
