use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    self, Allocate, Assign, CreateAccount, Transfer as SystemTransfer,
};
use anchor_spl::token::{self, CloseAccount, InitializeAccount3, TokenAccount, Transfer};

use crate::error::TokenSaleError;

/// Who may move tokens out of a source account.
///
/// Custody accounts are always `ProgramDerived`: the escrow PDA is their
/// authority and only this program can produce its signature. Deposits from
/// the admin go through `ExternalKey`, backed by a real transaction signature.
#[derive(Debug, Clone, Copy)]
pub enum TransferAuthority<'a> {
    ExternalKey(Pubkey),
    ProgramDerived(&'a [&'a [u8]]),
}

impl TransferAuthority<'_> {
    /// Key that must appear as the transfer authority.
    pub fn resolve(&self, program_id: &Pubkey) -> Result<Pubkey> {
        match self {
            Self::ExternalKey(key) => Ok(*key),
            Self::ProgramDerived(seeds) => Pubkey::create_program_address(seeds, program_id)
                .map_err(|_| error!(TokenSaleError::InvalidEscrowAddress)),
        }
    }

    pub fn authorize(
        &self,
        authority: &Pubkey,
        authority_signed: bool,
        source_owner: &Pubkey,
        program_id: &Pubkey,
    ) -> Result<()> {
        let expected = self.resolve(program_id)?;
        require_keys_eq!(*authority, expected, TokenSaleError::Unauthorized);
        require_keys_eq!(
            *source_owner,
            expected,
            TokenSaleError::InvalidTokenAccountOwner
        );
        if let Self::ExternalKey(_) = self {
            require!(authority_signed, TokenSaleError::MissingSignature);
        }
        Ok(())
    }
}

pub fn ensure_sufficient_funds(balance: u64, amount: u64) -> Result<()> {
    require!(balance >= amount, TokenSaleError::InsufficientFunds);
    Ok(())
}

/// Checks that exactly `amount` left the custody account during a transfer.
pub fn verify_outflow(before: u64, after: u64, amount: u64) -> Result<()> {
    let moved = before
        .checked_sub(after)
        .ok_or(TokenSaleError::ConservationViolation)?;
    require!(moved == amount, TokenSaleError::ConservationViolation);
    Ok(())
}

/// Moves `amount` tokens out of `from`, signing with the PDA seeds when the
/// authority is program derived.
pub fn transfer_tokens<'info>(
    token_program: &AccountInfo<'info>,
    from: &Account<'info, TokenAccount>,
    to: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    kind: TransferAuthority<'_>,
    amount: u64,
) -> Result<()> {
    kind.authorize(authority.key, authority.is_signer, &from.owner, &crate::ID)?;

    let transfer_instruction = Transfer {
        from: from.to_account_info(),
        to: to.clone(),
        authority: authority.clone(),
    };

    match kind {
        TransferAuthority::ExternalKey(_) => {
            let cpi_ctx = CpiContext::new(token_program.clone(), transfer_instruction);
            token::transfer(cpi_ctx, amount)
        }
        TransferAuthority::ProgramDerived(seeds) => {
            let signer_seeds = &[seeds];
            let cpi_ctx = CpiContext::new_with_signer(
                token_program.clone(),
                transfer_instruction,
                signer_seeds,
            );
            token::transfer(cpi_ctx, amount)
        }
    }
}

/// Allocates `target` at its PDA address with rent-exempt lamports.
///
/// Lamports already sitting at the address (anyone can send them) are kept
/// and topped up instead of making `create_account` fail.
pub fn create_program_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    owner: &Pubkey,
    seeds: &[&[u8]],
) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(space);
    let signer_seeds = &[seeds];
    let current_lamports = target.lamports();

    if current_lamports == 0 {
        let cpi_ctx = CpiContext::new_with_signer(
            system_program.clone(),
            CreateAccount {
                from: payer.clone(),
                to: target.clone(),
            },
            signer_seeds,
        );
        return system_program::create_account(cpi_ctx, rent, space as u64, owner);
    }

    let top_up = rent.saturating_sub(current_lamports);
    if top_up > 0 {
        let cpi_ctx = CpiContext::new(
            system_program.clone(),
            SystemTransfer {
                from: payer.clone(),
                to: target.clone(),
            },
        );
        system_program::transfer(cpi_ctx, top_up)?;
    }

    let cpi_ctx = CpiContext::new_with_signer(
        system_program.clone(),
        Allocate {
            account_to_allocate: target.clone(),
        },
        signer_seeds,
    );
    system_program::allocate(cpi_ctx, space as u64)?;

    let cpi_ctx = CpiContext::new_with_signer(
        system_program.clone(),
        Assign {
            account_to_assign: target.clone(),
        },
        signer_seeds,
    );
    system_program::assign(cpi_ctx, owner)
}

/// Creates the custody token account and hands its authority to the escrow PDA.
pub fn open_custody<'info>(
    payer: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    escrow: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    custody_seeds: &[&[u8]],
) -> Result<()> {
    create_program_account(
        payer,
        custody,
        system_program,
        TokenAccount::LEN,
        token_program.key,
        custody_seeds,
    )?;

    let cpi_ctx = CpiContext::new(
        token_program.clone(),
        InitializeAccount3 {
            account: custody.clone(),
            mint: mint.clone(),
            authority: escrow.clone(),
        },
    );
    token::initialize_account3(cpi_ctx)
}

/// Closes an emptied custody account, sending its rent to `destination`.
pub fn close_custody<'info>(
    token_program: &AccountInfo<'info>,
    custody: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    escrow: &AccountInfo<'info>,
    escrow_seeds: &[&[u8]],
) -> Result<()> {
    let signer_seeds = &[escrow_seeds];
    let cpi_ctx = CpiContext::new_with_signer(
        token_program.clone(),
        CloseAccount {
            account: custody.clone(),
            destination: destination.clone(),
            authority: escrow.clone(),
        },
        signer_seeds,
    );
    token::close_account(cpi_ctx)
}
