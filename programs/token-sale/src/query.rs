//! Read-only view of the program's sales for off-chain callers.
//!
//! Account bytes come from an [`AccountReader`]; an RPC client, a test
//! validator snapshot or a plain map can all serve as one.

use std::collections::HashMap;

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::{
    pda,
    state::{EscrowAccount, RegistryPage, SaleRegistry},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no sale named {0:?}")]
    NotFound(String),

    #[error("account {address} does not hold a valid {kind}")]
    InvalidAccountData { address: Pubkey, kind: &'static str },

    #[error("cannot derive an address for sale {0:?}")]
    Derivation(String),

    #[error("cannot derive the address of the sale registry")]
    RegistryDerivation,
}

pub trait AccountReader {
    /// Raw data of the account at `address`, or `None` if it does not exist.
    fn account_data(&self, address: &Pubkey) -> Option<Vec<u8>>;
}

impl AccountReader for HashMap<Pubkey, Vec<u8>> {
    fn account_data(&self, address: &Pubkey) -> Option<Vec<u8>> {
        self.get(address).cloned()
    }
}

pub struct SaleQuery<'r, R> {
    reader: &'r R,
    program_id: Pubkey,
}

impl<'r, R: AccountReader> SaleQuery<'r, R> {
    pub fn new(reader: &'r R, program_id: Pubkey) -> Self {
        Self { reader, program_id }
    }

    /// The sale index header, or `None` before the first sale is created.
    pub fn registry(&self) -> std::result::Result<Option<SaleRegistry>, QueryError> {
        let (address, _) = pda::registry_address(&self.program_id)
            .map_err(|_| QueryError::RegistryDerivation)?;
        self.reader
            .account_data(&address)
            .map(|data| decode::<SaleRegistry>(&address, &data, "sale registry"))
            .transpose()
    }

    pub fn registry_page(
        &self,
        index: u32,
    ) -> std::result::Result<Option<RegistryPage>, QueryError> {
        let (address, _) = pda::registry_page_address(index, &self.program_id)
            .map_err(|_| QueryError::RegistryDerivation)?;
        self.reader
            .account_data(&address)
            .map(|data| decode::<RegistryPage>(&address, &data, "registry page"))
            .transpose()
    }

    pub fn get_escrow_account(&self, name: &str) -> std::result::Result<EscrowAccount, QueryError> {
        // names that could never be initialized cannot exist
        if EscrowAccount::validate_name(name).is_err() {
            return Err(QueryError::NotFound(name.to_string()));
        }
        let (address, _) = pda::escrow_address(name, &self.program_id)
            .map_err(|_| QueryError::Derivation(name.to_string()))?;
        let data = self
            .reader
            .account_data(&address)
            .ok_or_else(|| QueryError::NotFound(name.to_string()))?;
        decode(&address, &data, "escrow account")
    }

    /// Every live sale, page by page in registry order. Empty, not an error,
    /// when there are none.
    pub fn list_sales(&self) -> std::result::Result<Vec<EscrowAccount>, QueryError> {
        let Some(registry) = self.registry()? else {
            return Ok(Vec::new());
        };

        let mut sales = Vec::with_capacity(registry.sale_count as usize);
        // the page after a full one is only created by the next initialize
        for index in 0..=registry.next_page {
            let Some(page) = self.registry_page(index)? else {
                continue;
            };
            for entry in &page.sales {
                let data = self
                    .reader
                    .account_data(&entry.escrow)
                    .ok_or_else(|| QueryError::NotFound(entry.name.clone()))?;
                sales.push(decode(&entry.escrow, &data, "escrow account")?);
            }
        }
        Ok(sales)
    }

    /// Token balance currently held in the sale's custody account.
    pub fn custody_balance(&self, escrow: &EscrowAccount) -> std::result::Result<u64, QueryError> {
        let data = self
            .reader
            .account_data(&escrow.custody)
            .ok_or_else(|| QueryError::NotFound(escrow.name.clone()))?;
        let account: TokenAccount = decode(&escrow.custody, &data, "token account")?;
        Ok(account.amount)
    }
}

fn decode<T: AccountDeserialize>(
    address: &Pubkey,
    data: &[u8],
    kind: &'static str,
) -> std::result::Result<T, QueryError> {
    T::try_deserialize(&mut &data[..]).map_err(|_| QueryError::InvalidAccountData {
        address: *address,
        kind,
    })
}
