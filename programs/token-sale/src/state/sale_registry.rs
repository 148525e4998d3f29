use anchor_lang::prelude::*;

use crate::{constants::REGISTRY_PAGE_CAPACITY, error::TokenSaleError};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, InitSpace, Debug, PartialEq, Eq)]
pub struct SaleEntry {
    #[max_len(32)]
    pub name: String,
    pub escrow: Pubkey,
}

/// Header of the sale index. Points at the page that takes the next
/// registration; earlier pages keep their entries until those sales are cancelled.
/// Seeds: ["sale_registry"]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct SaleRegistry {
    pub bump: u8,
    pub next_page: u32,
    pub sale_count: u64,
}

impl SaleRegistry {
    pub const LEN: usize = 8 + SaleRegistry::INIT_SPACE;

    /// Counts a sale just written to `page` and opens a fresh page once it is full.
    pub fn note_registered(&mut self, page: &RegistryPage) -> Result<()> {
        self.sale_count = self
            .sale_count
            .checked_add(1)
            .ok_or(TokenSaleError::MathOverflow)?;
        if page.index == self.next_page && page.is_full() {
            self.next_page = self
                .next_page
                .checked_add(1)
                .ok_or(TokenSaleError::MathOverflow)?;
        }
        Ok(())
    }

    pub fn note_removed(&mut self) {
        self.sale_count = self.sale_count.saturating_sub(1);
    }
}

/// Fixed-size slice of the sale index.
/// Seeds: ["sale_registry_page", index as u32 LE]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct RegistryPage {
    pub bump: u8,
    pub index: u32,
    #[max_len(32)]
    pub sales: Vec<SaleEntry>,
}

impl RegistryPage {
    pub const LEN: usize = 8 + RegistryPage::INIT_SPACE;

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sales.len() >= REGISTRY_PAGE_CAPACITY
    }

    pub fn find(&self, name: &str) -> Option<&SaleEntry> {
        self.sales.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Fails the same way `register` would, without mutating.
    pub fn check_can_register(&self, name: &str) -> Result<()> {
        require!(!self.contains(name), TokenSaleError::DuplicateSale);
        require!(!self.is_full(), TokenSaleError::RegistryPageFull);
        Ok(())
    }

    pub fn register(&mut self, name: &str, escrow: Pubkey) -> Result<()> {
        self.check_can_register(name)?;
        self.sales.push(SaleEntry {
            name: name.to_string(),
            escrow,
        });
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<SaleEntry> {
        let index = self
            .sales
            .iter()
            .position(|entry| entry.name == name)
            .ok_or(TokenSaleError::SaleNotFound)?;
        Ok(self.sales.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_NAME_LEN;

    fn page(index: u32) -> RegistryPage {
        RegistryPage {
            index,
            ..RegistryPage::default()
        }
    }

    #[test]
    fn page_space_covers_a_full_page() {
        let entry = 4 + MAX_NAME_LEN + 32;
        assert_eq!(
            RegistryPage::LEN,
            8 + 1 + 4 + 4 + REGISTRY_PAGE_CAPACITY * entry
        );
        // must stay within the 10 KiB limit for accounts created through CPI
        assert!(RegistryPage::LEN <= 10_240);
        assert_eq!(SaleRegistry::LEN, 8 + 1 + 4 + 8);
    }

    #[test]
    fn register_rejects_duplicates_and_keeps_original() {
        let mut page = page(0);
        let first = Pubkey::new_unique();
        page.register("Test Escrow", first).unwrap();

        assert_eq!(
            page.register("Test Escrow", Pubkey::new_unique())
                .unwrap_err(),
            TokenSaleError::DuplicateSale.into()
        );
        assert_eq!(page.len(), 1);
        assert_eq!(page.find("Test Escrow").unwrap().escrow, first);
    }

    #[test]
    fn full_page_moves_the_header_on() {
        let mut registry = SaleRegistry::default();
        let mut current = page(0);
        for i in 0..REGISTRY_PAGE_CAPACITY {
            current
                .register(&format!("sale-{i}"), Pubkey::new_unique())
                .unwrap();
            registry.note_registered(&current).unwrap();
        }

        assert!(current.is_full());
        assert_eq!(
            current
                .register("one too many", Pubkey::new_unique())
                .unwrap_err(),
            TokenSaleError::RegistryPageFull.into()
        );
        assert_eq!(registry.next_page, 1);
        assert_eq!(registry.sale_count, REGISTRY_PAGE_CAPACITY as u64);

        let mut next = page(registry.next_page);
        next.register("one too many", Pubkey::new_unique()).unwrap();
        registry.note_registered(&next).unwrap();
        assert_eq!(registry.next_page, 1);
    }

    #[test]
    fn filling_an_old_page_does_not_move_the_header() {
        let mut registry = SaleRegistry {
            next_page: 3,
            ..SaleRegistry::default()
        };
        let mut old = page(1);
        for i in 0..REGISTRY_PAGE_CAPACITY {
            old.register(&format!("sale-{i}"), Pubkey::new_unique())
                .unwrap();
        }
        registry.note_registered(&old).unwrap();
        assert_eq!(registry.next_page, 3);
    }

    #[test]
    fn remove_frees_the_name() {
        let mut registry = SaleRegistry::default();
        let mut page = page(0);
        let escrow = Pubkey::new_unique();
        page.register("a", escrow).unwrap();
        registry.note_registered(&page).unwrap();
        page.register("b", Pubkey::new_unique()).unwrap();
        registry.note_registered(&page).unwrap();

        let removed = page.remove("a").unwrap();
        registry.note_removed();
        assert_eq!(removed.escrow, escrow);
        assert!(!page.contains("a"));
        assert!(page.contains("b"));
        assert_eq!(registry.sale_count, 1);

        assert_eq!(
            page.remove("a").unwrap_err(),
            TokenSaleError::SaleNotFound.into()
        );
        page.register("a", Pubkey::new_unique()).unwrap();
    }
}
