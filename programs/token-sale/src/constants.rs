/// Seed for the escrow record PDA, followed by the sale name
pub const ESCROW_SEED: &[u8] = b"escrow_pda";

/// Seed for the custody token account PDA
pub const CUSTODY_SEED: &[u8] = b"escrow_token_account";

/// Seed for the singleton registry header PDA
pub const REGISTRY_SEED: &[u8] = b"sale_registry";

/// Seed for a registry page PDA, followed by the page index as little-endian u32
pub const REGISTRY_PAGE_SEED: &[u8] = b"sale_registry_page";

/// Longest sale name in bytes. Matches the ledger's per-seed limit.
pub const MAX_NAME_LEN: usize = 32;

/// Entries per registry page. New pages are opened as old ones fill up.
pub const REGISTRY_PAGE_CAPACITY: usize = 32;
