pub mod escrow_account;
pub mod sale_registry;

pub use escrow_account::*;
pub use sale_registry::*;
