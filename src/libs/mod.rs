pub mod config;
pub mod format;
pub mod identity;
pub mod nft;
pub mod registry;
pub mod rpc;
pub mod scanner;
pub mod session;
pub mod ticket;
pub mod transfer;
pub mod tui;
pub mod wallet;
pub mod writing;

#[cfg(test)]
pub(crate) mod testing;
