use crate::{
    constants::Network,
    error::DappError,
    libs::{
        nft::OwnedNft,
        registry::MessageChangeEvent,
        scanner::{Balance, BlockRecord, Scanned, TransactionRecord},
        session::WalletSession,
        ticket::Ticket,
        transfer::TransferState,
    },
};

/// Results of background work, posted to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    Connected(Result<WalletSession, DappError>),
    Restored(Option<WalletSession>),
    NetworkSwitched {
        run: Ticket,
        target: &'static Network,
        result: Result<WalletSession, DappError>,
    },
    Transfer(Ticket, TransferState),
    MessageTx(Ticket, TransferState),
    History(Ticket, Result<Scanned<TransactionRecord>, DappError>),
    LatestTxs(Ticket, Result<Scanned<TransactionRecord>, DappError>),
    Blocks(Ticket, Result<Scanned<BlockRecord>, DappError>),
    Balance(Ticket, Result<Balance, DappError>),
    CurrentMessage(Ticket, Result<String, DappError>),
    MessageHistory(Ticket, Result<Vec<MessageChangeEvent>, DappError>),
    Nfts(Ticket, Result<Option<Vec<OwnedNft>>, DappError>),
}
