//! Spawned work. Each function starts one tokio task that reports back
//! through the UI's event channel; nothing here touches `AppState`.
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    app::events::AppEvent,
    constants::Network,
    libs::{
        config::Config,
        identity::IdentityResolver,
        nft::NftClient,
        registry::MessageRegistry,
        rpc::Eip1193,
        scanner::ChainScanner,
        session::{self, WalletSession},
        ticket::Ticket,
        transfer::{submit_transaction, TransferSettings, TxPlan},
        wallet::{Consent, ProviderChoice},
    },
    warn,
};

pub type Events = UnboundedSender<AppEvent>;

pub fn connect(
    events: Events,
    choice: ProviderChoice,
    cfg: Config,
    network: &'static Network,
    consent: Arc<dyn Consent>,
    resolver: IdentityResolver,
) {
    tokio::spawn(async move {
        let res = session::connect(choice, &cfg, network, consent, &resolver).await;
        let _ = events.send(AppEvent::Connected(res));
    });
}

pub fn restore(
    events: Events,
    candidates: Vec<(ProviderChoice, Arc<dyn Eip1193>)>,
    resolver: IdentityResolver,
) {
    tokio::spawn(async move {
        let restored = session::restore_session(candidates, &resolver).await;
        let _ = events.send(AppEvent::Restored(restored));
    });
}

pub fn switch_network(
    events: Events,
    run: Ticket,
    session: WalletSession,
    target: &'static Network,
    resolver: IdentityResolver,
) {
    tokio::spawn(async move {
        let result = session.switch_network(target, &resolver).await;
        let _ = events.send(AppEvent::NetworkSwitched { run, target, result });
    });
}

pub fn transfer(
    events: Events,
    run: Ticket,
    rpc: Arc<dyn Eip1193>,
    from: Address,
    plan: TxPlan,
    settings: TransferSettings,
) {
    tokio::spawn(async move {
        let tx = events.clone();
        submit_transaction(rpc.as_ref(), from, plan, &settings, move |s| {
            let _ = tx.send(AppEvent::Transfer(run, s.clone()));
        })
        .await;
    });
}

pub fn set_message(
    events: Events,
    run: Ticket,
    registry: MessageRegistry,
    from: Address,
    text: String,
    settings: TransferSettings,
) {
    tokio::spawn(async move {
        let tx = events.clone();
        let res = registry
            .submit_message(from, &text, &settings, move |s| {
                let _ = tx.send(AppEvent::MessageTx(run, s.clone()));
            })
            .await;
        if let Err(e) = res {
            warn!("message not submitted: {}", e);
        }
    });
}

pub fn history(
    events: Events,
    scanner: ChainScanner,
    ticket: Ticket,
    address: Address,
    limit: usize,
) {
    tokio::spawn(async move {
        let res = scanner.transactions_for_address(address, limit).await;
        let _ = events.send(AppEvent::History(ticket, res));
    });
}

pub fn latest_transactions(events: Events, scanner: ChainScanner, ticket: Ticket, n: usize) {
    tokio::spawn(async move {
        let res = scanner.latest_transactions(n).await;
        let _ = events.send(AppEvent::LatestTxs(ticket, res));
    });
}

pub fn blocks(events: Events, scanner: ChainScanner, ticket: Ticket, n: usize) {
    tokio::spawn(async move {
        let res = scanner.latest_blocks(n).await;
        let _ = events.send(AppEvent::Blocks(ticket, res));
    });
}

pub fn balance(
    events: Events,
    scanner: ChainScanner,
    ticket: Ticket,
    address: Address,
    symbol: &'static str,
) {
    tokio::spawn(async move {
        let res = scanner.account_balance(address, symbol).await;
        let _ = events.send(AppEvent::Balance(ticket, res));
    });
}

pub fn current_message(events: Events, registry: MessageRegistry, ticket: Ticket) {
    tokio::spawn(async move {
        let res = registry.read_current_message().await;
        let _ = events.send(AppEvent::CurrentMessage(ticket, res));
    });
}

pub fn message_history(
    events: Events,
    registry: MessageRegistry,
    ticket: Ticket,
    sender: Option<Address>,
) {
    tokio::spawn(async move {
        let res = registry.list_change_history(sender).await;
        let _ = events.send(AppEvent::MessageHistory(ticket, res));
    });
}

pub fn nfts(
    events: Events,
    client: NftClient,
    ticket: Ticket,
    owner: Address,
    network: &'static Network,
) {
    tokio::spawn(async move {
        let res = client.list_nfts(owner, network).await;
        let _ = events.send(AppEvent::Nfts(ticket, res));
    });
}
