use std::{collections::HashMap, sync::Arc};

use crate::{
    constants::Network,
    libs::{
        nft::OwnedNft,
        registry::MessageChangeEvent,
        rpc::{Eip1193, HttpRpc},
        scanner::{Balance, BlockRecord, Scanned, TransactionRecord},
        session::WalletSession,
        ticket::{Latest, Runs},
        transfer::TransferState,
        wallet::ConsentRequest,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Wallet,
    Send,
    Transactions,
    Blocks,
    Balance,
    Messages,
    Nfts,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::Wallet,
        Tab::Send,
        Tab::Transactions,
        Tab::Blocks,
        Tab::Balance,
        Tab::Messages,
        Tab::Nfts,
        Tab::Logs,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Wallet => "Wallet",
            Tab::Send => "Send",
            Tab::Transactions => "Transactions",
            Tab::Blocks => "Blocks",
            Tab::Balance => "Balance",
            Tab::Messages => "Messages",
            Tab::Nfts => "NFTs",
            Tab::Logs => "Logs",
        }
    }

    pub fn is_paged(self) -> bool {
        matches!(
            self,
            Tab::Transactions | Tab::Blocks | Tab::Messages | Tab::Nfts
        )
    }
}

/// Transactions tab shows either the active account's history or the head
/// block's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxView {
    Mine,
    Latest,
}

/// A row of labelled text inputs. At most one field has focus.
#[derive(Debug, Clone)]
pub struct Form {
    labels: Vec<&'static str>,
    values: Vec<String>,
    focused: Option<usize>,
}

impl Form {
    pub fn new(labels: &[&'static str]) -> Self {
        Self {
            labels: labels.to_vec(),
            values: vec![String::new(); labels.len()],
            focused: None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str, bool)> + '_ {
        self.labels
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (l, v))| (*l, v.as_str(), self.focused == Some(i)))
    }

    pub fn value(&self, i: usize) -> &str {
        self.values.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn is_editing(&self) -> bool {
        self.focused.is_some()
    }

    pub fn focus_next(&mut self) {
        self.focused = match self.focused {
            None => Some(0),
            Some(i) => Some((i + 1) % self.labels.len()),
        };
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn push(&mut self, c: char) {
        if let Some(v) = self.focused.and_then(|i| self.values.get_mut(i)) {
            v.push(c);
        }
    }

    pub fn pop(&mut self) {
        if let Some(v) = self.focused.and_then(|i| self.values.get_mut(i)) {
            v.pop();
        }
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(String::clear);
        self.focused = None;
    }
}

#[derive(Debug)]
pub enum Modal {
    ProviderPicker { selected: usize },
    NetworkPicker { selected: usize },
    Consent(ConsentRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub ok: bool,
}

/// Everything the UI shows. Only the UI task touches it; background work
/// reports back through `AppEvent`s.
pub struct AppState {
    pub tab: Tab,
    pub network: &'static Network,
    read_rpc: Arc<HttpRpc>,
    pub session: Option<WalletSession>,

    pub send_form: Form,
    pub transfer: TransferState,
    pub balance_form: Form,
    pub message_form: Form,
    pub message_tx: TransferState,
    pub transfer_run: Runs,
    pub message_run: Runs,
    pub switch_run: Runs,
    pub history_mine_only: bool,
    pub tx_view: TxView,

    pub history: Latest<Scanned<TransactionRecord>>,
    pub latest_txs: Latest<Scanned<TransactionRecord>>,
    pub blocks: Latest<Scanned<BlockRecord>>,
    pub balance: Latest<Balance>,
    pub current_message: Latest<String>,
    pub message_history: Latest<Vec<MessageChangeEvent>>,
    pub nfts: Latest<Option<Vec<OwnedNft>>>,

    pages: HashMap<Tab, usize>,
    pub logs: Vec<String>,
    pub logs_scroll: usize,
    pub status: Option<Status>,
    pub modal: Option<Modal>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(network: &'static Network, read_rpc: HttpRpc) -> Self {
        Self {
            tab: Tab::Wallet,
            network,
            read_rpc: Arc::new(read_rpc),
            session: None,
            send_form: Form::new(&["Recipient", "Amount", "Call data (optional)"]),
            transfer: TransferState::Idle,
            balance_form: Form::new(&["Address (blank = active account)"]),
            message_form: Form::new(&["New message"]),
            message_tx: TransferState::Idle,
            transfer_run: Runs::default(),
            message_run: Runs::default(),
            switch_run: Runs::default(),
            history_mine_only: false,
            tx_view: TxView::Mine,
            history: Latest::default(),
            latest_txs: Latest::default(),
            blocks: Latest::default(),
            balance: Latest::default(),
            current_message: Latest::default(),
            message_history: Latest::default(),
            nfts: Latest::default(),
            pages: HashMap::new(),
            logs: Vec::new(),
            logs_scroll: 0,
            status: None,
            modal: None,
            should_quit: false,
        }
    }

    /// Where chain reads go: the wallet when connected, else the public RPC
    /// of the selected network.
    pub fn reader(&self) -> Arc<dyn Eip1193> {
        match &self.session {
            Some(s) => s.provider(),
            None => self.read_rpc.clone() as Arc<dyn Eip1193>,
        }
    }

    /// Chain id views are scoped to.
    pub fn chain_id(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.chain_id)
            .unwrap_or(self.network.chain_id)
    }

    pub fn native_symbol(&self) -> &'static str {
        self.session
            .as_ref()
            .and_then(|s| s.network())
            .unwrap_or(self.network)
            .native_symbol
    }

    pub fn current_network(&self) -> Option<&'static Network> {
        match &self.session {
            Some(s) => s.network(),
            None => Some(self.network),
        }
    }

    pub fn active_form(&mut self) -> Option<&mut Form> {
        match self.tab {
            Tab::Send => Some(&mut self.send_form),
            Tab::Balance => Some(&mut self.balance_form),
            Tab::Messages => Some(&mut self.message_form),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        match self.tab {
            Tab::Send => self.send_form.is_editing(),
            Tab::Balance => self.balance_form.is_editing(),
            Tab::Messages => self.message_form.is_editing(),
            _ => false,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, ok: bool) {
        self.status = Some(Status {
            text: text.into(),
            ok,
        });
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.tab = self.tab.previous();
    }

    pub fn page(&self, tab: Tab) -> usize {
        self.pages.get(&tab).copied().unwrap_or(0)
    }

    pub fn next_page(&mut self) {
        if self.tab.is_paged() {
            *self.pages.entry(self.tab).or_default() += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(p) = self.pages.get_mut(&self.tab) {
            *p = p.saturating_sub(1);
        }
    }

    /// Clamp a stored page index to what the data allows, so `n` past the end
    /// does not accumulate.
    pub fn clamp_page(&mut self, tab: Tab, total_pages: usize) {
        if let Some(p) = self.pages.get_mut(&tab) {
            *p = (*p).min(total_pages.saturating_sub(1));
        }
    }

    /// Views that depend on chain or account. In-flight results for them are
    /// invalidated too.
    fn reset_chain_views(&mut self) {
        self.history.reset();
        self.latest_txs.reset();
        self.blocks.reset();
        self.balance.reset();
        self.current_message.reset();
        self.message_history.reset();
        self.nfts.reset();
        self.pages.clear();
    }

    /// Progress from transactions sent through the previous session no
    /// longer applies.
    fn drop_runs(&mut self) {
        self.transfer_run.invalidate();
        self.message_run.invalidate();
        self.switch_run.invalidate();
        self.transfer = TransferState::Idle;
        self.message_tx = TransferState::Idle;
    }

    pub fn set_session(&mut self, session: WalletSession) {
        if let Some(n) = session.network() {
            self.network = n;
        }
        self.session = Some(session);
        self.drop_runs();
        self.reset_chain_views();
    }

    pub fn disconnect(&mut self) {
        if let Some(s) = self.session.take() {
            s.disconnect();
        }
        self.drop_runs();
        self.reset_chain_views();
    }

    /// Change the read-only network (no wallet involved).
    pub fn select_read_network(&mut self, network: &'static Network, rpc: HttpRpc) {
        self.network = network;
        self.read_rpc = Arc::new(rpc);
        self.reset_chain_views();
    }

    pub fn cycle_account(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.select_next();
        }
        self.history.reset();
        self.balance.reset();
        self.nfts.reset();
        self.pages.remove(&Tab::Transactions);
        self.pages.remove(&Tab::Nfts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::network_by_id;

    fn state() -> AppState {
        let n = network_by_id("localhost").unwrap();
        AppState::new(n, HttpRpc::new(n.rpc_url).unwrap())
    }

    #[test]
    fn tabs_wrap() {
        assert_eq!(Tab::Wallet.previous(), Tab::Logs);
        assert_eq!(Tab::Logs.next(), Tab::Wallet);
        assert_eq!(Tab::Send.index(), 1);
    }

    #[test]
    fn form_editing() {
        let mut f = Form::new(&["a", "b"]);
        f.push('x');
        assert_eq!(f.value(0), "");
        f.focus_next();
        f.push('1');
        f.focus_next();
        f.push('2');
        f.push('3');
        f.pop();
        assert_eq!((f.value(0), f.value(1)), ("1", "2"));
        f.focus_next();
        assert!(f.fields().next().unwrap().2);
        f.clear();
        assert!(!f.is_editing());
        assert_eq!(f.value(1), "");
    }

    #[test]
    fn pages_only_on_paged_tabs() {
        let mut s = state();
        s.next_page();
        assert_eq!(s.page(Tab::Wallet), 0);
        s.tab = Tab::Blocks;
        s.next_page();
        s.next_page();
        s.clamp_page(Tab::Blocks, 2);
        assert_eq!(s.page(Tab::Blocks), 1);
        s.previous_page();
        s.previous_page();
        assert_eq!(s.page(Tab::Blocks), 0);
    }

    #[test]
    fn network_change_invalidates_views() {
        let mut s = state();
        let t = s.blocks.begin();
        let sepolia = network_by_id("sepolia").unwrap();
        s.select_read_network(sepolia, HttpRpc::new(sepolia.rpc_url).unwrap());
        assert!(!s.blocks.settle(t, Ok(Scanned { items: vec![], skipped: 0 })));
        assert_eq!(s.chain_id(), 11_155_111);
        assert_eq!(s.native_symbol(), "SepoliaETH");
    }
}
