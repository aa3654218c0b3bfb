use {
    crate::{
        app::{
            events::AppEvent,
            state::{AppState, Modal, Tab, TxView},
            tasks::{self, Events},
            views::{self, UiState},
        },
        constants::{
            network_by_id, Network, HISTORY_LIMIT, LATEST_BLOCK_COUNT, LATEST_TX_COUNT, NETWORKS,
        },
        error::{DappError, InputError},
        libs::{
            config::Config,
            identity::IdentityResolver,
            nft::NftClient,
            registry::{deployment_for, MessageRegistry},
            rpc::{Eip1193, HttpRpc},
            scanner::ChainScanner,
            session::switch_failure_message,
            transfer::{parse_address, TransferRequest, TransferState, TxPlan},
            tui::{hit_test, list_next, list_prev},
            wallet::{ChannelConsent, Consent, ConsentRequest, ProviderChoice},
            writing::{self, cc},
        },
        log, warn,
    },
    anyhow::{Context, Result},
    crossterm::{
        event::{
            DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
            KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
        },
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    futures_util::StreamExt,
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{collections::VecDeque, sync::Arc, time::Duration},
    tokio::sync::mpsc,
};

const LOG_TAIL: usize = 500;

pub async fn init() -> Result<()> {
    let cfg = Config::new();
    writing::route_to_file(true);

    let network = network_by_id(&cfg.default_network).unwrap_or_else(|| {
        warn!("unknown DEFAULT_NETWORK `{}`, using Sepolia", cfg.default_network);
        &NETWORKS[1]
    });
    let read_rpc = HttpRpc::new(network.rpc_url)
        .with_context(|| format!("rpc client for {}", network.display_name))?;
    log!(cc::LIGHT_GREEN, "dappterm starting on {}", network.display_name);

    let (events_tx, events_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (consent_tx, consent_rx) = mpsc::channel::<ConsentRequest>(8);

    let mut app = DappTui::new(cfg, AppState::new(network, read_rpc), events_tx, consent_tx);
    app.restore();
    let res = app.run_tui(events_rx, consent_rx).await;
    writing::route_to_file(false);
    res
}

pub struct DappTui {
    cfg: Config,
    state: AppState,
    ui: UiState,
    resolver: IdentityResolver,
    consent: Arc<dyn Consent>,
    nft: Option<NftClient>,
    events: Events,
    pending_consents: VecDeque<ConsentRequest>,
}

impl DappTui {
    pub fn new(
        cfg: Config,
        state: AppState,
        events: Events,
        consent_tx: mpsc::Sender<ConsentRequest>,
    ) -> Self {
        let nft = NftClient::from_key(cfg.nft_api_key.as_deref());
        let ui = UiState {
            nft_enabled: nft.is_some(),
            providers: ProviderChoice::ALL
                .iter()
                .map(|c| (*c, c.is_available(&cfg)))
                .collect(),
            ..Default::default()
        };
        Self {
            cfg,
            state,
            ui,
            resolver: IdentityResolver::new(),
            consent: Arc::new(ChannelConsent::new(consent_tx)),
            nft,
            events,
            pending_consents: VecDeque::new(),
        }
    }

    /// Silent reconnect: every configured provider is asked for accounts
    /// without prompting.
    fn restore(&self) {
        let candidates: Vec<(ProviderChoice, Arc<dyn Eip1193>)> = ProviderChoice::ALL
            .iter()
            .filter(|c| c.is_available(&self.cfg))
            .filter_map(|c| {
                match c.inject(&self.cfg, self.state.network, self.consent.clone()) {
                    Ok(p) => Some((*c, p)),
                    Err(e) => {
                        warn!("{} unavailable: {}", c.label(), e);
                        None
                    }
                }
            })
            .collect();
        tasks::restore(self.events.clone(), candidates, self.resolver.clone());
    }

    async fn run_tui(
        &mut self,
        mut app_events: mpsc::UnboundedReceiver<AppEvent>,
        mut consents: mpsc::Receiver<ConsentRequest>,
    ) -> Result<()> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.event_loop(&mut terminal, &mut app_events, &mut consents).await;

        let mut stdout = std::io::stdout();
        execute!(stdout, DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        res
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        app_events: &mut mpsc::UnboundedReceiver<AppEvent>,
        consents: &mut mpsc::Receiver<ConsentRequest>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        let mut logs_ticker = tokio::time::interval(Duration::from_secs(1));
        let mut balance_ticker = tokio::time::interval(Duration::from_secs(15));

        self.enter_tab();
        while !self.state.should_quit {
            tokio::select! {
                maybe_ev = events.next() => {
                    match maybe_ev {
                        Some(Ok(Event::Key(key))) => self.on_key(key),
                        Some(Ok(Event::Mouse(me))) => self.on_mouse(me),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => warn!("terminal event error: {}", e),
                        None => self.state.should_quit = true,
                    }
                }
                Some(ev) = app_events.recv() => self.apply(ev),
                Some(req) = consents.recv() => self.pending_consents.push_back(req),
                _ = logs_ticker.tick() => {
                    if self.state.tab == Tab::Logs {
                        self.state.logs = writing::tail_log(LOG_TAIL);
                    }
                }
                _ = balance_ticker.tick() => {
                    if self.state.session.is_some() && self.state.balance_form.value(0).is_empty() {
                        self.refresh_balance();
                    }
                }
                _ = ticker.tick() => {
                    terminal.draw(|f| views::draw(f, &mut self.state, &mut self.ui))?;
                }
            }
            if self.state.modal.is_none() {
                if let Some(req) = self.pending_consents.pop_front() {
                    self.state.modal = Some(Modal::Consent(req));
                }
            }
        }
        Ok(())
    }

    fn on_mouse(&mut self, me: MouseEvent) {
        match me.kind {
            MouseEventKind::Moved => {
                self.ui.hovered_tab = hit_test(&self.ui.tab_areas, me.column, me.row);
            }
            MouseEventKind::Down(MouseButton::Left) if self.state.modal.is_none() => {
                if let Some(i) = hit_test(&self.ui.tab_areas, me.column, me.row) {
                    self.state.tab = Tab::ALL[i];
                    self.enter_tab();
                }
            }
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.decline_pending();
            self.state.should_quit = true;
            return;
        }
        if let Some(modal) = self.state.modal.take() {
            self.state.modal = self.on_modal_key(modal, key);
            return;
        }
        if self.state.is_editing() {
            self.on_edit_key(key);
            return;
        }

        let tab = self.state.tab;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.decline_pending();
                self.state.should_quit = true;
            }
            KeyCode::Left => {
                self.state.previous_tab();
                self.enter_tab();
            }
            KeyCode::Right => {
                self.state.next_tab();
                self.enter_tab();
            }
            KeyCode::Char('n') => self.state.next_page(),
            KeyCode::Char('p') => self.state.previous_page(),
            KeyCode::PageDown if tab.is_paged() => self.state.next_page(),
            KeyCode::PageUp if tab.is_paged() => self.state.previous_page(),
            KeyCode::Char('r') => self.refresh(tab),
            KeyCode::Char('N') => {
                let chain_id = self.state.chain_id();
                let selected = NETWORKS
                    .iter()
                    .position(|n| n.chain_id == chain_id)
                    .unwrap_or(0);
                self.state.modal = Some(Modal::NetworkPicker { selected });
            }
            KeyCode::Char('c') => {
                let selected = self
                    .ui
                    .providers
                    .iter()
                    .position(|(_, ok)| *ok)
                    .unwrap_or(0);
                self.state.modal = Some(Modal::ProviderPicker { selected });
            }
            KeyCode::Char('d') if self.state.session.is_some() => {
                self.state.disconnect();
                self.state.set_status("Disconnected", true);
                self.enter_tab();
            }
            KeyCode::Char('a') if self.state.session.is_some() => {
                self.state.cycle_account();
                if let Some(label) = self.state.session.as_ref().map(|s| s.active().label()) {
                    self.state.set_status(format!("Active account: {label}"), true);
                }
                self.enter_tab();
            }
            KeyCode::Char('f') if tab == Tab::Messages => {
                self.state.history_mine_only = !self.state.history_mine_only;
                self.state.message_history.reset();
                self.refresh_message_history();
            }
            KeyCode::Char('l') if tab == Tab::Transactions => {
                self.state.tx_view = match self.state.tx_view {
                    TxView::Mine => TxView::Latest,
                    TxView::Latest => TxView::Mine,
                };
                self.enter_tab();
            }
            KeyCode::Tab => {
                if let Some(form) = self.state.active_form() {
                    form.focus_next();
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Down | KeyCode::Char('j') if tab == Tab::Logs => {
                self.state.logs_scroll = self.state.logs_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') if tab == Tab::Logs => {
                self.state.logs_scroll = self.state.logs_scroll.saturating_sub(1);
            }
            KeyCode::PageDown if tab == Tab::Logs => {
                self.state.logs_scroll = self.state.logs_scroll.saturating_add(100);
            }
            KeyCode::PageUp if tab == Tab::Logs => {
                self.state.logs_scroll = self.state.logs_scroll.saturating_sub(100);
            }
            KeyCode::Home if tab == Tab::Logs => self.state.logs_scroll = 0,
            KeyCode::End if tab == Tab::Logs => self.state.logs_scroll = usize::MAX,
            _ => {}
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if let Some(form) = self.state.active_form() {
                    form.blur();
                }
            }
            KeyCode::Tab => {
                if let Some(form) = self.state.active_form() {
                    form.focus_next();
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.state.active_form() {
                    form.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.state.active_form() {
                    form.push(c);
                }
            }
            _ => {}
        }
    }

    /// Returns the modal to keep open, if any.
    fn on_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
        match modal {
            Modal::Consent(req) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    log!(cc::LIGHT_GREEN, "approved: {}", req.prompt.title());
                    let _ = req.reply.send(true);
                    None
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    log!(cc::YELLOW, "rejected: {}", req.prompt.title());
                    let _ = req.reply.send(false);
                    None
                }
                _ => Some(Modal::Consent(req)),
            },
            Modal::ProviderPicker { selected } => {
                let len = ProviderChoice::ALL.len();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => Some(Modal::ProviderPicker {
                        selected: list_next(selected, len),
                    }),
                    KeyCode::Up | KeyCode::Char('k') => Some(Modal::ProviderPicker {
                        selected: list_prev(selected, len),
                    }),
                    KeyCode::Enter => {
                        if let Some(choice) = ProviderChoice::ALL.get(selected) {
                            self.connect(*choice);
                        }
                        None
                    }
                    KeyCode::Esc => None,
                    _ => Some(Modal::ProviderPicker { selected }),
                }
            }
            Modal::NetworkPicker { selected } => {
                let len = NETWORKS.len();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => Some(Modal::NetworkPicker {
                        selected: list_next(selected, len),
                    }),
                    KeyCode::Up | KeyCode::Char('k') => Some(Modal::NetworkPicker {
                        selected: list_prev(selected, len),
                    }),
                    KeyCode::Enter => {
                        if let Some(target) = NETWORKS.get(selected) {
                            self.change_network(target);
                        }
                        None
                    }
                    KeyCode::Esc => None,
                    _ => Some(Modal::NetworkPicker { selected }),
                }
            }
        }
    }

    fn decline_pending(&mut self) {
        if let Some(Modal::Consent(req)) = self.state.modal.take() {
            let _ = req.reply.send(false);
        }
        for req in self.pending_consents.drain(..) {
            let _ = req.reply.send(false);
        }
    }

    fn connect(&mut self, choice: ProviderChoice) {
        self.state
            .set_status(format!("Connecting with {}…", choice.label()), true);
        tasks::connect(
            self.events.clone(),
            choice,
            self.cfg.clone(),
            self.state.network,
            self.consent.clone(),
            self.resolver.clone(),
        );
    }

    fn change_network(&mut self, target: &'static Network) {
        if target.chain_id == self.state.chain_id() {
            return;
        }
        match self.state.session.clone() {
            Some(session) => {
                self.state
                    .set_status(format!("Switching to {}…", target.display_name), true);
                let run = self.state.switch_run.begin();
                tasks::switch_network(
                    self.events.clone(),
                    run,
                    session,
                    target,
                    self.resolver.clone(),
                );
            }
            None => match HttpRpc::new(target.rpc_url) {
                Ok(rpc) => {
                    self.state.select_read_network(target, rpc);
                    self.state
                        .set_status(format!("Reading from {}", target.display_name), true);
                    self.enter_tab();
                }
                Err(e) => self.state.set_status(e.to_string(), false),
            },
        }
    }

    fn submit(&mut self) {
        match self.state.tab {
            Tab::Send => self.submit_transfer(),
            Tab::Balance => {
                self.state.balance_form.blur();
                self.refresh_balance();
            }
            Tab::Messages => self.submit_message(),
            _ => {}
        }
    }

    fn submit_transfer(&mut self) {
        let Some((rpc, from)) = self
            .state
            .session
            .as_ref()
            .map(|s| (s.provider(), s.active_address()))
        else {
            self.state.set_status(DappError::NoAccount.to_string(), false);
            return;
        };
        if self.state.transfer.is_busy() {
            self.state
                .set_status("A transfer is already in flight", false);
            return;
        }
        let form = &self.state.send_form;
        let req = match TransferRequest::parse(form.value(0), form.value(1), form.value(2)) {
            Ok(r) => r,
            Err(e) => {
                self.state.set_status(e.to_string(), false);
                return;
            }
        };
        log!(
            cc::CYAN,
            "sending {} wei from {} to {}",
            req.amount,
            from,
            req.recipient
        );
        self.state.send_form.blur();
        let run = self.state.transfer_run.begin();
        tasks::transfer(
            self.events.clone(),
            run,
            rpc,
            from,
            TxPlan::from(req),
            self.cfg.transfer.clone(),
        );
    }

    fn submit_message(&mut self) {
        let Some(from) = self.state.session.as_ref().map(|s| s.active_address()) else {
            self.state.set_status(DappError::NoAccount.to_string(), false);
            return;
        };
        if self.state.message_tx.is_busy() {
            self.state
                .set_status("A message update is already in flight", false);
            return;
        }
        let text = self.state.message_form.value(0).to_string();
        if text.trim().is_empty() {
            self.state
                .set_status(InputError::EmptyMessage.to_string(), false);
            return;
        }
        let registry = match self.registry() {
            Ok(r) => r,
            Err(e) => {
                self.state.set_status(e.to_string(), false);
                return;
            }
        };
        self.state.message_form.blur();
        let run = self.state.message_run.begin();
        tasks::set_message(
            self.events.clone(),
            run,
            registry,
            from,
            text,
            self.cfg.transfer.clone(),
        );
    }

    fn scanner(&self) -> ChainScanner {
        ChainScanner::new(self.state.reader(), self.cfg.scan.clone())
    }

    fn registry(&self) -> Result<MessageRegistry, DappError> {
        let deployment = deployment_for(self.state.chain_id(), self.cfg.registry_address)?;
        Ok(MessageRegistry::new(self.state.reader(), deployment))
    }

    /// Load the current tab if it has nothing to show yet.
    fn enter_tab(&mut self) {
        let tab = self.state.tab;
        let s = &self.state;
        let empty = match tab {
            Tab::Wallet | Tab::Send => s.session.is_some() && s.balance.value().is_none(),
            Tab::Transactions => {
                if s.tx_view == TxView::Mine && s.session.is_some() {
                    s.history.value().is_none() && !s.history.is_loading()
                } else {
                    s.latest_txs.value().is_none() && !s.latest_txs.is_loading()
                }
            }
            Tab::Blocks => s.blocks.value().is_none() && !s.blocks.is_loading(),
            Tab::Balance => false,
            Tab::Messages => {
                s.current_message.value().is_none() && !s.current_message.is_loading()
            }
            Tab::Nfts => s.nfts.value().is_none() && !s.nfts.is_loading(),
            Tab::Logs => true,
        };
        if empty {
            self.refresh(tab);
        }
    }

    fn refresh(&mut self, tab: Tab) {
        match tab {
            Tab::Wallet | Tab::Send | Tab::Balance => self.refresh_balance(),
            Tab::Transactions => {
                let scanner = self.scanner();
                match (&self.state.session, self.state.tx_view) {
                    (Some(s), TxView::Mine) => {
                        let address = s.active_address();
                        let ticket = self.state.history.begin();
                        tasks::history(self.events.clone(), scanner, ticket, address, *HISTORY_LIMIT);
                    }
                    _ => {
                        let ticket = self.state.latest_txs.begin();
                        tasks::latest_transactions(
                            self.events.clone(),
                            scanner,
                            ticket,
                            *LATEST_TX_COUNT,
                        );
                    }
                }
            }
            Tab::Blocks => {
                let ticket = self.state.blocks.begin();
                tasks::blocks(self.events.clone(), self.scanner(), ticket, *LATEST_BLOCK_COUNT);
            }
            Tab::Messages => {
                let ticket = self.state.current_message.begin();
                match self.registry() {
                    Ok(reg) => tasks::current_message(self.events.clone(), reg, ticket),
                    Err(e) => {
                        self.state.current_message.settle(ticket, Err(e.to_string()));
                    }
                }
                self.refresh_message_history();
            }
            Tab::Nfts => self.refresh_nfts(),
            Tab::Logs => self.state.logs = writing::tail_log(LOG_TAIL),
        }
    }

    /// Balance of the address in the Balance form, or of the active account
    /// when the form is blank.
    fn refresh_balance(&mut self) {
        let input = self.state.balance_form.value(0).trim().to_string();
        let active = self.state.session.as_ref().map(|s| s.active_address());
        let address = if input.is_empty() {
            match active {
                Some(a) => a,
                None => {
                    if self.state.tab == Tab::Balance {
                        self.state
                            .set_status("Enter an address or connect a wallet", false);
                    }
                    return;
                }
            }
        } else {
            match parse_address(&input) {
                Ok(a) => a,
                Err(e) => {
                    self.state.set_status(e.to_string(), false);
                    return;
                }
            }
        };
        let ticket = self.state.balance.begin();
        let symbol = self.state.native_symbol();
        tasks::balance(self.events.clone(), self.scanner(), ticket, address, symbol);
    }

    fn refresh_message_history(&mut self) {
        let ticket = self.state.message_history.begin();
        let active = self.state.session.as_ref().map(|s| s.active_address());
        let sender = if self.state.history_mine_only {
            match active {
                Some(a) => Some(a),
                None => {
                    self.state.message_history.settle(
                        ticket,
                        Err(DappError::NoAccount.to_string()),
                    );
                    return;
                }
            }
        } else {
            None
        };
        match self.registry() {
            Ok(reg) => tasks::message_history(self.events.clone(), reg, ticket, sender),
            Err(e) => {
                self.state.message_history.settle(ticket, Err(e.to_string()));
            }
        }
    }

    /// A confirmed transfer changes what the scanner would report, so both
    /// transaction listings are fetched again.
    fn rescan_transactions(&mut self) {
        let scanner = self.scanner();
        match self.state.session.as_ref().map(|s| s.active_address()) {
            Some(address) => {
                let ticket = self.state.history.begin();
                tasks::history(
                    self.events.clone(),
                    scanner.clone(),
                    ticket,
                    address,
                    *HISTORY_LIMIT,
                );
            }
            None => self.state.history.reset(),
        }
        let ticket = self.state.latest_txs.begin();
        tasks::latest_transactions(self.events.clone(), scanner, ticket, *LATEST_TX_COUNT);
    }

    fn refresh_nfts(&mut self) {
        let (Some(client), Some(session)) = (self.nft.clone(), &self.state.session) else {
            return;
        };
        let owner = session.active_address();
        let ticket = self.state.nfts.begin();
        match self.state.current_network() {
            Some(network) => tasks::nfts(self.events.clone(), client, ticket, owner, network),
            None => {
                self.state.nfts.settle(ticket, Ok(None));
            }
        }
    }

    fn apply(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Connected(Ok(session)) => {
                let label = session.active().label();
                log!(cc::LIGHT_GREEN, "connected via {} as {}", session.kind.label(), label);
                self.state.set_status(format!("Connected as {label}"), true);
                self.state.set_session(session);
                self.enter_tab();
            }
            AppEvent::Connected(Err(e)) => {
                warn!("connect failed: {}", e);
                self.state.set_status(e.to_string(), false);
            }
            AppEvent::Restored(Some(session)) => {
                log!(cc::LIGHT_GREEN, "restored session via {}", session.kind.label());
                self.state
                    .set_status(format!("Reconnected via {}", session.kind.label()), true);
                self.state.set_session(session);
                self.enter_tab();
            }
            AppEvent::Restored(None) => {}
            AppEvent::NetworkSwitched { run, .. } if !self.state.switch_run.is_current(run) => {
                log!(cc::LIGHT_GRAY, "ignoring result of a superseded network switch");
            }
            AppEvent::NetworkSwitched { target, result, .. } => match result {
                Ok(session) => {
                    log!(cc::LIGHT_GREEN, "switched to {}", target.display_name);
                    self.state
                        .set_status(format!("Switched to {}", target.display_name), true);
                    self.state.set_session(session);
                    self.enter_tab();
                }
                Err(e) => {
                    self.state
                        .set_status(switch_failure_message(&e, target), false);
                }
            },
            AppEvent::Transfer(run, _) if !self.state.transfer_run.is_current(run) => {}
            AppEvent::Transfer(_, t) => {
                match &t {
                    TransferState::Confirmed { .. } => {
                        self.state.set_status(t.label(), true);
                        self.state.send_form.clear();
                        self.rescan_transactions();
                        self.refresh_balance();
                    }
                    TransferState::Failed { .. } => self.state.set_status(t.label(), false),
                    _ => {}
                }
                self.state.transfer = t;
            }
            AppEvent::MessageTx(run, _) if !self.state.message_run.is_current(run) => {}
            AppEvent::MessageTx(_, t) => {
                match &t {
                    TransferState::Confirmed { .. } => {
                        self.state.set_status("Message updated", true);
                        self.state.message_form.clear();
                        self.refresh(Tab::Messages);
                    }
                    TransferState::Failed { .. } => self.state.set_status(t.label(), false),
                    _ => {}
                }
                self.state.message_tx = t;
            }
            AppEvent::History(t, r) => {
                self.state.history.settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::LatestTxs(t, r) => {
                self.state.latest_txs.settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::Blocks(t, r) => {
                self.state.blocks.settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::Balance(t, r) => {
                self.state.balance.settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::CurrentMessage(t, r) => {
                self.state
                    .current_message
                    .settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::MessageHistory(t, r) => {
                self.state
                    .message_history
                    .settle(t, r.map_err(|e| e.to_string()));
            }
            AppEvent::Nfts(t, r) => {
                self.state.nfts.settle(t, r.map_err(|e| e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::{
        scanner::{Balance, Scanned},
        transfer::FailureKind,
    };
    use crate::libs::{session::WalletSession, testing::FakeChain};
    use alloy::primitives::{Address, B256, U256};

    async fn session() -> WalletSession {
        let chain = Arc::new(FakeChain::new(31_337));
        chain.set_accounts(vec![Address::repeat_byte(7)], true);
        WalletSession::connect_with(ProviderChoice::LocalKey, chain, &IdentityResolver::new())
            .await
            .unwrap()
    }

    fn app() -> (DappTui, mpsc::UnboundedReceiver<AppEvent>) {
        let cfg = Config {
            private_keys: Vec::new(),
            node_wallet_rpc: None,
            default_network: "localhost".into(),
            scan: Default::default(),
            transfer: Default::default(),
            registry_address: None,
            nft_api_key: None,
        };
        let n = network_by_id("localhost").unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let (ctx, _crx) = mpsc::channel(1);
        let state = AppState::new(n, HttpRpc::new(n.rpc_url).unwrap());
        (DappTui::new(cfg, state, tx, ctx), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        let (mut a, _rx) = app();
        a.on_key(key(KeyCode::Char('q')));
        assert!(a.state.should_quit);
    }

    #[test]
    fn send_without_wallet_sets_status() {
        let (mut a, _rx) = app();
        a.state.tab = Tab::Send;
        a.submit();
        let status = a.state.status.clone().unwrap();
        assert!(!status.ok);
        assert!(status.text.contains("connect a wallet"));
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let (mut a, _rx) = app();
        a.state.tab = Tab::Balance;
        a.on_key(key(KeyCode::Tab));
        for c in "0xq".chars() {
            a.on_key(key(KeyCode::Char(c)));
        }
        // 'q' while editing is text, not quit
        assert!(!a.state.should_quit);
        a.on_key(key(KeyCode::Backspace));
        assert_eq!(a.state.balance_form.value(0), "0x");
        a.on_key(key(KeyCode::Esc));
        assert!(!a.state.is_editing());
    }

    #[test]
    fn invalid_balance_address_is_reported() {
        let (mut a, _rx) = app();
        a.state.tab = Tab::Balance;
        a.on_key(key(KeyCode::Tab));
        for c in "0x1234".chars() {
            a.on_key(key(KeyCode::Char(c)));
        }
        a.on_key(key(KeyCode::Enter));
        assert!(!a.state.status.clone().unwrap().ok);
        assert!(!a.state.balance.is_loading());
    }

    #[test]
    fn stale_results_are_dropped() {
        let (mut a, _rx) = app();
        let old = a.state.balance.begin();
        let new = a.state.balance.begin();
        let bal = |n: u64| Balance {
            address: Address::ZERO,
            wei: U256::from(n),
            formatted: n.to_string(),
        };
        a.apply(AppEvent::Balance(new, Ok(bal(2))));
        a.apply(AppEvent::Balance(old, Ok(bal(1))));
        assert_eq!(a.state.balance.value().unwrap().formatted, "2");
    }

    #[test]
    fn failed_transfer_sets_error_status() {
        let (mut a, _rx) = app();
        let run = a.state.transfer_run.begin();
        a.apply(AppEvent::Transfer(run, TransferState::Preparing));
        assert!(a.state.transfer.is_busy());
        a.apply(AppEvent::Transfer(run, TransferState::Failed {
            kind: FailureKind::UserCancelled,
            message: "rejected".into(),
        }));
        let status = a.state.status.clone().unwrap();
        assert!(!status.ok);
        assert!(status.text.starts_with("Cancelled in wallet"));
    }

    #[test]
    fn network_picker_switches_read_network() {
        let (mut a, _rx) = app();
        a.state.tab = Tab::Balance;
        a.on_key(key(KeyCode::Char('N')));
        assert!(matches!(a.state.modal, Some(Modal::NetworkPicker { .. })));
        let sepolia = NETWORKS.iter().position(|n| n.id == "sepolia").unwrap();
        a.state.modal = Some(Modal::NetworkPicker { selected: sepolia });
        a.on_key(key(KeyCode::Enter));
        assert!(a.state.modal.is_none());
        assert_eq!(a.state.chain_id(), 11_155_111);
    }

    #[tokio::test]
    async fn consent_modal_answers_request() {
        let (mut a, _rx) = app();
        let (reply, answer) = tokio::sync::oneshot::channel();
        a.state.modal = Some(Modal::Consent(ConsentRequest {
            prompt: crate::libs::wallet::Prompt::SwitchChain { chain_id: 1 },
            reply,
        }));
        a.on_key(key(KeyCode::Char('x')));
        assert!(a.state.modal.is_some());
        a.on_key(key(KeyCode::Char('y')));
        assert!(a.state.modal.is_none());
        assert!(answer.await.unwrap());
    }

    #[tokio::test]
    async fn blocks_refresh_uses_a_ticket() {
        let (mut a, _rx) = app();
        a.state.tab = Tab::Blocks;
        a.enter_tab();
        assert!(a.state.blocks.is_loading());
        // a second refresh supersedes the first
        let stale = {
            let t = a.state.blocks.begin();
            a.refresh(Tab::Blocks);
            t
        };
        a.apply(AppEvent::Blocks(stale, Ok(Scanned { items: vec![], skipped: 0 })));
        assert!(a.state.blocks.value().is_none());
    }

    #[tokio::test]
    async fn confirmed_transfer_rescans_transactions() {
        let (mut a, _rx) = app();
        a.state.set_session(session().await);
        assert!(!a.state.history.is_loading());
        let run = a.state.transfer_run.begin();
        a.apply(AppEvent::Transfer(run, TransferState::Preparing));
        a.apply(AppEvent::Transfer(run, TransferState::Pending { hash: B256::ZERO }));
        a.apply(AppEvent::Transfer(
            run,
            TransferState::Confirmed {
                hash: B256::ZERO,
                block_number: 5,
            },
        ));
        assert!(a.state.history.is_loading());
        assert!(a.state.latest_txs.is_loading());
        assert!(a.state.balance.is_loading());
        assert!(a.state.status.clone().unwrap().ok);
    }

    #[tokio::test]
    async fn transfer_progress_after_disconnect_is_ignored() {
        let (mut a, _rx) = app();
        a.state.set_session(session().await);
        let run = a.state.transfer_run.begin();
        a.apply(AppEvent::Transfer(run, TransferState::Preparing));
        a.on_key(key(KeyCode::Char('d')));
        assert_eq!(a.state.transfer, TransferState::Idle);
        a.apply(AppEvent::Transfer(run, TransferState::Pending { hash: B256::ZERO }));
        assert_eq!(a.state.transfer, TransferState::Idle);
    }

    #[tokio::test]
    async fn superseded_network_switch_is_ignored() {
        let (mut a, _rx) = app();
        let first = a.state.switch_run.begin();
        let _second = a.state.switch_run.begin();
        let sepolia = network_by_id("sepolia").unwrap();
        a.apply(AppEvent::NetworkSwitched {
            run: first,
            target: sepolia,
            result: Ok(session().await),
        });
        assert!(a.state.session.is_none());
        assert_eq!(a.state.chain_id(), 31_337);
    }
}
