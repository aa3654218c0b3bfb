//! Rendering. Reads `AppState`, never starts work; the only state it writes
//! is page clamping and scroll positions.
use ratatui::{prelude::*, widgets::ScrollbarState};

use crate::{
    app::state::{AppState, Modal, Tab, TxView},
    constants::{Network, MIN_TERMINAL_HEIGHT, NETWORKS, PAGE_SIZE},
    libs::{
        format::{format_native, format_timestamp_ms, short_addr, short_hex},
        nft::OwnedNft,
        registry::MessageChangeEvent,
        scanner::{paginate, BlockRecord, TransactionRecord, TxStatus},
        transfer::TransferState,
        tui::{
            centered_rect, draw_box, draw_inputs, draw_list, draw_main_window, draw_modal,
            draw_modal_lines, draw_status, draw_tab_strip, draw_title_bar, BoxProps, Theme,
        },
        wallet::ProviderChoice,
    },
};

pub const APP_NAME: &str = "dappterm";

/// UI-only bookkeeping that is not part of the app model.
#[derive(Debug, Default)]
pub struct UiState {
    pub hovered_tab: Option<usize>,
    pub tab_areas: Vec<Rect>,
    pub scrollbar: ScrollbarState,
    pub nft_enabled: bool,
    /// Provider variants and whether each is configured.
    pub providers: Vec<(ProviderChoice, bool)>,
}

pub fn draw(f: &mut Frame, state: &mut AppState, ui: &mut UiState) {
    let theme = Theme::dark();
    let size = f.area();
    draw_main_window(f, size);
    if size.height < *MIN_TERMINAL_HEIGHT {
        let lines = [
            "Terminal too small to render UI.".to_string(),
            format!("Minimum height required: {} rows.", *MIN_TERMINAL_HEIGHT),
            "Please resize your terminal window.".to_string(),
        ];
        draw_modal(f, centered_rect(70, 30, size), "Resize Needed", &lines, None);
        return;
    }

    let (mid, connected) = match &state.session {
        Some(s) => (
            format!(
                "{}  •  {}  •  {}",
                network_label(s.network(), s.chain_id),
                s.kind.label(),
                s.active().label()
            ),
            true,
        ),
        None => (
            format!("{}  •  read-only", network_label(Some(state.network), state.network.chain_id)),
            false,
        ),
    };
    draw_title_bar(
        f,
        size,
        APP_NAME,
        &mid,
        connected,
        "q: quit  ←/→: tabs  N: network  r: refresh",
    );

    let body = Rect {
        x: size.x + 1,
        y: size.y + 3,
        width: size.width.saturating_sub(2),
        height: size.height.saturating_sub(4),
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(10)])
        .split(body);
    draw_side_panels(f, cols[0], state, &theme);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(cols[1]);

    let labels: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    let disabled: Vec<bool> = Tab::ALL
        .iter()
        .map(|t| *t == Tab::Nfts && !ui.nft_enabled)
        .collect();
    draw_tab_strip(
        f,
        rows[0],
        &labels,
        ui.hovered_tab,
        state.tab.index(),
        &disabled,
        &mut ui.tab_areas,
    );

    let content = rows[1];
    match state.tab {
        Tab::Wallet => draw_wallet(f, content, state, ui, &theme),
        Tab::Send => draw_send(f, content, state, &theme),
        Tab::Transactions => draw_transactions(f, content, state, ui, &theme),
        Tab::Blocks => draw_blocks(f, content, state, ui, &theme),
        Tab::Balance => draw_balance(f, content, state, &theme),
        Tab::Messages => draw_messages(f, content, state, ui, &theme),
        Tab::Nfts => draw_nfts(f, content, state, ui, &theme),
        Tab::Logs => {
            let lines: Vec<Line> = state.logs.iter().map(|l| Line::raw(l.clone())).collect();
            let title = format!("Logs (newest first, {} lines)", state.logs.len());
            state.logs_scroll = draw_modal_lines(
                f,
                content,
                &title,
                lines,
                "No log lines yet.",
                state.logs_scroll,
                &mut ui.scrollbar,
            );
        }
    }

    match &state.status {
        Some(s) => draw_status(f, rows[2], &s.text, s.ok),
        None => draw_status(f, rows[2], "Ready", true),
    }

    if let Some(modal) = &state.modal {
        draw_overlay(f, size, modal, ui, state.chain_id());
    }
}

fn network_label(network: Option<&Network>, chain_id: u64) -> String {
    match network {
        Some(n) => format!("{} ({})", n.display_name, n.chain_id),
        None => format!("Unknown chain {chain_id}"),
    }
}

fn draw_side_panels(f: &mut Frame, col: Rect, state: &AppState, theme: &Theme) {
    let mut wallet: Vec<Line> = Vec::new();
    match &state.session {
        Some(s) => {
            let acct = s.active();
            wallet.push(Line::styled("● connected", Style::default().fg(theme.good)));
            wallet.push(Line::raw(format!("Via: {}", s.kind.label())));
            wallet.push(Line::raw(format!("Account: {}", short_addr(&acct.address))));
            wallet.push(Line::raw(format!(
                "Name: {}",
                acct.identity.name.as_deref().unwrap_or("-")
            )));
            wallet.push(Line::raw(format!("Tag: {}", acct.identity.tag)));
            if let Some(b) = state.balance.value().filter(|b| b.address == acct.address) {
                wallet.push(Line::raw(format!("Balance: {}", b.formatted)));
            }
        }
        None => {
            wallet.push(Line::styled("○ not connected", Style::default().fg(theme.muted)));
            wallet.push(Line::raw("Wallet tab, c: connect"));
        }
    }
    let used = draw_box(
        f,
        col,
        wallet,
        &BoxProps {
            title: "Wallet".into(),
            border_color: Color::LightBlue,
            ..Default::default()
        },
    );

    let network = state.current_network();
    let mut net = vec![Line::raw(network_label(network, state.chain_id()))];
    if let Some(n) = network {
        net.push(Line::raw(format!("Currency: {}", n.native_symbol)));
        net.push(Line::raw(format!(
            "Explorer: {}",
            n.explorer_url
                .map(|u| u.trim_start_matches("https://"))
                .unwrap_or("none")
        )));
    }
    let used = used
        + draw_box(
            f,
            col,
            net,
            &BoxProps {
                offset: (0, used),
                title: "Network".into(),
                border_color: theme.accent_soft,
                ..Default::default()
            },
        );

    let keys: Vec<Line> = tab_keys(state.tab)
        .iter()
        .map(|k| Line::styled(*k, Style::default().fg(theme.muted)))
        .collect();
    draw_box(
        f,
        col,
        keys,
        &BoxProps {
            offset: (0, used),
            title: "Keys".into(),
            border_color: theme.accent_soft,
            ..Default::default()
        },
    );
}

fn tab_keys(tab: Tab) -> &'static [&'static str] {
    match tab {
        Tab::Wallet => &["c: connect", "d: disconnect", "a: next account"],
        Tab::Send | Tab::Balance => &["tab: edit next field", "enter: submit", "esc: stop editing"],
        Tab::Transactions => &["l: mine / latest block", "n/p: page", "r: refresh"],
        Tab::Blocks | Tab::Nfts => &["n/p: page", "r: refresh"],
        Tab::Messages => &[
            "tab: edit message",
            "enter: submit",
            "f: all / mine",
            "n/p: page",
            "r: refresh",
        ],
        Tab::Logs => &["↑/↓ j/k: scroll", "PgUp/PgDn: fast", "Home/End"],
    }
}

fn draw_wallet(f: &mut Frame, area: Rect, state: &AppState, ui: &mut UiState, theme: &Theme) {
    let mut lines: Vec<Line> = Vec::new();
    match &state.session {
        Some(s) => {
            lines.push(Line::raw(format!("Provider: {}", s.kind.label())));
            lines.push(Line::raw(format!(
                "Network:  {}",
                network_label(s.network(), s.chain_id)
            )));
            lines.push(Line::raw(""));
            lines.push(Line::styled("Accounts", Style::default().fg(theme.accent)));
            let active = s.active_address();
            for acct in &s.accounts {
                let is_active = acct.address == active;
                let style = if is_active {
                    Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.muted)
                };
                lines.push(Line::from(vec![
                    Span::styled(if is_active { "▶ " } else { "  " }, style),
                    Span::styled(acct.label(), style),
                    Span::styled(format!("  {}", acct.identity.tag), Style::default().fg(theme.accent_soft)),
                ]));
                lines.push(Line::styled(
                    format!("    {}", acct.address.to_checksum(None)),
                    Style::default().fg(theme.muted),
                ));
                if let Some(avatar) = &acct.identity.avatar {
                    lines.push(Line::styled(
                        format!("    avatar: {avatar}"),
                        Style::default().fg(theme.muted),
                    ));
                }
            }
            if let Some(url) = s
                .network()
                .and_then(|n| n.address_url(&active.to_checksum(None)))
            {
                lines.push(Line::raw(""));
                lines.push(Line::raw(format!("Explorer: {url}")));
            }
        }
        None => {
            lines.push(Line::raw(format!(
                "Not connected. Reading {} over its public RPC.",
                state.network.display_name
            )));
            lines.push(Line::raw(""));
            lines.push(Line::styled("Providers", Style::default().fg(theme.accent)));
            for (choice, available) in &ui.providers {
                let (note, color) = if *available {
                    ("available", theme.good)
                } else {
                    ("not configured", theme.accent_soft)
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("  {:<16}", choice.label())),
                    Span::styled(note, Style::default().fg(color)),
                ]));
            }
            lines.push(Line::raw(""));
            lines.push(Line::raw("c: connect   N: change network"));
        }
    }
    draw_modal_lines(f, area, "Wallet", lines, "", 0, &mut ui.scrollbar);
}

fn transfer_lines(
    transfer: &TransferState,
    network: Option<&Network>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        transfer.label(),
        Style::default().fg(theme.transfer(transfer)),
    )];
    let hash = match transfer {
        TransferState::Pending { hash } | TransferState::Confirmed { hash, .. } => Some(hash),
        _ => None,
    };
    if let Some(url) = hash.and_then(|h| network.and_then(|n| n.tx_url(&h.to_string()))) {
        lines.push(Line::styled(url, Style::default().fg(theme.muted)));
    }
    lines
}

fn draw_send(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);
    draw_inputs(f, rows[0], state.send_form.fields());

    let mut lines = match &state.session {
        Some(s) => vec![Line::raw(format!("From: {}", s.active().label()))],
        None => vec![Line::styled(
            "Connect a wallet to send.",
            Style::default().fg(theme.muted),
        )],
    };
    lines.extend(transfer_lines(&state.transfer, state.current_network(), theme));
    draw_box(
        f,
        rows[1],
        lines,
        &BoxProps {
            title: "Transfer".into(),
            border_color: theme.transfer(&state.transfer),
            ..Default::default()
        },
    );
}

struct Listing<'a, T> {
    items: Option<&'a [T]>,
    loading: bool,
    error: Option<&'a str>,
    notice: Option<String>,
}

/// Draws one page of `listing` and returns the page count, so the caller can
/// clamp the stored page index.
fn draw_paged<T: Clone>(
    f: &mut Frame,
    area: Rect,
    ui: &mut UiState,
    title: &str,
    page: usize,
    listing: Listing<'_, T>,
    empty: &str,
    theme: &Theme,
    row: impl Fn(&T) -> Vec<Line<'static>>,
) -> usize {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(e) = listing.error {
        lines.push(Line::styled(format!("error: {e}"), Style::default().fg(theme.bad)));
    }
    if let Some(n) = listing.notice {
        lines.push(Line::styled(n, Style::default().fg(theme.pending)));
    }
    let items = listing.items.unwrap_or(&[]);
    let p = paginate(items, *PAGE_SIZE, page);
    for item in &p.items {
        lines.extend(row(item));
    }
    let mut full_title = format!(
        "{title} · page {}/{} · {} item(s)",
        p.index + 1,
        p.total_pages,
        p.total_items
    );
    if listing.loading {
        full_title.push_str(" · loading…");
    }
    let empty = if listing.loading && listing.items.is_none() {
        "Loading…"
    } else {
        empty
    };
    draw_modal_lines(f, area, &full_title, lines, empty, 0, &mut ui.scrollbar);
    p.total_pages
}

fn tx_rows(tx: &TransactionRecord, symbol: &str, theme: &Theme) -> Vec<Line<'static>> {
    let status_color = match tx.status {
        TxStatus::Success => theme.good,
        TxStatus::Failed => theme.bad,
        TxStatus::Pending => theme.pending,
    };
    let to = tx
        .to
        .as_ref()
        .map(short_addr)
        .unwrap_or_else(|| "contract creation".into());
    vec![
        Line::from(vec![
            Span::styled(format!("#{:<10}", tx.block_number), Style::default().fg(theme.muted)),
            Span::raw(format!("{}  ", short_hex(&tx.hash.to_string()))),
            Span::styled(tx.status.label(), Style::default().fg(status_color)),
            Span::styled(
                format!("  {}", format_timestamp_ms(tx.timestamp_ms)),
                Style::default().fg(theme.muted),
            ),
        ]),
        Line::styled(
            format!(
                "   {} → {}  {}  {:.2} gwei  gas {}",
                short_addr(&tx.from),
                to,
                format_native(tx.value, symbol),
                tx.gas_price_gwei,
                tx.gas_used
            ),
            Style::default().fg(theme.muted),
        ),
    ]
}

fn draw_transactions(
    f: &mut Frame,
    area: Rect,
    state: &mut AppState,
    ui: &mut UiState,
    theme: &Theme,
) {
    let mine = state.tx_view == TxView::Mine && state.session.is_some();
    let symbol = state.native_symbol();
    let total = {
        let (latest, title, empty) = if mine {
            (&state.history, "My transactions", "No transactions in the scanned window.")
        } else {
            (&state.latest_txs, "Latest block", "The head block has no transactions.")
        };
        let listing = Listing {
            items: latest.value().map(|s| s.items.as_slice()),
            loading: latest.is_loading(),
            error: latest.error(),
            notice: latest
                .value()
                .and_then(|s| s.partial_error())
                .map(|e| e.to_string()),
        };
        draw_paged(
            f,
            area,
            ui,
            title,
            state.page(Tab::Transactions),
            listing,
            empty,
            theme,
            |tx| tx_rows(tx, symbol, theme),
        )
    };
    state.clamp_page(Tab::Transactions, total);
}

fn block_rows(b: &BlockRecord, theme: &Theme) -> Vec<Line<'static>> {
    let pct = if b.gas_limit == 0 {
        0.0
    } else {
        b.gas_used as f64 * 100.0 / b.gas_limit as f64
    };
    vec![
        Line::from(vec![
            Span::styled(format!("#{:<10}", b.number), Style::default().fg(theme.accent)),
            Span::raw(format!("{}  ", short_hex(&b.hash.to_string()))),
            Span::raw(format!("{} tx", b.transaction_count)),
            Span::styled(
                format!("  {}", format_timestamp_ms(b.timestamp_ms)),
                Style::default().fg(theme.muted),
            ),
        ]),
        Line::styled(
            format!(
                "   gas {}/{} ({pct:.1}%)  miner {}",
                b.gas_used,
                b.gas_limit,
                short_addr(&b.miner)
            ),
            Style::default().fg(theme.muted),
        ),
    ]
}

fn draw_blocks(f: &mut Frame, area: Rect, state: &mut AppState, ui: &mut UiState, theme: &Theme) {
    let total = {
        let listing = Listing {
            items: state.blocks.value().map(|s| s.items.as_slice()),
            loading: state.blocks.is_loading(),
            error: state.blocks.error(),
            notice: state
                .blocks
                .value()
                .and_then(|s| s.partial_error())
                .map(|e| e.to_string()),
        };
        draw_paged(
            f,
            area,
            ui,
            "Latest blocks",
            state.page(Tab::Blocks),
            listing,
            "No blocks yet.",
            theme,
            |b| block_rows(b, theme),
        )
    };
    state.clamp_page(Tab::Blocks, total);
}

fn draw_balance(f: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    draw_inputs(f, rows[0], state.balance_form.fields());

    let mut lines: Vec<Line> = Vec::new();
    if state.balance.is_loading() {
        lines.push(Line::styled("Loading…", Style::default().fg(theme.pending)));
    }
    if let Some(e) = state.balance.error() {
        lines.push(Line::styled(format!("error: {e}"), Style::default().fg(theme.bad)));
    }
    if let Some(b) = state.balance.value() {
        let checksum = b.address.to_checksum(None);
        lines.push(Line::raw(format!("Address: {checksum}")));
        lines.push(Line::styled(
            format!("Balance: {}", b.formatted),
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        ));
        if let Some(url) = state.current_network().and_then(|n| n.address_url(&checksum)) {
            lines.push(Line::styled(url, Style::default().fg(theme.muted)));
        }
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "Enter an address, or leave blank for the active account.",
            Style::default().fg(theme.muted),
        ));
    }
    draw_box(
        f,
        rows[1],
        lines,
        &BoxProps {
            title: "Balance".into(),
            ..Default::default()
        },
    );
}

fn message_rows(ev: &MessageChangeEvent, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(
                format!("{}  ", format_timestamp_ms(ev.timestamp_ms)),
                Style::default().fg(theme.muted),
            ),
            Span::raw(short_addr(&ev.sender)),
            Span::styled(
                format!("  #{} {}", ev.block_number, short_hex(&ev.transaction_hash.to_string())),
                Style::default().fg(theme.accent_soft),
            ),
        ]),
        Line::styled(
            format!("   {:?} → {:?}", ev.old_message, ev.new_message),
            Style::default().fg(theme.fg),
        ),
    ]
}

fn draw_messages(
    f: &mut Frame,
    area: Rect,
    state: &mut AppState,
    ui: &mut UiState,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
        ])
        .split(area);

    let current = match (state.current_message.value(), state.current_message.error()) {
        (_, Some(e)) => Line::styled(format!("error: {e}"), Style::default().fg(theme.bad)),
        (Some(m), None) if m.is_empty() => Line::styled("(empty)", Style::default().fg(theme.muted)),
        (Some(m), None) => Line::styled(m.clone(), Style::default().add_modifier(Modifier::BOLD)),
        (None, None) => Line::styled("Loading…", Style::default().fg(theme.muted)),
    };
    draw_box(
        f,
        rows[0],
        vec![current],
        &BoxProps {
            title: "Current message".into(),
            ..Default::default()
        },
    );
    draw_inputs(f, rows[1], state.message_form.fields());
    draw_box(
        f,
        rows[2],
        transfer_lines(&state.message_tx, state.current_network(), theme),
        &BoxProps {
            title: "Update".into(),
            border_color: theme.transfer(&state.message_tx),
            ..Default::default()
        },
    );

    let total = {
        let title = if state.history_mine_only {
            "History (mine)"
        } else {
            "History (all)"
        };
        let listing = Listing {
            items: state.message_history.value().map(Vec::as_slice),
            loading: state.message_history.is_loading(),
            error: state.message_history.error(),
            notice: None,
        };
        draw_paged(
            f,
            rows[3],
            ui,
            title,
            state.page(Tab::Messages),
            listing,
            "No message changes yet.",
            theme,
            |ev| message_rows(ev, theme),
        )
    };
    state.clamp_page(Tab::Messages, total);
}

fn nft_rows(n: &OwnedNft, theme: &Theme) -> Vec<Line<'static>> {
    let title = n.name.clone().unwrap_or_else(|| format!("#{}", n.token_id));
    let collection = n
        .collection
        .clone()
        .unwrap_or_else(|| short_addr(&n.contract));
    let mut lines = vec![
        Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {collection}"), Style::default().fg(theme.accent)),
        ]),
        Line::styled(
            format!("   {} · token {} · x{}", n.token_type, n.token_id, n.balance),
            Style::default().fg(theme.muted),
        ),
    ];
    if let Some(img) = &n.image {
        lines.push(Line::styled(format!("   {img}"), Style::default().fg(theme.accent_soft)));
    }
    lines
}

fn draw_nfts(f: &mut Frame, area: Rect, state: &mut AppState, ui: &mut UiState, theme: &Theme) {
    let reason = if !ui.nft_enabled {
        Some("NFT listing is off. Set NFT_API_KEY to enable it.".to_string())
    } else if state.session.is_none() {
        Some("Connect a wallet to list its NFTs.".to_string())
    } else if matches!(state.nfts.value(), Some(None)) {
        Some(format!(
            "NFT listing is not available on {}.",
            network_label(state.current_network(), state.chain_id())
        ))
    } else {
        None
    };
    if let Some(reason) = reason {
        draw_modal_lines(f, area, "NFTs", Vec::new(), &reason, 0, &mut ui.scrollbar);
        return;
    }
    let total = {
        let listing = Listing {
            items: state.nfts.value().and_then(|o| o.as_deref()),
            loading: state.nfts.is_loading(),
            error: state.nfts.error(),
            notice: None,
        };
        draw_paged(
            f,
            area,
            ui,
            "NFTs",
            state.page(Tab::Nfts),
            listing,
            "No NFTs held by this account.",
            theme,
            |n| nft_rows(n, theme),
        )
    };
    state.clamp_page(Tab::Nfts, total);
}

fn draw_overlay(f: &mut Frame, size: Rect, modal: &Modal, ui: &UiState, chain_id: u64) {
    let area = centered_rect(60, 50, size);
    match modal {
        Modal::ProviderPicker { selected } => {
            let items: Vec<(String, bool)> = ui
                .providers
                .iter()
                .map(|(c, ok)| {
                    let note = if *ok { "" } else { "  (not configured)" };
                    (format!("{}{note}", c.label()), *ok)
                })
                .collect();
            draw_list(f, area, &items, *selected, "Connect with (enter / esc)");
        }
        Modal::NetworkPicker { selected } => {
            let items: Vec<(String, bool)> = NETWORKS
                .iter()
                .map(|n| {
                    let mark = if n.chain_id == chain_id { "●" } else { " " };
                    (format!("{mark} {} ({})", n.display_name, n.chain_id), true)
                })
                .collect();
            draw_list(f, area, &items, *selected, "Network (enter / esc)");
        }
        Modal::Consent(req) => {
            draw_modal(
                f,
                area,
                req.prompt.title(),
                &req.prompt.lines(),
                Some("y: approve    n: reject"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::network_by_id,
        libs::{rpc::HttpRpc, scanner::Scanned},
    };
    use alloy::primitives::{Address, B256, U256};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn screen(buf: &Buffer) -> String {
        let w = buf.area.width as usize;
        buf.content()
            .chunks(w)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(state: &mut AppState, ui: &mut UiState, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal.draw(|f| draw(f, state, ui)).unwrap();
        screen(terminal.backend().buffer())
    }

    fn state() -> AppState {
        let n = network_by_id("sepolia").unwrap();
        AppState::new(n, HttpRpc::new(n.rpc_url).unwrap())
    }

    #[test]
    fn small_terminal_asks_for_resize() {
        let out = render(&mut state(), &mut UiState::default(), 80, 10);
        assert!(out.contains("Resize Needed"));
    }

    #[test]
    fn read_only_wallet_view_lists_providers() {
        let mut ui = UiState {
            providers: vec![
                (ProviderChoice::LocalKey, false),
                (ProviderChoice::NodeAccounts, true),
            ],
            ..Default::default()
        };
        let out = render(&mut state(), &mut ui, 140, 40);
        assert!(out.contains("read-only"));
        assert!(out.contains("Sepolia (11155111)"));
        assert!(out.contains("not configured"));
        assert!(out.contains("available"));
    }

    #[test]
    fn blocks_page_is_clamped() {
        let mut s = state();
        s.tab = Tab::Blocks;
        for _ in 0..5 {
            s.next_page();
        }
        let t = s.blocks.begin();
        let blocks: Vec<BlockRecord> = (0..3)
            .map(|i| BlockRecord {
                number: 100 - i,
                hash: B256::with_last_byte(i as u8),
                timestamp_ms: 1_700_000_000_000,
                transaction_count: 2,
                gas_used: 50,
                gas_limit: 100,
                miner: Address::ZERO,
            })
            .collect();
        s.blocks.settle(t, Ok(Scanned { items: blocks, skipped: 1 }));
        let out = render(&mut s, &mut UiState::default(), 140, 40);
        assert!(out.contains("page 1/1"));
        assert!(out.contains("#100"));
        assert!(out.contains("1 item(s) could not be fetched"));
        assert_eq!(s.page(Tab::Blocks), 0);
    }

    #[test]
    fn tx_row_shows_contract_creation() {
        let tx = TransactionRecord {
            hash: B256::repeat_byte(0xab),
            block_number: 7,
            from: Address::repeat_byte(1),
            to: None,
            value: U256::from(1_500_000_000_000_000_000u128),
            gas_price_gwei: 1.5,
            gas_used: 21_000,
            timestamp_ms: 0,
            status: TxStatus::Failed,
        };
        let text: String = tx_rows(&tx, "ETH", &Theme::dark())
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("contract creation"));
        assert!(text.contains("1.5 ETH"));
        assert!(text.contains("failed"));
    }

    #[test]
    fn nft_tab_explains_when_disabled() {
        let mut s = state();
        s.tab = Tab::Nfts;
        let out = render(&mut s, &mut UiState::default(), 140, 40);
        assert!(out.contains("NFT_API_KEY"));
    }
}
