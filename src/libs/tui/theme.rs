use ratatui::prelude::*;

use crate::libs::transfer::TransferState;

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub accent_soft: Color,
    pub good: Color,
    pub bad: Color,
    pub pending: Color,
    pub muted: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::LightCyan,
            accent_soft: Color::DarkGray,
            good: Color::Green,
            bad: Color::Red,
            pending: Color::Yellow,
            muted: Color::Gray,
        }
    }

    pub fn transfer(&self, state: &TransferState) -> Color {
        match state {
            TransferState::Idle => self.muted,
            TransferState::Preparing | TransferState::Pending { .. } => self.pending,
            TransferState::Confirmed { .. } => self.good,
            TransferState::Failed { .. } => self.bad,
        }
    }
}
