//! Latest-wins bookkeeping for async views.
//!
//! Scans cannot be cancelled once issued, so an older scan may finish after a
//! newer one. Each invocation takes a [`Ticket`]; only the result carrying the
//! most recently issued ticket is applied, everything else is dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Latest<T> {
    issued: u64,
    loading: bool,
    value: Option<T>,
    error: Option<String>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            loading: false,
            value: None,
            error: None,
        }
    }
}

impl<T> Latest<T> {
    /// Start a new request; any ticket issued before is now stale.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply a finished request. Returns false if the ticket was superseded.
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(v) => {
                self.value = Some(v);
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
        true
    }

    /// Forget the value and invalidate everything in flight.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.loading = false;
        self.value = None;
        self.error = None;
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Tickets for a stream of progress events (a transfer, a network switch).
/// Events from a run that is no longer the newest are ignored.
#[derive(Debug, Clone, Default)]
pub struct Runs {
    issued: u64,
}

impl Runs {
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Orphan whatever is in flight.
    pub fn invalidate(&mut self) {
        self.issued += 1;
    }
}
