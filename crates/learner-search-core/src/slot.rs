//! Last-request-wins tracking for a logical query slot.
//!
//! Each result panel owns one slot. Issuing a request bumps the slot's
//! generation and hands back a ticket; only the ticket from the newest
//! generation may deliver a result. A late response for a superseded request
//! is reported as such and discarded, so it can never overwrite state
//! produced by a newer request. All mutation happens on the single event-loop
//! thread; ordered calls, not racing threads.

use crate::error::FetchError;

/// Proof that a request was issued, carrying its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    /// Generation this ticket belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lifecycle of the slot's current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState<T> {
    /// No request has been issued yet.
    Idle,
    /// The newest request is in flight.
    Pending,
    /// The newest request resolved.
    Ready(T),
    /// The newest request failed terminally.
    Failed(FetchError),
}

/// Whether a delivered result was accepted or lost the race to a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The result came from the newest generation and was recorded.
    Accepted,
    /// A newer request superseded this one; the result was discarded.
    Superseded,
}

/// A single logical query slot with a generation counter.
#[derive(Debug)]
pub struct QuerySlot<T> {
    generation: u64,
    state: SlotState<T>,
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QuerySlot<T> {
    /// Fresh slot with no request issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            state: SlotState::Idle,
        }
    }

    /// Begin a new request: bumps the generation, invalidates all
    /// outstanding tickets, and re-enters the pending state (so skeletons
    /// render on refinement changes, not only first load).
    pub fn begin(&mut self) -> RequestTicket {
        self.generation += 1;
        self.state = SlotState::Pending;
        RequestTicket {
            generation: self.generation,
        }
    }

    /// Deliver a result for a previously issued ticket.
    ///
    /// Results from any generation but the newest are discarded.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<T, FetchError>,
    ) -> Delivery {
        if ticket.generation != self.generation {
            return Delivery::Superseded;
        }
        self.state = match result {
            Ok(value) => SlotState::Ready(value),
            Err(error) => SlotState::Failed(error),
        };
        Delivery::Accepted
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &SlotState<T> {
        &self.state
    }

    /// Generation of the newest request (0 before the first `begin`).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the newest request is unresolved (including never-issued).
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self.state, SlotState::Idle | SlotState::Pending)
    }
}
