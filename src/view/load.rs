//! Sequence stamps for loads that may complete out of order.

use crate::model::DateRange;
use tracing::debug;

/// Identifies one load request. Tickets from the same `LoadSequence` are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    seq: u64,
    range: DateRange,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// Issues tickets and remembers the newest one whose response was applied.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoadSequence {
    issued: u64,
    applied: Option<u64>,
}

impl LoadSequence {
    pub(crate) fn issue(&mut self, range: DateRange) -> LoadTicket {
        self.issued += 1;
        LoadTicket {
            seq: self.issued,
            range,
        }
    }

    /// Returns false, and records nothing, when a newer ticket has already been applied.
    pub(crate) fn accept(&mut self, ticket: LoadTicket) -> bool {
        if self.applied.is_some_and(|applied| applied > ticket.seq) {
            debug!(
                "Discarding stale load #{} for {}, #{} is already applied",
                ticket.seq,
                ticket.range,
                self.applied.unwrap_or_default()
            );
            return false;
        }
        self.applied = Some(ticket.seq);
        true
    }
}
