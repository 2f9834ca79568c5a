use tracing::warn;

/// Where the cursor lands after a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorAdvance {
    /// Past the last scanned entry. Nothing is examined twice.
    #[default]
    PastEnd,
    /// On the last scanned entry (`length - 1`), so the next scan examines it
    /// again. Matches hosts that relied on the historical behavior.
    ReexamineLast,
}

/// Scan position in the append-only performance timeline.
///
/// Entries below the position are never examined again, and the position
/// never decreases.
#[derive(Debug, Clone, Default)]
pub struct EntryCursor {
    position: usize,
    advance: CursorAdvance,
}

impl EntryCursor {
    pub fn new(advance: CursorAdvance) -> Self {
        Self {
            position: 0,
            advance,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Index the next scan starts from, for a timeline that currently holds
    /// `timeline_len` entries.
    ///
    /// A timeline shorter than the cursor means the host cleared its buffer;
    /// that yields `None` and nothing is scanned.
    pub fn scan_start(&self, timeline_len: usize) -> Option<usize> {
        if timeline_len < self.position {
            warn!(
                cursor = self.position,
                timeline_len,
                "performance timeline shrank below the scan cursor; skipping scan"
            );
            return None;
        }
        Some(self.position)
    }

    /// Moves the cursor after a scan of a timeline that was `timeline_len` long.
    pub fn advance(&mut self, timeline_len: usize) {
        let next = match self.advance {
            CursorAdvance::PastEnd => timeline_len,
            CursorAdvance::ReexamineLast => timeline_len.saturating_sub(1),
        };
        self.position = self.position.max(next);
    }
}
