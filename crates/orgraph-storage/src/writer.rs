use crate::{PositionStore, StorageError};
use orgraph_core::{PositionMap, StructureType};
use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

struct PendingWrite {
    structure: StructureType,
    positions: PositionMap,
    due: Instant,
}

/// Coalesces bursts of drag updates into one position write.
///
/// Time is passed in by the caller so the writer can be driven from any loop
/// (and from tests) without sleeping.
pub struct PositionWriter {
    store: PositionStore,
    quiet_period: Duration,
    pending: Option<PendingWrite>,
}

impl PositionWriter {
    pub fn new(store: PositionStore) -> Self {
        Self::with_quiet_period(store, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(store: PositionStore, quiet_period: Duration) -> Self {
        Self {
            store,
            quiet_period,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Replace any pending write and restart the quiet period. A pending write
    /// for another structure view is flushed first.
    pub fn schedule(
        &mut self,
        structure: StructureType,
        positions: PositionMap,
        now: Instant,
    ) -> Result<(), StorageError> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.structure != structure)
        {
            self.flush()?;
        }
        self.pending = Some(PendingWrite {
            structure,
            positions,
            due: now + self.quiet_period,
        });
        Ok(())
    }

    /// Write the pending layout if its quiet period has elapsed. Returns
    /// whether a write happened.
    pub fn flush_due(&mut self, now: Instant) -> Result<bool, StorageError> {
        match &self.pending {
            Some(pending) if pending.due <= now => {
                self.flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn flush(&mut self) -> Result<(), StorageError> {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                "Writing {} positions for {}",
                pending.positions.len(),
                pending.structure
            );
            self.store.save_map(pending.structure, &pending.positions)?;
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }
}
