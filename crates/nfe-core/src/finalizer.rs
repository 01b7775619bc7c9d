//! End-of-document flushing.

use nfe_model::{CompletedEntity, Trigger};
use tracing::warn;

use crate::assembler::Assembler;
use crate::error::Result;
use crate::handlers::Slot;

/// Groups ended by an implicit boundary that may still be open at the end.
pub const IMPLICIT_SLOTS: [Slot; 2] = [Slot::Comb, Slot::PisSt];

/// Emission order of the document-wide totals, independent of input order.
pub const TOTALS_ORDER: [Slot; 11] = [
    Slot::IcmsTot,
    Slot::IssqnTot,
    Slot::RetTrib,
    Slot::IsTot,
    Slot::IbsCbsTot,
    Slot::GIbs,
    Slot::GIbsUf,
    Slot::GIbsMun,
    Slot::GCbs,
    Slot::GMono,
    Slot::NfTot,
];

impl Assembler<'_> {
    /// Flush implicit groups and touched totals, then hand back every entity
    /// in emission order. Consumes the assembler.
    pub fn finish(mut self) -> Result<Vec<CompletedEntity>> {
        for slot in IMPLICIT_SLOTS.into_iter().chain(TOTALS_ORDER) {
            self.flush_slot(slot, Trigger::EndOfDocument)?;
        }
        for (slot, open) in std::mem::take(&mut self.slots) {
            warn!(
                slot = slot.name(),
                code = %open.code,
                opened_at = open.opened_at,
                "discarding group that was never closed"
            );
        }
        Ok(std::mem::take(&mut self.emitted))
    }
}
