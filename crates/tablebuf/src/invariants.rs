//! Builder state checks excluded from coverage reports.
//!
//! Misusing the builder is a programming error. It panics immediately
//! instead of producing a corrupt buffer.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::builder::Builder;

/// Ways a [`Builder`] can be driven into an invalid state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderStateError {
    #[error("start_table called while another table is open")]
    NestedTable,
    #[error("{0} called outside of an open table")]
    NotInTable(&'static str),
    #[error("{0} called while a table is open")]
    TableOpen(&'static str),
    #[error("table declares {0} fields; at most {max} fit a vtable", max = crate::vtable::MAX_FIELDS)]
    TooManyFields(u16),
    #[error("slot {slot} out of range for a table with {num_fields} fields")]
    SlotOutOfRange { slot: u16, num_fields: u16 },
    #[error("offset {offset} refers to an object that is not written yet ({used} bytes used)")]
    UnwrittenOffset { offset: u32, used: usize },
    #[error("table body of {0} bytes exceeds the 65535 byte limit")]
    TableTooLarge(usize),
    #[error("buffer cannot grow beyond 2 GiB")]
    BufferTooLarge,
    #[error("cannot finish without a root table")]
    NoRoot,
    #[error("builder is finished; call reset() to start a new buffer")]
    AlreadyFinished,
    #[error("builder has not been finished")]
    NotFinished,
}

#[cold]
#[track_caller]
pub(crate) fn fail(err: BuilderStateError) -> ! {
    panic!("invalid builder state: {err}")
}

impl Builder {
    #[track_caller]
    pub(crate) fn ensure_idle(&self, op: &'static str) {
        self.ensure_not_finished();
        if self.in_table() {
            fail(BuilderStateError::TableOpen(op));
        }
    }

    #[track_caller]
    pub(crate) fn ensure_slot(&self, op: &'static str, slot: u16) {
        self.ensure_not_finished();
        let Some(num_fields) = self.open_num_fields() else {
            fail(BuilderStateError::NotInTable(op));
        };
        if slot >= num_fields {
            fail(BuilderStateError::SlotOutOfRange { slot, num_fields });
        }
    }

    #[track_caller]
    pub(crate) fn ensure_not_finished(&self) {
        if self.is_finished() {
            fail(BuilderStateError::AlreadyFinished);
        }
    }

    #[track_caller]
    pub(crate) fn ensure_written(&self, offset: u32) {
        let used = self.used_space();
        if offset as usize > used {
            fail(BuilderStateError::UnwrittenOffset { offset, used });
        }
    }
}
