//! Tender lifecycle tracking: registration, readiness classification, agenda views, dispute
//! closing, and the picklists that feed the registration form.
//!
//! [`TenderDesk`] owns the in-memory collection and writes through a [`TenderStore`] before any
//! change becomes visible.

pub mod domain;
pub mod lifecycle;
pub mod lists;
pub mod readiness;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    AppealWindow, EffectivePosition, FinancialCeiling, FollowUp, Lot, LotType, Tender,
    TenderDraft, TenderId, TenderStatus, UnknownStatus, APPEAL_INTENT_PHASE, QUALIFICATION_PHASE,
    UNKNOWN_POSITION,
};
pub use lifecycle::{LifecycleError, LotPatch};
pub use lists::{DynamicLists, ListKind, UnknownList};
pub use readiness::{is_ready, readiness, Readiness};
pub use repository::{MemoryTenderStore, StoreError, TenderStore};
pub use router::tender_router;
pub use service::{DeleteConfirmation, TenderDesk, TenderDeskError};
pub use storage::{JsonFileStore, SqliteTenderStore};
pub use views::{DashboardSummary, MonthCalendar};
