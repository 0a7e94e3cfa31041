use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::domain::{Lot, Tender, TenderDraft, TenderId, TenderStatus};
use super::lifecycle::{self, LifecycleError, LotPatch};
use super::lists::{DynamicLists, ListKind};
use super::repository::{StoreError, TenderStore};
use super::views::{CalendarError, DashboardSummary, MonthCalendar};

/// Explicit acknowledgement required before a tender is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Unconfirmed,
}

impl From<bool> for DeleteConfirmation {
    fn from(value: bool) -> Self {
        if value {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

#[derive(Debug, Default)]
struct DeskState {
    tenders: Vec<Tender>,
    lists: DynamicLists,
}

/// Application state owner: holds the tender collection and lists, and persists every change
/// before making it visible.
pub struct TenderDesk<S> {
    store: Arc<S>,
    state: RwLock<DeskState>,
}

impl<S> TenderDesk<S>
where
    S: TenderStore + 'static,
{
    pub fn open(store: Arc<S>) -> Result<Self, TenderDeskError> {
        let tenders = store.load_tenders()?;
        let lists = store.load_lists()?.unwrap_or_default();
        info!(tenders = tenders.len(), "tender desk opened");
        Ok(Self {
            store,
            state: RwLock::new(DeskState { tenders, lists }),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DeskState>, TenderDeskError> {
        self.state.read().map_err(|_| TenderDeskError::StatePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DeskState>, TenderDeskError> {
        self.state.write().map_err(|_| TenderDeskError::StatePoisoned)
    }

    pub fn tenders(&self) -> Result<Vec<Tender>, TenderDeskError> {
        Ok(self.read()?.tenders.clone())
    }

    pub fn get(&self, id: &TenderId) -> Result<Tender, TenderDeskError> {
        self.read()?
            .tenders
            .iter()
            .find(|tender| &tender.id == id)
            .cloned()
            .ok_or_else(|| TenderDeskError::NotFound(id.clone()))
    }

    pub fn lists(&self) -> Result<DynamicLists, TenderDeskError> {
        Ok(self.read()?.lists.clone())
    }

    /// Register a new tender from the form payload; it goes to the front of the collection.
    pub fn register(
        &self,
        draft: TenderDraft,
        now: DateTime<Utc>,
    ) -> Result<Tender, TenderDeskError> {
        let mut state = self.write()?;
        let mut id = TenderId::generate();
        while state.tenders.iter().any(|tender| tender.id == id) {
            id = TenderId::generate();
        }
        let tender = draft.into_tender(id, now);

        let mut next = Vec::with_capacity(state.tenders.len() + 1);
        next.push(tender.clone());
        next.extend(state.tenders.iter().cloned());

        self.store.upsert_tender(&tender, &next)?;
        state.tenders = next;
        info!(id = %tender.id, edital = %tender.numero_edital, "tender registered");
        Ok(tender)
    }

    /// Insert tenders carrying their own ids, such as a spreadsheet import. Every id is checked
    /// against the collection and the rest of the batch before the first write.
    pub fn import(&self, tenders: Vec<Tender>) -> Result<usize, TenderDeskError> {
        let mut state = self.write()?;

        let mut seen: HashSet<&TenderId> =
            state.tenders.iter().map(|tender| &tender.id).collect();
        if let Some(duplicate) = tenders.iter().find(|tender| !seen.insert(&tender.id)) {
            return Err(TenderDeskError::Conflict(duplicate.id.clone()));
        }

        let mut imported = 0;
        for tender in tenders {
            let mut next = Vec::with_capacity(state.tenders.len() + 1);
            next.push(tender);
            next.extend(state.tenders.iter().cloned());
            if let Err(err) = self.store.upsert_tender(&next[0], &next) {
                warn!(imported, error = %err, "import interrupted by the store");
                return Err(err.into());
            }
            state.tenders = next;
            imported += 1;
        }
        info!(imported, "tenders imported");
        Ok(imported)
    }

    /// Replace a stored tender wholesale, as the management panel's save does. Unknown ids are
    /// inserted at the front. `createdAt` of an existing record is never overwritten.
    pub fn upsert_tender(&self, tender: Tender) -> Result<Tender, TenderDeskError> {
        let mut state = self.write()?;
        let mut next = state.tenders.clone();
        let stored = match next.iter().position(|existing| existing.id == tender.id) {
            Some(index) => {
                let mut updated = tender;
                updated.created_at = next[index].created_at;
                next[index] = updated.clone();
                updated
            }
            None => {
                next.insert(0, tender.clone());
                tender
            }
        };

        self.store.upsert_tender(&stored, &next)?;
        state.tenders = next;
        info!(id = %stored.id, status = %stored.status_atual, "tender saved");
        Ok(stored)
    }

    pub fn delete_tender(
        &self,
        id: &TenderId,
        confirmation: DeleteConfirmation,
    ) -> Result<Tender, TenderDeskError> {
        if confirmation != DeleteConfirmation::Confirmed {
            warn!(%id, "delete requested without confirmation");
            return Err(TenderDeskError::ConfirmationRequired(id.clone()));
        }

        let mut state = self.write()?;
        let index = state
            .tenders
            .iter()
            .position(|tender| &tender.id == id)
            .ok_or_else(|| TenderDeskError::NotFound(id.clone()))?;

        let mut next = state.tenders.clone();
        let removed = next.remove(index);
        self.store.delete_tender(id, &next)?;
        state.tenders = next;
        info!(%id, "tender deleted");
        Ok(removed)
    }

    pub fn finalize_dispute(
        &self,
        id: &TenderId,
        today: NaiveDate,
    ) -> Result<Tender, TenderDeskError> {
        self.replace(id, |current| Ok(lifecycle::finalize_dispute(current, today)?))
    }

    pub fn set_status(
        &self,
        id: &TenderId,
        status: TenderStatus,
        phase: Option<String>,
    ) -> Result<Tender, TenderDeskError> {
        self.replace(id, |current| {
            let mut updated = current.clone();
            lifecycle::set_status(&mut updated, status, phase);
            Ok(updated)
        })
    }

    pub fn set_position(&self, id: &TenderId, position: String) -> Result<Tender, TenderDeskError> {
        self.replace(id, |current| {
            let mut updated = current.clone();
            lifecycle::set_position(&mut updated, position);
            Ok(updated)
        })
    }

    pub fn add_lot(&self, id: &TenderId) -> Result<Lot, TenderDeskError> {
        let updated = self.replace(id, |current| {
            let mut updated = current.clone();
            lifecycle::add_lot(&mut updated);
            Ok(updated)
        })?;
        updated
            .lotes
            .last()
            .cloned()
            .ok_or_else(|| TenderDeskError::NotFound(id.clone()))
    }

    pub fn update_lot(
        &self,
        id: &TenderId,
        lot_id: &str,
        patch: LotPatch,
    ) -> Result<Tender, TenderDeskError> {
        self.replace(id, |current| {
            let mut updated = current.clone();
            lifecycle::update_lot(&mut updated, lot_id, patch)?;
            Ok(updated)
        })
    }

    pub fn remove_lot(&self, id: &TenderId, lot_id: &str) -> Result<Tender, TenderDeskError> {
        self.replace(id, |current| {
            let mut updated = current.clone();
            lifecycle::remove_lot(&mut updated, lot_id)?;
            Ok(updated)
        })
    }

    pub fn add_list_option(
        &self,
        kind: ListKind,
        value: &str,
    ) -> Result<DynamicLists, TenderDeskError> {
        self.change_lists(|lists| {
            if lists.add(kind, value) {
                Ok(())
            } else {
                Err(TenderDeskError::BlankOption(kind))
            }
        })
    }

    pub fn remove_list_option(
        &self,
        kind: ListKind,
        index: usize,
    ) -> Result<DynamicLists, TenderDeskError> {
        self.change_lists(|lists| {
            lists
                .remove(kind, index)
                .map(|_| ())
                .ok_or(TenderDeskError::OptionNotFound { kind, index })
        })
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, TenderDeskError> {
        Ok(DashboardSummary::build(&self.read()?.tenders, today))
    }

    pub fn calendar(&self, year: i32, month: u32) -> Result<MonthCalendar, TenderDeskError> {
        Ok(MonthCalendar::build(&self.read()?.tenders, year, month)?)
    }

    fn replace<F>(&self, id: &TenderId, change: F) -> Result<Tender, TenderDeskError>
    where
        F: FnOnce(&Tender) -> Result<Tender, TenderDeskError>,
    {
        let mut state = self.write()?;
        let index = state
            .tenders
            .iter()
            .position(|tender| &tender.id == id)
            .ok_or_else(|| TenderDeskError::NotFound(id.clone()))?;

        let mut updated = change(&state.tenders[index])?;
        updated.id = id.clone();

        let mut next = state.tenders.clone();
        next[index] = updated.clone();
        self.store.upsert_tender(&updated, &next)?;
        state.tenders = next;
        debug!(%id, status = %updated.status_atual, "tender updated");
        Ok(updated)
    }

    fn change_lists<F>(&self, change: F) -> Result<DynamicLists, TenderDeskError>
    where
        F: FnOnce(&mut DynamicLists) -> Result<(), TenderDeskError>,
    {
        let mut state = self.write()?;
        let mut next = state.lists.clone();
        change(&mut next)?;
        self.store.save_lists(&next)?;
        state.lists = next.clone();
        Ok(next)
    }
}

/// Error raised by the tender desk.
#[derive(Debug, thiserror::Error)]
pub enum TenderDeskError {
    #[error("tender {0} not found")]
    NotFound(TenderId),
    #[error("tender {0} already exists")]
    Conflict(TenderId),
    #[error("deleting tender {0} requires confirmation")]
    ConfirmationRequired(TenderId),
    #[error("option for list {0} must not be blank")]
    BlankOption(ListKind),
    #[error("list {kind} has no option at position {index}")]
    OptionNotFound { kind: ListKind, index: usize },
    #[error("tender desk state lock poisoned")]
    StatePoisoned,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
