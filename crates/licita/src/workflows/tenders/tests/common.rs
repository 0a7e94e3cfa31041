use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::tenders::domain::{
    FinancialCeiling, Tender, TenderDraft, TenderId, TenderStatus,
};
use crate::workflows::tenders::lists::DynamicLists;
use crate::workflows::tenders::repository::{MemoryTenderStore, StoreError, TenderStore};
use crate::workflows::tenders::service::TenderDesk;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn registered_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn draft(edital: &str) -> TenderDraft {
    TenderDraft {
        empresa: "Construtora ABC Ltda".to_string(),
        orgao_licitante: "Prefeitura de Sorocaba".to_string(),
        numero_edital: edital.to_string(),
        portal: "Compras.gov".to_string(),
        objeto: "Reforma de escola municipal".to_string(),
        categoria: "Engenharia".to_string(),
        responsavel: "Maria Silva".to_string(),
        data_abertura: Some(date(2025, 2, 10)),
        valor_referencia: 250_000.0,
        ceiling: Some(FinancialCeiling::Valor {
            valor_minimo: 180_000.0,
        }),
        ..TenderDraft::default()
    }
}

pub(super) fn tender(id: &str, status: TenderStatus) -> Tender {
    TenderDraft {
        status_atual: Some(status),
        ..draft(&format!("PE {id}/2025"))
    }
    .into_tender(TenderId(id.to_string()), registered_at())
}

pub(super) fn build_desk(
    tenders: Vec<Tender>,
) -> (TenderDesk<MemoryTenderStore>, Arc<MemoryTenderStore>) {
    let store = Arc::new(MemoryTenderStore::with_tenders(tenders));
    let desk = TenderDesk::open(store.clone()).expect("desk opens");
    (desk, store)
}

/// Loads fine but refuses every write.
pub(super) struct OfflineStore {
    pub(super) tenders: Vec<Tender>,
}

impl TenderStore for OfflineStore {
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        Ok(self.tenders.clone())
    }

    fn upsert_tender(&self, _tender: &Tender, _snapshot: &[Tender]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete_tender(&self, _id: &TenderId, _snapshot: &[Tender]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError> {
        Ok(None)
    }

    fn save_lists(&self, _lists: &DynamicLists) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn offline_desk(tenders: Vec<Tender>) -> TenderDesk<OfflineStore> {
    TenderDesk::open(Arc::new(OfflineStore { tenders })).expect("desk opens")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
