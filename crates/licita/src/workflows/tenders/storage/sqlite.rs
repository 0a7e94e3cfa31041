use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use super::super::domain::{Tender, TenderId};
use super::super::lists::{DynamicLists, ListKind};
use super::super::repository::{StoreError, TenderStore};

pub const TENDERS_TABLE: &str = "licitacoes";
pub const LISTS_TABLE: &str = "listas_dinamicas";

const CURRENT_SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Text,
    Real,
    Flag,
    Json,
}

/// Columns of `licitacoes`, named after the persisted tender fields.
const COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("createdAt", ColumnKind::Text),
    ("empresa", ColumnKind::Text),
    ("orgaoLicitante", ColumnKind::Text),
    ("numeroEdital", ColumnKind::Text),
    ("portal", ColumnKind::Text),
    ("objeto", ColumnKind::Text),
    ("categoria", ColumnKind::Text),
    ("situacao", ColumnKind::Text),
    ("modoDisputa", ColumnKind::Text),
    ("responsavel", ColumnKind::Text),
    ("dataAbertura", ColumnKind::Text),
    ("horarioSessao", ColumnKind::Text),
    ("prazoImpugnacao", ColumnKind::Text),
    ("prazoEsclarecimento", ColumnKind::Text),
    ("dataRetorno", ColumnKind::Text),
    ("horarioRetorno", ColumnKind::Text),
    ("retornoQualquerHorario", ColumnKind::Flag),
    ("valorReferencia", ColumnKind::Real),
    ("validadeProposta", ColumnKind::Text),
    ("exigeGarantia", ColumnKind::Flag),
    ("valorGarantia", ColumnKind::Real),
    ("propostaEnviada", ColumnKind::Flag),
    ("tipoLicitacao", ColumnKind::Text),
    ("valorMinimo", ColumnKind::Real),
    ("percentualDesconto", ColumnKind::Real),
    ("valorFinal", ColumnKind::Real),
    ("statusAtual", ColumnKind::Text),
    ("faseAtual", ColumnKind::Text),
    ("posicaoAtual", ColumnKind::Text),
    ("tipoLote", ColumnKind::Text),
    ("lotes", ColumnKind::Json),
    ("dataLimiteRecurso", ColumnKind::Text),
    ("horaLimiteRecurso", ColumnKind::Text),
    ("contraProposta", ColumnKind::Flag),
    ("contraHabilitacao", ColumnKind::Flag),
    ("observacoes", ColumnKind::Text),
    ("observacoesPregao", ColumnKind::Text),
];

/// Relational backend: one `licitacoes` row per tender, keyed by `id`.
pub struct SqliteTenderStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteTenderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTenderStore").finish_non_exhaustive()
    }
}

impl SqliteTenderStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened sqlite tender store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, StoreError> {
        run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection mutex poisoned".to_string()))
    }
}

fn run_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Unavailable(format!(
            "database version ({version}) is newer than supported schema ({CURRENT_SCHEMA_VERSION})"
        )));
    }
    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let columns: Vec<String> = COLUMNS
        .iter()
        .map(|(name, kind)| {
            let affinity = match kind {
                ColumnKind::Text | ColumnKind::Json => "TEXT",
                ColumnKind::Real => "REAL",
                ColumnKind::Flag => "INTEGER",
            };
            if *name == "id" {
                format!("\"{name}\" TEXT NOT NULL UNIQUE")
            } else {
                format!("\"{name}\" {affinity}")
            }
        })
        .collect();

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {TENDERS_TABLE} (seq INTEGER PRIMARY KEY AUTOINCREMENT, {});
         CREATE TABLE IF NOT EXISTS {LISTS_TABLE} (chave TEXT PRIMARY KEY, itens TEXT NOT NULL);",
        columns.join(", ")
    ))?;
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

fn quoted_columns() -> String {
    COLUMNS
        .iter()
        .map(|(name, _)| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn upsert_sql() -> String {
    let placeholders = (1..=COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = COLUMNS
        .iter()
        .filter(|(name, _)| *name != "id")
        .map(|(name, _)| format!("\"{name}\" = excluded.\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {TENDERS_TABLE} ({}) VALUES ({placeholders}) ON CONFLICT(\"id\") DO UPDATE SET {updates}",
        quoted_columns()
    )
}

fn tender_to_row(tender: &Tender) -> Result<Vec<SqlValue>, StoreError> {
    let value = serde_json::to_value(tender)?;
    let fields = value
        .as_object()
        .ok_or_else(|| StoreError::Corrupt("tender did not serialize to an object".to_string()))?;

    COLUMNS
        .iter()
        .map(|(name, kind)| {
            let cell = match (fields.get(*name), kind) {
                (None | Some(Value::Null), _) => SqlValue::Null,
                (Some(Value::Bool(flag)), _) => SqlValue::Integer(i64::from(*flag)),
                (Some(Value::Number(number)), _) => {
                    SqlValue::Real(number.as_f64().unwrap_or_default())
                }
                (Some(Value::String(text)), _) => SqlValue::Text(text.clone()),
                (Some(other), ColumnKind::Json) => SqlValue::Text(serde_json::to_string(other)?),
                (Some(other), _) => {
                    return Err(StoreError::Corrupt(format!(
                        "column {name} cannot hold {other}"
                    )))
                }
            };
            Ok(cell)
        })
        .collect()
}

fn row_to_tender(row: &Row<'_>) -> Result<Tender, StoreError> {
    let mut fields = Map::new();
    for (index, (name, kind)) in COLUMNS.iter().enumerate() {
        let cell: SqlValue = row.get(index)?;
        let value = match (cell, kind) {
            (SqlValue::Null, _) => continue,
            (SqlValue::Integer(flag), ColumnKind::Flag) => Value::Bool(flag != 0),
            (SqlValue::Integer(number), _) => Value::Number(Number::from(number)),
            (SqlValue::Real(number), _) => Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| StoreError::Corrupt(format!("column {name} holds {number}")))?,
            (SqlValue::Text(text), ColumnKind::Json) => serde_json::from_str(&text)?,
            (SqlValue::Text(text), _) => Value::String(text),
            (SqlValue::Blob(_), _) => {
                return Err(StoreError::Corrupt(format!("column {name} holds a blob")))
            }
        };
        fields.insert((*name).to_string(), value);
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}

impl TenderStore for SqliteTenderStore {
    /// Newest rows first, matching the desk's collection order.
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {TENDERS_TABLE} ORDER BY seq DESC",
            quoted_columns()
        ))?;
        let mut rows = stmt.query([])?;
        let mut tenders = Vec::new();
        while let Some(row) = rows.next()? {
            tenders.push(row_to_tender(row)?);
        }
        debug!(count = tenders.len(), "loaded tenders from sqlite");
        Ok(tenders)
    }

    fn upsert_tender(&self, tender: &Tender, _snapshot: &[Tender]) -> Result<(), StoreError> {
        let row = tender_to_row(tender)?;
        let conn = self.conn()?;
        conn.execute(&upsert_sql(), params_from_iter(row))?;
        Ok(())
    }

    fn delete_tender(&self, id: &TenderId, _snapshot: &[Tender]) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            &format!("DELETE FROM {TENDERS_TABLE} WHERE \"id\" = ?1"),
            params![id.as_str()],
        )?;
        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT chave, itens FROM {LISTS_TABLE}"))?;
        let mut rows = stmt.query([])?;
        let mut fields = Map::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let items: String = row.get(1)?;
            fields.insert(key, serde_json::from_str(&items)?);
        }
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(Value::Object(fields))?))
    }

    fn save_lists(&self, lists: &DynamicLists) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for kind in ListKind::ordered() {
            tx.execute(
                &format!(
                    "INSERT INTO {LISTS_TABLE} (chave, itens) VALUES (?1, ?2)
                     ON CONFLICT(chave) DO UPDATE SET itens = excluded.itens"
                ),
                params![kind.key(), serde_json::to_string(lists.get(kind))?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tenders::domain::{FinancialCeiling, LotType, TenderDraft};
    use crate::workflows::tenders::lifecycle::add_lot;
    use chrono::{NaiveDate, Utc};

    fn tender(id: &str) -> Tender {
        TenderDraft {
            empresa: "Tech Solutions".to_string(),
            numero_edital: format!("PE {id}"),
            data_abertura: NaiveDate::from_ymd_opt(2025, 5, 2),
            ceiling: Some(FinancialCeiling::Desconto {
                percentual_desconto: 7.5,
            }),
            valor_referencia: 42000.0,
            ..TenderDraft::default()
        }
        .into_tender(TenderId(id.to_string()), Utc::now())
    }

    #[test]
    fn rows_round_trip_field_for_field() {
        let store = SqliteTenderStore::open_in_memory().expect("store opens");
        let mut first = tender("a");
        first.tipo_lote = LotType::Multiplos;
        add_lot(&mut first);
        first.appeal.contra_habilitacao = true;
        first.proposta_enviada = true;
        let second = tender("b");

        store.upsert_tender(&first, &[]).expect("insert");
        store.upsert_tender(&second, &[]).expect("insert");

        let loaded = store.load_tenders().expect("load");
        assert_eq!(loaded, vec![second, first]);
    }

    #[test]
    fn upsert_updates_in_place() {
        let store = SqliteTenderStore::open_in_memory().expect("store opens");
        let mut record = tender("a");
        store.upsert_tender(&record, &[]).expect("insert");
        store.upsert_tender(&tender("b"), &[]).expect("insert");

        record.observacoes = "Aguardando parecer jurídico".to_string();
        store.upsert_tender(&record, &[]).expect("update");

        let loaded = store.load_tenders().expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1], record);
    }

    #[test]
    fn delete_reports_missing_rows() {
        let store = SqliteTenderStore::open_in_memory().expect("store opens");
        let record = tender("a");
        store.upsert_tender(&record, &[]).expect("insert");
        store.delete_tender(&record.id, &[]).expect("delete");
        assert!(matches!(
            store.delete_tender(&record.id, &[]),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn lists_are_stored_per_kind() {
        let store = SqliteTenderStore::open_in_memory().expect("store opens");
        assert!(store.load_lists().expect("load").is_none());

        let mut lists = DynamicLists::default();
        lists.add(ListKind::Portais, "BEC/SP");
        store.save_lists(&lists).expect("save");
        assert_eq!(store.load_lists().expect("load"), Some(lists));
    }

    #[test]
    fn reopening_a_file_keeps_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("licitacoes.db");
        let record = tender("a");
        {
            let store = SqliteTenderStore::open(&path).expect("store opens");
            store.upsert_tender(&record, &[]).expect("insert");
        }
        let store = SqliteTenderStore::open(&path).expect("store reopens");
        assert_eq!(store.load_tenders().expect("load"), vec![record]);
    }
}
