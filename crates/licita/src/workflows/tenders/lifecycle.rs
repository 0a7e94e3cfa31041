use super::domain::{Lot, Tender, TenderStatus, QUALIFICATION_PHASE, UNKNOWN_POSITION};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("dispute already closed: tender is in '{status}'")]
    DisputeAlreadyClosed { status: TenderStatus },
    #[error("lot {0} not found")]
    LotNotFound(String),
}

/// Close the dispute and move the tender into qualification, logging the move in the session notes.
pub fn finalize_dispute(tender: &Tender, on: NaiveDate) -> Result<Tender, LifecycleError> {
    if !tender.status_atual.dispute_open() {
        return Err(LifecycleError::DisputeAlreadyClosed {
            status: tender.status_atual,
        });
    }

    let mut updated = tender.clone();
    updated.status_atual = TenderStatus::Habilitacao;
    updated.fase_atual = QUALIFICATION_PHASE.to_string();
    append_session_note(
        &mut updated,
        &format!(
            "[Log {}]: Disputa realizada. Movido para {}.",
            on.format("%d/%m/%Y"),
            TenderStatus::Habilitacao.label()
        ),
    );
    Ok(updated)
}

pub(crate) fn append_session_note(tender: &mut Tender, line: &str) {
    if !tender.observacoes_pregao.is_empty() {
        tender.observacoes_pregao.push('\n');
    }
    tender.observacoes_pregao.push_str(line);
}

/// Free-form status edit; legality is left to the operator.
pub fn set_status(tender: &mut Tender, status: TenderStatus, phase: Option<String>) {
    tender.status_atual = status;
    if let Some(phase) = phase {
        tender.fase_atual = phase;
    }
}

/// Ranking for single-lot tenders. Multi-lot tenders rank per lot through [`update_lot`].
pub fn set_position(tender: &mut Tender, position: String) {
    tender.posicao_atual = position;
}

pub fn add_lot(tender: &mut Tender) -> &Lot {
    let numero = format!("{:02}", tender.lotes.len() + 1);
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(5);
    tender.lotes.push(Lot {
        id,
        numero,
        colocacao: UNKNOWN_POSITION.to_string(),
        descricao: None,
        valor_ofertado: None,
    });
    &tender.lotes[tender.lotes.len() - 1]
}

/// Partial edit of a lot; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotPatch {
    pub numero: Option<String>,
    pub colocacao: Option<String>,
    pub descricao: Option<String>,
    pub valor_ofertado: Option<f64>,
}

pub fn update_lot(tender: &mut Tender, lot_id: &str, patch: LotPatch) -> Result<(), LifecycleError> {
    let lot = tender
        .lotes
        .iter_mut()
        .find(|lot| lot.id == lot_id)
        .ok_or_else(|| LifecycleError::LotNotFound(lot_id.to_string()))?;

    if let Some(numero) = patch.numero {
        lot.numero = numero;
    }
    if let Some(colocacao) = patch.colocacao {
        lot.colocacao = colocacao;
    }
    if let Some(descricao) = patch.descricao {
        lot.descricao = Some(descricao);
    }
    if let Some(valor) = patch.valor_ofertado {
        lot.valor_ofertado = Some(valor);
    }
    Ok(())
}

pub fn remove_lot(tender: &mut Tender, lot_id: &str) -> Result<Lot, LifecycleError> {
    let index = tender
        .lotes
        .iter()
        .position(|lot| lot.id == lot_id)
        .ok_or_else(|| LifecycleError::LotNotFound(lot_id.to_string()))?;
    Ok(tender.lotes.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tenders::domain::{TenderDraft, TenderId};
    use chrono::Utc;

    fn tender(status: TenderStatus) -> Tender {
        TenderDraft {
            status_atual: Some(status),
            ..TenderDraft::default()
        }
        .into_tender(TenderId("l-1".to_string()), Utc::now())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date")
    }

    #[test]
    fn finalize_moves_screening_tender_to_qualification() {
        let mut original = tender(TenderStatus::Triagem);
        original.observacoes_pregao = "Lance inicial registrado.".to_string();

        let updated = finalize_dispute(&original, day()).expect("dispute open");

        assert_eq!(updated.status_atual, TenderStatus::Habilitacao);
        assert_eq!(updated.fase_atual, QUALIFICATION_PHASE);
        assert!(updated
            .observacoes_pregao
            .starts_with("Lance inicial registrado."));
        assert_eq!(
            updated.observacoes_pregao.lines().count(),
            original.observacoes_pregao.lines().count() + 1
        );
        assert!(updated
            .observacoes_pregao
            .ends_with("[Log 20/01/2025]: Disputa realizada. Movido para Habilitação."));
        assert_eq!(original.status_atual, TenderStatus::Triagem);
    }

    #[test]
    fn finalize_on_empty_notes_writes_single_line() {
        let updated =
            finalize_dispute(&tender(TenderStatus::EmDisputa), day()).expect("dispute open");
        assert_eq!(updated.observacoes_pregao.lines().count(), 1);
        assert!(!updated.observacoes_pregao.starts_with('\n'));
    }

    #[test]
    fn finalize_rejects_closed_disputes() {
        for status in [
            TenderStatus::Habilitacao,
            TenderStatus::Recurso,
            TenderStatus::Homologacao,
            TenderStatus::Suspenso,
        ] {
            assert_eq!(
                finalize_dispute(&tender(status), day()),
                Err(LifecycleError::DisputeAlreadyClosed { status })
            );
        }
    }

    #[test]
    fn set_status_accepts_any_target() {
        let mut record = tender(TenderStatus::Homologacao);
        set_status(&mut record, TenderStatus::Triagem, None);
        assert_eq!(record.status_atual, TenderStatus::Triagem);
        assert_eq!(record.fase_atual, "Lances");

        set_status(
            &mut record,
            TenderStatus::Recurso,
            Some("Intenção de Recurso".to_string()),
        );
        assert!(record.in_appeal_intent());
    }

    #[test]
    fn lots_are_numbered_and_edited_in_place() {
        let mut record = tender(TenderStatus::Triagem);
        add_lot(&mut record);
        let second = add_lot(&mut record).id.clone();
        assert_eq!(record.lotes[0].numero, "01");
        assert_eq!(record.lotes[1].numero, "02");
        assert_eq!(record.lotes[1].colocacao, UNKNOWN_POSITION);

        update_lot(
            &mut record,
            &second,
            LotPatch {
                colocacao: Some("1º Lugar".to_string()),
                valor_ofertado: Some(980.5),
                ..LotPatch::default()
            },
        )
        .expect("lot exists");
        assert_eq!(record.lotes[1].colocacao, "1º Lugar");
        assert_eq!(record.lotes[1].valor_ofertado, Some(980.5));
        assert_eq!(record.lotes[1].numero, "02");

        let removed = remove_lot(&mut record, &second).expect("lot exists");
        assert_eq!(removed.numero, "02");
        assert_eq!(record.lotes.len(), 1);
        assert_eq!(
            remove_lot(&mut record, "missing"),
            Err(LifecycleError::LotNotFound("missing".to_string()))
        );
    }
}
