use super::domain::Tender;
use chrono::NaiveDate;
use serde::Serialize;

/// Binary signal shown on agenda and calendar cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Apt,
    Pending,
}

impl Readiness {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apt => "Apto a participar",
            Self::Pending => "Pendente",
        }
    }
}

/// True when the active ceiling selected by `tipoLicitacao` is set to a positive amount.
pub fn has_minimum_financials(tender: &Tender) -> bool {
    let amount = tender.ceiling.amount();
    amount.is_finite() && amount > 0.0
}

/// Readiness is decided by the financial ceiling alone.
pub fn is_ready(tender: &Tender) -> bool {
    has_minimum_financials(tender)
}

pub fn readiness(tender: &Tender) -> Readiness {
    if is_ready(tender) {
        Readiness::Apt
    } else {
        Readiness::Pending
    }
}

/// Either the challenge or the clarification deadline falls on or after `today`.
pub fn has_open_legal_deadline(tender: &Tender, today: NaiveDate) -> bool {
    legal_deadlines(tender).any(|deadline| deadline >= today)
}

pub(crate) fn legal_deadlines(tender: &Tender) -> impl Iterator<Item = NaiveDate> {
    [tender.prazo_impugnacao, tender.prazo_esclarecimento]
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tenders::domain::{FinancialCeiling, TenderDraft, TenderId};
    use chrono::Utc;

    fn tender_with(ceiling: FinancialCeiling) -> Tender {
        TenderDraft {
            ceiling: Some(ceiling),
            ..TenderDraft::default()
        }
        .into_tender(TenderId("r-1".to_string()), Utc::now())
    }

    #[test]
    fn zero_minimum_value_is_pending() {
        let tender = tender_with(FinancialCeiling::Valor { valor_minimo: 0.0 });
        assert!(!is_ready(&tender));
        assert_eq!(readiness(&tender), Readiness::Pending);
    }

    #[test]
    fn positive_minimum_value_is_apt() {
        let tender = tender_with(FinancialCeiling::Valor {
            valor_minimo: 15000.0,
        });
        assert!(is_ready(&tender));
        assert_eq!(readiness(&tender).label(), "Apto a participar");
    }

    #[test]
    fn discount_tenders_use_the_percentage() {
        let apt = tender_with(FinancialCeiling::Desconto {
            percentual_desconto: 8.0,
        });
        let pending = tender_with(FinancialCeiling::Desconto {
            percentual_desconto: 0.0,
        });
        assert!(is_ready(&apt));
        assert!(!is_ready(&pending));
    }

    #[test]
    fn non_finite_amounts_are_never_ready() {
        for amount in [f64::NAN, f64::INFINITY, -5.0] {
            let tender = tender_with(FinancialCeiling::Valor {
                valor_minimo: amount,
            });
            assert!(!is_ready(&tender), "{amount} should not be ready");
        }
    }

    #[test]
    fn legal_deadline_is_open_on_the_day_itself() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let mut tender = tender_with(FinancialCeiling::default());
        assert!(!has_open_legal_deadline(&tender, today));

        tender.prazo_esclarecimento = Some(today);
        assert!(has_open_legal_deadline(&tender, today));

        tender.prazo_esclarecimento = today.pred_opt();
        tender.prazo_impugnacao = today.pred_opt();
        assert!(!has_open_legal_deadline(&tender, today));
    }
}
