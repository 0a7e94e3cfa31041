use super::super::domain::Tender;
use super::agenda::{
    apt, awaiting_proposal, events_on_day, in_dispute_count, legal_deadlines_within,
    needing_diligence, upcoming,
};
use super::cards::{cards, follow_up_cards, FollowUpCard, TenderCard};
use chrono::NaiveDate;
use serde::Serialize;

/// Window used by the "legal deadlines" tile.
pub const LEGAL_DEADLINE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounters {
    pub upcoming: usize,
    pub awaiting_proposal: usize,
    pub legal_deadlines_next_days: usize,
    pub apt: usize,
    pub needing_diligence: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayBoard {
    pub openings: Vec<TenderCard>,
    pub follow_ups: Vec<FollowUpCard>,
    pub in_dispute: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub counters: DashboardCounters,
    pub today_board: TodayBoard,
    pub agenda: Vec<TenderCard>,
}

impl DashboardSummary {
    pub fn build(tenders: &[Tender], today: NaiveDate) -> Self {
        let agenda = upcoming(tenders, today);
        let counters = DashboardCounters {
            upcoming: agenda.len(),
            awaiting_proposal: awaiting_proposal(tenders, today).len(),
            legal_deadlines_next_days: legal_deadlines_within(
                tenders,
                today,
                LEGAL_DEADLINE_WINDOW_DAYS,
            )
            .len(),
            apt: apt(tenders, today).len(),
            needing_diligence: needing_diligence(tenders, today).len(),
        };

        let events = events_on_day(tenders, today);
        let today_board = TodayBoard {
            openings: cards(events.openings),
            follow_ups: follow_up_cards(events.follow_ups),
            in_dispute: in_dispute_count(tenders),
        };

        Self {
            today,
            counters,
            today_board,
            agenda: cards(agenda),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tenders::domain::{
        FinancialCeiling, TenderDraft, TenderId, TenderStatus,
    };
    use chrono::Utc;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
    }

    #[test]
    fn counters_reflect_collection() {
        let today = date(10);
        let mut ready = TenderDraft {
            data_abertura: Some(date(10)),
            ceiling: Some(FinancialCeiling::Desconto {
                percentual_desconto: 5.0,
            }),
            proposta_enviada: true,
            status_atual: Some(TenderStatus::EmDisputa),
            ..TenderDraft::default()
        }
        .into_tender(TenderId("ready".to_string()), Utc::now());
        ready.prazo_esclarecimento = Some(date(12));

        let mut pending = TenderDraft {
            data_abertura: Some(date(25)),
            ..TenderDraft::default()
        }
        .into_tender(TenderId("pending".to_string()), Utc::now());
        pending.data_retorno = Some(today);
        pending.retorno_qualquer_horario = true;

        let finished = TenderDraft {
            data_abertura: Some(date(1)),
            status_atual: Some(TenderStatus::Homologacao),
            ..TenderDraft::default()
        }
        .into_tender(TenderId("done".to_string()), Utc::now());

        let summary = DashboardSummary::build(&[ready, pending, finished], today);

        assert_eq!(
            summary.counters,
            DashboardCounters {
                upcoming: 2,
                awaiting_proposal: 1,
                legal_deadlines_next_days: 1,
                apt: 1,
                needing_diligence: 1,
            }
        );
        assert_eq!(summary.today_board.openings.len(), 1);
        assert_eq!(summary.today_board.follow_ups.len(), 1);
        assert!(summary.today_board.follow_ups[0].time.is_none());
        assert_eq!(summary.today_board.in_dispute, 1);
        assert_eq!(summary.agenda[0].id.0, "ready");
        assert_eq!(summary.agenda[1].readiness_label, "Pendente");
    }

    #[test]
    fn empty_collection_yields_zeroes() {
        let summary = DashboardSummary::build(&[], date(1));
        assert_eq!(summary.counters.upcoming, 0);
        assert!(summary.agenda.is_empty());
        assert_eq!(summary.today_board.in_dispute, 0);
    }
}
