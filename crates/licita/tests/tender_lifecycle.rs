use chrono::{NaiveDate, Utc};
use licita::workflows::tenders::lifecycle::finalize_dispute;
use licita::workflows::tenders::views::{
    apt, group_by_company, needing_diligence, upcoming, MonthCalendar,
};
use licita::workflows::tenders::{
    is_ready, DeleteConfirmation, FinancialCeiling, MemoryTenderStore, Tender, TenderDesk,
    TenderDraft, TenderId, TenderStatus,
};
use std::sync::Arc;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn tender(id: &str, empresa: &str, opening: Option<NaiveDate>, ceiling: FinancialCeiling) -> Tender {
    TenderDraft {
        empresa: empresa.to_string(),
        numero_edital: format!("PE {id}"),
        data_abertura: opening,
        ceiling: Some(ceiling),
        ..TenderDraft::default()
    }
    .into_tender(TenderId(id.to_string()), Utc::now())
}

fn valor(amount: f64) -> FinancialCeiling {
    FinancialCeiling::Valor {
        valor_minimo: amount,
    }
}

fn portfolio() -> Vec<Tender> {
    vec![
        tender("t1", "Tech Solutions", Some(date(2025, 1, 20)), valor(15_000.0)),
        tender("t2", "Construtora ABC Ltda", Some(date(2025, 1, 15)), valor(0.0)),
        tender("t3", "Tech Solutions", Some(date(2025, 1, 10)), valor(9_000.0)),
        tender(
            "t4",
            "Empresa XYZ S.A.",
            Some(date(2025, 1, 15)),
            FinancialCeiling::Desconto {
                percentual_desconto: 8.0,
            },
        ),
        tender("t5", "Construtora ABC Ltda", None, valor(1_000.0)),
    ]
}

#[test]
fn readiness_follows_the_active_ceiling() {
    let mut record = tender("r1", "Tech Solutions", None, valor(0.0));
    assert!(!is_ready(&record));

    record.ceiling = valor(15_000.0);
    assert!(is_ready(&record));

    record.ceiling = FinancialCeiling::Desconto {
        percentual_desconto: 0.0,
    };
    assert!(!is_ready(&record), "valorMinimo of the other mode is ignored");
}

#[test]
fn past_openings_are_excluded_from_upcoming() {
    let tenders = portfolio();
    let today = date(2025, 1, 15);

    let ids: Vec<&str> = upcoming(&tenders, today)
        .into_iter()
        .map(|tender| tender.id.as_str())
        .collect();

    assert_eq!(ids, vec!["t2", "t4", "t1"]);
}

#[test]
fn agenda_partitions_upcoming_by_readiness() {
    let tenders = portfolio();
    let today = date(2025, 1, 12);

    let all = upcoming(&tenders, today);
    let ready = apt(&tenders, today);
    let pending = needing_diligence(&tenders, today);

    assert_eq!(ready.len() + pending.len(), all.len());
    assert!(ready.iter().all(|tender| is_ready(tender)));
    assert!(pending.iter().all(|tender| !is_ready(tender)));
    assert!(ready
        .iter()
        .all(|tender| !pending.iter().any(|other| other.id == tender.id)));

    let again = upcoming(&tenders, today);
    assert_eq!(all, again);
}

#[test]
fn finalize_dispute_appends_one_log_line() {
    let mut record = tender("f1", "Tech Solutions", Some(date(2025, 1, 20)), valor(1.0));
    record.observacoes_pregao = "Pregoeiro suspendeu para almoço.".to_string();
    assert_eq!(record.status_atual, TenderStatus::Triagem);

    let closed = finalize_dispute(&record, date(2025, 1, 20)).expect("dispute open");

    assert_eq!(closed.status_atual, TenderStatus::Habilitacao);
    assert_ne!(closed.fase_atual, record.fase_atual);
    assert!(closed
        .observacoes_pregao
        .starts_with(&record.observacoes_pregao));
    assert_eq!(
        closed.observacoes_pregao.lines().count(),
        record.observacoes_pregao.lines().count() + 1
    );
}

#[test]
fn delete_keeps_every_other_record_intact() {
    let tenders = portfolio();
    let store = Arc::new(MemoryTenderStore::with_tenders(tenders.clone()));
    let desk = TenderDesk::open(store.clone()).expect("desk opens");

    desk.delete_tender(&TenderId("t3".to_string()), DeleteConfirmation::Confirmed)
        .expect("delete succeeds");

    let expected: Vec<Tender> = tenders
        .into_iter()
        .filter(|tender| tender.id.as_str() != "t3")
        .collect();
    assert_eq!(desk.tenders().expect("state readable"), expected);
    assert_eq!(store.snapshot(), expected);
}

#[test]
fn companies_group_in_first_seen_order() {
    let tenders = portfolio();
    let groups = group_by_company(&tenders);

    let names: Vec<&str> = groups.iter().map(|group| group.empresa).collect();
    assert_eq!(
        names,
        vec!["Tech Solutions", "Construtora ABC Ltda", "Empresa XYZ S.A."]
    );
    let abc: Vec<&str> = groups[1]
        .tenders
        .iter()
        .map(|tender| tender.id.as_str())
        .collect();
    assert_eq!(abc, vec!["t2", "t5"]);
}

#[test]
fn month_calendar_places_openings_on_their_day() {
    let tenders = portfolio();
    let calendar = MonthCalendar::build(&tenders, 2025, 1).expect("valid month");

    assert_eq!(calendar.days.len(), 31);
    assert_eq!(calendar.leading_blanks, 3);
    let fifteenth = calendar.day(15).expect("day exists");
    assert_eq!(fifteenth.openings.len(), 2);
    assert!(calendar.day(16).map(|day| !day.has_events()).unwrap_or(false));
}
