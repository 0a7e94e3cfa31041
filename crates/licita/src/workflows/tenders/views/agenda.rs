use super::super::domain::Tender;
use super::super::readiness::{is_ready, legal_deadlines};
use chrono::{Duration, NaiveDate};

/// Tenders opening on or after `today`, earliest first. Ties keep collection order.
pub fn upcoming(tenders: &[Tender], today: NaiveDate) -> Vec<&Tender> {
    let mut selected: Vec<&Tender> = tenders
        .iter()
        .filter(|tender| tender.data_abertura.is_some_and(|date| date >= today))
        .collect();
    selected.sort_by_key(|tender| tender.data_abertura);
    selected
}

/// Upcoming tenders still missing their financial ceiling.
pub fn needing_diligence(tenders: &[Tender], today: NaiveDate) -> Vec<&Tender> {
    upcoming(tenders, today)
        .into_iter()
        .filter(|tender| !is_ready(tender))
        .collect()
}

/// Upcoming tenders apt to participate.
pub fn apt(tenders: &[Tender], today: NaiveDate) -> Vec<&Tender> {
    upcoming(tenders, today)
        .into_iter()
        .filter(|tender| is_ready(tender))
        .collect()
}

/// Upcoming tenders whose proposal has not been sent yet.
pub fn awaiting_proposal(tenders: &[Tender], today: NaiveDate) -> Vec<&Tender> {
    upcoming(tenders, today)
        .into_iter()
        .filter(|tender| !tender.proposta_enviada)
        .collect()
}

pub fn open_legal_deadlines(tenders: &[Tender], today: NaiveDate) -> Vec<&Tender> {
    tenders
        .iter()
        .filter(|tender| legal_deadlines(tender).any(|deadline| deadline >= today))
        .collect()
}

/// Tenders with a challenge or clarification deadline in `[today, today + days]`.
pub fn legal_deadlines_within(tenders: &[Tender], today: NaiveDate, days: i64) -> Vec<&Tender> {
    let horizon = today + Duration::days(days);
    tenders
        .iter()
        .filter(|tender| {
            legal_deadlines(tender).any(|deadline| deadline >= today && deadline <= horizon)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct DayEvents<'a> {
    pub openings: Vec<&'a Tender>,
    pub follow_ups: Vec<&'a Tender>,
}

impl DayEvents<'_> {
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty() && self.follow_ups.is_empty()
    }
}

pub fn events_on_day(tenders: &[Tender], date: NaiveDate) -> DayEvents<'_> {
    DayEvents {
        openings: tenders
            .iter()
            .filter(|tender| tender.data_abertura == Some(date))
            .collect(),
        follow_ups: tenders
            .iter()
            .filter(|tender| tender.data_retorno == Some(date))
            .collect(),
    }
}

#[derive(Debug, Default)]
pub struct DeadlineEvents<'a> {
    pub challenges: Vec<&'a Tender>,
    pub clarifications: Vec<&'a Tender>,
}

pub fn deadlines_on_day(tenders: &[Tender], date: NaiveDate) -> DeadlineEvents<'_> {
    DeadlineEvents {
        challenges: tenders
            .iter()
            .filter(|tender| tender.prazo_impugnacao == Some(date))
            .collect(),
        clarifications: tenders
            .iter()
            .filter(|tender| tender.prazo_esclarecimento == Some(date))
            .collect(),
    }
}

#[derive(Debug)]
pub struct CompanyGroup<'a> {
    pub empresa: &'a str,
    pub tenders: Vec<&'a Tender>,
}

/// Groups appear in order of first occurrence; members keep collection order.
pub fn group_by_company(tenders: &[Tender]) -> Vec<CompanyGroup<'_>> {
    let mut groups: Vec<CompanyGroup<'_>> = Vec::new();
    for tender in tenders {
        match groups
            .iter_mut()
            .find(|group| group.empresa == tender.empresa)
        {
            Some(group) => group.tenders.push(tender),
            None => groups.push(CompanyGroup {
                empresa: &tender.empresa,
                tenders: vec![tender],
            }),
        }
    }
    groups
}

pub fn in_dispute_count(tenders: &[Tender]) -> usize {
    tenders
        .iter()
        .filter(|tender| tender.status_atual.in_dispute())
        .count()
}
