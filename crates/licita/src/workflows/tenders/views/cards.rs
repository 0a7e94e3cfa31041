use super::super::domain::{Tender, TenderId, TenderStatus, TIME_FORMAT};
use super::super::readiness::{readiness, Readiness};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderCard {
    pub id: TenderId,
    pub headline: String,
    pub empresa: String,
    pub portal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_abertura: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horario_sessao: Option<String>,
    pub status: TenderStatus,
    pub status_label: &'static str,
    pub readiness: Readiness,
    pub readiness_label: &'static str,
    pub proposta_enviada: bool,
}

impl TenderCard {
    pub fn from_tender(tender: &Tender) -> Self {
        let readiness = readiness(tender);
        Self {
            id: tender.id.clone(),
            headline: tender.headline(),
            empresa: tender.empresa.clone(),
            portal: tender.portal.clone(),
            data_abertura: tender.data_abertura,
            horario_sessao: tender
                .horario_sessao
                .map(|time| time.format(TIME_FORMAT).to_string()),
            status: tender.status_atual,
            status_label: tender.status_atual.label(),
            readiness,
            readiness_label: readiness.label(),
            proposta_enviada: tender.proposta_enviada,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpCard {
    pub id: TenderId,
    pub headline: String,
    pub date: NaiveDate,
    /// Absent when the return may happen at any time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl FollowUpCard {
    pub fn from_tender(tender: &Tender) -> Option<Self> {
        tender.follow_up().map(|follow_up| Self {
            id: tender.id.clone(),
            headline: tender.headline(),
            date: follow_up.date,
            time: follow_up
                .time
                .map(|time| time.format(TIME_FORMAT).to_string()),
        })
    }
}

pub(crate) fn cards<'a>(tenders: impl IntoIterator<Item = &'a Tender>) -> Vec<TenderCard> {
    tenders.into_iter().map(TenderCard::from_tender).collect()
}

pub(crate) fn follow_up_cards<'a>(
    tenders: impl IntoIterator<Item = &'a Tender>,
) -> Vec<FollowUpCard> {
    tenders
        .into_iter()
        .filter_map(FollowUpCard::from_tender)
        .collect()
}
