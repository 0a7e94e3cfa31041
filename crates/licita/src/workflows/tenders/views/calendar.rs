use super::super::domain::Tender;
use super::agenda::{deadlines_on_day, events_on_day};
use super::cards::{cards, follow_up_cards, FollowUpCard, TenderCard};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const MONTH_LABELS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u32),
    #[error("year {0} is outside the supported calendar range")]
    InvalidYear(i32),
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub openings: Vec<TenderCard>,
    pub follow_ups: Vec<FollowUpCard>,
    pub challenge_deadlines: Vec<TenderCard>,
    pub clarification_deadlines: Vec<TenderCard>,
}

impl CalendarDay {
    pub fn has_events(&self) -> bool {
        !(self.openings.is_empty()
            && self.follow_ups.is_empty()
            && self.challenge_deadlines.is_empty()
            && self.clarification_deadlines.is_empty())
    }
}

/// Month grid: blank cells before day 1 (Sunday first) followed by one entry per day.
#[derive(Debug, Clone, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub month_label: &'static str,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    pub fn build(tenders: &[Tender], year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidYear(year))?;

        let days = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| {
                let events = events_on_day(tenders, date);
                let deadlines = deadlines_on_day(tenders, date);
                CalendarDay {
                    date,
                    day: date.day(),
                    openings: cards(events.openings),
                    follow_ups: follow_up_cards(events.follow_ups),
                    challenge_deadlines: cards(deadlines.challenges),
                    clarification_deadlines: cards(deadlines.clarifications),
                }
            })
            .collect();

        Ok(Self {
            year,
            month,
            month_label: MONTH_LABELS[(month - 1) as usize],
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        self.days.get(day.checked_sub(1)? as usize)
    }
}
