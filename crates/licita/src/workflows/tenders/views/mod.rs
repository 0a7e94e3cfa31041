mod agenda;
mod calendar;
mod cards;
mod dashboard;

pub use agenda::{
    apt, awaiting_proposal, deadlines_on_day, events_on_day, group_by_company, in_dispute_count,
    legal_deadlines_within, needing_diligence, open_legal_deadlines, upcoming, CompanyGroup,
    DayEvents, DeadlineEvents,
};
pub use calendar::{CalendarDay, CalendarError, MonthCalendar};
pub use cards::{FollowUpCard, TenderCard};
pub use dashboard::{DashboardCounters, DashboardSummary, TodayBoard, LEGAL_DEADLINE_WINDOW_DAYS};
