use crate::infra::{open_desk, Desk};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Utc};
use clap::{Args, Subcommand};
use licita::config::AppConfig;
use licita::error::AppError;
use licita::telemetry;
use licita::workflows::import::TenderCsvImporter;
use licita::workflows::tenders::views::{group_by_company, TenderCard};
use licita::workflows::tenders::{
    DashboardSummary, FinancialCeiling, ListKind, MemoryTenderStore, MonthCalendar, StoreError,
    Tender, TenderDesk, TenderDraft, TenderStatus,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the summary as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CalendarArgs {
    /// Calendar year. Defaults to the current year.
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Calendar month (1-12). Defaults to the current month.
    #[arg(long)]
    pub(crate) month: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Spreadsheet export whose headers are the tender field names
    #[arg(long, conflicts_with = "json", required_unless_present = "json")]
    pub(crate) csv: Option<PathBuf>,
    /// JSON array of tenders (such as an exported `qa_tenders` value); ids are kept
    #[arg(long)]
    pub(crate) json: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListsArgs {
    #[command(subcommand)]
    pub(crate) action: Option<ListsAction>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ListsAction {
    /// Append an option to a list
    Add { kind: ListKind, value: String },
    /// Remove the option at a zero-based position
    Remove { kind: ListKind, index: usize },
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn configured_desk() -> Result<Arc<Desk>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    open_desk(&config.storage)
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let desk = configured_desk()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let summary = desk.dashboard(today)?;

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Dashboard payload unavailable: {err}"),
        }
    } else {
        render_dashboard(&summary);
    }
    Ok(())
}

pub(crate) fn run_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let desk = configured_desk()?;
    let today = Local::now().date_naive();
    let calendar = desk.calendar(
        args.year.unwrap_or_else(|| today.year()),
        args.month.unwrap_or_else(|| today.month()),
    )?;
    render_calendar(&calendar);
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let desk = configured_desk()?;

    if let Some(path) = args.json {
        let raw = std::fs::read(&path)?;
        let tenders: Vec<Tender> = serde_json::from_slice(&raw).map_err(StoreError::from)?;
        let imported = desk.import(tenders)?;
        println!("Restored {imported} tenders from {}", path.display());
        return Ok(());
    }

    if let Some(path) = args.csv {
        let drafts = TenderCsvImporter::from_path(&path)?;
        let now = Utc::now();
        for draft in drafts {
            let tender = desk.register(draft, now)?;
            println!("- {} registered as {}", tender.headline(), tender.id);
        }
    }
    Ok(())
}

pub(crate) fn run_lists(args: ListsArgs) -> Result<(), AppError> {
    let desk = configured_desk()?;

    let lists = match args.action {
        None => desk.lists()?,
        Some(ListsAction::Add { kind, value }) => desk.add_list_option(kind, &value)?,
        Some(ListsAction::Remove { kind, index }) => desk.remove_list_option(kind, index)?,
    };

    for kind in ListKind::ordered() {
        println!("{kind}");
        for (index, option) in lists.get(kind).iter().enumerate() {
            println!("  [{index}] {option}");
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let desk = TenderDesk::open(Arc::new(MemoryTenderStore::default()))?;

    println!("Tender desk walkthrough ({today})");
    let now = Utc::now();
    for draft in sample_drafts(today) {
        let tender = desk.register(draft, now)?;
        println!("- registered {} [{}]", tender.headline(), tender.id);
    }

    let disputed = desk
        .tenders()?
        .into_iter()
        .find(|tender| tender.status_atual == TenderStatus::EmDisputa);
    if let Some(mut tender) = disputed {
        tender.data_retorno = Some(today);
        tender.horario_retorno = NaiveTime::from_hms_opt(14, 0, 0);
        tender.observacoes_pregao = "Pregoeiro suspendeu a sessão para análise.".to_string();
        let tender = desk.upsert_tender(tender)?;

        let closed = desk.finalize_dispute(&tender.id, today)?;
        println!(
            "\nDispute closed for {} -> {} / {}",
            closed.headline(),
            closed.status_atual,
            closed.fase_atual
        );
        println!("Session notes:\n{}", closed.observacoes_pregao);

        if let Err(err) = desk.finalize_dispute(&tender.id, today) {
            println!("Second attempt rejected: {err}");
        }
    }

    render_dashboard(&desk.dashboard(today)?);
    render_calendar(&desk.calendar(today.year(), today.month())?);

    println!("\nBy company");
    let tenders = desk.tenders()?;
    for group in group_by_company(&tenders) {
        println!("- {} ({} tenders)", group.empresa, group.tenders.len());
        for tender in group.tenders {
            println!("    {} [{}]", tender.headline(), tender.status_atual);
        }
    }

    Ok(())
}

fn sample_drafts(today: NaiveDate) -> Vec<TenderDraft> {
    vec![
        TenderDraft {
            empresa: "Tech Solutions".to_string(),
            orgao_licitante: "Prefeitura de Campinas".to_string(),
            numero_edital: "PE 12/2025".to_string(),
            portal: "BLL".to_string(),
            objeto: "Aquisição de notebooks".to_string(),
            categoria: "Tecnologia da Informação".to_string(),
            data_abertura: Some(today + Duration::days(3)),
            horario_sessao: NaiveTime::from_hms_opt(9, 30, 0),
            prazo_impugnacao: Some(today + Duration::days(1)),
            valor_referencia: 120_000.0,
            ceiling: Some(FinancialCeiling::Desconto {
                percentual_desconto: 12.5,
            }),
            proposta_enviada: true,
            ..TenderDraft::default()
        },
        TenderDraft {
            empresa: "Construtora ABC Ltda".to_string(),
            orgao_licitante: "DNIT".to_string(),
            numero_edital: "RDC 4/2025".to_string(),
            portal: "Compras.gov".to_string(),
            objeto: "Manutenção rodoviária".to_string(),
            categoria: "Engenharia".to_string(),
            data_abertura: Some(today),
            horario_sessao: NaiveTime::from_hms_opt(10, 0, 0),
            status_atual: Some(TenderStatus::AguardandoDisputa),
            ..TenderDraft::default()
        },
        TenderDraft {
            empresa: "Empresa XYZ S.A.".to_string(),
            orgao_licitante: "Governo do Estado de Minas Gerais".to_string(),
            numero_edital: "CC 7/2025".to_string(),
            portal: "Portal Nacional".to_string(),
            categoria: "Serviços".to_string(),
            data_abertura: Some(today + Duration::days(10)),
            prazo_esclarecimento: Some(today + Duration::days(5)),
            ceiling: Some(FinancialCeiling::Valor {
                valor_minimo: 48_000.0,
            }),
            ..TenderDraft::default()
        },
        TenderDraft {
            empresa: "Tech Solutions".to_string(),
            orgao_licitante: "Tribunal Regional Eleitoral".to_string(),
            numero_edital: "PE 2/2025".to_string(),
            portal: "Compras.gov".to_string(),
            data_abertura: Some(today - Duration::days(5)),
            ceiling: Some(FinancialCeiling::Valor {
                valor_minimo: 9_800.0,
            }),
            status_atual: Some(TenderStatus::EmDisputa),
            ..TenderDraft::default()
        },
    ]
}

fn card_line(card: &TenderCard) -> String {
    let when = match (card.data_abertura, card.horario_sessao.as_deref()) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        (Some(date), None) => date.to_string(),
        (None, _) => "sem data".to_string(),
    };
    format!(
        "{when} | {} | {} | {} | {}",
        card.headline, card.empresa, card.status_label, card.readiness_label
    )
}

pub(crate) fn render_dashboard(summary: &DashboardSummary) {
    let counters = &summary.counters;
    println!("\nDashboard for {}", summary.today);
    println!("- Upcoming openings: {}", counters.upcoming);
    println!("- Awaiting proposal: {}", counters.awaiting_proposal);
    println!(
        "- Legal deadlines in the next days: {}",
        counters.legal_deadlines_next_days
    );
    println!("- Apt to participate: {}", counters.apt);
    println!("- Needing diligence: {}", counters.needing_diligence);

    let board = &summary.today_board;
    println!("\nToday ({} in dispute)", board.in_dispute);
    if board.openings.is_empty() && board.follow_ups.is_empty() {
        println!("- nothing scheduled");
    }
    for card in &board.openings {
        println!("- opening: {}", card_line(card));
    }
    for follow_up in &board.follow_ups {
        match follow_up.time.as_deref() {
            Some(time) => println!("- return at {time}: {}", follow_up.headline),
            None => println!("- return any time: {}", follow_up.headline),
        }
    }

    if summary.agenda.is_empty() {
        println!("\nAgenda: empty");
    } else {
        println!("\nAgenda");
        for card in &summary.agenda {
            println!("- {}", card_line(card));
        }
    }
}

pub(crate) fn render_calendar(calendar: &MonthCalendar) {
    println!("\n{} {}", calendar.month_label, calendar.year);
    let busy: Vec<_> = calendar.days.iter().filter(|day| day.has_events()).collect();
    if busy.is_empty() {
        println!("- no events this month");
        return;
    }

    for day in busy {
        println!("{:02}", day.day);
        for card in &day.openings {
            println!("  opening: {} ({})", card.headline, card.readiness_label);
        }
        for follow_up in &day.follow_ups {
            println!("  return: {}", follow_up.headline);
        }
        for card in &day.challenge_deadlines {
            println!("  challenge deadline: {}", card.headline);
        }
        for card in &day.clarification_deadlines {
            println!("  clarification deadline: {}", card.headline);
        }
    }
}
