use std::sync::Arc;

use anyhow::Context;
use itertools::Itertools;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use vax_checkin::models::parse_vaccinated_at;
use vax_checkin::{
    CheckInConfig, CheckInCoordinator, CheckInEvent, DashboardAggregate, DashboardView, HttpBackend,
    RefreshScheduler, VaccinationInput,
};

const HELP: &str = "\
commands:
  search <citizen id>
  staff <staff id>
  save <staff id> | [site] | [preset] | [extra] | [YYYY-MM-DDTHH:MM]
  dashboard
  refresh
  reset
  quit";

fn render(event: &CheckInEvent) {
    match event {
        CheckInEvent::CacheRefreshed { registrations } => {
            println!("[cache] {registrations} registrations loaded");
        }
        CheckInEvent::RegistrationShown(registration) => {
            let age = registration
                .age()
                .map_or_else(|| "-".to_string(), |age| age.to_string());
            println!(
                "[registration] {} | {} | phone {} | slot {} | age {age}",
                registration.full_name,
                registration.citizen_id,
                registration.phone,
                registration.appointment_slot
            );
        }
        CheckInEvent::HistoryShown(records) => {
            println!("[history]");
            for record in records {
                println!(
                    "  {} | {} | {} | {} | {} | {}",
                    record.timestamp,
                    record.vaccinated_at,
                    record.vaccine_name,
                    record.injection_site,
                    record.staff_id,
                    record.notes
                );
            }
        }
        CheckInEvent::StaffResolved(staff) => println!("[staff] name: {}", staff.staff_name),
        CheckInEvent::VaccinationSaved { message, .. } => println!("[saved] {message}"),
        CheckInEvent::DashboardUpdated(aggregate) => render_dashboard(aggregate),
        _ => {}
    }
}

fn render_dashboard(aggregate: &DashboardAggregate) {
    println!(
        "[dashboard] registrations {} | vaccinations {} | vaccinated {} | unvaccinated {}",
        aggregate.total_registrations,
        aggregate.total_vaccinations,
        aggregate.total_unique_vaccinated,
        aggregate.total_unvaccinated
    );
    for (slot, registered, vaccinated) in aggregate.rows() {
        println!("  {slot:<16} {registered:>6} {vaccinated:>6}");
    }
}

fn parse_save(args: &str) -> anyhow::Result<VaccinationInput> {
    let (staff, site, preset, extra, when) = args
        .split('|')
        .map(str::trim)
        .chain(std::iter::repeat(""))
        .next_tuple()
        .context("malformed save command")?;

    let mut input = VaccinationInput::new(staff)
        .with_injection_site(site)
        .with_notes(preset, extra);
    input.vaccinated_at = parse_vaccinated_at(when)?;
    Ok(input)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CheckInConfig::from_env();
    let backend = HttpBackend::new(&config).context("Invalid backend configuration")?;
    info!("Using backend at {}", backend.base_url());

    let coordinator = Arc::new(CheckInCoordinator::new(Arc::new(backend)));

    let mut events = coordinator.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => render(&event),
                Err(RecvError::Lagged(skipped)) => warn!("Display skipped {skipped} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut scheduler = RefreshScheduler::start(Arc::clone(&coordinator), config.refresh_interval);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "search" => {
                if let Err(e) = coordinator.lookup(args).await {
                    println!("! {e}");
                }
            }
            "staff" => {
                if let Err(e) = coordinator.lookup_staff(args).await {
                    println!("! {e}");
                }
            }
            "save" => {
                let input = match parse_save(args) {
                    Ok(input) => input,
                    Err(e) => {
                        println!("! {e}");
                        continue;
                    }
                };
                if let Err(e) = coordinator.record_vaccination(input).await {
                    println!("! {e}");
                    if e.is_duplicate() {
                        println!("*** {e} *** press Enter to acknowledge");
                        lines.next_line().await?;
                    }
                }
            }
            "dashboard" => {
                // Only the first activation fetches and publishes an update
                let already_open = coordinator.dashboard_view() == DashboardView::Opened;
                match coordinator.open_dashboard().await {
                    Some(aggregate) if already_open => render_dashboard(&aggregate),
                    Some(_) => {}
                    None => println!("! dashboard unavailable"),
                }
            }
            "refresh" => {
                if let Err(e) = coordinator.refresh().await {
                    println!("! {e}");
                }
            }
            "reset" => coordinator.reset(),
            "quit" | "exit" => break,
            _ => println!("{HELP}"),
        }
    }

    scheduler.stop();
    Ok(())
}
