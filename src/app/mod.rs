//! Command-line application: wires config, storage and clock into the core services.

pub mod cli;
pub mod render;

use std::{fs, io::Write, path::PathBuf};

use clap::Parser;
use tracing::info;

use boleto_config::{Config, ConfigManager};
use boleto_core::{
    AlertService, BoletoService, Clock, CoreError, FixedClock, LocaleFormatter, PortfolioService,
    portfolio_warnings, PortfolioStorage, ScheduleAnchor, ScheduleService, SummaryService,
    SystemClock,
};
use boleto_domain::{Boleto, BoletoHeader, PaymentMethod, ReportPeriod, StatusFilter};
use boleto_storage_json::{
    backup_file_name, export_portfolio, import_portfolio, JsonPortfolioStorage, StoragePaths,
};

use crate::{errors::AppError, output};
use cli::{AddArgs, Cli, Command, ConfigCommand, EditArgs, FilterArgs};
use render::{short_id, Presenter};

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    if cli.no_color {
        output::set_color_enabled(false);
    }
    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock::at_date(date)),
        None => Box::new(SystemClock),
    };
    let app = App::open(cli.data_dir, clock)?;
    app.execute(cli.command)
}

/// Loaded settings plus the collaborators every command needs.
pub struct App {
    config: Config,
    config_manager: ConfigManager,
    storage: JsonPortfolioStorage,
    clock: Box<dyn Clock>,
}

impl App {
    /// With `data_dir`, config, portfolio and backups all live under it.
    pub fn open(data_dir: Option<PathBuf>, clock: Box<dyn Clock>) -> Result<Self, AppError> {
        let config_manager = match &data_dir {
            Some(dir) => ConfigManager::with_base_dir(dir.clone())?,
            None => ConfigManager::default_location()?,
        };
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled);
        let paths = match data_dir {
            Some(dir) => StoragePaths {
                backup_root: dir.join("backups"),
                data_root: dir,
            },
            None => StoragePaths {
                data_root: config.resolve_data_root(),
                backup_root: config.resolve_backup_root(),
            },
        };
        let storage = JsonPortfolioStorage::with_retention(paths, config.backup_retention)?;
        Ok(Self {
            config,
            config_manager,
            storage,
            clock,
        })
    }

    pub fn execute(&self, command: Command) -> Result<(), AppError> {
        match command {
            Command::Add(args) => self.add(args),
            Command::List(filters) => self.list(&filters),
            Command::Show { id } => self.show(&id),
            Command::Pay { id, number } => self.pay(&id, number),
            Command::Reschedule { id, number, date } => {
                let index = installment_index(number)?;
                let portfolio = self.storage.load()?;
                let id = PortfolioService::resolve_id(&portfolio, &id)?;
                let next = PortfolioService::update(&portfolio, id, |boleto| {
                    BoletoService::reschedule_installment(boleto, index, date)
                })?;
                self.storage.save(&next)?;
                output::success(format!(
                    "Installment #{} now due {}",
                    number,
                    self.presenter().date(date)
                ));
                Ok(())
            }
            Command::Edit(args) => self.edit(args),
            Command::Delete { id } => {
                let portfolio = self.storage.load()?;
                let id = PortfolioService::resolve_id(&portfolio, &id)?;
                let next = PortfolioService::remove(&portfolio, id)?;
                self.storage.save(&next)?;
                output::success(format!("Deleted boleto {id}"));
                Ok(())
            }
            Command::Dashboard => self.dashboard(),
            Command::Report(filters) => self.report(&filters),
            Command::Upcoming { limit } => self.upcoming(limit),
            Command::Alerts => self.alerts(),
            Command::Export { output } => self.export(output),
            Command::Import { path } => self.import(path),
            Command::Backup { note } => {
                let portfolio = self.storage.load()?;
                let info = self.storage.backup(&portfolio, note.as_deref())?;
                output::success(format!("Backup written to {}", info.path.display()));
                Ok(())
            }
            Command::Backups => {
                let backups = self.storage.list_backups()?;
                if backups.is_empty() {
                    output::line("No backups yet.");
                }
                for backup in backups {
                    output::line(format!("{}  {}", backup.created_at, backup.id));
                }
                Ok(())
            }
            Command::Restore { id } => {
                let backup = self
                    .storage
                    .list_backups()?
                    .into_iter()
                    .find(|info| info.id == id || info.id.starts_with(&id))
                    .ok_or_else(|| AppError::Input(format!("no backup named `{id}`")))?;
                let restored = self.storage.restore(&backup)?;
                output::success(format!(
                    "Restored {} boletos from {}",
                    restored.len(),
                    backup.id
                ));
                Ok(())
            }
            Command::Config(command) => self.configure(command),
        }
    }

    fn presenter(&self) -> Presenter {
        Presenter {
            formatter: LocaleFormatter::for_locale(&self.config.locale),
            currency: self.config.currency.clone(),
            today: self.clock.today(),
            due_soon_days: self.config.due_soon_days,
        }
    }

    fn anchor(&self) -> Result<ScheduleAnchor, AppError> {
        self.config
            .default_schedule_anchor
            .parse::<ScheduleAnchor>()
            .map_err(|err| AppError::Input(err.to_string()))
    }

    fn add(&self, args: AddArgs) -> Result<(), AppError> {
        let header = BoletoHeader {
            client_name: args.client,
            total_value: args.total,
            down_payment: args.down,
            down_payment_method: args.down_method,
            installment_count: args.count,
            installment_method: args.method,
            start_date: args.start,
        };
        let boleto = ScheduleService::create(&header, self.clock.now(), self.anchor()?)
            .map_err(CoreError::from)?;
        let portfolio = self.storage.load()?;
        let next = PortfolioService::add(&portfolio, boleto.clone());
        self.storage.save(&next)?;
        info!(id = %boleto.id, "registered boleto");

        let presenter = self.presenter();
        output::success(format!(
            "Registered boleto {} for {}",
            short_id(&boleto),
            boleto.client_name
        ));
        for line in presenter.boleto_detail(&boleto) {
            output::line(line);
        }
        Ok(())
    }

    fn list(&self, filters: &FilterArgs) -> Result<(), AppError> {
        let portfolio = self.filtered(filters)?;
        if portfolio.is_empty() {
            output::line("No boletos found.");
            return Ok(());
        }
        let presenter = self.presenter();
        for boleto in &portfolio {
            output::line(presenter.boleto_row(boleto));
        }
        Ok(())
    }

    fn show(&self, id: &str) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let id = PortfolioService::resolve_id(&portfolio, id)?;
        let boleto = PortfolioService::get(&portfolio, id)?;
        for line in self.presenter().boleto_detail(boleto) {
            output::line(line);
        }
        Ok(())
    }

    fn pay(&self, id: &str, number: usize) -> Result<(), AppError> {
        let index = installment_index(number)?;
        let portfolio = self.storage.load()?;
        let id = PortfolioService::resolve_id(&portfolio, id)?;
        let next =
            PortfolioService::update(&portfolio, id, |boleto| BoletoService::mark_paid(boleto, index))?;
        self.storage.save(&next)?;

        let boleto = PortfolioService::get(&next, id)?;
        let paid = boleto.installments[index].paid;
        output::success(format!(
            "Installment #{} of {} marked {}",
            number,
            boleto.client_name,
            if paid { "paid" } else { "unpaid" }
        ));
        if boleto.is_fully_paid() {
            output::success(format!("{} is fully paid", boleto.client_name));
        }
        Ok(())
    }

    fn edit(&self, args: EditArgs) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let id = PortfolioService::resolve_id(&portfolio, &args.id)?;
        let current = PortfolioService::get(&portfolio, id)?;
        let mut header = current.header();
        if let Some(client) = args.client {
            header.client_name = client;
        }
        if let Some(total) = args.total {
            header.total_value = total;
        }
        if let Some(down) = args.down {
            header.down_payment = down;
        }
        if let Some(method) = args.down_method {
            header.down_payment_method = method;
        }
        if let Some(count) = args.count {
            header.installment_count = count;
        }
        if let Some(method) = args.method {
            header.installment_method = method;
        }
        if let Some(start) = args.start {
            header.start_date = Some(start);
        }
        let anchor = self.anchor()?;
        let next = PortfolioService::update(&portfolio, id, |boleto| {
            BoletoService::edit(boleto, &header, anchor)
        })?;
        self.storage.save(&next)?;

        let edited = PortfolioService::get(&next, id)?;
        if edited.installments != current.installments {
            output::warning("Schedule regenerated; previous payments were cleared.");
        }
        output::success(format!("Updated boleto {}", short_id(edited)));
        Ok(())
    }

    fn dashboard(&self) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let presenter = self.presenter();
        let summary =
            SummaryService::dashboard(&portfolio, presenter.today, self.config.upcoming_limit);
        output::section("Dashboard");
        for line in presenter.dashboard(&summary) {
            output::line(line);
        }
        Ok(())
    }

    fn report(&self, filters: &FilterArgs) -> Result<(), AppError> {
        let portfolio = self.filtered(filters)?;
        let presenter = self.presenter();
        let report = SummaryService::report(&portfolio, presenter.today);
        output::section(format!("Report ({})", filters.period));
        for line in presenter.report(&report) {
            output::line(line);
        }
        Ok(())
    }

    fn upcoming(&self, limit: Option<usize>) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let presenter = self.presenter();
        let limit = limit.unwrap_or(self.config.upcoming_limit);
        let upcoming = SummaryService::upcoming_due(&portfolio, limit);
        if upcoming.is_empty() {
            output::line("No upcoming installments.");
        }
        for item in &upcoming {
            output::line(presenter.upcoming(item));
        }
        Ok(())
    }

    fn alerts(&self) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let presenter = self.presenter();
        let alerts = AlertService::alerts(&portfolio, presenter.today, self.config.due_soon_days);
        if alerts.is_empty() {
            output::success("No overdue or due-soon installments.");
            return Ok(());
        }
        let overdue = alerts.iter().filter(|alert| alert.is_overdue()).count();
        output::warning(format!(
            "{} overdue, {} due within {} days",
            overdue,
            alerts.len() - overdue,
            self.config.due_soon_days
        ));
        for alert in &alerts {
            output::line(presenter.alert(alert));
        }
        Ok(())
    }

    fn export(&self, target: Option<PathBuf>) -> Result<(), AppError> {
        let portfolio = self.storage.load()?;
        let bytes = export_portfolio(&portfolio)?;
        let target =
            target.unwrap_or_else(|| PathBuf::from(backup_file_name(self.clock.today())));
        if target.as_os_str() == "-" {
            let mut stdout = std::io::stdout();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
            return Ok(());
        }
        fs::write(&target, bytes)?;
        output::success(format!(
            "Exported {} boletos to {}",
            portfolio.len(),
            target.display()
        ));
        Ok(())
    }

    fn import(&self, path: PathBuf) -> Result<(), AppError> {
        let bytes = fs::read(&path)?;
        let imported = import_portfolio(&bytes)?;
        let current = self.storage.load()?;
        if !current.is_empty() {
            self.storage.backup(&current, Some("before import"))?;
        }
        for warning in portfolio_warnings(&imported) {
            output::warning(warning);
        }
        self.storage.save(&imported)?;
        output::success(format!(
            "Imported {} boletos from {}",
            imported.len(),
            path.display()
        ));
        Ok(())
    }

    fn configure(&self, command: ConfigCommand) -> Result<(), AppError> {
        match command {
            ConfigCommand::Show => {
                for key in Config::KEYS {
                    let value = self.config.get(key).unwrap_or_default();
                    output::line(format!("{key} = {value}"));
                }
            }
            ConfigCommand::Set { key, value } => {
                let mut next = self.config.clone();
                next.set(&key, &value)?;
                self.config_manager
                    .backup(&self.config, Some(&format!("before {key}")))?;
                self.config_manager.save(&next)?;
                output::success(format!(
                    "{key} = {}",
                    next.get(&key).unwrap_or_default()
                ));
            }
            ConfigCommand::Backups => {
                let backups = self.config_manager.list_backups()?;
                if backups.is_empty() {
                    output::line("No config backups yet.");
                }
                for name in backups {
                    output::line(name);
                }
            }
            ConfigCommand::Restore { name } => {
                self.config_manager.restore(&name)?;
                output::success(format!("Restored config from {name}"));
            }
        }
        Ok(())
    }

    fn filtered(&self, filters: &FilterArgs) -> Result<Vec<Boleto>, AppError> {
        let portfolio = self.storage.load()?;
        Ok(apply_filters(
            &portfolio,
            self.clock.as_ref(),
            filters.period,
            filters.status,
            filters.method,
        ))
    }
}

/// Narrows the portfolio by creation period, installment status and method.
pub fn apply_filters(
    portfolio: &[Boleto],
    clock: &dyn Clock,
    period: ReportPeriod,
    status: StatusFilter,
    method: Option<PaymentMethod>,
) -> Vec<Boleto> {
    let by_period = SummaryService::filter_by_period(portfolio, clock.now(), period);
    let by_status = SummaryService::filter_by_status(&by_period, clock.today(), status);
    match method {
        Some(method) => SummaryService::filter_by_method(&by_status, method),
        None => by_status,
    }
}

/// Converts a 1-based installment number as typed by the user into an index.
fn installment_index(number: usize) -> Result<usize, AppError> {
    number
        .checked_sub(1)
        .ok_or_else(|| AppError::Input("installment numbers start at 1".into()))
}
