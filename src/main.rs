mod api;
mod cli_messages;
mod config;
mod confirm;
mod consts;
mod environment;
mod error_classifier;
mod events;
mod logging;
mod session;
mod store;
mod ui;
mod workers;

use crate::api::{ApiClient, HistoryRange, PumpState, RigApi};
use crate::config::{Config, get_config_path};
use crate::confirm::{AutoConfirm, Confirm, StdinConfirm};
use crate::environment::Environment;
use crate::events::{Event, EventType};
use crate::session::{ConfirmMode, run_headless_mode, run_tui_mode, setup_session};
use crate::store::DashboardStore;
use crate::ui::dashboard::view::humanize_alert_type;
use crate::workers::{CommandDispatcher, DispatchError, EventSender, ReportController, WorkerConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about = "Monitor and control a DualFarm rig", long_about = None)]
/// Command-line arguments
struct Args {
    /// Rig API base URL. Overrides the config file and DUALFARM_ENVIRONMENT.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Operator name recorded with every command.
    #[arg(long, global = true, value_name = "NAME")]
    user: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the live dashboard
    Start {
        /// Stream activity and status lines to stdout instead of the dashboard
        #[arg(long, default_value_t = false)]
        headless: bool,

        /// Paint the dashboard background
        #[arg(long, default_value_t = false)]
        with_background: bool,

        /// Skip confirmation prompts
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Print the current reading, simulator state and active alerts
    Status,
    /// Turn the water pump on or off
    Pump {
        #[arg(value_enum)]
        state: PumpArg,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Dose nutrients (10-1000 ml, in steps of 10)
    Dose {
        /// Amount in ml
        amount: u32,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Control the telemetry simulator
    Simulator {
        #[arg(value_enum)]
        action: SimulatorAction,
    },
    /// Generate and print the rig report
    Report,
    /// Download sensor data as CSV
    Export {
        /// Directory to write to. Defaults to the configured export directory.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// List recent sensor readings
    History {
        #[arg(long, value_enum, default_value_t = HistoryRange::Hour)]
        range: HistoryRange,
    },
    /// List active alerts
    Alerts {
        /// Include resolved alerts
        #[arg(long, default_value_t = false)]
        history: bool,
    },
    /// List recent control actions
    Actions,
    /// Save settings to the config file. `--api-url` and `--user` are saved too.
    Configure {
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        #[arg(long, value_name = "MS")]
        poll_interval_ms: Option<u64>,
    },
    /// Delete the config file
    ResetConfig,
}

#[derive(Copy, Clone, ValueEnum)]
enum PumpArg {
    On,
    Off,
}

impl From<PumpArg> for PumpState {
    fn from(arg: PumpArg) -> Self {
        match arg {
            PumpArg::On => PumpState::On,
            PumpArg::Off => PumpState::Off,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SimulatorAction {
    Start,
    Stop,
    Toggle,
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            crate::print_cmd_error!("dualfarm failed", &e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = get_config_path()?;

    if let Command::ResetConfig = args.command {
        Config::clear(&config_path)?;
        crate::print_cmd_success!("Config cleared", "{}", config_path.display());
        return Ok(());
    }

    let mut config = Config::load_or_default(&config_path)
        .map_err(|e| format!("Failed to load {}: {}", config_path.display(), e))?;

    if let Command::Configure {
        export_dir,
        poll_interval_ms,
    } = &args.command
    {
        if let Some(url) = &args.api_url {
            config.api_url = Some(parse_api_url(url)?.api_url());
        }
        if let Some(user) = &args.user {
            config.user = user.clone();
        }
        if let Some(dir) = export_dir {
            config.export_dir = Some(dir.clone());
        }
        if let Some(ms) = poll_interval_ms {
            config.poll_interval_ms = *ms;
        }
        config.save(&config_path)?;
        crate::print_cmd_success!("Config saved", "{}", config_path.display());
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // Precedence: --api-url, then the config file, then DUALFARM_ENVIRONMENT.
    let fallback = std::env::var("DUALFARM_ENVIRONMENT")
        .ok()
        .and_then(|s| s.parse::<Environment>().ok())
        .unwrap_or_default();
    let environment = match &args.api_url {
        Some(url) => parse_api_url(url)?,
        None => config.resolve_environment(fallback),
    };
    if let Some(user) = &args.user {
        config.user = user.clone();
    }
    let worker_config = WorkerConfig::from_config(&config);

    match args.command {
        Command::Start {
            headless,
            with_background,
            yes,
        } => {
            let confirm_mode = if yes || headless {
                ConfirmMode::Auto(true)
            } else {
                ConfirmMode::Dashboard
            };
            let session = setup_session(environment, worker_config, confirm_mode).await?;
            if headless {
                run_headless_mode(session).await
            } else {
                run_tui_mode(session, with_background).await
            }
        }
        command => {
            let mut ctx = OneShot::new(environment, worker_config)?;
            let result = ctx.execute(command).await;
            ctx.print_failures();
            result
        }
    }
}

fn parse_api_url(url: &str) -> Result<Environment, String> {
    url.parse::<Environment>()
        .map_err(|_| format!("Invalid API URL '{}': expected http(s)://host[:port]", url))
}

/// Everything a single non-interactive command needs.
struct OneShot {
    api: Arc<dyn RigApi>,
    store: DashboardStore,
    events: EventSender,
    event_receiver: mpsc::Receiver<Event>,
    worker_config: WorkerConfig,
}

impl OneShot {
    fn new(environment: Environment, worker_config: WorkerConfig) -> Result<Self, Box<dyn Error>> {
        let (events, event_receiver) = EventSender::channel();
        Ok(Self {
            api: Arc::new(ApiClient::new(environment)?),
            store: DashboardStore::new(),
            events,
            event_receiver,
            worker_config,
        })
    }

    fn dispatcher(&self, yes: bool) -> CommandDispatcher {
        let confirm: Arc<dyn Confirm> = if yes {
            Arc::new(AutoConfirm(true))
        } else {
            Arc::new(StdinConfirm)
        };
        CommandDispatcher::new(
            Arc::clone(&self.api),
            self.store.clone(),
            confirm,
            self.events.clone(),
            self.worker_config.user.clone(),
        )
    }

    fn reports(&self, export_dir: Option<PathBuf>) -> ReportController {
        ReportController::new(
            Arc::clone(&self.api),
            self.store.clone(),
            self.events.clone(),
            export_dir.unwrap_or_else(|| self.worker_config.export_dir.clone()),
        )
    }

    /// Prints the background failures the command swallowed (refresh, export).
    fn print_failures(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if event.event_type == EventType::Error {
                crate::print_cmd_warn!("Background task failed", "{}", event.msg);
            }
        }
    }

    /// Reports a dispatcher outcome the way the dashboard banner would.
    fn finish_command(&self, result: Result<(), DispatchError>) -> Result<(), Box<dyn Error>> {
        match result {
            Ok(()) => {
                let message = self.store.message().unwrap_or_default();
                crate::print_cmd_success!("Done", "{}", message);
                Ok(())
            }
            Err(DispatchError::Declined) => {
                crate::print_cmd_info!("Cancelled", "no command was sent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn execute(&self, command: Command) -> Result<(), Box<dyn Error>> {
        match command {
            Command::Status => {
                let snapshot = workers::fetch_snapshot(self.api.as_ref()).await?;
                println!("{}", session::headless_mode::status_line(&snapshot));
                for alert in &snapshot.alerts {
                    println!(
                        "  [{}] {}: {}",
                        alert.severity.to_string().to_uppercase(),
                        humanize_alert_type(&alert.alert_type),
                        alert.message
                    );
                }
                Ok(())
            }
            Command::Pump { state, yes } => {
                let result = self.dispatcher(yes).set_pump(state.into()).await;
                self.finish_command(result)
            }
            Command::Dose { amount, yes } => {
                let result = self.dispatcher(yes).dose(amount).await;
                self.finish_command(result)
            }
            Command::Simulator { action } => {
                let dispatcher = self.dispatcher(true);
                let result = match action {
                    SimulatorAction::Start => dispatcher.set_simulator(true).await,
                    SimulatorAction::Stop => dispatcher.set_simulator(false).await,
                    SimulatorAction::Toggle => {
                        // The toggle reads the current state from the store.
                        workers::poller::refresh_now(self.api.as_ref(), &self.store).await?;
                        dispatcher.toggle_simulator().await
                    }
                    SimulatorAction::Status => {
                        let status = self.api.simulator_status().await?;
                        let state = if status.running { "running" } else { "stopped" };
                        crate::print_cmd_info!("Simulator", "{} {}", state, status.message);
                        return Ok(());
                    }
                };
                self.finish_command(result)
            }
            Command::Report => {
                self.reports(None).generate_report().await?;
                if let Some(report) = self.store.report() {
                    println!("{}", report.report_markdown);
                }
                Ok(())
            }
            Command::Export { out } => match self.reports(out).export_csv().await? {
                Some(path) => {
                    crate::print_cmd_success!("CSV exported", "{}", path.display());
                    Ok(())
                }
                None => Err("CSV export failed".into()),
            },
            Command::History { range } => {
                let readings = self.api.reading_history(range).await?;
                crate::print_cmd_info!(
                    "Sensor history",
                    "{} reading(s) over {}",
                    readings.len(),
                    range.as_str()
                );
                for r in readings {
                    println!(
                        "{}  TDS {:>6.0} ppm  {:>5.1} °C  {:>5.1} cm  pump {}",
                        r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        r.tds_ppm,
                        r.temperature_c,
                        r.water_level_cm,
                        r.pump_state
                    );
                }
                Ok(())
            }
            Command::Alerts { history } => {
                let alerts = if history {
                    self.api.alert_history().await?
                } else {
                    self.api.latest_alerts().await?
                };
                if alerts.is_empty() {
                    crate::print_cmd_info!("Alerts", "none");
                }
                for alert in alerts {
                    let state = if alert.is_active { "active" } else { "resolved" };
                    println!(
                        "{}  [{}] {} ({}): {}",
                        alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        alert.severity.to_string().to_uppercase(),
                        humanize_alert_type(&alert.alert_type),
                        state,
                        alert.message
                    );
                }
                Ok(())
            }
            Command::Actions => {
                for action in self.api.control_history().await? {
                    println!(
                        "{}  {:<6} {:<8} by {}",
                        action.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        action.action_type,
                        action.action_value,
                        action.user
                    );
                }
                Ok(())
            }
            Command::Start { .. } | Command::Configure { .. } | Command::ResetConfig => {
                Err("command needs no rig session".into())
            }
        }
    }
}
