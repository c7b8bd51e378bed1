//! fleetswitch - terminal rendition of the fleetswitch marketing site
//!
//! Reads navigation, calculator and contact commands from standard input and
//! renders the resulting pages to standard output. Analytics records go to
//! the log.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use fleetswitch::analytics::TracingSink;
use fleetswitch::error::{Error, Result};
use fleetswitch::logging::init_tracing;
use fleetswitch::{CalculatorField, Config, ContactForm, Site, TerminalSurface};

const HELP: &str = "commands:
  go <page>                 navigate (home, solutions, models, calculator, contact)
  #<page>                   change the address fragment
  set <field> <value>       calculator input (diesel_cost, monthly_km, vehicle_count, model)
  calc                      recalculate now
  contact name|email|phone[|company|message]
  help | quit";

/// One line of terminal input
#[derive(Debug, PartialEq)]
enum Command {
    Go(String),
    Fragment(String),
    Set(CalculatorField, String),
    Calc,
    Contact(ContactForm),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.starts_with('#') {
            return Ok(Some(Command::Fragment(line.to_string())));
        }

        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word {
            "go" => Command::Go(rest.to_string()),
            "set" => {
                let (field, value) = rest
                    .split_once(' ')
                    .ok_or_else(|| Error::validation("usage: set <field> <value>"))?;
                let field = CalculatorField::parse(field)
                    .ok_or_else(|| Error::validation(format!("unknown field: {}", field)))?;
                Command::Set(field, value.trim().to_string())
            },
            "calc" => Command::Calc,
            "contact" => Command::Contact(parse_contact(rest)?),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(Error::validation(format!("unknown command: {}", other))),
        };
        Ok(Some(command))
    }
}

fn parse_contact(rest: &str) -> Result<ContactForm> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(Error::validation(
            "usage: contact name|email|phone[|company|message]",
        ));
    }

    let mut form = ContactForm::new(parts[0], parts[1], parts[2]);
    if let Some(company) = parts.get(3).filter(|c| !c.is_empty()) {
        form = form.with_company(*company);
    }
    if let Some(message) = parts.get(4).filter(|m| !m.is_empty()) {
        form = form.with_message(*message);
    }
    Ok(form)
}

fn run_command(site: &mut Site, surface: &TerminalSurface, command: Command) -> Result<()> {
    use fleetswitch::RenderSurface;

    match command {
        Command::Go(page) => {
            site.router_mut().handle_link_click(&page);
        },
        Command::Fragment(fragment) => {
            surface.set_fragment(&fragment);
            site.router_mut().handle_external_route_change();
        },
        Command::Set(field, value) => site.router().calculator_input(field, &value)?,
        Command::Calc => {
            site.router().recalculate()?;
        },
        Command::Contact(form) => {
            let pending = site.router().begin_contact_submission(&form)?;
            tokio::spawn(async move {
                // The outcome is reported to the visitor and logged by send
                let _ = pending.send().await;
            });
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {},
    }
    Ok(())
}

// One thread drives the router, debounced work and submissions in turn
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Arc::new(Config::from_env()?);

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    init_tracing(&config.site.log_level, &config.site.environment)?;

    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting fleetswitch");

    let surface = Arc::new(TerminalSurface::new(""));
    let mut site = Site::new(config, surface.clone(), Arc::new(TracingSink::new()));
    let maintenance = site.spawn_maintenance();
    site.start();
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received CTRL+C, shutting down");
                break;
            },
        };
        let Some(line) = line else { break };

        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = run_command(&mut site, &surface, command) {
                    tracing::warn!(error = %e, error_type = e.error_type(), "Command failed");
                }
            },
            Ok(None) => {},
            Err(e) => println!("{}", e),
        }
    }

    maintenance.abort();
    tracing::info!("fleetswitch shutdown complete");
    Ok(())
}
