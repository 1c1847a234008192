//! Terminal UI for Ecoleta that lets organizations register waste collection points.

mod app;
mod config;
#[cfg(test)]
mod fakes;
mod input;
mod logging;
mod map;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ecoleta_core::{backends::Backends, model::Coordinate, ports::GeolocationPort};
use ecoleta_provider_backend::BackendCatalogPort;
use ecoleta_provider_geoip::{DisabledGeolocationPort, FixedGeolocationPort, IpGeolocationPort};
use ecoleta_provider_ibge::IbgeGeographyPort;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{error, info};

use crate::app::App;
use crate::config::{Cli, Config, GeolocationSetting};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let _log_guard = logging::init(&config.log_path())?;
    info!(api_url = %config.api_url, geo_url = %config.geo_url, "starting ecoleta");

    // HTTP + client setup
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .build()?;
    let backends = build_backends(&config, &client);

    // App state
    let app = App::new(backends, config.default_center);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "ecoleta stopped with an error");
    } else {
        info!("ecoleta stopped");
    }
    res
}

fn build_backends(config: &Config, client: &Client) -> Backends {
    let geolocation: Arc<dyn GeolocationPort> = match &config.geolocation {
        GeolocationSetting::Auto { lookup_url } => {
            Arc::new(IpGeolocationPort::new(client.clone(), lookup_url.clone()))
        }
        GeolocationSetting::Fixed {
            latitude,
            longitude,
        } => Arc::new(FixedGeolocationPort::new(Coordinate::new(
            *latitude, *longitude,
        ))),
        GeolocationSetting::Disabled => Arc::new(DisabledGeolocationPort),
    };

    Backends::new(
        Arc::new(IbgeGeographyPort::with_base_url(
            client.clone(),
            config.geo_url.clone(),
        )),
        Arc::new(BackendCatalogPort::new(client.clone(), config.api_url.clone())),
        geolocation,
    )
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Merge finished lookups before drawing
        app.sync();

        // Draw current UI
        let completed = terminal.draw(|frame| ui::draw(frame, &app))?;
        app.viewport = completed.area;

        // Poll for input (small timeout so background results show up promptly)
        if !event::poll(StdDuration::from_millis(100))? {
            continue;
        }

        let action = match event::read()? {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                input::handle_key_event(key, &mut app)
            }
            CEvent::Mouse(mouse) => input::handle_mouse_event(mouse, &mut app),
            _ => Action::None,
        };

        if action == Action::Quit {
            break;
        }
    }

    Ok(())
}
