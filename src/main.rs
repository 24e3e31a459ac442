use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use pane_kit::collaborators::ConfirmDialog;
use pane_kit::config::PaneConfig;
use pane_kit::drivers::{FileTransport, MemoryDrivers};
use pane_kit::render::{ConfirmOverlay, PaneView, render_pane};
use pane_kit::tracing_sub::{self, LogBuffer};
use pane_kit::{
    CallParams, LoadOption, LoadStep, PaneBuilder, PaneError, PaneManager, PaneOption,
    RequestSettings,
};

const EDIT_SUFFIX: &str = " (edited)";
const FORM_CONTAINER: &str = "contact";

/// Drive a single pane served from a directory.
#[derive(Debug, Parser)]
#[command(name = "pane-demo", version, about)]
struct Args {
    /// Directory request paths are served from.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Load source of the pane; overrides the configuration file.
    #[arg(long)]
    url: Option<String>,
    /// Pane id.
    #[arg(long, default_value = "demo")]
    id: String,
    /// JSON file with pane options.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target of the `s` (submit) key.
    #[arg(long, default_value = "/save.html")]
    submit_url: String,
}

/// The submit response is rendered into the form so an error message in it
/// keeps the edited fields highlighted.
fn submit_params(url: String) -> CallParams {
    CallParams::new(FORM_CONTAINER, RequestSettings::new(url))
        .keep_modified_if_exists("div.error")
        .render_response(true)
}

struct App {
    manager: PaneManager,
    drivers: MemoryDrivers,
    overlay: ConfirmOverlay,
    log: LogBuffer,
    id: String,
    submit_url: String,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let log = LogBuffer::default();
    tracing_sub::set_global_log(log.clone());
    tracing_sub::init_default();

    let mut app = App::new(args, log).map_err(io::Error::other)?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

impl App {
    fn new(args: Args, log: LogBuffer) -> Result<Self, PaneError> {
        let mut config = match &args.config {
            Some(path) => PaneConfig::from_json_file(path)?,
            None => PaneConfig {
                enable_pane_header: true,
                pane_header_title: "Demo pane".to_string(),
                ..PaneConfig::default()
            },
        };
        if let Some(url) = args.url {
            config.pane_action_url = url;
        } else if config.pane_action_url.trim().is_empty() {
            config.pane_action_url = "/pane.html".to_string();
        }

        let drivers = MemoryDrivers::new();
        drivers.form.insert_field(&args.id, None, "name", "Ada Lovelace");
        drivers
            .form
            .insert_field(&args.id, Some(FORM_CONTAINER), "email", "ada@example.com");

        let env = drivers.environment(Box::new(FileTransport::new(&args.root)));
        let mut manager = PaneManager::new(env);
        manager.create(PaneBuilder::new(args.id.clone()).config(config).on_after_load(
            |event| {
                tracing::info!(
                    pane_id = event.pane_id,
                    container = event.container_id.unwrap_or("-"),
                    "after pane load"
                );
            },
        ))?;

        Ok(Self {
            manager,
            drivers,
            overlay: ConfirmOverlay::new(),
            log,
            id: args.id,
            submit_url: args.submit_url,
        })
    }

    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        loop {
            self.manager.pump();
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if self.drivers.dialog.is_open() {
                if let Some(action) = self.overlay.handle_key(&key) {
                    self.manager.answer_dialog(action);
                }
                continue;
            }
            if key.code == KeyCode::Char('q') {
                return Ok(());
            }
            if let Err(err) = self.handle_key(key.code) {
                tracing::warn!(error = %err, "command failed");
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<(), PaneError> {
        let submit_url = self.submit_url.clone();
        let mut pane = self.manager.try_pane_mut(&self.id)?;
        let mut step = None;
        match code {
            KeyCode::Char('r') => step = Some(pane.load(LoadOption::PromptOnlyIfModified)),
            KeyCode::Char('R') => step = Some(pane.load(LoadOption::PromptAlways)),
            KeyCode::Char('n') => step = Some(pane.load(LoadOption::NoPrompt)),
            KeyCode::Char('d') => {
                if pane.config().disable {
                    pane.enable();
                } else {
                    pane.disable();
                }
            }
            KeyCode::Char('o') => {
                let flag = !pane.config().readonly;
                pane.read_only(None, flag);
            }
            KeyCode::Char('h') => {
                let flag = !pane.config().highlight_modifications;
                pane.set_option(PaneOption::HighlightModifications(flag))?;
            }
            KeyCode::Char('e') => {
                let form = &self.drivers.form;
                let value = form.value(&self.id, "name").unwrap_or_default();
                let edited = match value.strip_suffix(EDIT_SUFFIX) {
                    Some(original) => original.to_string(),
                    None => format!("{value}{EDIT_SUFFIX}"),
                };
                form.set_value(&self.id, "name", &edited);
                form.set_value(&self.id, "email", &edited.replace(' ', ".").to_lowercase());
                let highlight = pane.config().highlight_modifications;
                pane.set_option(PaneOption::HighlightModifications(highlight))?;
            }
            KeyCode::Char('s') => {
                pane.call(submit_params(submit_url))?;
            }
            _ => {}
        }
        if step == Some(LoadStep::Prompting) {
            self.overlay.reset();
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [pane_area, log_area, help_area] = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        if let Some(view) = PaneView::capture(&mut self.manager, &self.drivers, &self.id) {
            render_pane(frame, pane_area, &view);
        }
        let lines: Vec<Line> = self
            .log
            .tail(usize::from(log_area.height))
            .into_iter()
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(lines), log_area);
        frame.render_widget(
            Paragraph::new(
                "r reload  R reload (always ask)  n reload now  d disable  o read-only  \
                 h highlight  e edit  s submit  q quit",
            ),
            help_area,
        );

        if self.drivers.dialog.is_open() {
            self.overlay.render(
                frame,
                pane_area,
                &self.drivers.dialog.title(),
                &self.drivers.dialog.body(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_renders_the_response_it_inspects() {
        let params = submit_params("/save.html".into());
        assert_eq!(params.container_id, FORM_CONTAINER);
        assert_eq!(params.keep_modified_if_exist_in_dom.as_deref(), Some("div.error"));
        assert!(params.render_response);
    }
}
