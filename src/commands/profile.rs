//! Athlete profile screen.
//!
//! Shows the locally persisted profile and allows inline editing of its
//! fields. Changes are saved when the screen is left.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::athlete::{Athlete, AthleteStore};
use crate::commands::data_dir;
use crate::ui::LOGO;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const ACCENT: Color = Color::Rgb(185, 207, 212);

/// Editable profile fields, in display order.
const FIELDS: [&str; 4] = ["Name", "Age", "Location", "Sport"];

/// Displays and edits the athlete profile.
///
/// # Errors
/// - If the data directory cannot be determined
/// - If the profile cannot be loaded or saved
pub async fn handle_profile() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel Profile ===");

    let mut store = AthleteStore::new(&data_dir()?)?;
    let athlete = store.load()?;

    let mut viewer = ProfileViewer::new(athlete)?;
    let updated = viewer.run()?;

    store.save(&updated)?;
    tracing::debug!("Profile screen closed");
    Ok(())
}

/// Interactive profile viewer with inline field editing.
struct ProfileViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    athlete: Athlete,
    list_state: ListState,
    /// Whether a field is being edited
    input_mode: bool,
    /// Text input widget for the field under edit
    input: Input,
}

impl ProfileViewer {
    fn new(athlete: Athlete) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Ok(Self {
            terminal,
            athlete,
            list_state,
            input_mode: false,
            input: Input::default(),
        })
    }

    /// Runs the viewer loop and returns the (possibly edited) profile.
    fn run(&mut self) -> Result<Athlete> {
        loop {
            self.draw()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if self.input_mode {
                        match key.code {
                            KeyCode::Enter => {
                                self.commit_field();
                                self.input_mode = false;
                            }
                            KeyCode::Esc => {
                                self.input_mode = false;
                            }
                            _ => {
                                self.input.handle_event(&Event::Key(key));
                            }
                        }
                    } else {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => break,
                            KeyCode::Up => self.list_state.select_previous(),
                            KeyCode::Down => {
                                // The joined-date row is read-only; stop above it
                                let next = self.list_state.selected().unwrap_or(0) + 1;
                                if next < FIELDS.len() {
                                    self.list_state.select(Some(next));
                                }
                            }
                            KeyCode::Enter | KeyCode::Char('e') => {
                                self.input = Input::new(self.selected_value());
                                self.input_mode = true;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        self.cleanup()?;
        Ok(self.athlete.clone())
    }

    fn selected_value(&self) -> String {
        match self.list_state.selected().unwrap_or(0) {
            0 => self.athlete.name.clone(),
            1 => self.athlete.age.to_string(),
            2 => self.athlete.location.clone(),
            _ => self.athlete.sport.clone(),
        }
    }

    /// Writes the edited value back into the profile.
    fn commit_field(&mut self) {
        let value = self.input.value().trim().to_string();
        if value.is_empty() {
            return;
        }
        match self.list_state.selected().unwrap_or(0) {
            0 => self.athlete.name = value,
            1 => {
                // Non-numeric input keeps the previous age
                if let Ok(age) = value.parse::<u32>() {
                    self.athlete.age = age;
                }
            }
            2 => self.athlete.location = value,
            _ => self.athlete.sport = value,
        }
        tracing::debug!("Profile field updated");
    }

    fn draw(&mut self) -> Result<()> {
        let values = [
            self.athlete.name.clone(),
            self.athlete.age.to_string(),
            self.athlete.location.clone(),
            self.athlete.sport.clone(),
        ];
        let joined = self.athlete.join_date.clone();
        let input_mode = self.input_mode;
        let input_value = self.input.value().to_string();
        let selected_field = FIELDS[self.list_state.selected().unwrap_or(0)];

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, list_area, edit_area, footer_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            let mut items: Vec<ListItem> = FIELDS
                .iter()
                .zip(values.iter())
                .map(|(field, value)| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{field:<10}"), Style::default().fg(DIM_FG)),
                        Span::styled(value.clone(), Style::default().fg(FG)),
                    ]))
                })
                .collect();
            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", "Joined"), Style::default().fg(DIM_FG)),
                Span::styled(joined, Style::default().fg(DIM_FG)),
            ])));

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Athlete Profile ")
                        .borders(Borders::ALL)
                        .padding(Padding::uniform(1)),
                )
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            if input_mode {
                let edit_line = Paragraph::new(format!("{selected_field}: {input_value}█"))
                    .style(Style::default().fg(ACCENT));
                frame.render_widget(edit_line, edit_area);
            }

            let help = if input_mode {
                "↵ save field · esc cancel"
            } else {
                "↑↓ select · ↵/e edit · esc/q done"
            };
            let footer = Paragraph::new(help)
                .alignment(Alignment::Center)
                .style(Style::default().fg(DIM_FG));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ProfileViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
