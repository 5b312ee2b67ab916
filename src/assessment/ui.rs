//! Interactive terminal UI for browsing assessment history.
//!
//! Provides a scrollable list of completed assessments with keyboard
//! navigation.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;

use crate::ui::LOGO;

use super::AssessmentEntry;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const TIMESTAMP_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// Interactive viewer for assessment entries.
pub struct AssessmentViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entries: Vec<AssessmentEntry>,
    list_state: ListState,
}

impl AssessmentViewer {
    /// Creates a new viewer with the given entries.
    pub fn new(entries: Vec<AssessmentEntry>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            entries,
            list_state,
        })
    }

    /// Runs the interactive viewer loop.
    pub fn run(&mut self) -> Result<()> {
        if self.entries.is_empty() {
            self.cleanup()?;
            return Ok(());
        }

        tracing::debug!("Assessment viewer started with {} entries", self.entries.len());

        loop {
            self.draw()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Up => self.list_state.select_previous(),
                        KeyCode::Down => self.list_state.select_next(),
                        _ => {}
                    }
                }
            }
        }

        self.cleanup()?;
        Ok(())
    }

    /// Renders the current state of the viewer.
    fn draw(&mut self) -> Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, list_area, footer_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            let items: Vec<ListItem> = self
                .entries
                .iter()
                .map(|entry| {
                    let timestamp = Line::styled(
                        entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        Style::default().fg(TIMESTAMP_FG),
                    );
                    let mut summary = format!("{} — {} reps", entry.exercise.title(), entry.reps);
                    if let Some(video) = &entry.video_path {
                        summary.push_str(&format!("  ({video})"));
                    }
                    let text = Line::styled(summary, Style::default().fg(FG));
                    ListItem::new(vec![timestamp, text])
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Assessments ")
                        .borders(Borders::ALL)
                        .padding(Padding::bottom(1)),
                )
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ")
                .highlight_spacing(HighlightSpacing::Always);

            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            let help_paragraph = Paragraph::new("↑↓ select, esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(HELP_FG));
            frame.render_widget(help_paragraph, footer_area);
        })?;

        Ok(())
    }

    /// Cleans up terminal and restores normal mode.
    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for AssessmentViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
