//! Terminal user interface for the recording studio.
//!
//! Renders the exercise list, the live rep counter and the preview actions,
//! and translates key presses into recording commands for the flow.

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::capture::VideoHandle;
use crate::exercise::ExerciseId;
use crate::flow::Stage;

use super::LOGO;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const RECORD_FG: Color = Color::Red;
const PREVIEW_FG: Color = Color::Green;

/// User input command on the recording screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCommand {
    /// No actionable key pressed
    Continue,
    /// Record or stop, depending on the current state (r / Enter)
    ToggleRecord,
    /// Accept the preview and upload (u)
    Upload,
    /// Discard the preview and return to idle (t)
    Retake,
    /// Move exercise selection up
    SelectPrev,
    /// Move exercise selection down
    SelectNext,
    /// Leave the recording screen (Escape / q)
    Cancel,
}

/// Snapshot of the flow state for rendering one frame.
pub struct RecordView<'a> {
    pub stage: Stage,
    pub exercise: ExerciseId,
    pub rep_count: u32,
    pub video: Option<&'a VideoHandle>,
    /// Time spent in the recording state
    pub elapsed: Duration,
    /// Transient message shown under the stage panel (e.g. a start failure)
    pub notice: Option<String>,
}

/// Terminal UI for the recording studio.
pub struct RecordTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    list_state: ListState,
}

impl RecordTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(RecordTui {
            terminal,
            list_state: ListState::default(),
        })
    }

    /// Renders the recording screen from the given view snapshot.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, view: &RecordView) -> anyhow::Result<()> {
        let selected = ExerciseId::all()
            .iter()
            .position(|e| *e == view.exercise)
            .unwrap_or(0);
        self.list_state.select(Some(selected));

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, body_area, footer_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            let [list_area, stage_area] =
                Layout::horizontal([Constraint::Length(32), Constraint::Min(0)]).areas(body_area);

            let items: Vec<ListItem> = ExerciseId::all()
                .iter()
                .map(|exercise| {
                    let title = Line::styled(
                        format!("{} {}", exercise.icon(), exercise.title()),
                        Style::default().fg(FG),
                    );
                    let description =
                        Line::styled(exercise.description(), Style::default().fg(DIM_FG));
                    ListItem::new(vec![title, description])
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Select Exercise ")
                        .borders(Borders::ALL)
                        .padding(Padding::uniform(1)),
                )
                .highlight_style(Style::default().bg(Color::Rgb(20, 20, 20)).fg(ACCENT))
                .highlight_symbol("> ");

            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            Self::render_stage(frame, stage_area, view);

            let footer = Paragraph::new(Self::footer_line(view))
                .alignment(Alignment::Center)
                .style(Style::default().fg(DIM_FG));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Renders the camera panel for the current state.
    fn render_stage(frame: &mut Frame, area: Rect, view: &RecordView) {
        let block = Block::default()
            .title(" Recording Studio ")
            .borders(Borders::ALL)
            .padding(Padding::uniform(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = match view.stage {
            Stage::Idle => vec![
                Line::raw(""),
                Line::styled(
                    format!("Ready to Record {}", view.exercise.title()),
                    Style::default().fg(FG).add_modifier(Modifier::BOLD),
                ),
                Line::styled(
                    "Position yourself in frame and press r",
                    Style::default().fg(DIM_FG),
                ),
            ],
            Stage::Recording => {
                let secs = view.elapsed.as_secs();
                vec![
                    Line::from(vec![
                        Span::styled("● REC ", Style::default().fg(RECORD_FG)),
                        Span::styled(
                            format!("{}:{:02}", secs / 60, secs % 60),
                            Style::default().fg(FG),
                        ),
                    ]),
                    Line::raw(""),
                    Line::styled(
                        format!("{} Detected", view.exercise.title()),
                        Style::default().fg(ACCENT),
                    ),
                    Line::styled(
                        format!("{}", view.rep_count),
                        Style::default().fg(FG).add_modifier(Modifier::BOLD),
                    ),
                ]
            }
            Stage::Preview => {
                let mut lines = vec![
                    Line::styled("Preview", Style::default().fg(PREVIEW_FG)),
                    Line::raw(""),
                    Line::styled(
                        format!("{}: {} reps", view.exercise.title(), view.rep_count),
                        Style::default().fg(FG),
                    ),
                ];
                if let Some(video) = view.video {
                    lines.push(Line::styled(
                        format!("Video saved at: {video}"),
                        Style::default().fg(DIM_FG),
                    ));
                }
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "u upload · t retake",
                    Style::default().fg(ACCENT),
                ));
                lines
            }
        };

        let mut lines = lines;
        if let Some(notice) = &view.notice {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                notice.clone(),
                Style::default().fg(Color::Yellow),
            ));
        }

        let panel = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true });
        frame.render_widget(panel, inner);
    }

    /// Builds the one-line status footer.
    fn footer_line(view: &RecordView) -> String {
        match view.stage {
            Stage::Idle => "↑↓ exercise · r record · esc/q exit".to_string(),
            Stage::Recording => format!("r stop · reps {} · esc/q exit", view.rep_count),
            Stage::Preview => "u upload · t retake · esc/q exit".to_string(),
        }
    }

    /// Processes user input and returns the appropriate recording command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<RecordCommand> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('r') | KeyCode::Enter => {
                        tracing::debug!("Record toggle pressed");
                        RecordCommand::ToggleRecord
                    }
                    KeyCode::Char('u') => RecordCommand::Upload,
                    KeyCode::Char('t') => RecordCommand::Retake,
                    KeyCode::Up => RecordCommand::SelectPrev,
                    KeyCode::Down => RecordCommand::SelectNext,
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Recording screen exit requested");
                        RecordCommand::Cancel
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        RecordCommand::Cancel
                    }
                    _ => RecordCommand::Continue,
                });
            }
        }
        Ok(RecordCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
