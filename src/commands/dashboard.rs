//! Performance dashboard screen.
//!
//! Renders the stat cards, the monthly score trend, the per-exercise
//! performance profile and the assigned tests from the injected talent
//! data source, plus personal bests from the local assessment history.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Padding, Paragraph},
};
use std::io;
use std::time::Duration;

use crate::assessment::AssessmentStore;
use crate::commands::data_dir;
use crate::data::{StaticTalentData, TalentData, TestStatus};
use crate::exercise::ExerciseId;
use crate::ui::LOGO;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const UP_FG: Color = Color::Green;
const DOWN_FG: Color = Color::Red;

/// Width of the textual bar in the performance profile.
const PROFILE_CELLS: usize = 20;

/// Displays the performance dashboard.
///
/// # Errors
/// - If the terminal cannot be initialized
/// - If the assessment store cannot be read
pub async fn handle_dashboard() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel Dashboard ===");

    let mut store = AssessmentStore::new(&data_dir()?)?;
    let mut bests: Vec<(ExerciseId, Option<u32>)> = Vec::new();
    for exercise in ExerciseId::all() {
        bests.push((*exercise, store.best_for(*exercise)?));
    }

    run_dashboard(&StaticTalentData, &bests)
}

fn run_dashboard(data: &dyn TalentData, bests: &[(ExerciseId, Option<u32>)]) -> Result<()> {
    let stats = data.dashboard_stats();
    let trend = data.score_trend();
    let profile = data.performance_profile();
    let tests = data.assigned_tests();

    let bests_line: String = bests
        .iter()
        .map(|(exercise, best)| match best {
            Some(reps) => format!("{} {reps}", exercise.title()),
            None => format!("{} —", exercise.title()),
        })
        .collect::<Vec<_>>()
        .join("  ·  ");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, stats_area, charts_area, bests_area, tests_area, footer_area] =
                Layout::vertical([
                    Constraint::Length(3),
                    Constraint::Length(5),
                    Constraint::Length(10),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                ])
                .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            // One bordered card per stat
            let card_areas = Layout::horizontal(vec![
                Constraint::Ratio(1, stats.len() as u32);
                stats.len()
            ])
            .split(stats_area);

            for (stat, card_area) in stats.iter().zip(card_areas.iter()) {
                let trend_style = if stat.trending_up() {
                    Style::default().fg(UP_FG)
                } else {
                    Style::default().fg(DOWN_FG)
                };
                let card = Paragraph::new(vec![
                    Line::styled(
                        stat.value.to_string(),
                        Style::default().fg(FG).add_modifier(Modifier::BOLD),
                    ),
                    Line::styled(stat.label, Style::default().fg(DIM_FG)),
                    Line::styled(stat.trend, trend_style),
                ])
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
                frame.render_widget(card, *card_area);
            }

            let [trend_area, profile_area] =
                Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .areas(charts_area);

            // Monthly score trend
            let bars: Vec<(&str, u64)> = trend
                .iter()
                .map(|point| (point.month, point.score as u64))
                .collect();
            let chart = BarChart::default()
                .block(
                    Block::default()
                        .title(" Score Trend ")
                        .borders(Borders::ALL),
                )
                .data(&bars)
                .bar_width(5)
                .bar_gap(2)
                .max(100)
                .bar_style(Style::default().fg(ACCENT))
                .value_style(Style::default().fg(BG).bg(ACCENT));
            frame.render_widget(chart, trend_area);

            // Per-exercise performance profile
            let profile_lines: Vec<Line> = profile
                .iter()
                .map(|axis| {
                    let filled = (axis.score as usize * PROFILE_CELLS) / 100;
                    let mut bar = String::new();
                    for i in 0..PROFILE_CELLS {
                        bar.push(if i < filled { '█' } else { '░' });
                    }
                    Line::from(vec![
                        Span::styled(format!("{:<10}", axis.label), Style::default().fg(DIM_FG)),
                        Span::styled(bar, Style::default().fg(ACCENT)),
                        Span::styled(format!(" {}", axis.score), Style::default().fg(FG)),
                    ])
                })
                .collect();
            let profile_paragraph = Paragraph::new(profile_lines).block(
                Block::default()
                    .title(" Performance Profile ")
                    .borders(Borders::ALL)
                    .padding(Padding::uniform(1)),
            );
            frame.render_widget(profile_paragraph, profile_area);

            // Personal bests from the local assessment history
            let bests_paragraph = Paragraph::new(format!("Personal bests:  {bests_line}"))
                .style(Style::default().fg(ACCENT));
            frame.render_widget(bests_paragraph, bests_area);

            // Assigned tests
            let test_lines: Vec<Line> = tests
                .iter()
                .map(|test| {
                    let status_style = match test.status {
                        TestStatus::Completed => Style::default().fg(UP_FG),
                        TestStatus::InProgress => Style::default().fg(Color::Yellow),
                        TestStatus::Pending => Style::default().fg(ACCENT),
                        TestStatus::Upcoming => Style::default().fg(DIM_FG),
                    };
                    let mut spans = vec![
                        Span::styled(format!("[{}] ", test.status.label()), status_style),
                        Span::styled(test.name, Style::default().fg(FG)),
                    ];
                    if let Some(score) = test.score {
                        spans.push(Span::styled(
                            format!("  score {score}"),
                            Style::default().fg(ACCENT),
                        ));
                    }
                    if let Some(assigned) = test.assigned {
                        spans.push(Span::styled(
                            format!("  assigned {assigned}"),
                            Style::default().fg(DIM_FG),
                        ));
                    }
                    Line::from(spans)
                })
                .collect();
            let tests_paragraph = Paragraph::new(test_lines).block(
                Block::default()
                    .title(" Assigned Tests ")
                    .borders(Borders::ALL)
                    .padding(Padding::uniform(1)),
            );
            frame.render_widget(tests_paragraph, tests_area);

            let footer = Paragraph::new("esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(DIM_FG));
            frame.render_widget(footer, footer_area);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
