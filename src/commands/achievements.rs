//! Achievements screen.
//!
//! Badge list with category filter, earned-points summary and a rotating
//! motivational quote.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
};
use std::io;
use std::time::{Duration, Instant};

use crate::data::{Achievement, StaticTalentData, TalentData};
use crate::ui::LOGO;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const EARNED_FG: Color = Color::Green;

/// How long each motivational quote stays on screen.
const QUOTE_ROTATION: Duration = Duration::from_secs(4);

/// Width of the textual progress bar for unearned badges.
const PROGRESS_CELLS: usize = 20;

fn categories(achievements: &[Achievement]) -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = Vec::new();
    for achievement in achievements {
        if !categories.contains(&achievement.category) {
            categories.push(achievement.category);
        }
    }
    categories
}

/// Renders a textual progress bar like `████░░░░ 43%`.
fn progress_bar(progress: u8) -> String {
    let filled = (progress as usize * PROGRESS_CELLS) / 100;
    let mut bar = String::new();
    for i in 0..PROGRESS_CELLS {
        bar.push(if i < filled { '█' } else { '░' });
    }
    format!("{bar} {progress}%")
}

/// Displays the achievements screen.
///
/// # Errors
/// - If the terminal cannot be initialized
pub async fn handle_achievements() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel Achievements ===");

    run_achievements(&StaticTalentData)
}

fn run_achievements(data: &dyn TalentData) -> Result<()> {
    let achievements = data.achievements();
    let quotes = data.quotes();
    let all_categories = categories(&achievements);

    let earned_count = achievements.iter().filter(|a| a.earned).count();
    let total_points: u32 = achievements
        .iter()
        .filter(|a| a.earned)
        .map(|a| a.points)
        .sum();

    let mut filter: Option<usize> = None;
    let mut quote_index = 0;
    let mut quote_changed = Instant::now();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        if quote_changed.elapsed() >= QUOTE_ROTATION {
            quote_index = (quote_index + 1) % quotes.len();
            quote_changed = Instant::now();
        }

        let category = filter.map(|i| all_categories[i]);
        let visible: Vec<&Achievement> = achievements
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .collect();

        terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, summary_area, list_area, quote_area, footer_area] =
                Layout::vertical([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            let summary = Paragraph::new(format!(
                "{earned_count} of {} achievements earned · {total_points} points",
                achievements.len()
            ))
            .style(Style::default().fg(ACCENT));
            frame.render_widget(summary, summary_area);

            let items: Vec<ListItem> = visible
                .iter()
                .map(|achievement| {
                    let title_style = if achievement.earned {
                        Style::default().fg(EARNED_FG)
                    } else {
                        Style::default().fg(FG)
                    };
                    let marker = if achievement.earned { "✔" } else { " " };
                    let title = Line::from(vec![
                        Span::styled(format!("{marker} "), title_style),
                        Span::styled(achievement.title, title_style),
                        Span::styled(
                            format!("  [{}]", achievement.category),
                            Style::default().fg(DIM_FG),
                        ),
                        Span::styled(
                            format!("  {} pts", achievement.points),
                            Style::default().fg(ACCENT),
                        ),
                    ]);
                    let detail = match achievement.progress {
                        Some(progress) => Line::styled(
                            format!("  {}", progress_bar(progress)),
                            Style::default().fg(DIM_FG),
                        ),
                        None => Line::raw(""),
                    };
                    ListItem::new(vec![title, detail])
                })
                .collect();

            let title = format!(" Achievements — {} ", category.unwrap_or("all"));
            let list = List::new(items).block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .padding(Padding::uniform(1)),
            );
            frame.render_widget(list, list_area);

            let quote = Paragraph::new(quotes[quote_index])
                .alignment(Alignment::Center)
                .style(Style::default().fg(ACCENT).add_modifier(Modifier::ITALIC));
            frame.render_widget(quote, quote_area);

            let footer = Paragraph::new("f filter category · esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(DIM_FG));
            frame.render_widget(footer, footer_area);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('f') => {
                        filter = match filter {
                            None => Some(0),
                            Some(i) if i + 1 < all_categories.len() => Some(i + 1),
                            Some(_) => None,
                        };
                    }
                    _ => {}
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_scaling() {
        assert_eq!(progress_bar(0), format!("{} 0%", "░".repeat(20)));
        assert_eq!(progress_bar(100), format!("{} 100%", "█".repeat(20)));
        let half = progress_bar(50);
        assert!(half.starts_with(&"█".repeat(10)));
        assert!(half.contains(&"░".repeat(10)));
    }

    #[test]
    fn test_categories_are_distinct() {
        let achievements = StaticTalentData.achievements();
        let cats = categories(&achievements);
        assert_eq!(cats.len(), achievements.len()); // all categories unique in the catalog
    }
}
