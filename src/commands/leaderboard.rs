//! National leaderboard screen.
//!
//! Shows the top-three podium and the complete rankings, with a sport
//! filter and a rank/score sort toggle.

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
use std::time::Duration;

use crate::data::{LeaderboardEntry, StaticTalentData, TalentData};
use crate::ui::LOGO;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const GOLD: Color = Color::Rgb(212, 175, 55);
const SILVER: Color = Color::Rgb(170, 169, 173);
const BRONZE: Color = Color::Rgb(176, 141, 87);

/// Sort order for the rankings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortBy {
    Rank,
    Score,
}

/// Applies the sport filter and sort order.
fn visible_entries(
    entries: &[LeaderboardEntry],
    sport: Option<&str>,
    sort_by: SortBy,
) -> Vec<LeaderboardEntry> {
    let mut filtered: Vec<LeaderboardEntry> = entries
        .iter()
        .filter(|entry| sport.map_or(true, |s| entry.sport == s))
        .cloned()
        .collect();
    match sort_by {
        SortBy::Rank => filtered.sort_by_key(|entry| entry.rank),
        SortBy::Score => filtered.sort_by_key(|entry| std::cmp::Reverse(entry.score)),
    }
    filtered
}

/// Distinct sports in catalog order, for the filter cycle.
fn sports(entries: &[LeaderboardEntry]) -> Vec<&'static str> {
    let mut sports: Vec<&'static str> = Vec::new();
    for entry in entries {
        if !sports.contains(&entry.sport) {
            sports.push(entry.sport);
        }
    }
    sports
}

/// Displays the leaderboard.
///
/// # Errors
/// - If the terminal cannot be initialized
pub async fn handle_leaderboard() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel Leaderboard ===");

    run_leaderboard(&StaticTalentData)
}

fn run_leaderboard(data: &dyn TalentData) -> Result<()> {
    let entries = data.leaderboard();
    let all_sports = sports(&entries);

    let mut sort_by = SortBy::Rank;
    // None = all sports; Some(i) indexes into all_sports
    let mut filter: Option<usize> = None;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let sport = filter.map(|i| all_sports[i]);
        let visible = visible_entries(&entries, sport, sort_by);

        terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG));
            frame.render_widget(&padding_block, area);
            let padded_area = padding_block.inner(area);

            let [header_area, podium_area, list_area, footer_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(padded_area);

            let header = Paragraph::new(LOGO)
                .style(Style::default().fg(FG))
                .alignment(Alignment::Left);
            frame.render_widget(header, header_area);

            // Top three podium
            let podium: Vec<&LeaderboardEntry> = visible.iter().take(3).collect();
            if !podium.is_empty() {
                let podium_areas = Layout::horizontal(vec![
                    Constraint::Ratio(1, podium.len() as u32);
                    podium.len()
                ])
                .split(podium_area);

                for (entry, slot) in podium.iter().zip(podium_areas.iter()) {
                    let medal = match entry.rank {
                        1 => GOLD,
                        2 => SILVER,
                        _ => BRONZE,
                    };
                    let card = Paragraph::new(vec![
                        Line::styled(
                            format!("#{}", entry.rank),
                            Style::default().fg(medal).add_modifier(Modifier::BOLD),
                        ),
                        Line::styled(entry.name, Style::default().fg(FG)),
                        Line::styled(format!("{}%", entry.score), Style::default().fg(medal)),
                    ])
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL));
                    frame.render_widget(card, *slot);
                }
            }

            // Complete rankings
            let items: Vec<ListItem> = visible
                .iter()
                .map(|entry| {
                    let movement = entry.movement();
                    let (arrow, arrow_style) = if movement > 0 {
                        ("▲", Style::default().fg(Color::Green))
                    } else if movement < 0 {
                        ("▼", Style::default().fg(Color::Red))
                    } else {
                        ("·", Style::default().fg(DIM_FG))
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("#{:<3}", entry.rank), Style::default().fg(FG)),
                        Span::styled(format!("{arrow} "), arrow_style),
                        Span::styled(format!("{:<16}", entry.name), Style::default().fg(FG)),
                        Span::styled(
                            format!("{:<12}", entry.location),
                            Style::default().fg(DIM_FG),
                        ),
                        Span::styled(format!("{:<12}", entry.sport), Style::default().fg(DIM_FG)),
                        Span::styled(format!("{:>3}%", entry.score), Style::default().fg(FG)),
                    ]))
                })
                .collect();

            let title = format!(
                " Complete Rankings — {} (sort: {}) ",
                sport.unwrap_or("All Sports"),
                match sort_by {
                    SortBy::Rank => "rank",
                    SortBy::Score => "score",
                }
            );
            let list = List::new(items).block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .padding(Padding::uniform(1)),
            );
            frame.render_widget(list, list_area);

            let footer = Paragraph::new("f filter sport · s toggle sort · esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(DIM_FG));
            frame.render_widget(footer, footer_area);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('s') => {
                        sort_by = match sort_by {
                            SortBy::Rank => SortBy::Score,
                            SortBy::Score => SortBy::Rank,
                        };
                    }
                    KeyCode::Char('f') => {
                        // Cycle: all -> sport 0 -> sport 1 -> ... -> all
                        filter = match filter {
                            None => Some(0),
                            Some(i) if i + 1 < all_sports.len() => Some(i + 1),
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
    fn test_sport_filter() {
        let entries = StaticTalentData.leaderboard();
        let athletics = visible_entries(&entries, Some("Athletics"), SortBy::Rank);
        assert_eq!(athletics.len(), 2);
        assert!(athletics.iter().all(|e| e.sport == "Athletics"));
    }

    #[test]
    fn test_sort_toggle() {
        let entries = StaticTalentData.leaderboard();
        let by_rank = visible_entries(&entries, None, SortBy::Rank);
        let by_score = visible_entries(&entries, None, SortBy::Score);
        assert!(by_rank.windows(2).all(|w| w[0].rank <= w[1].rank));
        assert!(by_score.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_distinct_sports_keep_catalog_order() {
        let entries = StaticTalentData.leaderboard();
        assert_eq!(
            sports(&entries),
            vec!["Athletics", "Swimming", "Gymnastics", "Football", "Basketball"]
        );
    }
}
