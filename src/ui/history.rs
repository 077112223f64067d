use chrono::Local;
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};

use super::charting::{compute_chart_params, format_label, score_points};
use super::{bold, render_legend, tier_color};
use crate::app::HistoryScreen;
use crate::history::HistoryEntry;
use crate::util::{mean, std_dev};

/// "3 minutes ago" style label for when a game finished
pub fn relative_time(entry: &HistoryEntry) -> String {
    let age = (Local::now() - entry.finished_at)
        .to_std()
        .unwrap_or_default();
    HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Pure presenter for a single history row
pub fn present_row(entry: &HistoryEntry) -> Row<'static> {
    let r = &entry.result;
    Row::new(vec![
        Cell::from(relative_time(entry)),
        Cell::from(r.theme.to_string()),
        Cell::from(r.score.to_string()).style(bold().fg(Color::Cyan)),
        Cell::from(r.words_played.to_string()),
        Cell::from(r.best_streak.to_string()),
        Cell::from(r.final_tier.to_string()).style(Style::default().fg(tier_color(r.final_tier))),
        Cell::from(format!("{}s", r.final_time_limit_secs)),
        Cell::from(entry.coins.to_string()).style(Style::default().fg(Color::Yellow)),
    ])
}

pub fn render(screen: &HistoryScreen, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(4),      // summary + rewards
            Constraint::Percentage(40), // chart
            Constraint::Min(4),         // table
            Constraint::Length(1),      // legend
        ])
        .split(f.area());

    let summary_text = if screen.summary.is_empty() {
        "No games played yet".to_string()
    } else {
        screen
            .summary
            .iter()
            .map(|s| {
                format!(
                    "{}: {} games, avg {:.1}, best {}",
                    s.theme, s.games, s.avg_score, s.best_score
                )
            })
            .join("  |  ")
    };
    let rewards_text = if screen.achievements.is_empty() {
        format!("Coins: {}", screen.total_coins)
    } else {
        format!(
            "Coins: {}  |  Achievements: {}",
            screen.total_coins,
            screen.achievements.iter().join(", ")
        )
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::raw(summary_text),
            Line::styled(rewards_text, Style::default().fg(Color::Yellow)),
        ])
            .block(Block::default().borders(Borders::ALL).title("Word Chain History"))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let points = score_points(&screen.entries);
    let (games, highest) = compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];
    let scores: Vec<f64> = points.iter().map(|&(_, s)| s).collect();
    let chart_title = match (mean(&scores), std_dev(&scores)) {
        (Some(avg), Some(sd)) => format!("Scores (avg {avg:.1}, sd {sd:.1})"),
        _ => "Scores".to_string(),
    };
    let chart = Chart::new(datasets)
        .block(Block::default().title(chart_title))
        .x_axis(
            Axis::default()
                .title("games")
                .bounds([1.0, games])
                .labels(vec![Span::raw("1"), Span::raw(format_label(games))]),
        )
        .y_axis(
            Axis::default()
                .title("score")
                .bounds([0.0, highest])
                .labels(vec![Span::raw("0"), Span::raw(format_label(highest))]),
        );
    f.render_widget(chart, chunks[1]);

    let table_height = chunks[2].height.saturating_sub(3) as usize;
    let rows: Vec<Row> = screen
        .entries
        .iter()
        .skip(screen.scroll_offset)
        .take(table_height)
        .map(present_row)
        .collect();
    let header = Row::new(vec!["When", "Theme", "Score", "Words", "Streak", "Tier", "Limit", "Coins"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(format!(
        "Recent games ({})",
        screen.entries.len()
    )));
    f.render_widget(table, chunks[2]);

    render_legend(f, chunks[3], "(up/down) scroll / (n)ew game / (esc)ape");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Theme;
    use crate::difficulty::Tier;
    use crate::word_chain::WordChainResult;

    #[test]
    fn relative_time_reads_as_past() {
        let entry = HistoryEntry {
            id: 1,
            result: WordChainResult {
                theme: Theme::Animals,
                score: 10,
                best_streak: 2,
                words_played: 2,
                final_tier: Tier::Medium,
                final_time_limit_secs: 15,
                words_used: vec!["rat".to_string(), "tiger".to_string()],
                total_time_played_secs: 20.0,
            },
            coins: 13,
            finished_at: Local::now() - chrono::Duration::hours(3),
        };
        let text = relative_time(&entry);
        assert!(text.contains("hours"), "got {text}");
        assert!(text.ends_with("ago"), "got {text}");
    }
}
