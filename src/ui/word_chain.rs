use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use itertools::Itertools;
use unicode_width::UnicodeWidthStr;

use super::{bold, dim_bold, render_legend, tier_color, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::{MessageKind, WordChainScreen};

pub fn render(screen: &WordChainScreen, f: &mut Frame) {
    let game = &screen.game;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // status line
            Constraint::Length(1), // timer
            Constraint::Min(3),    // current word
            Constraint::Length(3), // input box
            Constraint::Length(2), // message
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let difficulty = game.difficulty();
    let mut status = vec![
        Span::styled(format!("Theme: {}", game.theme()), bold()),
        Span::raw("   "),
        Span::styled(format!("Score: {}", game.score()), bold().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(
            format!("Streak: {} (best {})", game.streak(), game.best_streak()),
            bold(),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Level: {}", difficulty.tier),
            bold().fg(tier_color(difficulty.tier)),
        ),
    ];
    if let Some(best) = screen.best_score {
        status.push(Span::raw("   "));
        status.push(Span::styled(format!("Record: {best}"), dim_bold()));
    }
    f.render_widget(
        Paragraph::new(Line::from(status)).alignment(Alignment::Center),
        chunks[0],
    );

    let limit = difficulty.base_time_limit_secs.max(1) as f64;
    let ratio = (game.time_left_secs() / limit).clamp(0.0, 1.0);
    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(ratio)
            .label(format!("{:.1}s / {}s", game.time_left_secs(), difficulty.base_time_limit_secs)),
        chunks[1],
    );

    let word = game.current_word();
    let (head, tail) = match word.char_indices().last() {
        Some((idx, _)) => word.split_at(idx),
        None => (word, ""),
    };
    let word_line = Line::from(vec![
        Span::styled(head.to_string(), dim_bold()),
        Span::styled(
            tail.to_string(),
            bold().fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
        ),
    ]);
    let top_pad = chunks[2].height.saturating_sub(1) / 2;
    let mut lines = vec![Line::raw(""); top_pad as usize];
    lines.push(word_line);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[2],
    );

    let prompt = if game.is_over() {
        "Game over".to_string()
    } else {
        match game.expected_start() {
            Some(c) => format!("Next word starts with '{c}'"),
            None => "Your word".to_string(),
        }
    };
    let input_width = chunks[3].width.saturating_sub(2) as usize;
    let shown = if screen.input.width() > input_width {
        let skip = screen.input.chars().count().saturating_sub(input_width);
        screen.input.chars().skip(skip).collect()
    } else {
        screen.input.clone()
    };
    f.render_widget(
        Paragraph::new(Span::styled(format!("{shown}_"), bold()))
            .block(Block::default().borders(Borders::ALL).title(prompt)),
        chunks[3],
    );

    if let Some(message) = &screen.message {
        let color = match message.kind {
            MessageKind::Success => Color::Green,
            MessageKind::Error => Color::Red,
        };
        let mut lines = vec![Line::from(Span::styled(message.text.clone(), bold().fg(color)))];
        if !screen.new_achievements.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Unlocked: {}", screen.new_achievements.iter().join(", ")),
                bold().fg(Color::Yellow),
            )));
        }
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[4],
        );
    }

    let legend = if game.is_over() {
        "(r)etry / (h)istory / (esc)ape"
    } else {
        "type a word + (enter) / (esc)ape"
    };
    render_legend(f, chunks[5], legend);
}
