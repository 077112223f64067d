use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{bold, dim_bold, palette, render_legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::app::MemoryScreen;
use crate::celebration::Celebration;
use crate::memory::{MemoryStatus, MAX_LEVEL};

/// How big each card is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// 6x3 bordered cards
    Boxed,
    /// 4x1 borderless cards, cursor shown by reversed colors
    Compact,
}

impl CardLayout {
    pub fn cell_size(self) -> (u16, u16) {
        match self {
            CardLayout::Boxed => (6, 3),
            CardLayout::Compact => (4, 1),
        }
    }

    /// Largest layout that shows every card of a `cols` x `rows` board in `area`
    pub fn fit(cols: u16, rows: u16, area: Rect) -> Option<Self> {
        [CardLayout::Boxed, CardLayout::Compact]
            .into_iter()
            .find(|layout| {
                let (w, h) = layout.cell_size();
                cols * w <= area.width && rows * h <= area.height
            })
    }
}

/// Terminal size needed to show a board in the compact layout
pub fn minimum_terminal_size(cols: u16, rows: u16) -> (u16, u16) {
    let (w, h) = CardLayout::Compact.cell_size();
    (
        cols * w + 2 * HORIZONTAL_MARGIN,
        rows * h + BOARD_CHROME_ROWS + 2 * VERTICAL_MARGIN,
    )
}

// header, outcome and legend lines around the board
const BOARD_CHROME_ROWS: u16 = 3;

pub fn render(screen: &MemoryScreen, f: &mut Frame) {
    let game = &screen.game;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // level + attempts
            Constraint::Min(3),    // board
            Constraint::Length(1), // outcome
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let attempts_style = if game.attempts() + 2 >= game.max_attempts() {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    let header = Line::from(vec![
        Span::styled(format!("Level {}/{}", game.level(), MAX_LEVEL), bold().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(
            format!("Attempts {}/{}", game.attempts(), game.max_attempts()),
            attempts_style,
        ),
        Span::raw("   "),
        Span::styled(
            format!("Pairs {}/{}", game.matched_pairs(), game.config().pairs),
            dim_bold(),
        ),
    ]);
    f.render_widget(
        Paragraph::new(header).alignment(Alignment::Center),
        chunks[0],
    );

    render_board(screen, f, chunks[1]);

    let (text, color) = match game.status() {
        MemoryStatus::Playing => (String::new(), Color::Reset),
        MemoryStatus::Won => ("Level complete!".to_string(), Color::Green),
        MemoryStatus::Lost => ("Out of attempts!".to_string(), Color::Red),
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, bold().fg(color))).alignment(Alignment::Center),
        chunks[2],
    );

    let legend = match game.status() {
        MemoryStatus::Playing => "(arrows) move / (space) flip / (esc)ape",
        MemoryStatus::Won if game.level() < MAX_LEVEL => "(n)ext level / (r)etry / (esc)ape",
        _ => "(r)etry / (esc)ape",
    };
    render_legend(f, chunks[3], legend);

    if screen.celebration.is_active {
        render_celebration(&screen.celebration, f);
    }
}

fn render_board(screen: &MemoryScreen, f: &mut Frame, area: Rect) {
    let game = &screen.game;
    let cols = game.config().cols.max(1) as u16;
    let rows = (game.cards().len() as u16).div_ceil(cols);

    let Some(layout) = CardLayout::fit(cols, rows, area) else {
        let (need_w, need_h) = minimum_terminal_size(cols, rows);
        let size = f.area();
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(
                    "terminal too small (need {need_w}x{need_h}, have {}x{})",
                    size.width, size.height
                ),
                bold().fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            area,
        );
        return;
    };

    let (cell_width, cell_height) = layout.cell_size();
    let origin_x = area.x + (area.width - cols * cell_width) / 2;
    let origin_y = area.y + (area.height - rows * cell_height) / 2;

    for (idx, card) in game.cards().iter().enumerate() {
        let col = idx as u16 % cols;
        let row = idx as u16 / cols;
        let cell = Rect {
            x: origin_x + col * cell_width,
            y: origin_y + row * cell_height,
            width: cell_width,
            height: cell_height,
        };

        let (label, mut style) = if card.is_matched {
            (card.value.to_string(), bold().fg(Color::Green))
        } else if card.is_flipped {
            (card.value.to_string(), bold().fg(Color::Magenta))
        } else {
            ("?".to_string(), dim_bold())
        };
        let selected = idx == screen.cursor;

        let card_widget = match layout {
            CardLayout::Boxed => {
                let border_style = if selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                Paragraph::new(Span::styled(label, style))
                    .block(Block::default().borders(Borders::ALL).border_style(border_style))
            }
            CardLayout::Compact => {
                if selected {
                    style = style.fg(Color::Yellow).add_modifier(Modifier::REVERSED);
                }
                Paragraph::new(Span::styled(label, style))
            }
        };
        f.render_widget(card_widget.alignment(Alignment::Center), cell);
    }
}

fn render_celebration(celebration: &Celebration, f: &mut Frame) {
    let area = f.area();
    let buf = f.buffer_mut();
    for piece in &celebration.pieces {
        if piece.x < 0.0 || piece.y < 0.0 {
            continue;
        }
        let (x, y) = (piece.x as u16, piece.y as u16);
        if x < area.right() && y < area.bottom() {
            buf[(x, y)]
                .set_char(piece.symbol)
                .set_fg(palette(piece.color_index));
        }
    }

    let banner_width = celebration.banner.chars().count() as u16;
    let x = area.x + area.width.saturating_sub(banner_width) / 2;
    let y = area.y + area.height / 2;
    buf.set_string(
        x,
        y,
        celebration.banner,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    );
}
