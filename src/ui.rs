pub mod charting;
pub mod history;
pub mod memory;
pub mod word_chain;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::difficulty::Tier;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    match &app.state {
        AppState::WordChain(screen) => word_chain::render(screen, f),
        AppState::Memory(screen) => memory::render(screen, f),
        AppState::History(screen) => history::render(screen, f),
    }
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

pub(crate) fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Easy => Color::Green,
        Tier::Medium => Color::Yellow,
        Tier::Hard => Color::Red,
    }
}

pub(crate) fn palette(index: usize) -> Color {
    const COLORS: [Color; 7] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::Cyan,
        Color::Blue,
        Color::Magenta,
        Color::LightMagenta,
    ];
    COLORS[index % COLORS.len()]
}

/// One centered line of dim help text
pub(crate) fn render_legend(f: &mut Frame, area: Rect, text: &str) {
    let legend = Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    f.render_widget(legend, area);
}
