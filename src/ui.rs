//! Terminal user interface with ratatui.

use crate::app::App;
use crate::models::Coin;
use crate::state::LoadStatus;
use num_format::{Locale, ToFormattedString};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

/// Palette for the UI, one per theme.
pub struct UiColors {
    pub gain: Color,
    pub loss: Color,
    pub text: Color,
    pub dimmed: Color,
    pub accent: Color,
    pub header_bg: Color,
    pub border: Color,
}

impl UiColors {
    /// Pick the palette for the active theme.
    pub fn for_theme(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                gain: Color::Green,
                loss: Color::Red,
                text: Color::White,
                dimmed: Color::DarkGray,
                accent: Color::Cyan,
                header_bg: Color::Rgb(30, 30, 46),
                border: Color::DarkGray,
            }
        } else {
            Self {
                gain: Color::Rgb(0, 140, 60),
                loss: Color::Rgb(200, 30, 30),
                text: Color::Black,
                dimmed: Color::Gray,
                accent: Color::Blue,
                header_bg: Color::Rgb(220, 225, 235),
                border: Color::Gray,
            }
        }
    }
}

/// Render the main UI.
pub fn render(frame: &mut Frame, app: &App) {
    let colors = UiColors::for_theme(app.dark_mode);

    let mut constraints = vec![
        Constraint::Length(2), // Header
        Constraint::Length(3), // Search box
    ];
    if app.history_visible() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(5)); // Coin table
    constraints.push(Constraint::Length(1)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let mut next = 0;
    render_header(frame, app, chunks[next], &colors);
    next += 1;
    render_search(frame, app, chunks[next], &colors);
    next += 1;
    if app.history_visible() {
        render_history(frame, app, chunks[next], &colors);
        next += 1;
    }
    render_coin_table(frame, app, chunks[next], &colors);
    next += 1;
    render_footer(frame, app, chunks[next], &colors);

    if let Some(ref error) = app.state.error {
        render_error(frame, error, &colors);
    }
}

/// Render the header with title and refresh status.
fn render_header(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let status = match app.state.status {
        LoadStatus::Loading => Span::styled("refreshing...", Style::default().fg(colors.accent)),
        LoadStatus::Failed => Span::styled("failed", Style::default().fg(colors.loss)),
        _ => Span::styled(
            format!("updated {}", app.time_since_refresh()),
            Style::default().fg(colors.dimmed),
        ),
    };

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "COINWATCH ",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("- {} coins  ", app.state.filtered_coins.len()),
            Style::default().fg(colors.text),
        ),
        status,
    ])])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.border)),
    );

    frame.render_widget(header, area);
}

/// Render the search input box.
fn render_search(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let content = if app.input.is_empty() {
        Span::styled(
            "Search by name or symbol...",
            Style::default().fg(colors.dimmed),
        )
    } else {
        Span::styled(format!("{}█", app.input), Style::default().fg(colors.text))
    };

    let search = Paragraph::new(Line::from(content)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border)),
    );

    frame.render_widget(search, area);
}

/// Render the recent-searches row.
fn render_history(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let mut spans = vec![Span::styled("recent: ", Style::default().fg(colors.dimmed))];
    for (i, term) in app.search_history.iter().enumerate() {
        let style = if app.history_cursor == Some(i) {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.text)
        };
        spans.push(Span::styled(format!("[{}]", term), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the coin table.
fn render_coin_table(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let coins = &app.state.filtered_coins;

    if coins.is_empty() && app.state.error.is_none() {
        let message = if app.state.status == LoadStatus::Loading {
            "Loading...".to_string()
        } else if app.state.is_searching() {
            format!("No results found for \"{}\"", app.state.search_term.trim())
        } else {
            "No cryptocurrencies found. Try searching for a specific coin.".to_string()
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(colors.dimmed))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colors.border)),
            );
        frame.render_widget(empty, area);
        return;
    }

    let header_cells = ["SYMBOL", "NAME", "PRICE", "24H%", "MKT CAP", "24H VOL"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(colors.text)));
    let header = Row::new(header_cells)
        .style(Style::default().bg(colors.header_bg))
        .height(1);

    let rows = coins.iter().map(|coin| {
        let change_color = if coin.change.is_none() {
            colors.dimmed
        } else if coin.is_decline() {
            colors.loss
        } else {
            colors.gain
        };

        let cells = vec![
            Cell::from(coin.symbol.clone()).style(Style::default().fg(colors.accent)),
            Cell::from(truncate_string(&coin.name, 20)).style(Style::default().fg(colors.text)),
            Cell::from(format_price(coin.price_value())).style(Style::default().fg(colors.text)),
            Cell::from(format_change(coin)).style(Style::default().fg(change_color)),
            Cell::from(format_compact_usd(coin.market_cap_value()))
                .style(Style::default().fg(colors.text)),
            Cell::from(format_compact_usd(coin.volume_value()))
                .style(Style::default().fg(colors.text)),
        ];

        Row::new(cells)
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(22),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::NONE));

    frame.render_widget(table, area);
}

/// Render the footer with keybindings.
fn render_footer(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let theme = if app.dark_mode { "dark" } else { "light" };
    let key_style = Style::default().fg(colors.accent);

    let footer = Line::from(vec![
        Span::styled(" Esc", key_style),
        Span::raw(":clear "),
        Span::styled("Enter", key_style),
        Span::raw(":save search "),
        Span::styled("^R", key_style),
        Span::raw(":refresh "),
        Span::styled("^T", key_style),
        Span::raw(":theme "),
        Span::styled("^C", key_style),
        Span::raw(":quit "),
        Span::raw(format!("| {} | {}", theme, app.state.status)),
    ]);

    let footer_widget = Paragraph::new(footer).style(
        Style::default()
            .bg(colors.header_bg)
            .fg(colors.text),
    );

    frame.render_widget(footer_widget, area);
}

/// Render error popup.
fn render_error(frame: &mut Frame, error: &str, colors: &UiColors) {
    let area = centered_rect(50, 20, frame.area());

    let error_widget = Paragraph::new(error)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.loss)),
        )
        .style(Style::default().fg(colors.loss))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(error_widget, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Format price with appropriate precision. Coins trading under a dollar get
/// the extra decimals their holders cling to.
fn format_price(price: f64) -> String {
    if price >= 1.0 {
        let total_cents = (price * 100.0).round() as u64;
        format!(
            "${}.{:02}",
            (total_cents / 100).to_formatted_string(&Locale::en),
            total_cents % 100
        )
    } else {
        format!("${:.6}", price)
    }
}

/// Format the 24h change with a direction arrow.
fn format_change(coin: &Coin) -> String {
    match coin.change_value() {
        Some(change) if coin.is_decline() => format!("▼ {:.2}%", change.abs()),
        Some(change) => format!("▲ {:.2}%", change.abs()),
        None => "-".to_string(),
    }
}

/// Compact USD formatting with K/M/B/T suffixes.
fn format_compact_usd(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "$0".to_string();
    };
    if value >= 1_000_000_000_000.0 {
        format!("${:.1}T", value / 1_000_000_000_000.0)
    } else if value >= 1_000_000_000.0 {
        format!("${:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// Truncate string to max length.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Render batch mode output (non-interactive).
pub fn render_batch(app: &App) {
    use chrono::Local;

    println!(
        "\n=== COINWATCH {} ===",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(ref error) = app.state.error {
        println!("Error: {}", error);
        return;
    }

    if app.state.is_searching() {
        println!("Search: {}", app.state.search_term.trim());
    }

    println!(
        "{:<8} {:<20} {:>14} {:>10} {:>10} {:>10}",
        "SYMBOL", "NAME", "PRICE", "24H%", "MKT CAP", "24H VOL"
    );
    println!("{}", "-".repeat(78));

    for coin in &app.state.filtered_coins {
        println!(
            "{:<8} {:<20} {:>14} {:>10} {:>10} {:>10}",
            coin.symbol,
            truncate_string(&coin.name, 20),
            format_price(coin.price_value()),
            format_change(coin),
            format_compact_usd(coin.market_cap_value()),
            format_compact_usd(coin.volume_value()),
        );
    }

    println!();
}
