use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Page};
use crate::models::{RequestStatus, SOCIAL_LINKS};
use crate::services::Theme;

const TWITTER_BLUE: Color = Color::Rgb(29, 161, 242);
const TWEET_LIMIT: usize = 280;

const ABOUT_TEXT: &str = "This project distills the internet into 280-character insights. \
It scrapes, parses, and runs content through Hugging Face to give tweet-ready summaries.";

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    card: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(21, 32, 43),
                fg: Color::White,
                muted: Color::DarkGray,
                accent: TWITTER_BLUE,
                card: Color::Magenta,
            },
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Gray,
                accent: TWITTER_BLUE,
                card: Color::Blue,
            },
        }
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme.get());

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Nav bar
            Constraint::Min(0),    // Page content
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_nav(frame, app, &palette, chunks[0]);
    match app.page {
        Page::Home => render_home(frame, app, &palette, chunks[1]),
        Page::About => render_about(frame, app, &palette, chunks[1]),
    }
    render_status(frame, app, &palette, chunks[2]);

    if app.show_help {
        render_help(frame, &palette);
    }
}

fn render_nav(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let tab = |label: &'static str, page: Page| {
        if app.page == page {
            Span::styled(
                label,
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(palette.muted))
        }
    };

    let line = Line::from(vec![
        tab("🐦 Home", Page::Home),
        Span::styled(" • ", Style::default().fg(palette.muted)),
        tab("About", Page::About),
    ]);

    let block = Block::default()
        .title(" Tweet-Sized Takeaways ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_home(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.controller.state();
    let has_preview = state.preview_image_url.is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                // URL input
            Constraint::Length(1),                                // Actions
            Constraint::Length(if has_preview { 3 } else { 0 }),  // Preview image
            Constraint::Min(0),                                   // Summary card
        ])
        .split(area);

    // Input
    let input_style = if app.input_active {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    let input_text = if app.input.is_empty() && !app.input_active {
        Span::styled(
            "Paste a link you want a summary for...",
            Style::default().fg(palette.muted),
        )
    } else if app.input_active {
        Span::raw(format!("{}_", app.input))
    } else {
        Span::raw(app.input.as_str())
    };
    let input = Paragraph::new(Line::from(input_text)).block(
        Block::default()
            .title(" Link ")
            .borders(Borders::ALL)
            .border_style(input_style),
    );
    frame.render_widget(input, chunks[0]);

    // Actions
    let summarize = if app.is_loading() {
        Span::styled(
            format!(" {} Summarizing ", app.spinner()),
            Style::default().fg(palette.muted),
        )
    } else {
        Span::styled(
            " [Enter] Summarize ",
            Style::default().fg(Color::White).bg(palette.accent),
        )
    };
    let huggingface = if app.controller.can_submit_secondary() {
        Span::styled(" [h] Hugging Face ", Style::default().fg(palette.accent))
    } else {
        Span::styled(" [h] Hugging Face ", Style::default().fg(palette.muted))
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![summarize, Span::raw("  "), huggingface])),
        chunks[1],
    );

    // Preview image
    if let Some(image) = &state.preview_image_url {
        let preview = Paragraph::new(image.as_str())
            .style(Style::default().fg(palette.fg))
            .block(
                Block::default()
                    .title(" Preview [o] ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.muted)),
            );
        frame.render_widget(preview, chunks[2]);
    }

    render_summary(frame, app, palette, chunks[3]);
}

fn render_summary(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.controller.state();
    let Some(summary) = state.summary_text.as_deref() else {
        return;
    };

    let title = if state.used_secondary_model {
        " 📝 280-Character (or less) Takeaway 🤗 "
    } else {
        " 📝 280-Character (or less) Takeaway "
    };
    let counter = if app.controller.is_copied() {
        " ✓ Copied! ".to_string()
    } else {
        format!(" {}/{} [c] copy ", summary.chars().count(), TWEET_LIMIT)
    };

    let border = if state.status == RequestStatus::Failed {
        Color::Red
    } else {
        palette.card
    };

    let block = Block::default()
        .title(title)
        .title_bottom(Line::from(counter).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(summary)
        .block(block)
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_about(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let about = Paragraph::new(ABOUT_TEXT)
        .block(
            Block::default()
                .title(" About Tweet-Sized Takeaways ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        )
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: true });
    frame.render_widget(about, chunks[0]);

    let items: Vec<ListItem> = SOCIAL_LINKS
        .iter()
        .map(|link| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", link.label), Style::default().fg(palette.accent)),
                Span::styled(link.url, Style::default().fg(palette.muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Quick Connects ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_link));

    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_status(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let state = app.controller.state();

    let text = if let Some(notice) = app.notice() {
        notice.to_string()
    } else {
        let status = match state.status {
            RequestStatus::Idle => String::new(),
            RequestStatus::InFlight => format!("{} {}...", app.spinner(), state.mode.label()),
            RequestStatus::Failed => "❌ Failed".to_string(),
            RequestStatus::Succeeded => state
                .settled_at
                .map(|at| format!("✓ {}", at.with_timezone(&chrono::Local).format("%H:%M:%S")))
                .unwrap_or_default(),
        };
        let backend = app.backend_status.as_deref().unwrap_or("checking backend...");
        format!("{status} | {backend} | t:theme  Tab:page  ?:help  q:quit")
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(palette.muted));
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, palette: &Palette) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = [
        "",
        " Home:",
        "   i / /    Edit link",
        "   Enter    Summarize",
        "   h        Re-summarize with Hugging Face",
        "   c        Copy summary",
        "   o        Open preview image",
        "",
        " About:",
        "   j / k    Move through links",
        "   Enter    Open link",
        "",
        " General:",
        "   Tab      Switch page",
        "   t        Toggle dark/light",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

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
