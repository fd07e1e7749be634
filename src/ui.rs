//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, LibraryStatus, ListRow};
use crate::audio::{PlaybackSnapshot, PlayerState};
use crate::config::PlaybackSettings;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "load selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next lesson");
    // H/L is filled dynamically from config.
    map.insert("0-9", "jump to 0-90%");
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "0-9", "+/-", "m", "gg/G", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, playback: &PlaybackSettings) {
    match &app.status {
        LibraryStatus::Loading => draw_message(frame, "Loading audio library...", None),
        LibraryStatus::Failed(msg) => draw_message(
            frame,
            &format!("Could not load the audio library: {msg}"),
            Some("[r] retry | [q] quit"),
        ),
        LibraryStatus::Ready => draw_player(frame, app, &app.snapshot(), playback),
    }
}

fn draw_message(frame: &mut Frame, text: &str, hint: Option<&str>) {
    let area = frame.area();
    let mut body = text.to_string();
    if let Some(hint) = hint {
        body.push_str("\n\n");
        body.push_str(hint);
    }
    let height = 6.min(area.height);
    let rect = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };
    let par = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" prepcast ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(par, rect);
}

fn draw_player(frame: &mut Frame, app: &App, snap: &PlaybackSnapshot, playback: &PlaybackSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let s = &snap.summary;
    let header = Paragraph::new(format!(
        "{} lessons • {} completed • {}% overall",
        s.total, s.completed, s.overall_percent
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" prepcast ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, app, snap, chunks[1]);
    draw_track_list(frame, app, snap, chunks[2]);

    let footer = Paragraph::new(controls_text(playback.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_now_playing(frame: &mut Frame, app: &App, snap: &PlaybackSnapshot, area: Rect) {
    let block = Block::bordered().padding(left_pad()).title(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);

    let Some((idx, entry)) = snap.index.and_then(|i| app.entry(i).map(|e| (i, e))) else {
        frame.render_widget(Paragraph::new("Nothing selected"), rows[0]);
        return;
    };

    let mut status = vec![
        format!("Track {} of {}", idx + 1, app.navigator.len()),
        entry.group_label.clone(),
        snap.state.label().to_string(),
    ];
    if snap.volume <= 0.0 {
        status.push("Muted".to_string());
    } else {
        status.push(format!("Vol {}%", (snap.volume * 100.0).round() as u32));
    }
    if !snap.has_next {
        status.push("Last lesson".to_string());
    } else if !snap.has_previous {
        status.push("First lesson".to_string());
    }
    if app.follow_playback {
        status.push("Follow".to_string());
    }
    let second = match (&snap.state, &snap.error) {
        (PlayerState::Failed, Some(err)) => err.clone(),
        _ => status.join(" • "),
    };
    let text = Paragraph::new(format!("{}\n{second}", entry.display_title)).wrap(Wrap { trim: true });
    let text = if snap.is_playing() { text.bold() } else { text };
    frame.render_widget(text, rows[0]);

    let ratio = match snap.duration {
        Some(d) if !d.is_zero() => (snap.elapsed.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let label = format!(
        "{} / {}",
        format_time(snap.elapsed),
        snap.duration.map(format_time).unwrap_or_else(|| "-:--".to_string())
    );
    frame.render_widget(Gauge::default().ratio(ratio).label(label), rows[1]);
}

/// One list line for a track: playing marker, title and saved progress.
fn track_line(app: &App, snap: &PlaybackSnapshot, index: usize) -> String {
    let Some(entry) = app.entry(index) else {
        return String::new();
    };
    let marker = if snap.index == Some(index) {
        if snap.is_playing() { "▶ " } else { "• " }
    } else {
        "  "
    };
    let tail = if snap.unplayable.contains(&entry.storage_path) {
        "unavailable".to_string()
    } else {
        match snap.percent_of(&entry.storage_path) {
            100 => "✓".to_string(),
            0 => String::new(),
            p => format!("{p}%"),
        }
    };
    let number = entry
        .sequence_number
        .map(|n| format!("{n:02} "))
        .unwrap_or_default();
    if tail.is_empty() {
        format!("{marker}{number}{}", entry.display_title)
    } else {
        format!("{marker}{number}{}  [{tail}]", entry.display_title)
    }
}

fn draw_track_list(frame: &mut Frame, app: &App, snap: &PlaybackSnapshot, area: Rect) {
    let rows = app.rows();

    // Center the selected row when possible; only build items for the visible window.
    let total = rows.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = rows
        .iter()
        .position(|r| *r == ListRow::Track(app.selected))
        .unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .map(|row| match row {
            ListRow::Group(label) => ListItem::new(label.to_string()).bold().underlined(),
            ListRow::Track(i) => ListItem::new(track_line(app, snap, *i)),
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" lessons "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.has_tracks() {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
