use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, LibraryStatus};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::context::Context;
use crate::navigator::TrackNavigator;
use crate::ui;

use super::{CatalogResult, spawn_catalog_load, start_audio};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Pending catalog load, if one is in flight.
    pub catalog_rx: Option<Receiver<CatalogResult>>,
    /// Audio thread, once a catalog has been resolved.
    pub player: Option<AudioPlayer>,
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new(catalog_rx: Receiver<CatalogResult>) -> Self {
        Self {
            catalog_rx: Some(catalog_rx),
            player: None,
            pending_gg: false,
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Some(player) = &self.player {
            if player.send(cmd).is_err() {
                warn!("audio thread is gone");
            }
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// catalog loader and the audio thread. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &Arc<Context>,
    app: &mut App,
    state: &mut EventLoopState,
    force_refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        poll_catalog(ctx, app, state);

        // Follow the active track; the index lives in the published snapshot.
        if app.is_ready() {
            let active = app.snapshot().index;
            app.follow(active);
        }

        terminal.draw(|f| ui::draw(f, app, &ctx.settings.playback))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, ctx, app, state, force_refresh) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn poll_catalog(ctx: &Context, app: &mut App, state: &mut EventLoopState) {
    let Some(rx) = &state.catalog_rx else {
        return;
    };
    let result = match rx.try_recv() {
        Ok(result) => result,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => Err("catalog loader stopped".to_string()),
    };
    state.catalog_rx = None;

    match result {
        Ok(entries) => {
            let navigator = TrackNavigator::new(entries, &ctx.group_order());
            info!("catalog ready: {} lessons", navigator.len());
            match start_audio(ctx, navigator.clone()) {
                Ok(player) => {
                    app.set_playback_handle(player.playback_handle());
                    app.set_catalog(navigator);
                    state.player = Some(player);
                }
                Err(e) => {
                    error!("cannot start audio thread: {e}");
                    app.set_failed(format!("cannot start audio: {e}"));
                }
            }
        }
        Err(msg) => {
            error!("catalog load failed: {msg}");
            app.set_failed(msg);
        }
    }
}

/// Handle one key press. Returns `true` when the app should exit.
fn handle_key_event(
    key: KeyEvent,
    ctx: &Arc<Context>,
    app: &mut App,
    state: &mut EventLoopState,
    force_refresh: bool,
) -> bool {
    let pending_gg = std::mem::take(&mut state.pending_gg);

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('r') => {
            if matches!(app.status, LibraryStatus::Failed(_)) && state.player.is_none() {
                app.set_loading();
                state.catalog_rx = Some(spawn_catalog_load(ctx.clone(), force_refresh));
            }
        }
        _ if !app.is_ready() => {}
        KeyCode::Char('g') => {
            if pending_gg {
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if app.has_tracks() {
                app.follow_playback_on();
                app.set_pending_follow_index(app.selected);
                state.send(AudioCmd::Select(app.selected));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            state.send(AudioCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.follow_playback_on();
            state.send(AudioCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.follow_playback_on();
            state.send(AudioCmd::Prev);
        }
        KeyCode::Char('L') => {
            let secs = ctx.settings.playback.scrub_seconds.min(i64::MAX as u64) as i64;
            state.send(AudioCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = ctx.settings.playback.scrub_seconds.min(i64::MAX as u64) as i64;
            state.send(AudioCmd::SeekBy(-secs));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c as u8 - b'0');
            state.send(AudioCmd::Seek(tenth / 10.0));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = app.snapshot().volume + ctx.settings.playback.volume_step;
            state.send(AudioCmd::SetVolume(v));
        }
        KeyCode::Char('-') => {
            let v = app.snapshot().volume - ctx.settings.playback.volume_step;
            state.send(AudioCmd::SetVolume(v));
        }
        KeyCode::Char('m') => state.send(AudioCmd::ToggleMute),
        _ => {}
    }

    false
}
