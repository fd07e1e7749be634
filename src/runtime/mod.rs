use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioPlayer, MediaFetcher, RodioSink};
use crate::catalog::CatalogEntry;
use crate::context::Context;
use crate::navigator::TrackNavigator;

mod event_loop;
mod settings;

pub use settings::load_settings;

type CatalogResult = Result<Vec<CatalogEntry>, String>;

/// Resolve the catalog on a background thread so the UI can show a
/// loading screen meanwhile.
fn spawn_catalog_load(ctx: Arc<Context>, force_refresh: bool) -> Receiver<CatalogResult> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("catalog".into())
        .spawn(move || {
            let result = ctx.load_catalog(force_refresh).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        error!("cannot start catalog thread: {e}");
    }
    rx
}

/// Start the audio thread over a resolved catalog.
fn start_audio(ctx: &Context, navigator: TrackNavigator) -> std::io::Result<AudioPlayer> {
    let cache_dir = ctx.settings.media_cache_dir();
    let timeout = ctx.settings.media_timeout();
    info!(
        "starting playback over {} lessons, media cache at {}",
        navigator.len(),
        cache_dir.display()
    );
    AudioPlayer::spawn(
        move || RodioSink::open(MediaFetcher::new(cache_dir, timeout)?),
        navigator,
        ctx.progress_store(),
        ctx.volume_store(),
        ctx.settings.playback.continue_on_end,
    )
}

/// Run the interactive player until the user quits.
pub fn run_player(ctx: Arc<Context>, force_refresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new();
    let mut state = event_loop::EventLoopState::new(spawn_catalog_load(ctx.clone(), force_refresh));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &ctx, &mut app, &mut state, force_refresh);

    if let Some(player) = state.player.take() {
        player.quit();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
