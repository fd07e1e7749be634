//! The rodio-backed media resource.
//!
//! Media is downloaded to the local cache first, then decoded from disk.
//! Seeking rebuilds the sink and skips into the file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::catalog::CatalogEntry;
use crate::error::MediaError;

use super::fetch::MediaFetcher;
use super::media::MediaSink;

pub struct RodioSink {
    stream: OutputStream,
    fetcher: MediaFetcher,
    sink: Option<Sink>,
    file: Option<PathBuf>,
    // Position the current sink started at.
    base: Duration,
    volume: f32,
}

impl RodioSink {
    /// Open the default output device. Must be called on the thread that
    /// will drive the sink.
    pub fn open(fetcher: MediaFetcher) -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would land
        // on top of the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            fetcher,
            sink: None,
            file: None,
            base: Duration::ZERO,
            volume: 1.0,
        })
    }

    /// A paused sink for `path` that starts at `start_at`.
    fn create_sink_at(&self, path: &Path, start_at: Duration) -> Result<Sink, MediaError> {
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| MediaError::Decode(format!("{}: {e}", path.display())))?
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }
}

impl MediaSink for RodioSink {
    fn load(&mut self, entry: &CatalogEntry) -> Result<Option<Duration>, MediaError> {
        self.stop();
        self.file = None;
        self.base = Duration::ZERO;

        let path = self.fetcher.fetch(entry)?;
        let sink = self.create_sink_at(&path, Duration::ZERO)?;
        let duration = lofty::read_from_path(&path)
            .ok()
            .map(|tagged| tagged.properties().duration())
            .filter(|d| !d.is_zero());

        self.sink = Some(sink);
        self.file = Some(path);
        Ok(duration)
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn seek(&mut self, to: Duration) -> Result<(), MediaError> {
        let Some(path) = self.file.clone() else {
            return Err(MediaError::NotLoaded);
        };
        let was_playing = self
            .sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty());

        let sink = self.create_sink_at(&path, to)?;
        self.stop();
        if was_playing {
            sink.play();
        }
        self.sink = Some(sink);
        self.base = to;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = &self.sink {
            s.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map_or(self.base, |s| self.base + s.get_pos())
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}
