use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

fn load_bytes(path: &Path) -> Option<Vec<u8>> {
    let mut f = File::open(path).ok()?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn load_bytes_any(paths: &[PathBuf]) -> Option<Vec<u8>> {
    let found = paths.iter().find_map(|p| load_bytes(p));
    if found.is_none() {
        warn!(candidates = ?paths, "sound not found, skipping");
    }
    found
}

/// Background theme plus the two one-shot effects the game uses.
pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bg_sink: Option<Sink>,
    sfx_sink: Sink,
    shot: Option<Arc<Vec<u8>>>,
    pain: Option<Arc<Vec<u8>>>,
    shot_volume: f32,
}

impl AudioManager {
    /// `None` when no output device is available.
    pub fn new() -> Option<Self> {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "audio device unavailable, running silent");
                return None;
            }
        };
        let sfx_sink = Sink::try_new(&handle).ok()?;
        Some(Self { _stream, handle, bg_sink: None, sfx_sink, shot: None, pain: None, shot_volume: 0.6 })
    }

    /// Looks for `sounds/shotgun.*` and `music/pain.*` below `assets`.
    pub fn load_sfx(&mut self, assets: &Path) {
        let candidates = |dir: &str, stem: &str| -> Vec<PathBuf> {
            ["wav", "mp3", "ogg"].iter().map(|ext| assets.join(dir).join(format!("{stem}.{ext}"))).collect()
        };
        self.shot = load_bytes_any(&candidates("sounds", "shotgun")).map(Arc::new);
        self.pain = load_bytes_any(&candidates("music", "pain")).map(Arc::new);
    }

    pub fn play_shot(&self) {
        // own sink so rapid shots overlap instead of queueing
        let Some(d) = self.shot.clone() else { return };
        if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                sink.append(dec.amplify(self.shot_volume.clamp(0.0, 2.5)));
                sink.detach();
            }
        }
    }

    pub fn play_pain(&self) {
        if let Some(d) = self.pain.clone() {
            if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
                self.sfx_sink.append(dec);
            }
        }
    }

    /// Starts the first theme found below `assets/music`; a no-op once playing.
    pub fn play_music_loop(&mut self, assets: &Path, stem: &str) {
        if self.bg_sink.is_some() {
            return;
        }
        let paths: Vec<PathBuf> =
            ["mp3", "ogg", "wav"].iter().map(|ext| assets.join("music").join(format!("{stem}.{ext}"))).collect();
        let Some(bytes) = load_bytes_any(&paths) else { return };
        match Decoder::new_looped(Cursor::new(bytes)) {
            Ok(dec) => {
                if let Ok(sink) = Sink::try_new(&self.handle) {
                    sink.append(dec);
                    sink.set_volume(0.35);
                    self.bg_sink = Some(sink);
                    debug!(stem, "music started");
                }
            }
            Err(e) => warn!(error = %e, stem, "could not decode music"),
        }
    }

    /// Replaces the running theme, e.g. with the win tune.
    pub fn switch_music(&mut self, assets: &Path, stem: &str) {
        if let Some(s) = self.bg_sink.take() {
            s.stop();
        }
        self.play_music_loop(assets, stem);
    }
}
