//! Concrete audio and filesystem collaborators.
//!
//! Decoding itself is rodio's job; this module only adapts it to the control
//! plane's traits and keeps the session's progress counters honest.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use musdeck_core::browser::DirEntryInfo;
use musdeck_core::error::{
    PlayerError, Result, CODE_DECODE_FAILED, CODE_OPEN_FAILED, CODE_OUTPUT_FAILED,
};
use musdeck_core::{
    Decoder, DecoderFactory, DirectorySource, FileClassifier, PlaybackContext, PlaybackSession,
};
use rodio::source::Source;
use rodio::{OutputStream, Sink};

/// File extensions rodio's default feature set can decode.
pub const PLAYABLE_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg"];

/// How often the playback thread checks the stop and pause flags.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Extension-based playability check.
pub struct ExtensionClassifier;

impl FileClassifier for ExtensionClassifier {
    fn is_playable(&self, path: &Path) -> Result<()> {
        let playable = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    PLAYABLE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                });
        if playable {
            Ok(())
        } else {
            Err(PlayerError::NotPlayable {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Directory enumeration over std::fs.
pub struct FsDirectorySource;

impl DirectorySource for FsDirectorySource {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let read_error = |source: std::io::Error| PlayerError::DirectoryRead {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let is_dir = entry.file_type().map_err(read_error)?.is_dir();
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }
}

/// Opens rodio-backed decoders.
pub struct RodioFactory;

impl DecoderFactory for RodioFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(RodioDecoder {
            path: path.to_path_buf(),
        }))
    }
}

/// One playback run of a single file.
///
/// The output stream is acquired on the playback thread, not at `open` time:
/// losing the device is an asynchronous playback failure like any other and
/// goes through the shared channel.
struct RodioDecoder {
    path: std::path::PathBuf,
}

impl Decoder for RodioDecoder {
    fn run(&mut self, ctx: &PlaybackContext) -> std::result::Result<(), i32> {
        let (_stream, handle) = OutputStream::try_default().map_err(|err| {
            tracing::warn!(error = %err, "no audio output device");
            CODE_OUTPUT_FAILED
        })?;
        let sink = Sink::try_new(&handle).map_err(|_| CODE_OUTPUT_FAILED)?;

        let file = File::open(&self.path).map_err(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "open failed");
            CODE_OPEN_FAILED
        })?;
        let source = rodio::Decoder::new(BufReader::new(file)).map_err(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "decode failed");
            CODE_DECODE_FAILED
        })?;

        let rate = u64::from(source.sample_rate());
        ctx.session.set_samples_per_second(rate);
        if let Some(duration) = source.total_duration() {
            ctx.session
                .set_samples_total((duration.as_secs_f64() * rate as f64) as u64);
        }

        let channels = source.channels();
        sink.append(CountingSource {
            inner: source,
            session: Arc::clone(&ctx.session),
            channels,
            interleave_pos: 0,
        });

        while !ctx.stop_requested() && !sink.empty() {
            if ctx.is_paused() != sink.is_paused() {
                if ctx.is_paused() {
                    sink.pause();
                } else {
                    sink.play();
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        sink.stop();
        Ok(())
    }
}

/// Pass-through source that counts playback progress in whole frames, so the
/// session's `samples_played` stays in units of `samples_per_second`.
struct CountingSource<S> {
    inner: S,
    session: Arc<PlaybackSession>,
    channels: u16,
    interleave_pos: u16,
}

impl<S> Iterator for CountingSource<S>
where
    S: Source,
    S::Item: rodio::Sample,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next()?;
        self.interleave_pos += 1;
        if self.interleave_pos >= self.channels {
            self.interleave_pos = 0;
            self.session.add_samples_played(1);
        }
        Some(sample)
    }
}

impl<S> Source for CountingSource<S>
where
    S: Source,
    S::Item: rodio::Sample,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}
