//! Audio output: where notification cues end up.
//!
//! Playback is fire-and-forget. `play` starts the sound and returns without
//! waiting for it to finish, so a slow or stuck player never holds up the next
//! snapshot.

use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use tracing::debug;

/// Errors that can occur while preparing or playing the notification sound.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("sound file {path} is not readable: {source}")]
    SoundUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("audio player '{0}' not found on PATH")]
    PlayerNotFound(String),

    #[error("failed to start audio player '{player}': {source}")]
    Spawn {
        player: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, AudioError>;

/// A sink for the single notification sound.
pub trait AudioOutput {
    /// Load or check the sound resource ahead of first use.
    fn preload(&mut self) -> Result<()>;

    /// Prepare the output after the user opts in. Must not make a sound.
    fn unlock(&mut self) -> Result<()>;

    /// Start one playback of the notification sound without waiting for it.
    fn play(&mut self) -> Result<()>;
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn preload(&mut self) -> Result<()> {
        (**self).preload()
    }

    fn unlock(&mut self) -> Result<()> {
        (**self).unlock()
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }
}

/// Plays a sound file through an external player program (`aplay`, `afplay`, ...).
pub struct CommandPlayer {
    player: String,
    sound: PathBuf,
    /// Playbacks that may still be running. Reaped lazily.
    children: Vec<Child>,
}

impl CommandPlayer {
    pub fn new(player: impl Into<String>, sound: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            sound: sound.into(),
            children: Vec::new(),
        }
    }

    /// The player this platform most likely has installed.
    pub fn default_player() -> &'static str {
        if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "aplay"
        }
    }

    /// Drop handles of playbacks that have already finished.
    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl AudioOutput for CommandPlayer {
    fn preload(&mut self) -> Result<()> {
        fs::File::open(&self.sound).map_err(|source| AudioError::SoundUnreadable {
            path: self.sound.clone(),
            source,
        })?;
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        if resolve_program(&self.player).is_none() {
            return Err(AudioError::PlayerNotFound(self.player.clone()));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.reap();
        let child = Command::new(&self.player)
            .arg(&self.sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AudioError::Spawn {
                player: self.player.clone(),
                source,
            })?;
        self.children.push(child);
        Ok(())
    }
}

impl Drop for CommandPlayer {
    // Playbacks still running are left to finish on their own.
    fn drop(&mut self) {
        self.reap();
        if !self.children.is_empty() {
            debug!(running = self.children.len(), "leaving notification playback running");
        }
    }
}

/// Rings the terminal bell on stderr. Used when no sound file is configured.
#[derive(Debug, Default)]
pub struct Bell;

impl AudioOutput for Bell {
    fn preload(&mut self) -> Result<()> {
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Audio output that counts calls instead of making noise.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingAudio {
    pub plays: usize,
    pub unlocks: usize,
    pub fail: bool,
}

#[cfg(test)]
impl AudioOutput for CountingAudio {
    fn preload(&mut self) -> Result<()> {
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.unlocks += 1;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.plays += 1;
        if self.fail {
            return Err(AudioError::PlayerNotFound("muted".into()));
        }
        Ok(())
    }
}

/// Find a program the way a shell would: as given if it contains a path, else on `PATH`.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    let dirs = env::var_os("PATH")?;
    env::split_paths(&dirs)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
