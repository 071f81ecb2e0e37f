//! macOS sound playback through `afplay`.

use async_trait::async_trait;
use tokio::process::Command;

use super::{AlertSound, NotifyError, Notifier};

const PROGRAM: &str = "afplay";

/// Plays a system sound with `afplay -v <volume> <path>`.
///
/// Arguments are passed directly to the child process, never through a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfplayNotifier;

impl AfplayNotifier {
    fn command(sound: &AlertSound) -> Command {
        let mut cmd = Command::new(PROGRAM);
        cmd.arg("-v").arg(&sound.volume).arg(sound.path());
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Notifier for AfplayNotifier {
    async fn play(&self, sound: &AlertSound) -> Result<(), NotifyError> {
        tracing::debug!(path = %sound.path().display(), volume = %sound.volume, "Playing alert sound");

        let status = Self::command(sound)
            .status()
            .await
            .map_err(|source| NotifyError::Spawn {
                program: PROGRAM,
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::Exit {
                program: PROGRAM,
                status,
            })
        }
    }
}
