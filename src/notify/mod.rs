//! Local notification for firing alerts.
//!
//! # Data Flow
//! ```text
//! webhook handler (status == "firing")
//!     → AlertDispatcher::dispatch (returns immediately)
//!     → detached task: Notifier::play
//!     → failures end in the log, never in the HTTP response
//! ```

pub mod afplay;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::Instrument;

use crate::config::AlertConfig;
use crate::http::request::RequestId;
use crate::observability::metrics;

pub use afplay::AfplayNotifier;

/// Failure from a notifier.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Exit {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}

/// What to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSound {
    pub name: String,
    pub volume: String,
    pub sounds_dir: PathBuf,
}

impl AlertSound {
    /// `<sounds_dir>/<name>.aiff`
    pub fn path(&self) -> PathBuf {
        self.sounds_dir.join(format!("{}.aiff", self.name))
    }
}

impl From<&AlertConfig> for AlertSound {
    fn from(config: &AlertConfig) -> Self {
        Self {
            name: config.sound.clone(),
            volume: config.volume.trim().to_string(),
            sounds_dir: PathBuf::from(&config.sounds_dir),
        }
    }
}

/// A platform side effect triggered by a firing alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn play(&self, sound: &AlertSound) -> Result<(), NotifyError>;
}

/// The notifier available on this platform, if any.
pub fn platform_notifier() -> Option<Arc<dyn Notifier>> {
    if cfg!(target_os = "macos") {
        Some(Arc::new(AfplayNotifier))
    } else {
        None
    }
}

/// Fire-and-forget front for a [`Notifier`].
#[derive(Clone)]
pub struct AlertDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
    sound: AlertSound,
}

impl AlertDispatcher {
    pub fn new(notifier: Option<Arc<dyn Notifier>>, sound: AlertSound) -> Self {
        Self { notifier, sound }
    }

    /// Start playback in a detached task. Returns false when no notifier is
    /// available on this platform.
    pub fn dispatch(&self, request_id: &RequestId) -> bool {
        let Some(notifier) = self.notifier.clone() else {
            return false;
        };
        let sound = self.sound.clone();
        let request_id = request_id.clone();

        tokio::spawn(
            async move {
                if let Err(e) = notifier.play(&sound).await {
                    tracing::error!(
                        request_id = %request_id,
                        sound = %sound.name,
                        error = %e,
                        "Unable to play alert sound"
                    );
                    metrics::record_notification_failure();
                }
            }
            .in_current_span(),
        );
        true
    }
}
