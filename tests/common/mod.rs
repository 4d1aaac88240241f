//! Shared doubles and fixtures for the player scenarios

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use tunequeue::commands::music::utils::player::{CompletionReceiver, MusicPlayer};

use mocks::{RecordingDriver, RecordingNotifier, ScriptedResolver};

/// A player wired to recording doubles. Completions are left on `completions`
/// so each test decides when a stream "ends".
pub struct Harness {
    pub player: Arc<MusicPlayer>,
    pub completions: CompletionReceiver,
    pub resolver: Arc<ScriptedResolver>,
    pub driver: Arc<RecordingDriver>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(resolver: ScriptedResolver) -> Self {
        crate::test_utils::init();

        let resolver = Arc::new(resolver);
        let driver = Arc::new(RecordingDriver::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (player, completions) = MusicPlayer::new(
            resolver.clone(),
            driver.clone(),
            notifier.clone(),
        );

        Self {
            player: Arc::new(player),
            completions,
            resolver,
            driver,
            notifier,
        }
    }

    /// Deliver the next pending completion to the player
    pub async fn pump(&mut self) {
        let completion = tokio::time::timeout(Duration::from_secs(1), self.completions.recv())
            .await
            .expect("no completion arrived")
            .expect("completion channel closed");
        self.player.handle_completion(completion).await;
    }

    /// True if no completion is waiting
    pub fn no_pending_completions(&mut self) -> bool {
        self.completions.try_recv().is_err()
    }
}
