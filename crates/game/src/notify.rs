//! Side-effect notifications raised by gameplay: sounds, music and
//! checkpoints. The game only announces them; a sink decides what happens.

use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MusicTrack {
    Title,
    Main,
}

impl MusicTrack {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            MusicTrack::Title => "title",
            MusicTrack::Main => "main",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notification {
    CoinCollected,
    KeyCollected,
    DoorOpening,
    Footstep,
    MapTransition,
    LifeLost,
    EndGame,
    CheckpointReached,
    WaspZooming,
    Music(MusicTrack),
}

impl Notification {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Notification::CoinCollected => "coin_collected",
            Notification::KeyCollected => "key_collected",
            Notification::DoorOpening => "door_opening",
            Notification::Footstep => "footstep",
            Notification::MapTransition => "map_transition",
            Notification::LifeLost => "life_lost",
            Notification::EndGame => "end_game",
            Notification::CheckpointReached => "checkpoint_reached",
            Notification::WaspZooming => "wasp_zooming",
            Notification::Music(_) => "music",
        }
    }

    /// Checkpoints are bookkeeping, not something to play.
    const fn is_audible(self) -> bool {
        !matches!(self, Notification::CheckpointReached)
    }
}

pub(crate) trait NotificationSink {
    fn notify(&mut self, notification: Notification);

    /// Flips the mute flag and returns the new value.
    fn toggle_mute(&mut self) -> bool;
}

/// Default sink: records notifications in the trace log.
#[derive(Debug, Default)]
pub(crate) struct TracingSink {
    muted: bool,
    track: Option<MusicTrack>,
}

impl TracingSink {
    pub(crate) fn new(sound_enabled: bool) -> Self {
        Self {
            muted: !sound_enabled,
            track: None,
        }
    }
}

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::Music(track) => {
                if self.track != Some(track) {
                    self.track = Some(track);
                    info!(track = track.name(), muted = self.muted, "music_started");
                }
            }
            _ if !notification.is_audible() => {
                debug!(event = notification.name(), "notification");
            }
            _ if self.muted => {
                trace!(sound = notification.name(), "sound_muted");
            }
            _ => {
                debug!(sound = notification.name(), "sound_played");
            }
        }
    }

    fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        info!(muted = self.muted, "sound_toggled");
        self.muted
    }
}
