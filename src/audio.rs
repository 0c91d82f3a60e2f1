/// Audio collaborators.
///
/// The session never plays sound itself; it emits play/stop events for the
/// cues below and the host forwards them to whatever sink it has.

use crate::session::SessionEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Background music, looping while a session runs.
    Music,
    Shoot,
    Hit,
    /// The shield absorbed a blow.
    ShieldBreak,
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
    fn stop(&mut self, cue: AudioCue);
    /// `volume` is in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
}

/// Used when the host has no audio device.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
    fn stop(&mut self, _cue: AudioCue) {}
    fn set_volume(&mut self, _volume: f32) {}
}

/// Forward the audio events in `events` to `sink`, ignoring the rest.
pub fn dispatch(events: &[SessionEvent], sink: &mut dyn AudioSink) {
    for event in events {
        match event {
            SessionEvent::Play(cue) => sink.play(*cue),
            SessionEvent::Stop(cue) => sink.stop(*cue),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<(bool, AudioCue)>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.log.push((true, cue));
        }
        fn stop(&mut self, cue: AudioCue) {
            self.log.push((false, cue));
        }
        fn set_volume(&mut self, _volume: f32) {}
    }

    #[test]
    fn dispatch_forwards_only_audio_events() {
        let events = vec![
            SessionEvent::Started { player: "Ada".into() },
            SessionEvent::Play(AudioCue::Music),
            SessionEvent::Play(AudioCue::Shoot),
            SessionEvent::Paused,
            SessionEvent::Stop(AudioCue::Music),
        ];
        let mut rec = Recorder::default();
        dispatch(&events, &mut rec);
        assert_eq!(
            rec.log,
            vec![(true, AudioCue::Music), (true, AudioCue::Shoot), (false, AudioCue::Music)]
        );
    }

    #[test]
    fn null_audio_accepts_everything() {
        let mut sink = NullAudio;
        dispatch(&[SessionEvent::Play(AudioCue::Hit)], &mut sink);
        sink.set_volume(0.5);
    }
}
