//! Voice allocation
//!
//! Maps incoming notes onto the active chip's fixed voice pool. The policy
//! is deterministic: first free voice by index, otherwise steal the voice
//! holding the oldest note. `start_time` is a logical allocation counter
//! stamped by the chip driver at note-on, so "oldest" means earliest
//! allocation, not wall time.

use crate::chip::Voice;

/// Pick a voice index for a new note.
///
/// Scans in index order and returns the first inactive voice. When every
/// voice is sounding, returns the voice with the smallest `start_time`
/// (strict comparison, so ties keep the lowest index). Returns `None` only
/// for an empty voice pool, which indicates a detection or configuration
/// problem rather than a playable chip.
pub fn allocate_voice(voices: &[Voice]) -> Option<usize> {
    if let Some(free) = voices.iter().position(|v| !v.active) {
        return Some(free);
    }

    if voices.is_empty() {
        return None;
    }

    let mut oldest = 0;
    let mut oldest_time = voices[0].start_time;
    for (i, voice) in voices.iter().enumerate().skip(1) {
        if voice.start_time < oldest_time {
            oldest_time = voice.start_time;
            oldest = i;
        }
    }
    Some(oldest)
}

/// Find the active voice playing an exact (note, channel) pair.
///
/// First match in index order wins; `None` when nothing matches, which is
/// common (note-off for a note that was stolen earlier).
pub fn find_voice(voices: &[Voice], note: u8, channel: u8) -> Option<usize> {
    voices
        .iter()
        .position(|v| v.active && v.note == note && v.channel == channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(note: u8, channel: u8, start_time: u32) -> Voice {
        Voice {
            active: true,
            note,
            channel,
            start_time,
            ..Voice::default()
        }
    }

    #[test]
    fn test_first_free_voice_wins() {
        let voices = [active(60, 0, 0), Voice::default(), Voice::default()];
        assert_eq!(allocate_voice(&voices), Some(1));
    }

    #[test]
    fn test_full_pool_steals_oldest_start_time() {
        let voices = [active(60, 0, 5), active(62, 0, 3), active(64, 0, 9)];
        assert_eq!(allocate_voice(&voices), Some(1));
    }

    #[test]
    fn test_steal_tie_breaks_on_lowest_index() {
        let voices = [active(60, 0, 4), active(62, 0, 4), active(64, 0, 4)];
        assert_eq!(allocate_voice(&voices), Some(0));
    }

    #[test]
    fn test_empty_pool_fails() {
        assert_eq!(allocate_voice(&[]), None);
    }

    #[test]
    fn test_find_voice_matches_note_and_channel() {
        let voices = [active(60, 0, 0), active(60, 1, 1), active(64, 0, 2)];

        assert_eq!(find_voice(&voices, 60, 1), Some(1));
        assert_eq!(find_voice(&voices, 64, 0), Some(2));
        assert_eq!(find_voice(&voices, 60, 2), None);
        assert_eq!(find_voice(&voices, 65, 0), None);
    }

    #[test]
    fn test_find_voice_ignores_inactive_voices() {
        let mut voices = [active(60, 0, 0)];
        voices[0].active = false;
        assert_eq!(find_voice(&voices, 60, 0), None);
    }
}
