use helmrs::lifecycle::NoteLifecycle;
use helmrs::midi::MidiMessage;
use helmrs::TriggerId;

const A: TriggerId = TriggerId('a');
const S: TriggerId = TriggerId('s');
const C_MAJOR: [u8; 3] = [60, 64, 67];

fn ons(messages: &[MidiMessage]) -> Vec<u8> {
    messages
        .iter()
        .filter(|m| m.is_note_on())
        .filter_map(MidiMessage::note)
        .collect()
}

fn offs(messages: &[MidiMessage]) -> Vec<u8> {
    messages
        .iter()
        .filter(|m| m.is_note_off())
        .filter_map(MidiMessage::note)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_then_stop() {
        let mut notes = NoteLifecycle::default();
        assert_eq!(ons(&notes.on_trigger_start(A, &C_MAJOR)), C_MAJOR.to_vec());
        assert_eq!(notes.active_for(A), C_MAJOR.to_vec());

        assert_eq!(offs(&notes.on_trigger_stop(A)), C_MAJOR.to_vec());
        assert!(notes.active().is_empty());
    }

    #[test]
    fn test_repeated_start_is_idempotent() {
        let mut notes = NoteLifecycle::default();
        assert_eq!(notes.on_trigger_start(A, &C_MAJOR).len(), 3);
        assert!(notes.on_trigger_start(A, &C_MAJOR).is_empty());

        assert_eq!(offs(&notes.on_trigger_stop(A)).len(), 3);
        assert!(notes.on_trigger_stop(A).is_empty());
    }

    #[test]
    fn test_restart_with_new_chord_only_adds_new_pitches() {
        let mut notes = NoteLifecycle::default();
        notes.on_trigger_start(A, &[60, 67]);
        assert_eq!(ons(&notes.on_trigger_start(A, &[60, 64, 67])), vec![64]);
        assert_eq!(offs(&notes.on_trigger_stop(A)), vec![60, 64, 67]);
    }

    #[test]
    fn test_triggers_own_their_pitches() {
        let mut notes = NoteLifecycle::default();
        notes.on_trigger_start(A, &[60]);
        assert_eq!(ons(&notes.on_trigger_start(S, &[60, 67])), vec![60, 67]);

        assert_eq!(offs(&notes.on_trigger_stop(A)), vec![60]);
        assert_eq!(notes.active_for(S), vec![60, 67]);
    }

    #[test]
    fn test_latch_round_trip() {
        let mut notes = NoteLifecycle::default();
        notes.on_latch_engage();
        notes.on_trigger_start(A, &C_MAJOR);

        assert!(notes.on_trigger_stop(A).is_empty());
        assert_eq!(notes.active_for(A), C_MAJOR.to_vec());
        assert!(notes.latch().was_released(A));

        let released = notes.on_latch_disengage();
        assert_eq!(offs(&released), C_MAJOR.to_vec());
        assert_eq!(released.len(), 3);
        assert!(notes.active().is_empty());
        assert!(notes.latch().captured().is_empty());
        assert!(!notes.latch().is_engaged());
    }

    #[test]
    fn test_engaging_latch_leaves_sounding_notes_alone() {
        let mut notes = NoteLifecycle::default();
        notes.on_trigger_start(A, &C_MAJOR);
        notes.on_latch_engage();
        assert_eq!(notes.active_for(A), C_MAJOR.to_vec());
        assert!(notes.latch().captured().is_empty());
    }

    #[test]
    fn test_note_started_before_latch_is_held_when_released_during_latch() {
        let mut notes = NoteLifecycle::default();
        notes.on_trigger_start(A, &C_MAJOR);
        notes.on_latch_engage();

        assert!(notes.on_trigger_stop(A).is_empty());
        assert_eq!(offs(&notes.on_latch_disengage()), C_MAJOR.to_vec());
        assert!(notes.active().is_empty());
    }

    #[test]
    fn test_held_trigger_survives_disengage_and_releases_once() {
        let mut notes = NoteLifecycle::default();
        notes.on_latch_engage();
        notes.on_trigger_start(A, &C_MAJOR);

        assert!(notes.on_latch_disengage().is_empty());
        assert_eq!(notes.active_for(A), C_MAJOR.to_vec());

        assert_eq!(offs(&notes.on_trigger_stop(A)), C_MAJOR.to_vec());
        assert!(notes.on_trigger_stop(A).is_empty());
    }

    #[test]
    fn test_repress_during_latch_still_releases_at_disengage() {
        let mut notes = NoteLifecycle::default();
        notes.on_latch_engage();
        notes.on_trigger_start(A, &C_MAJOR);
        notes.on_trigger_stop(A);
        assert!(notes.on_trigger_start(A, &C_MAJOR).is_empty());

        assert_eq!(offs(&notes.on_latch_disengage()), C_MAJOR.to_vec());
        assert!(notes.on_trigger_stop(A).is_empty());
    }

    #[test]
    fn test_disengage_without_engage_is_silent() {
        let mut notes = NoteLifecycle::default();
        notes.on_trigger_start(A, &C_MAJOR);
        assert!(notes.on_latch_disengage().is_empty());
        assert_eq!(notes.active_for(A), C_MAJOR.to_vec());
    }

    #[test]
    fn test_every_note_off_follows_a_note_on() {
        let mut notes = NoteLifecycle::default();
        let mut log = Vec::new();
        log.extend(notes.on_trigger_start(A, &C_MAJOR));
        notes.on_latch_engage();
        log.extend(notes.on_trigger_start(S, &[60, 67]));
        log.extend(notes.on_trigger_stop(A));
        log.extend(notes.on_trigger_stop(S));
        log.extend(notes.on_trigger_start(A, &C_MAJOR));
        log.extend(notes.on_latch_disengage());
        log.extend(notes.on_trigger_stop(A));
        log.extend(notes.on_trigger_stop(S));

        assert_eq!(ons(&log).len(), offs(&log).len());
        assert!(notes.active().is_empty());
    }
}
