use helmrs::chord::{ChordDegree, ChordResolver, Mode};
use helmrs::ring::{RingModifier, RingSelector, RotationRing};
use helmrs::wheel::{Direction, FifthsPosition, Wheel, WheelTarget};

fn triad() -> ChordDegree {
    ChordDegree::new(&[1, 3, 5]).unwrap()
}

#[test]
fn test_key_rotation_is_net_steps_mod_12() {
    let steps = [1, 1, -1, 1, 1, 1, -1, -1, -1, -1, -1, -1, -1, -1, 1, -1, -1, -1];
    let mut selector = RingSelector::new();
    selector.modifier_down(RingModifier::Key);
    let mut wheel = Wheel::new(FifthsPosition::new(4), FifthsPosition::new(0));

    for step in steps {
        let direction = if step > 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        selector.route(&mut wheel, direction);
    }

    let net: i32 = steps.iter().sum();
    assert_eq!(wheel.key().index() as i32, (4 + net).rem_euclid(12));
    assert_eq!(wheel.mode().index(), 0);
}

#[test]
fn test_modifier_release_restores_mode_ring() {
    for start in [None, Some(RingModifier::Key), Some(RingModifier::All)] {
        let mut selector = RingSelector::new();
        if let Some(modifier) = start {
            selector.modifier_down(modifier);
        }
        selector.modifier_down(RingModifier::Key);
        selector.modifier_up();
        assert_eq!(selector.ring(), RotationRing::Mode);
    }
}

#[test]
fn test_default_ring_only_moves_mode_wheel() {
    let selector = RingSelector::new();
    let mut wheel = Wheel::default();
    selector.route(&mut wheel, Direction::Clockwise);
    assert_eq!(wheel.key().index(), 0);
    assert_eq!(wheel.mode().index(), 1);
}

#[test]
fn test_c_major_triad() {
    let resolver = ChordResolver::default();
    let wheel = Wheel::default();
    assert_eq!(resolver.mode(&wheel), Mode::Ionian);
    assert_eq!(resolver.resolve(&triad(), &wheel), vec![60, 64, 67]);
}

#[test]
fn test_key_step_clockwise_moves_up_a_fifth() {
    let resolver = ChordResolver::default();
    let mut wheel = Wheel::default();
    let before = resolver.resolve(&triad(), &wheel);

    wheel.rotate(WheelTarget::Key, Direction::Clockwise);
    let after = resolver.resolve(&triad(), &wheel);

    let shifted: Vec<u8> = before.iter().map(|p| p + 7).collect();
    assert_eq!(after, shifted);
}

#[test]
fn test_tonic_stays_in_base_octave() {
    let resolver = ChordResolver::default();
    let mut wheel = Wheel::default();
    for _ in 0..12 {
        wheel.rotate(WheelTarget::Key, Direction::Clockwise);
        let tonic = resolver.tonic(&wheel);
        assert!((60..72).contains(&tonic), "tonic {} escaped the octave", tonic);
    }
    assert_eq!(wheel.key().index(), 0);
}

#[test]
fn test_mode_wheel_changes_interval_table() {
    let resolver = ChordResolver::default();
    // Mode wheel three fifths below the key: aeolian on the same tonic.
    let wheel = Wheel::new(FifthsPosition::new(0), FifthsPosition::new(9));
    assert_eq!(resolver.mode(&wheel), Mode::Aeolian);
    assert_eq!(resolver.resolve(&triad(), &wheel), vec![60, 63, 67]);
}

#[test]
fn test_all_ring_transposes_without_changing_mode() {
    let resolver = ChordResolver::default();
    let mut selector = RingSelector::new();
    let mut wheel = Wheel::new(FifthsPosition::new(0), FifthsPosition::new(10));
    assert_eq!(resolver.mode(&wheel), Mode::Dorian);

    selector.modifier_down(RingModifier::All);
    selector.route(&mut wheel, Direction::Clockwise);
    selector.route(&mut wheel, Direction::Clockwise);

    assert_eq!(resolver.mode(&wheel), Mode::Dorian);
    // D dorian
    assert_eq!(resolver.resolve(&triad(), &wheel), vec![62, 65, 69]);
}

#[test]
fn test_resolution_is_deduplicated_and_ascending() {
    let resolver = ChordResolver::default();
    let chord = ChordDegree::new(&[8, 5, 1, 9]).unwrap();
    assert_eq!(
        resolver.resolve(&chord, &Wheel::default()),
        vec![60, 67, 72, 74]
    );
}

#[test]
fn test_pitches_above_127_are_dropped() {
    let resolver = ChordResolver::new(120);
    let chord = ChordDegree::new(&[1, 5]).unwrap();
    let wheel = Wheel::new(FifthsPosition::new(1), FifthsPosition::new(1));
    // Tonic G = 127, its fifth would be 134.
    assert_eq!(resolver.resolve(&chord, &wheel), vec![127]);
}
