use std::collections::HashMap;

use glam::Vec2;
use space_shooter::animation::*;
use space_shooter::error::GameError;
use space_shooter::geometry::Mask;

fn frames(sizes: &[(u32, u32)]) -> FrameSet {
    sizes
        .iter()
        .map(|&(w, h)| Frame::new(Mask::filled(w, h)))
        .collect::<Vec<_>>()
        .into()
}

#[test]
fn empty_frame_set_is_rejected() {
    let err = AnimationState::looping(frames(&[]), 0.1).unwrap_err();
    assert!(matches!(err, GameError::EmptyFrames(_)));
}

#[test]
fn missing_default_state_is_rejected() {
    let err = Animator::new("idle", HashMap::new()).unwrap_err();
    assert!(matches!(err, GameError::UnknownAnimationState(_)));
}

#[test]
fn looping_state_wraps_to_first_frame() {
    let state = AnimationState::looping(frames(&[(4, 4), (4, 4), (4, 4)]), 0.1).unwrap();
    let mut anim = Animator::single(state);

    assert_eq!(anim.advance(0.1), Playback::Running);
    assert_eq!(anim.index(), 1);
    anim.advance(0.1);
    assert_eq!(anim.index(), 2);
    assert_eq!(anim.advance(0.1), Playback::Running);
    assert_eq!(anim.index(), 0);
    assert!(!anim.is_finished());
}

#[test]
fn frame_holds_until_duration_elapses() {
    let state = AnimationState::looping(frames(&[(4, 4), (4, 4)]), 0.5).unwrap();
    let mut anim = Animator::single(state);
    anim.advance(0.25);
    assert_eq!(anim.index(), 0);
    anim.advance(0.25);
    assert_eq!(anim.index(), 1);
}

#[test]
fn one_shot_expires_once_and_holds_last_frame() {
    let state = AnimationState::one_shot(frames(&[(4, 4), (8, 8)]), 0.1).unwrap();
    let mut anim = Animator::single(state);

    assert_eq!(anim.advance(0.1), Playback::Running);
    assert_eq!(anim.index(), 1);
    assert_eq!(anim.advance(0.1), Playback::Expired);
    assert!(anim.is_finished());
    assert_eq!(anim.index(), 1);

    assert_eq!(anim.advance(0.1), Playback::Held);
    assert_eq!(anim.advance(5.0), Playback::Held);
    assert_eq!(anim.index(), 1);
}

#[test]
fn non_looping_without_kill_reports_finished() {
    let state = AnimationState::new(frames(&[(4, 4)]), 0.1, false, false).unwrap();
    let mut anim = Animator::single(state);
    assert_eq!(anim.advance(0.1), Playback::Finished);
    assert_eq!(anim.advance(0.1), Playback::Held);
}

#[test]
fn set_state_switches_and_resets() {
    let idle = AnimationState::looping(frames(&[(4, 4), (4, 4)]), 0.1).unwrap();
    let boom = AnimationState::one_shot(frames(&[(6, 6), (6, 6), (6, 6)]), 0.1).unwrap();
    let mut states = HashMap::new();
    states.insert("idle".to_string(), idle);
    let mut anim = Animator::new("idle", states).unwrap();
    anim.add_state("boom", boom);

    anim.advance(0.1);
    assert_eq!(anim.index(), 1);

    // Re-selecting the current state without reset changes nothing.
    anim.set_state("idle", false).unwrap();
    assert_eq!(anim.index(), 1);

    anim.set_state("idle", true).unwrap();
    assert_eq!(anim.index(), 0);

    anim.set_state("boom", true).unwrap();
    assert_eq!(anim.state_name(), "boom");
    assert_eq!(anim.frame_count(), 3);
    assert_eq!(anim.size(), Vec2::splat(6.0));
}

#[test]
fn replacing_current_state_keeps_index_in_range() {
    let state = AnimationState::looping(frames(&[(4, 4), (4, 4), (4, 4)]), 0.1).unwrap();
    let mut anim = Animator::single(state);
    anim.advance(0.1);
    anim.advance(0.1);
    assert_eq!(anim.index(), 2);

    let shorter = AnimationState::one_shot(frames(&[(8, 8)]), 0.1).unwrap();
    anim.add_state(DEFAULT_STATE, shorter);
    assert_eq!(anim.index(), 0);
    assert_eq!(anim.frame_count(), 1);
    assert_eq!(anim.size(), Vec2::splat(8.0));
    assert_eq!(anim.advance(0.1), Playback::Expired);
}

#[test]
fn replacing_finished_state_restarts_playback() {
    let state = AnimationState::one_shot(frames(&[(4, 4), (4, 4)]), 0.1).unwrap();
    let mut anim = Animator::single(state);
    anim.advance(0.1);
    anim.advance(0.1);
    assert!(anim.is_finished());

    let longer = AnimationState::one_shot(frames(&[(4, 4), (4, 4), (4, 4)]), 0.1).unwrap();
    anim.add_state(DEFAULT_STATE, longer);
    assert!(!anim.is_finished());
    assert_eq!(anim.index(), 1);
    assert_eq!(anim.advance(0.1), Playback::Running);
    assert_eq!(anim.index(), 2);
}

#[test]
fn unknown_state_is_an_error() {
    let state = AnimationState::looping(frames(&[(4, 4)]), 0.1).unwrap();
    let mut anim = Animator::single(state);
    assert!(anim.set_state("nope", true).is_err());
    assert_eq!(anim.state_name(), DEFAULT_STATE);
}

#[test]
fn finished_flag_clears_on_state_change() {
    let state = AnimationState::one_shot(frames(&[(4, 4)]), 0.1).unwrap();
    let mut anim = Animator::single(state);
    anim.advance(0.1);
    assert!(anim.is_finished());
    anim.set_state(DEFAULT_STATE, true).unwrap();
    assert!(!anim.is_finished());
}

#[test]
fn bounds_stay_centered_across_frame_sizes() {
    let state = AnimationState::looping(frames(&[(10, 10), (20, 30)]), 0.1).unwrap();
    let mut anim = Animator::single(state);
    let center = Vec2::new(50.0, 50.0);

    let first = anim.bounds(center);
    anim.advance(0.1);
    let second = anim.bounds(center);

    assert_eq!(first.center(), center);
    assert_eq!(second.center(), center);
    assert_eq!(second.size(), Vec2::new(20.0, 30.0));
}
