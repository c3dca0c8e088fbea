use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use space_shooter::audio::*;
use space_shooter::entities::LaserBeam;
use space_shooter::error::AudioError;
use space_shooter::geometry::Rect;

/// Records every call the pool makes to its sink.
#[derive(Clone, Default)]
struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn stops(&self) -> usize {
        self.log.borrow().iter().filter(|l| l.starts_with("stop")).count()
    }
}

impl AudioSink for Recorder {
    fn play(&mut self, channel: usize, cue: Cue, _volume: f32, looping: bool) -> Result<(), AudioError> {
        self.log
            .borrow_mut()
            .push(format!("play {channel} {cue:?} {looping}"));
        Ok(())
    }

    fn stop(&mut self, channel: usize) -> Result<(), AudioError> {
        self.log.borrow_mut().push(format!("stop {channel}"));
        Ok(())
    }
}

struct Broken;

impl AudioSink for Broken {
    fn play(&mut self, _: usize, _: Cue, _: f32, _: bool) -> Result<(), AudioError> {
        Err(AudioError::Device("no device".to_string()))
    }

    fn stop(&mut self, _: usize) -> Result<(), AudioError> {
        Ok(())
    }
}

#[test]
fn cap_limits_simultaneous_cue() {
    let mut pool = ChannelPool::silent(8);
    let req = CueRequest::new(Cue::Explosion).max_simultaneous(2);
    assert!(pool.play(req).is_some());
    assert!(pool.play(req).is_some());
    assert!(pool.play(req).is_none());
    assert_eq!(pool.playing(Cue::Explosion), 2);
    assert_eq!(pool.busy_count(), 2);
}

#[test]
fn full_pool_evicts_lowest_priority() {
    let mut pool = ChannelPool::silent(2);
    let high = pool.play(CueRequest::new(Cue::Pickup).priority(5)).unwrap();
    let low = pool.play(CueRequest::new(Cue::Bullet).priority(1)).unwrap();
    let new = pool.play(CueRequest::new(Cue::Explosion).priority(3)).unwrap();

    assert!(pool.is_playing(high));
    assert!(!pool.is_playing(low));
    assert!(pool.is_playing(new));
    assert_eq!(new.channel(), low.channel());
}

#[test]
fn priority_ties_evict_oldest() {
    let mut pool = ChannelPool::silent(2);
    let first = pool.play(CueRequest::new(Cue::Pickup).priority(1)).unwrap();
    let second = pool.play(CueRequest::new(Cue::Pickup).priority(1)).unwrap();
    pool.play(CueRequest::new(Cue::Bullet).priority(1)).unwrap();

    assert!(!pool.is_playing(first));
    assert!(pool.is_playing(second));
}

#[test]
fn stale_voice_cannot_stop_new_sound() {
    let mut pool = ChannelPool::silent(1);
    let old = pool.play(CueRequest::new(Cue::Bullet)).unwrap();
    let new = pool.play(CueRequest::new(Cue::Pickup)).unwrap();
    assert!(!pool.stop(old));
    assert!(pool.is_playing(new));
}

#[test]
fn one_shots_expire_loops_do_not() {
    let mut pool = ChannelPool::silent(4);
    pool.play(CueRequest::new(Cue::Bullet));
    let hum = pool.play(CueRequest::laser()).unwrap();

    pool.advance(Cue::Bullet.duration() + 0.01);
    assert_eq!(pool.playing(Cue::Bullet), 0);

    pool.advance(1000.0);
    assert!(pool.is_playing(hum));
}

#[test]
fn sink_failure_leaves_channel_free() {
    let mut pool = ChannelPool::new(4, Box::new(Broken));
    assert!(pool.play(CueRequest::explosion()).is_none());
    assert_eq!(pool.busy_count(), 0);
}

#[test]
fn laser_loop_stopped_exactly_once() {
    let recorder = Recorder::default();
    let mut pool = ChannelPool::new(4, Box::new(recorder.clone()));
    let voice = pool.play(CueRequest::laser());
    assert!(voice.is_some());

    let hero = Rect::from_center(Vec2::new(300.0, 700.0), Vec2::splat(48.0));
    let mut beam = LaserBeam::new(&hero, 16.0, voice);
    beam.shut_down(&mut pool);
    beam.shut_down(&mut pool);

    assert_eq!(recorder.stops(), 1);
    assert_eq!(pool.playing(Cue::Laser), 0);
    assert!(beam.voice().is_none());
}

#[test]
fn laser_cue_plays_looping() {
    let recorder = Recorder::default();
    let mut pool = ChannelPool::new(4, Box::new(recorder.clone()));
    pool.play(CueRequest::laser());
    assert_eq!(recorder.log.borrow()[0], "play 0 Laser true");
}

#[test]
fn volume_is_clamped() {
    assert_eq!(CueRequest::new(Cue::Bullet).volume(3.0).volume, 1.0);
    assert_eq!(CueRequest::new(Cue::Bullet).volume(-1.0).volume, 0.0);
}

#[test]
fn zero_channel_pool_still_has_one() {
    let pool = ChannelPool::silent(0);
    assert_eq!(pool.capacity(), 1);
}
