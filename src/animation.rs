//! Named-state frame animation shared by every animated entity.

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;

use crate::error::GameError;
use crate::geometry::{Mask, Rect};

pub const DEFAULT_STATE: &str = "default";

/// One animation frame: its pixel size and collision mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub size: Vec2,
    pub mask: Mask,
}

impl Frame {
    pub fn new(mask: Mask) -> Self {
        Self {
            size: Vec2::new(mask.width() as f32, mask.height() as f32),
            mask,
        }
    }
}

/// Frames are shared between every entity of a kind.
pub type FrameSet = Rc<[Frame]>;

#[derive(Clone, Debug)]
pub struct AnimationState {
    frames: FrameSet,
    frame_duration: f32,
    looping: bool,
    kill_on_end: bool,
}

impl AnimationState {
    pub fn new(
        frames: FrameSet,
        frame_duration: f32,
        looping: bool,
        kill_on_end: bool,
    ) -> Result<Self, GameError> {
        if frames.is_empty() {
            return Err(GameError::EmptyFrames("animation state".to_string()));
        }
        Ok(Self {
            frames,
            frame_duration,
            looping,
            kill_on_end,
        })
    }

    pub fn looping(frames: FrameSet, frame_duration: f32) -> Result<Self, GameError> {
        Self::new(frames, frame_duration, true, false)
    }

    /// Plays once, then asks for the owning entity to be removed.
    pub fn one_shot(frames: FrameSet, frame_duration: f32) -> Result<Self, GameError> {
        Self::new(frames, frame_duration, false, true)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Outcome of advancing an animation by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Running,
    /// A non-looping state reached its last frame on this tick.
    Finished,
    /// Finished and the state asks for its entity to be destroyed.
    Expired,
    /// Finished on an earlier tick; the last frame is held.
    Held,
}

#[derive(Clone, Debug)]
pub struct Animator {
    states: HashMap<String, AnimationState>,
    current: String,
    index: usize,
    elapsed: f32,
    finished: bool,
}

impl Animator {
    pub fn new(
        default_state: &str,
        states: HashMap<String, AnimationState>,
    ) -> Result<Self, GameError> {
        if !states.contains_key(default_state) {
            return Err(GameError::UnknownAnimationState(default_state.to_string()));
        }
        Ok(Self {
            states,
            current: default_state.to_string(),
            index: 0,
            elapsed: 0.0,
            finished: false,
        })
    }

    /// Animator with a single `"default"` state.
    pub fn single(state: AnimationState) -> Self {
        let mut states = HashMap::new();
        states.insert(DEFAULT_STATE.to_string(), state);
        Self {
            states,
            current: DEFAULT_STATE.to_string(),
            index: 0,
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Register `state` under `name`.  Replacing the current state restarts
    /// playback and keeps the frame index inside the new frame list.
    pub fn add_state(&mut self, name: &str, state: AnimationState) {
        if name == self.current {
            if self.index >= state.len() {
                self.index = 0;
            }
            self.elapsed = 0.0;
            self.finished = false;
        }
        self.states.insert(name.to_string(), state);
    }

    /// Switch to `name`.  Re-selecting the current state without a reset is a
    /// no-op; otherwise the timer and finished flag restart.
    pub fn set_state(&mut self, name: &str, reset_frame: bool) -> Result<(), GameError> {
        if name == self.current && !reset_frame {
            return Ok(());
        }
        let len = self
            .states
            .get(name)
            .map(AnimationState::len)
            .ok_or_else(|| GameError::UnknownAnimationState(name.to_string()))?;

        self.current = name.to_string();
        if reset_frame || self.index >= len {
            self.index = 0;
        }
        self.elapsed = 0.0;
        self.finished = false;
        Ok(())
    }

    pub fn advance(&mut self, dt: f32) -> Playback {
        if self.finished {
            return Playback::Held;
        }
        let state = &self.states[&self.current];

        self.elapsed += dt;
        if self.elapsed < state.frame_duration {
            return Playback::Running;
        }
        self.elapsed = 0.0;

        if self.index + 1 < state.frames.len() {
            self.index += 1;
            return Playback::Running;
        }
        if state.looping {
            self.index = 0;
            return Playback::Running;
        }

        // Hold the last frame.
        self.finished = true;
        if state.kill_on_end {
            Playback::Expired
        } else {
            Playback::Finished
        }
    }

    pub fn state_name(&self) -> &str {
        &self.current
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame_count(&self) -> usize {
        self.states[&self.current].frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame(&self) -> &Frame {
        &self.states[&self.current].frames[self.index]
    }

    pub fn size(&self) -> Vec2 {
        self.frame().size
    }

    /// Visual bounds centered on the entity's logical center.
    pub fn bounds(&self, center: Vec2) -> Rect {
        Rect::from_center(center, self.size())
    }
}
