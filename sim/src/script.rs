//! Scripted intent timeline.
//!
//! Stands in for player input and AI: a list of timed cues, each overwriting part of
//! the `LocomotionInput` of the bodies it targets. Held values (axis, sprint) stay
//! until a later cue changes them; jump/crouch/look/momentum fire once.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use locomotion::{LocomotionActive, LocomotionConfig, LocomotionInput, MomentumDirection, Variant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueTarget {
    #[default]
    All,
    Player,
    Cells,
}

impl CueTarget {
    fn matches(self, variant: Variant) -> bool {
        match self {
            CueTarget::All => true,
            CueTarget::Player => variant == Variant::Player,
            CueTarget::Cells => variant == Variant::Cell,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentCue {
    /// Seconds since startup.
    pub at: f32,
    pub target: CueTarget,
    pub axis: Option<[f32; 2]>,
    pub look: Option<[f32; 2]>,
    pub sprint: Option<bool>,
    pub jump: bool,
    pub crouch: bool,
    pub momentum: Option<(MomentumDirection, f32)>,
}

impl IntentCue {
    fn apply(&self, input: &mut LocomotionInput) {
        if let Some(axis) = self.axis {
            input.axis = Vec2::from_array(axis);
        }
        if let Some(look) = self.look {
            input.look += Vec2::from_array(look);
        }
        if let Some(sprint) = self.sprint {
            input.sprint = sprint;
        }
        input.jump |= self.jump;
        input.crouch_toggle |= self.crouch;
        if self.momentum.is_some() {
            input.momentum = self.momentum;
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentScript {
    pub cues: Vec<IntentCue>,
    #[serde(skip)]
    cursor: usize,
}

impl IntentScript {
    pub fn new(mut cues: Vec<IntentCue>) -> Self {
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { cues, cursor: 0 }
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ScriptError> {
        let parsed: Self = ron::from_str(text)?;
        Ok(Self::new(parsed.cues))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Cues that became due at or before `elapsed`, each returned once.
    pub fn due(&mut self, elapsed: f32) -> &[IntentCue] {
        let start = self.cursor;
        while self.cursor < self.cues.len() && self.cues[self.cursor].at <= elapsed {
            self.cursor += 1;
        }
        &self.cues[start..self.cursor]
    }

    pub fn finished(&self) -> bool {
        self.cursor >= self.cues.len()
    }
}

impl Default for IntentScript {
    /// Walk, sprint, jump, crouch and turn the player; march the cells off the edge.
    fn default() -> Self {
        let cue = |at: f32, target: CueTarget| IntentCue {
            at,
            target,
            ..default()
        };
        Self::new(vec![
            IntentCue {
                axis: Some([0.0, 1.0]),
                ..cue(0.5, CueTarget::All)
            },
            IntentCue {
                sprint: Some(true),
                ..cue(1.5, CueTarget::Player)
            },
            IntentCue {
                jump: true,
                ..cue(2.5, CueTarget::All)
            },
            // Mid-air request; dropped.
            IntentCue {
                jump: true,
                ..cue(2.6, CueTarget::Player)
            },
            IntentCue {
                sprint: Some(false),
                look: Some([45.0, 0.0]),
                ..cue(4.0, CueTarget::Player)
            },
            IntentCue {
                crouch: true,
                ..cue(5.0, CueTarget::Player)
            },
            IntentCue {
                crouch: true,
                ..cue(6.5, CueTarget::Player)
            },
            IntentCue {
                axis: Some([1.0, 0.0]),
                momentum: Some((MomentumDirection::Right, 1.0)),
                ..cue(7.0, CueTarget::Cells)
            },
            IntentCue {
                axis: Some([0.0, 0.0]),
                ..cue(9.0, CueTarget::Player)
            },
        ])
    }
}

/// Copy due cues into the targeted bodies' intent.
pub fn play_script(
    time: Res<Time>,
    mut script: ResMut<IntentScript>,
    mut bodies: Query<(&LocomotionConfig, &mut LocomotionInput), With<LocomotionActive>>,
) {
    if script.finished() {
        return;
    }

    let elapsed = time.elapsed_secs();
    for cue in script.due(elapsed) {
        for (config, mut input) in bodies.iter_mut() {
            if cue.target.matches(config.variant) {
                cue.apply(&mut input);
            }
        }
        debug!("Cue at {:.2}s applied to {:?}", cue.at, cue.target);
    }
}
