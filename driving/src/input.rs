use bevy::prelude::*;

/// One of the four driving intents a key can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Key state sampled once per simulation tick.
///
/// Opposing directions may be held simultaneously; the integrator's priority
/// rule resolves them, not this struct.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DriveInput {
    /// Set exactly one intent. Repeats for an already-active direction are
    /// idempotent.
    pub fn set(&mut self, direction: DriveDirection, active: bool) {
        match direction {
            DriveDirection::Forward => self.forward = active,
            DriveDirection::Backward => self.backward = active,
            DriveDirection::Left => self.left = active,
            DriveDirection::Right => self.right = active,
        }
    }
}

const KEY_BINDINGS: [(DriveDirection, [KeyCode; 2]); 4] = [
    (DriveDirection::Forward, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (DriveDirection::Backward, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (DriveDirection::Left, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (DriveDirection::Right, [KeyCode::KeyD, KeyCode::ArrowRight]),
];

/// Translate key edges into intent updates. A release only clears the intent
/// once no bound key for that direction is still held.
pub fn read_drive_keys(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<DriveInput>) {
    for (direction, keys) in KEY_BINDINGS {
        if keys.iter().any(|key| keyboard.just_pressed(*key)) {
            input.set(direction, true);
        } else if keys.iter().any(|key| keyboard.just_released(*key))
            && !keys.iter().any(|key| keyboard.pressed(*key))
        {
            input.set(direction, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DriveDirection, DriveInput};

    #[test]
    fn set_touches_exactly_one_field() {
        let mut input = DriveInput::default();
        input.set(DriveDirection::Left, true);
        assert!(input.left);
        assert!(!input.forward && !input.backward && !input.right);

        input.set(DriveDirection::Left, false);
        assert_eq!(input, DriveInput::default());
    }

    #[test]
    fn repeated_set_is_idempotent() {
        let mut input = DriveInput::default();
        input.set(DriveDirection::Forward, true);
        let after_first = input;
        input.set(DriveDirection::Forward, true);
        assert_eq!(input, after_first);
    }

    #[test]
    fn opposing_intents_may_both_be_held() {
        let mut input = DriveInput::default();
        input.set(DriveDirection::Forward, true);
        input.set(DriveDirection::Backward, true);
        assert!(input.forward && input.backward);
    }
}
