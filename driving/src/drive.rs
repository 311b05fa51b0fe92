use avian3d::prelude::*;
use bevy::prelude::*;

use crate::Vehicle;
use crate::input::DriveInput;

/// Tuning constants for the drive model. Changing these re-tunes feel, not
/// correctness.
#[derive(Resource, Clone, Copy)]
pub struct DriveTuning {
    pub base_speed: f32,
    /// Yaw impulse per tick at full steering authority (rad/s).
    pub rotation_speed: f32,
    pub max_forward_speed: f32,
    pub max_reverse_speed: f32,
    /// Speed change rate under throttle (m/s²).
    pub accel: f32,
    /// Speed change rate when the demanded change opposes the current
    /// direction of travel (m/s²).
    pub brake_accel: f32,
    /// Per-second decay applied to forward speed while coasting.
    pub coast_drag: f32,
    /// Per-tick multiplier on the sideways velocity component (tire scrub).
    pub lateral_damping: f32,
    /// Horizontal speed at which steering reaches full authority (m/s).
    pub steering_speed_ref: f32,
    /// Steering authority multiplier while neither throttle intent is held.
    pub coasting_steer_penalty: f32,
}

impl Default for DriveTuning {
    fn default() -> Self {
        let base_speed = 1.3;
        Self {
            base_speed,
            rotation_speed: 2.0,
            max_forward_speed: base_speed * 10.0,
            max_reverse_speed: base_speed * 8.0,
            accel: 30.0,
            brake_accel: 40.0,
            coast_drag: 0.6,
            lateral_damping: 0.98,
            steering_speed_ref: 1.5,
            coasting_steer_penalty: 0.4,
        }
    }
}

/// Result of one drive tick: the velocity to set on the body and, when
/// steering input is held, the yaw impulse to apply about world +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStep {
    pub velocity: Vec3,
    pub yaw_impulse: Option<f32>,
}

/// The vehicle's world-space forward axis (local -Z rotated by `rotation`).
pub fn forward_axis(rotation: Quat) -> Vec3 {
    rotation * Vec3::NEG_Z
}

/// Speed along the vehicle's heading. Positive means travelling forward,
/// regardless of world heading.
pub fn signed_forward_speed(rotation: Quat, velocity: Vec3) -> f32 {
    forward_axis(rotation).dot(velocity)
}

/// Compute one tick of the drive model.
///
/// `rotation` must be a normalized orientation quaternion and `dt`
/// non-negative; both are preconditions, not handled errors.
pub fn drive_step(
    rotation: Quat,
    velocity: Vec3,
    input: DriveInput,
    tuning: &DriveTuning,
    dt: f32,
) -> DriveStep {
    let forward = forward_axis(rotation);
    let forward_speed = forward.dot(velocity);

    // Throttle intents, forward taking priority; with neither held the speed
    // decays toward zero without ever crossing it in a single tick.
    let desired_speed = if input.forward {
        tuning.max_forward_speed
    } else if input.backward {
        -tuning.max_reverse_speed
    } else {
        forward_speed * (1.0 - tuning.coast_drag * dt).max(0.0)
    };

    let speed_diff = desired_speed - forward_speed;
    // A zero on either side counts as sign-matching, so pulling away from
    // rest uses the throttle rate rather than the brake rate.
    let same_direction =
        speed_diff == 0.0 || forward_speed == 0.0 || (speed_diff > 0.0) == (forward_speed > 0.0);
    let rate = if same_direction {
        tuning.accel
    } else {
        tuning.brake_accel
    };
    let new_forward_speed = forward_speed + speed_diff.clamp(-rate * dt, rate * dt);

    // Whatever is not along the heading is slide; bleed it off. The vertical
    // component stays whatever gravity made it.
    let lateral = velocity - forward * forward_speed;
    let mut new_velocity = forward * new_forward_speed + lateral * tuning.lateral_damping;
    new_velocity.y = velocity.y;

    let steer = (input.left as i32 - input.right as i32) as f32;
    let yaw_impulse = (steer != 0.0).then(|| {
        // Steering mirrors while reversing, scales quadratically with
        // horizontal speed up to full authority, and weakens while coasting.
        let direction = if input.backward && !input.forward {
            -1.0
        } else {
            1.0
        };
        let horiz_speed = velocity.xz().length();
        let speed_scale = (horiz_speed / tuning.steering_speed_ref).powi(2).min(1.0);
        let coasting_penalty = if !input.forward && !input.backward {
            tuning.coasting_steer_penalty
        } else {
            1.0
        };
        tuning.rotation_speed * steer * direction * speed_scale * coasting_penalty
    });

    DriveStep {
        velocity: new_velocity,
        yaw_impulse,
    }
}

/// Apply one drive tick to the vehicle body. Skips the tick when the body has
/// not been spawned yet.
pub fn apply_drive(
    time: Res<Time<Fixed>>,
    input: Res<DriveInput>,
    tuning: Res<DriveTuning>,
    mut vehicles: Query<(&Transform, &mut LinearVelocity, &mut AngularVelocity), With<Vehicle>>,
) {
    let dt = time.delta_secs();
    let Ok((transform, mut linear_velocity, mut angular_velocity)) = vehicles.single_mut() else {
        return;
    };

    let step = drive_step(transform.rotation, linear_velocity.0, *input, &tuning, dt);
    linear_velocity.0 = step.velocity;
    if let Some(impulse) = step.yaw_impulse {
        angular_velocity.y += impulse;
    }
}
