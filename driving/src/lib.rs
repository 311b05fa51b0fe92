use bevy::prelude::*;

pub mod camera;
pub mod course;
pub mod course_format;
pub mod drive;
pub mod input;

/// Marker for the player-controlled vehicle body.
#[derive(Component)]
pub struct Vehicle;
