use avian3d::prelude::*;
use bevy::{
    color::palettes::css::{GREEN, WHITE, YELLOW},
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use driving::Vehicle;
use driving::camera::{ChaseCamera, follow_vehicle};
use driving::course::{self, CourseLayout, CoursePath, CourseProgress, ZoneReached};
use driving::drive::{DriveTuning, apply_drive, signed_forward_speed};
use driving::input::{DriveInput, read_drive_keys};

fn main() {
    let course_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "driving/assets/course1.toml".to_string());

    App::new()
        .add_plugins((
            DefaultPlugins,
            FrameTimeDiagnosticsPlugin::default(),
            PhysicsPlugins::default(),
        ))
        .init_state::<SimState>()
        .add_message::<ZoneReached>()
        .insert_resource(Time::<Fixed>::from_duration(
            std::time::Duration::from_secs_f32(1.0 / 60.0),
        ))
        .insert_resource(CoursePath(course_path))
        .insert_resource(DriveInput::default())
        .insert_resource(DriveTuning::default())
        .insert_resource(CourseProgress::default())
        .add_systems(
            Startup,
            (
                course::setup_course,
                setup.after(course::setup_course),
                spawn_vehicle.after(course::setup_course),
            ),
        )
        // Pause/unpause avian3d physics based on SimState
        .add_systems(OnEnter(SimState::Paused), pause_physics)
        .add_systems(OnEnter(SimState::Driving), unpause_physics)
        .add_systems(Update, (read_drive_keys, toggle_pause, toggle_debug_gizmos))
        // Drive model: only while Driving
        .add_systems(FixedUpdate, apply_drive.run_if(in_state(SimState::Driving)))
        .add_systems(
            Update,
            (
                course::check_zone_arrival.run_if(in_state(SimState::Driving)),
                course::announce_zone_reached,
                follow_vehicle,
                draw_gizmos,
                update_fps_counter,
                update_hud,
            ),
        )
        .run();
}

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
enum SimState {
    #[default]
    Driving,
    Paused,
}

/// Marker: when present on the vehicle, debug gizmos are drawn for it.
#[derive(Component)]
struct DebugGizmos;

#[derive(Component)]
struct FpsCounterText;

#[derive(Component)]
struct SpeedText;

#[derive(Component)]
struct ZoneText;

const VEHICLE_SPAWN_HEIGHT: f32 = 0.6;

fn setup(mut commands: Commands, course: Res<CourseLayout>) {
    spawn_hud_text(&mut commands, 8.0, "FPS: --", FpsCounterText);
    spawn_hud_text(&mut commands, 36.0, "Speed:   0.0 m/s", SpeedText);
    spawn_hud_text(&mut commands, 64.0, "Zones: 0/0", ZoneText);

    // Camera starts at its settled chase position behind the spawn point.
    let spawn_translation = course.0.spawn_translation() + Vec3::Y * VEHICLE_SPAWN_HEIGHT;
    let chase = ChaseCamera::default();
    let target = chase.target(spawn_translation);
    let position = chase.desired_position(spawn_translation, course.0.spawn_rotation());
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).looking_at(target, Vec3::Y),
        chase,
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(40.0, 60.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_hud_text(commands: &mut Commands, top: f32, value: &str, marker: impl Component) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(top),
            left: Val::Px(8.0),
            padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
        Text::new(value),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(WHITE.into()),
        marker,
    ));
}

fn spawn_vehicle(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    course: Res<CourseLayout>,
) {
    let translation = course.0.spawn_translation() + Vec3::Y * VEHICLE_SPAWN_HEIGHT;

    commands
        .spawn((
            Transform::from_translation(translation).with_rotation(course.0.spawn_rotation()),
            Visibility::default(),
            RigidBody::Dynamic,
            Friction::new(0.1),
            Restitution::new(0.2),
            // Yaw impulses must not tip the body over.
            LockedAxes::ROTATION_LOCKED.unlock_rotation_y(),
            Vehicle,
        ))
        .with_children(|parent| {
            parent.spawn((Collider::cuboid(1.6, 0.9, 3.2), Transform::default()));

            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(1.6, 0.7, 3.2))),
                MeshMaterial3d(materials.add(Color::srgb(0.8, 0.25, 0.2))),
                Transform::from_xyz(0.0, -0.1, 0.0),
            ));
            // Cabin sits toward the rear; local -Z is forward.
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(1.3, 0.5, 1.4))),
                MeshMaterial3d(materials.add(Color::srgb(0.15, 0.15, 0.2))),
                Transform::from_xyz(0.0, 0.4, 0.3),
            ));
        });
}

fn pause_physics(mut physics_time: ResMut<Time<Physics>>) {
    physics_time.pause();
}

fn unpause_physics(mut physics_time: ResMut<Time<Physics>>) {
    physics_time.unpause();
}

fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<SimState>>,
    mut next_state: ResMut<NextState<SimState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        next_state.set(match state.get() {
            SimState::Driving => SimState::Paused,
            SimState::Paused => SimState::Driving,
        });
    }
}

fn toggle_debug_gizmos(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    vehicles: Query<(Entity, Has<DebugGizmos>), With<Vehicle>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }
    for (entity, enabled) in &vehicles {
        if enabled {
            commands.entity(entity).remove::<DebugGizmos>();
        } else {
            commands.entity(entity).insert(DebugGizmos);
        }
    }
}

fn draw_gizmos(
    vehicles: Query<(&Transform, &LinearVelocity), (With<Vehicle>, With<DebugGizmos>)>,
    mut gizmos: Gizmos,
) {
    for (transform, velocity) in &vehicles {
        let origin = transform.translation + Vec3::Y * 0.8;
        gizmos.arrow(origin, origin + transform.forward() * 3.0, YELLOW);
        gizmos.arrow(origin, origin + velocity.0, GREEN);
    }
}

fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsCounterText>>,
) {
    let Ok(mut text) = query.single_mut() else {
        return;
    };

    if let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|value| value.smoothed())
    {
        text.0 = format!("FPS: {fps:>3.0}");
    }
}

fn update_hud(
    progress: Res<CourseProgress>,
    vehicles: Query<(&Transform, &LinearVelocity), With<Vehicle>>,
    mut speed_text: Query<&mut Text, (With<SpeedText>, Without<ZoneText>)>,
    mut zone_text: Query<&mut Text, (With<ZoneText>, Without<SpeedText>)>,
) {
    if let (Ok(mut text), Ok((transform, velocity))) = (speed_text.single_mut(), vehicles.single())
    {
        let speed = signed_forward_speed(transform.rotation, velocity.0);
        text.0 = format!("Speed: {speed:>5.1} m/s");
    }
    if let Ok(mut text) = zone_text.single_mut() {
        text.0 = format!("Zones: {}/{}", progress.visited, progress.total);
    }
}
