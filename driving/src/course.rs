use std::path::Path;

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::Vehicle;
use crate::course_format::CourseFile;

/// Path to the course TOML file, taken from argv at startup.
#[derive(Resource)]
pub struct CoursePath(pub String);

/// The loaded course layout, kept around for spawning and HUD.
#[derive(Resource)]
pub struct CourseLayout(pub CourseFile);

/// A marker zone on the ground plane.
#[derive(Component)]
pub struct MarkerZone {
    pub index: usize,
    pub radius: f32,
}

/// Present on zones the vehicle has already reached.
#[derive(Component)]
pub struct ZoneVisited;

#[derive(Resource, Default)]
pub struct CourseProgress {
    pub visited: usize,
    pub total: usize,
}

#[derive(Resource)]
pub struct ZoneMaterials {
    pub pending: Handle<StandardMaterial>,
    pub visited: Handle<StandardMaterial>,
}

#[derive(Message)]
pub struct ZoneReached {
    pub index: usize,
}

/// Build the static world from the course file: ground plane with a collider,
/// and one flat cylinder per marker zone.
pub fn setup_course(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    course_path: Res<CoursePath>,
    mut progress: ResMut<CourseProgress>,
) {
    let course = CourseFile::load(Path::new(&course_path.0))
        .unwrap_or_else(|error| panic!("Failed to load course file: {error}"));
    info!(
        "loaded course '{}' with {} zones",
        course.metadata.name,
        course.zones.len()
    );

    let ground_size = course.metadata.ground_size;
    commands
        .spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(ground_size, ground_size))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 0.2))),
            Transform::default(),
            Visibility::default(),
            RigidBody::Static,
        ))
        .with_children(|parent| {
            parent.spawn((
                Collider::cuboid(ground_size, 0.2, ground_size),
                Transform::from_xyz(0.0, -0.1, 0.0),
            ));
        });

    let pending = materials.add(Color::srgb(0.9, 0.7, 0.1));
    let visited = materials.add(Color::srgb(0.1, 0.8, 0.3));
    let zone_radius = course.metadata.zone_radius;
    let zone_mesh = meshes.add(Cylinder::new(zone_radius, 0.08));

    for (index, center) in course.zone_centers().into_iter().enumerate() {
        commands.spawn((
            Mesh3d(zone_mesh.clone()),
            MeshMaterial3d(pending.clone()),
            Transform::from_translation(center + Vec3::Y * 0.04),
            MarkerZone {
                index,
                radius: zone_radius,
            },
        ));
    }

    progress.total = course.zones.len();
    commands.insert_resource(ZoneMaterials { pending, visited });
    commands.insert_resource(CourseLayout(course));
}

/// Mark a zone visited once the vehicle's ground-plane position enters it.
pub fn check_zone_arrival(
    mut commands: Commands,
    vehicles: Query<&Transform, With<Vehicle>>,
    zones: Query<(Entity, &Transform, &MarkerZone), Without<ZoneVisited>>,
    materials: Res<ZoneMaterials>,
    mut progress: ResMut<CourseProgress>,
    mut reached: MessageWriter<ZoneReached>,
) {
    let Ok(vehicle) = vehicles.single() else {
        return;
    };
    let vehicle_xz = vehicle.translation.xz();

    for (entity, transform, zone) in &zones {
        if vehicle_xz.distance(transform.translation.xz()) < zone.radius {
            commands
                .entity(entity)
                .insert((ZoneVisited, MeshMaterial3d(materials.visited.clone())));
            progress.visited += 1;
            reached.write(ZoneReached { index: zone.index });
        }
    }
}

/// Log zone arrivals and course completion.
pub fn announce_zone_reached(
    mut reached: MessageReader<ZoneReached>,
    progress: Res<CourseProgress>,
) {
    for message in reached.read() {
        info!(
            "reached zone {} ({}/{})",
            message.index + 1,
            progress.visited,
            progress.total
        );
        if progress.visited == progress.total {
            info!("course complete");
        }
    }
}
