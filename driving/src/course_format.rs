use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CourseFile {
    #[serde(default)]
    pub metadata: CourseMetadata,
    #[serde(default)]
    pub spawn: SpawnPoint,
    /// Marker zone centers as [x, z] on the ground plane.
    pub zones: Vec<[f32; 2]>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CourseMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_ground_size")]
    pub ground_size: f32,
    #[serde(default = "default_zone_radius")]
    pub zone_radius: f32,
}

impl Default for CourseMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            author: String::new(),
            ground_size: default_ground_size(),
            zone_radius: default_zone_radius(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpawnPoint {
    /// Vehicle start as [x, z] on the ground plane.
    #[serde(default)]
    pub position: [f32; 2],
    /// Initial heading in degrees; 0 faces -Z.
    #[serde(default)]
    pub heading_deg: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            heading_deg: 0.0,
        }
    }
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_ground_size() -> f32 {
    240.0
}

fn default_zone_radius() -> f32 {
    4.0
}

impl CourseFile {
    /// Load a course from a TOML file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Zone centers in world space, on the ground plane.
    pub fn zone_centers(&self) -> Vec<Vec3> {
        self.zones
            .iter()
            .map(|&[x, z]| Vec3::new(x, 0.0, z))
            .collect()
    }

    pub fn spawn_translation(&self) -> Vec3 {
        Vec3::new(self.spawn.position[0], 0.0, self.spawn.position[1])
    }

    pub fn spawn_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.spawn.heading_deg.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::CourseFile;
    use bevy::math::Vec3;

    #[test]
    fn minimal_file_fills_in_defaults() {
        let course: CourseFile = toml::from_str("zones = [[0.0, 40.0], [35.0, -10.0]]").unwrap();
        assert_eq!(course.metadata.name, "Untitled");
        assert_eq!(course.metadata.ground_size, 240.0);
        assert_eq!(course.metadata.zone_radius, 4.0);
        assert_eq!(course.spawn.position, [0.0, 0.0]);
        assert_eq!(course.zones.len(), 2);
    }

    #[test]
    fn zone_centers_land_on_the_ground_plane() {
        let course: CourseFile = toml::from_str("zones = [[3.0, -7.5]]").unwrap();
        assert_eq!(course.zone_centers(), vec![Vec3::new(3.0, 0.0, -7.5)]);
    }

    #[test]
    fn spawn_heading_rotates_about_the_vertical_axis() {
        let text = "zones = []\n[spawn]\nposition = [1.0, 2.0]\nheading_deg = 90.0\n";
        let course: CourseFile = toml::from_str(text).unwrap();
        assert_eq!(course.spawn_translation(), Vec3::new(1.0, 0.0, 2.0));
        // 90 degrees turns local -Z onto world -X.
        let forward = course.spawn_rotation() * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
    }
}
