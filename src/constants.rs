use std::f32::consts::PI;

/// Base influence radius/magnitude projected by an owned structure.
pub const BASE_INFLUENCE: f32 = 32.0;

/// Civic centers project influence at four times the base strength.
pub const CIV_CENTRE_INFLUENCE_SCALE: f32 = 4.0;

/// Walls are not real blockers, but nothing should be planned on top of them.
pub const WALL_STANDOFF_RADIUS: f32 = 2.0;
pub const WALL_STANDOFF: f32 = -1000.0;

/// Radius and magnitude of the linear attraction that clusters houses.
pub const HOUSE_CLUSTER_RADIUS: f32 = 15.0;
pub const HOUSE_CLUSTER_STRENGTH: f32 = 20.0;

/// Radius of the flat attraction around an explicit placement hint.
pub const HINT_ATTRACTION_RADIUS: f32 = 200.0;

/// Clearance tried first for a settlement's first house.
pub const HOUSE_BREATHING_ROOM_RADIUS: f32 = 10.0;

/// Clearance tightening once houses already exist.
pub const HOUSE_PACKED_RADIUS_SCALE: f32 = 0.9;

/// New buildings face south-west by convention.
pub const DEFAULT_FACING_ANGLE: f32 = 3.0 * PI / 4.0;

/// Per-civilization packing multiplier applied to the clearance radius.
/// Wall-heavy playstyles pack tighter.
pub fn civ_radius_multiplier(civ: &str) -> f32 {
    match civ {
        "iber" => 0.95,
        _ => 1.0,
    }
}
