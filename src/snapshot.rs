//! Read-only world-state snapshot records and collaborator traits.
//!
//! The planner never talks to the simulation directly. It consumes a
//! [`WorldSnapshot`] of entity and template records, and emits construct
//! commands through [`UnitActions`]. Both are implemented by the host
//! decision layer; [`InMemoryWorld`] and [`RecordedActions`] cover offline
//! testing and benchmarking on native targets.

use bitflags::bitflags;
use fnv::FnvHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Class tags carried by entities and templates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClassTags: u8 {
        const NONE = 0;
        const STRUCTURE = 1;
        const CIV_CENTRE = 2;
        const DROPSITE_WOOD = 4;
        const DROPSITE_STONE = 8;
        const DROPSITE_METAL = 16;
    }
}

bitflags! {
    /// Resource categories a drop-site accepts delivery of.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DropsiteTypes: u8 {
        const NONE = 0;
        const FOOD = 1;
        const WOOD = 2;
        const STONE = 4;
        const METAL = 8;
    }
}

impl ClassTags {
    /// Drop-site tags that affect the clearance-radius policy.
    pub fn is_resource_dropsite(self) -> bool {
        self.intersects(
            ClassTags::DROPSITE_WOOD | ClassTags::DROPSITE_STONE | ClassTags::DROPSITE_METAL,
        )
    }
}

impl Serialize for ClassTags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClassTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        ClassTags::from_bits(bits).ok_or_else(|| serde::de::Error::custom("invalid class tags"))
    }
}

impl Serialize for DropsiteTypes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DropsiteTypes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        DropsiteTypes::from_bits(bits)
            .ok_or_else(|| serde::de::Error::custom("invalid dropsite types"))
    }
}

/// Build-restriction category a template belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildCategory {
    Building,
    Wall,
    Field,
    Dock,
}

/// A world-space position on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, z: f32) -> Self {
        WorldPos { x, z }
    }
}

/// Handle to a unit owned by the host simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Per-resource cost breakdown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub food: u32,
    pub wood: u32,
    pub stone: u32,
    pub metal: u32,
}

impl ResourceCost {
    pub fn accumulate(&mut self, other: &ResourceCost) {
        self.food += other.food;
        self.wood += other.wood;
        self.stone += other.stone;
        self.metal += other.metal;
    }

    pub fn total(&self) -> u32 {
        self.food + self.wood + self.stone + self.metal
    }
}

/// Footprint shape of a template.
///
/// Wall sets bundle segment sub-templates and a tower; they price out as
/// the bundle but are placed by a separate line-laying routine, so the
/// tile search never runs for them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    Simple {
        obstruction_radius: f32,
    },
    WallSet {
        short: String,
        medium: String,
        long: String,
        tower: String,
    },
}

/// Read-only template record supplied by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub generic_name: String,
    pub classes: ClassTags,
    pub category: BuildCategory,
    pub footprint: Footprint,
    pub cost: ResourceCost,
}

impl TemplateSnapshot {
    pub fn obstruction_radius(&self) -> f32 {
        match self.footprint {
            Footprint::Simple { obstruction_radius } => obstruction_radius,
            Footprint::WallSet { .. } => 0.0,
        }
    }

    pub fn is_house(&self) -> bool {
        self.generic_name == "House"
    }
}

/// Read-only entity record supplied by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub position: WorldPos,
    pub generic_name: String,
    pub classes: ClassTags,
    pub category: BuildCategory,
    pub dropsites: DropsiteTypes,
    pub obstruction_radius: f32,
}

/// Play-area grid resolution and cell size.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapGeometry {
    /// Cell counts along each axis.
    pub width: u32,
    pub height: u32,
    /// World units per cell.
    pub cell_size: f32,
}

/// Resolve a `{civ}` placeholder in a template identifier.
pub fn apply_civ(type_id: &str, civ: &str) -> String {
    type_id.replace("{civ}", civ)
}

/// Queryable world-state snapshot, read-only for the duration of a
/// planning call.
pub trait WorldSnapshot {
    fn geometry(&self) -> MapGeometry;

    /// Civilization identifier of the planning player (e.g. `"athen"`).
    fn civilization(&self) -> &str;

    /// Entities owned by the planning player.
    fn own_entities(&self) -> &[EntitySnapshot];

    /// All currently visible entities; these source the obstruction grid.
    fn visible_entities(&self) -> &[EntitySnapshot];

    fn get_template(&self, type_id: &str) -> Option<&TemplateSnapshot>;

    /// Units capable of constructing the given type.
    fn find_builders(&self, type_id: &str) -> Vec<UnitId>;
}

/// Fire-and-forget command surface toward the host simulation.
pub trait UnitActions {
    fn construct(&mut self, unit: UnitId, type_id: &str, x: f32, z: f32, angle: f32);
}

// ---------------------------------------------------------------------------
// Offline implementations
// ---------------------------------------------------------------------------

/// In-memory snapshot for offline tests and benchmarks.
pub struct InMemoryWorld {
    geometry: MapGeometry,
    civ: String,
    own: Vec<EntitySnapshot>,
    visible: Vec<EntitySnapshot>,
    templates: FnvHashMap<String, TemplateSnapshot>,
    builders: FnvHashMap<String, Vec<UnitId>>,
}

impl InMemoryWorld {
    pub fn new(geometry: MapGeometry, civ: &str) -> Self {
        InMemoryWorld {
            geometry,
            civ: civ.to_string(),
            own: Vec::new(),
            visible: Vec::new(),
            templates: FnvHashMap::default(),
            builders: FnvHashMap::default(),
        }
    }

    /// Register an owned entity; it is also visible and obstructs.
    pub fn add_own_entity(&mut self, entity: EntitySnapshot) {
        self.visible.push(entity.clone());
        self.own.push(entity);
    }

    /// Register a visible entity that is not owned (trees, enemy buildings).
    pub fn add_neutral_entity(&mut self, entity: EntitySnapshot) {
        self.visible.push(entity);
    }

    pub fn add_template(&mut self, type_id: &str, template: TemplateSnapshot) {
        self.templates.insert(type_id.to_string(), template);
    }

    pub fn add_builder(&mut self, type_id: &str, unit: UnitId) {
        self.builders.entry(type_id.to_string()).or_default().push(unit);
    }
}

impl WorldSnapshot for InMemoryWorld {
    fn geometry(&self) -> MapGeometry {
        self.geometry
    }

    fn civilization(&self) -> &str {
        &self.civ
    }

    fn own_entities(&self) -> &[EntitySnapshot] {
        &self.own
    }

    fn visible_entities(&self) -> &[EntitySnapshot] {
        &self.visible
    }

    fn get_template(&self, type_id: &str) -> Option<&TemplateSnapshot> {
        self.templates.get(type_id)
    }

    fn find_builders(&self, type_id: &str) -> Vec<UnitId> {
        self.builders.get(type_id).cloned().unwrap_or_default()
    }
}

/// A recorded construct command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstructCommand {
    pub unit: UnitId,
    pub type_id: String,
    pub x: f32,
    pub z: f32,
    pub angle: f32,
}

/// Records construct commands instead of issuing them.
#[derive(Default)]
pub struct RecordedActions {
    pub commands: Vec<ConstructCommand>,
}

impl UnitActions for RecordedActions {
    fn construct(&mut self, unit: UnitId, type_id: &str, x: f32, z: f32, angle: f32) {
        self.commands.push(ConstructCommand {
            unit,
            type_id: type_id.to_string(),
            x,
            z,
            angle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_civ_substitutes_the_placeholder() {
        assert_eq!(
            apply_civ("structures/{civ}_house", "athen"),
            "structures/athen_house"
        );
        assert_eq!(apply_civ("structures/palisade", "athen"), "structures/palisade");
    }

    #[test]
    fn cost_accumulates_per_resource() {
        let mut cost = ResourceCost {
            food: 0,
            wood: 100,
            stone: 0,
            metal: 0,
        };
        cost.accumulate(&ResourceCost {
            food: 50,
            wood: 25,
            stone: 10,
            metal: 0,
        });
        assert_eq!(cost.wood, 125);
        assert_eq!(cost.food, 50);
        assert_eq!(cost.total(), 185);
    }

    #[test]
    fn dropsite_classes_are_detected() {
        assert!(ClassTags::DROPSITE_WOOD.is_resource_dropsite());
        assert!((ClassTags::STRUCTURE | ClassTags::DROPSITE_METAL).is_resource_dropsite());
        assert!(!(ClassTags::STRUCTURE | ClassTags::CIV_CENTRE).is_resource_dropsite());
    }

    #[test]
    fn wall_set_footprints_have_no_obstruction_radius() {
        let template = TemplateSnapshot {
            generic_name: "Wall".to_string(),
            classes: ClassTags::STRUCTURE,
            category: BuildCategory::Wall,
            footprint: Footprint::WallSet {
                short: "wall_short".to_string(),
                medium: "wall_medium".to_string(),
                long: "wall_long".to_string(),
                tower: "wall_tower".to_string(),
            },
            cost: ResourceCost::default(),
        };
        assert_eq!(template.obstruction_radius(), 0.0);
    }
}
