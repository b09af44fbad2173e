pub mod constants;
pub mod grid;
pub mod heuristics;
pub mod obstruction;
pub mod plan;
pub mod snapshot;

pub use grid::{BestTile, GridMap, InfluenceFalloff};
pub use obstruction::{ObstructionGrid, ObstructionShape};
pub use plan::{ConstructionPlan, Placement, PlacementContext, PlanState};
pub use snapshot::{
    apply_civ, BuildCategory, ClassTags, DropsiteTypes, EntitySnapshot, Footprint, InMemoryWorld,
    MapGeometry, RecordedActions, ResourceCost, TemplateSnapshot, UnitActions, UnitId, WorldPos,
    WorldSnapshot,
};
