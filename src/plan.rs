//! Construction planning: template resolution, cost, position search,
//! execution.
//!
//! A [`ConstructionPlan`] is created once per planning decision and
//! discarded after executing or failing. The whole computation runs to
//! completion inside one decision tick; the scratch grids live in a
//! caller-owned [`PlacementContext`] so repeated calls reuse their
//! allocations instead of reallocating per tick.

use crate::constants::{
    civ_radius_multiplier, DEFAULT_FACING_ANGLE, HOUSE_BREATHING_ROOM_RADIUS,
    HOUSE_PACKED_RADIUS_SCALE,
};
use crate::grid::GridMap;
use crate::heuristics::{clearance_radius, populate_friendliness};
use crate::obstruction::{ObstructionGrid, ObstructionShape};
use crate::snapshot::{
    apply_civ, ClassTags, Footprint, MapGeometry, ResourceCost, TemplateSnapshot, UnitActions,
    WorldPos, WorldSnapshot,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a construction plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    /// Template resolved; the plan can search for a position.
    Ready,
    /// The requested type has no known template. Permanent.
    Inapplicable,
    /// A construct command has been issued.
    Executed,
    /// Execution found no admissible position or no builder.
    Failed,
}

/// A selected world-space placement.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub z: f32,
    pub angle: f32,
}

/// Reusable scratch state for position searches. Pre-sized once and
/// shared across planning calls; never shared across concurrent planners.
pub struct PlacementContext {
    friendliness: GridMap,
    obstructions: ObstructionGrid,
    shapes: Vec<ObstructionShape>,
}

impl PlacementContext {
    pub fn new(geometry: MapGeometry) -> Self {
        PlacementContext {
            friendliness: GridMap::new(geometry.width, geometry.height, geometry.cell_size),
            obstructions: ObstructionGrid::new(geometry),
            shapes: Vec::new(),
        }
    }

    /// Re-zero the grids, resizing only if the geometry changed.
    fn reset(&mut self, geometry: MapGeometry) {
        let grid = &self.friendliness;
        if grid.width() != geometry.width
            || grid.height() != geometry.height
            || grid.cell_size() != geometry.cell_size
        {
            *self = PlacementContext::new(geometry);
        } else {
            self.friendliness.clear();
        }
    }
}

/// A single building-construction decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstructionPlan {
    building_type: String,
    hint: Option<WorldPos>,
    template: Option<TemplateSnapshot>,
    cost: ResourceCost,
    unit_count: u32,
    state: PlanState,
}

impl ConstructionPlan {
    /// Resolve the civilization-specific identifier and template. An
    /// unknown type leaves the plan permanently inapplicable.
    pub fn new(
        snapshot: &dyn WorldSnapshot,
        building_type: &str,
        hint: Option<WorldPos>,
    ) -> Self {
        let resolved = apply_civ(building_type, snapshot.civilization());

        match snapshot.get_template(&resolved) {
            None => {
                debug!("cannot build {}: no template", resolved);
                ConstructionPlan {
                    building_type: resolved,
                    hint,
                    template: None,
                    cost: ResourceCost::default(),
                    unit_count: 1,
                    state: PlanState::Inapplicable,
                }
            }
            Some(template) => {
                let cost = resolve_cost(snapshot, template);
                ConstructionPlan {
                    building_type: resolved,
                    hint,
                    template: Some(template.clone()),
                    cost,
                    unit_count: 1,
                    state: PlanState::Ready,
                }
            }
        }
    }

    pub fn building_type(&self) -> &str {
        &self.building_type
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    pub fn template(&self) -> Option<&TemplateSnapshot> {
        self.template.as_ref()
    }

    /// Resolved cost breakdown; zero for inapplicable plans.
    pub fn cost(&self) -> ResourceCost {
        self.cost
    }

    pub fn unit_count(&self) -> u32 {
        self.unit_count
    }

    /// Whether at least one unit can construct this type right now.
    /// A negative answer is a normal result, not an error; the caller
    /// retries later or picks a different plan.
    pub fn can_execute(&self, snapshot: &dyn WorldSnapshot) -> bool {
        if self.state == PlanState::Inapplicable {
            return false;
        }
        !snapshot.find_builders(&self.building_type).is_empty()
    }

    /// Search for the best admissible position for this plan's template.
    ///
    /// Builds and dilates the obstruction grid, populates friendliness
    /// (hint or structure rules), then runs the clearance-aware best-tile
    /// search. `None` means no admissible cell exists this tick.
    pub fn find_position(
        &self,
        snapshot: &dyn WorldSnapshot,
        ctx: &mut PlacementContext,
    ) -> Option<Placement> {
        let template = self.template.as_ref()?;

        if let Footprint::WallSet { .. } = template.footprint {
            // Wall lines are laid out by a dedicated routine; the tile
            // search has no meaningful footprint to place.
            debug!("{} is a wall set; skipping tile search", self.building_type);
            return None;
        }

        let geometry = snapshot.geometry();
        ctx.reset(geometry);

        collect_obstructions(snapshot, &mut ctx.shapes);
        ctx.obstructions.rebuild(&ctx.shapes);
        ctx.obstructions.expand();

        populate_friendliness(&mut ctx.friendliness, snapshot, template, self.hint);

        let multiplier = civ_radius_multiplier(snapshot.civilization());
        let mut radius = clearance_radius(template, geometry.cell_size, multiplier);

        let best = if template.is_house() {
            let has_house = snapshot
                .own_entities()
                .iter()
                .any(|e| e.classes.contains(ClassTags::STRUCTURE) && e.generic_name == "House");
            if has_house {
                radius *= HOUSE_PACKED_RADIUS_SCALE;
                ctx.friendliness.find_best_tile(radius, &ctx.obstructions)
            } else {
                // The first house gets breathing room if any is to be had.
                ctx.friendliness
                    .find_best_tile(HOUSE_BREATHING_ROOM_RADIUS, &ctx.obstructions)
                    .or_else(|| ctx.friendliness.find_best_tile(radius, &ctx.obstructions))
            }
        } else {
            ctx.friendliness.find_best_tile(radius, &ctx.obstructions)
        };

        match best {
            Some(tile) => {
                let (x, z) = ctx.friendliness.grid_to_world(tile.x, tile.z);
                debug!(
                    "{} placed at ({:.1}, {:.1}) score {:.1}",
                    self.building_type, x, z, tile.score
                );
                Some(Placement {
                    x,
                    z,
                    angle: DEFAULT_FACING_ANGLE,
                })
            }
            None => {
                debug!("no room to place {}", self.building_type);
                None
            }
        }
    }

    /// Find a position and hand it to the first available builder. Which
    /// builder gets the order does not matter; any unit that can start
    /// the foundation will do.
    pub fn execute(
        &mut self,
        snapshot: &dyn WorldSnapshot,
        actions: &mut dyn UnitActions,
        ctx: &mut PlacementContext,
    ) {
        if self.state != PlanState::Ready {
            return;
        }

        let Some(position) = self.find_position(snapshot, ctx) else {
            self.state = PlanState::Failed;
            return;
        };

        let builders = snapshot.find_builders(&self.building_type);
        let Some(&builder) = builders.first() else {
            debug!("no builder available for {}", self.building_type);
            self.state = PlanState::Failed;
            return;
        };

        actions.construct(
            builder,
            &self.building_type,
            position.x,
            position.z,
            position.angle,
        );
        self.state = PlanState::Executed;
    }
}

/// Collect obstruction footprints from every visible entity.
fn collect_obstructions(snapshot: &dyn WorldSnapshot, shapes: &mut Vec<ObstructionShape>) {
    shapes.clear();
    for entity in snapshot.visible_entities() {
        if entity.obstruction_radius <= 0.0 {
            continue;
        }
        shapes.push(ObstructionShape::Circle {
            x: entity.position.x,
            z: entity.position.z,
            radius: entity.obstruction_radius,
        });
    }
}

/// Cost of a template; wall sets price out as their segment bundle.
fn resolve_cost(snapshot: &dyn WorldSnapshot, template: &TemplateSnapshot) -> ResourceCost {
    match &template.footprint {
        Footprint::Simple { .. } => template.cost,
        Footprint::WallSet {
            short,
            medium,
            long,
            tower,
        } => {
            let mut cost = template.cost;
            for piece in [short, medium, long, tower] {
                match snapshot.get_template(piece) {
                    Some(sub) => cost.accumulate(&sub.cost),
                    None => debug!("wall-set piece {} has no template", piece),
                }
            }
            cost
        }
    }
}
