//! Building-type-specific friendliness rules and the clearance-radius
//! policy.
//!
//! Each owned structure projects influence onto the friendliness grid
//! through a small rule table keyed on the candidate's classification and
//! the owned structure's tags. The table replaces the original chained
//! type checks while keeping the exact rule semantics: houses cluster,
//! fields hug food drop-sites, walls repel, and civic centers reserve a
//! halo for fields while pushing houses to an intermediate band.

use crate::constants::*;
use crate::grid::{GridMap, InfluenceFalloff};
use crate::snapshot::{
    BuildCategory, ClassTags, DropsiteTypes, EntitySnapshot, TemplateSnapshot, WorldPos,
    WorldSnapshot,
};

/// Candidate classification used to key heuristic dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CandidateKind {
    Field,
    House,
    Other,
}

impl CandidateKind {
    pub fn of(template: &TemplateSnapshot) -> Self {
        if template.category == BuildCategory::Field {
            CandidateKind::Field
        } else if template.is_house() {
            CandidateKind::House
        } else {
            CandidateKind::Other
        }
    }
}

/// Inputs to a single owned-structure rule application.
pub struct RuleContext<'a> {
    pub candidate: CandidateKind,
    pub owned: &'a EntitySnapshot,
    /// Grid cell of the owned structure.
    pub cx: i32,
    pub cz: i32,
    /// Base influence for this structure; civic centers scale it up.
    pub influence: f32,
}

impl RuleContext<'_> {
    fn owned_is_house(&self) -> bool {
        self.owned.generic_name == "House"
    }

    fn owned_is_civ_centre(&self) -> bool {
        self.owned.classes.contains(ClassTags::CIV_CENTRE)
    }
}

/// One row of the heuristic rule table.
pub struct InfluenceRule {
    pub name: &'static str,
    /// An exclusive rule suppresses the remaining rows for this structure.
    pub exclusive: bool,
    pub applies: fn(&RuleContext) -> bool,
    pub apply: fn(&RuleContext, &mut GridMap),
}

/// Heuristic rules evaluated, in order, for every owned structure.
pub const STRUCTURE_RULES: &[InfluenceRule] = &[
    // Walls are no real blockers, but nothing should be planned on them.
    InfluenceRule {
        name: "wall_standoff",
        exclusive: true,
        applies: |ctx| ctx.owned.category == BuildCategory::Wall,
        apply: |ctx, grid| {
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                WALL_STANDOFF_RADIUS,
                WALL_STANDOFF,
                InfluenceFalloff::Constant,
            );
        },
    },
    // Fields belong next to food drop-sites; a civic-center drop-site gets
    // a tighter, full-strength ring than a dedicated one.
    InfluenceRule {
        name: "field_near_food_dropsite",
        exclusive: false,
        applies: |ctx| {
            ctx.candidate == CandidateKind::Field
                && ctx.owned.dropsites.contains(DropsiteTypes::FOOD)
        },
        apply: |ctx, grid| {
            let radius = if ctx.owned_is_civ_centre() {
                ctx.influence / 4.0
            } else {
                ctx.influence
            };
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                radius,
                ctx.influence,
                InfluenceFalloff::Constant,
            );
        },
    },
    // Houses cluster with other houses.
    InfluenceRule {
        name: "house_cluster",
        exclusive: false,
        applies: |ctx| ctx.candidate == CandidateKind::House && ctx.owned_is_house(),
        apply: |ctx, grid| {
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                HOUSE_CLUSTER_RADIUS,
                HOUSE_CLUSTER_STRENGTH,
                InfluenceFalloff::Linear,
            );
        },
    },
    // Houses keep some distance from other buildings, with a smaller
    // counter-ring so they are not pushed out entirely.
    InfluenceRule {
        name: "house_standoff",
        exclusive: false,
        applies: |ctx| ctx.candidate == CandidateKind::House && !ctx.owned_is_house(),
        apply: |ctx, grid| {
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                (ctx.influence / 2.0).ceil(),
                ctx.influence,
                InfluenceFalloff::Constant,
            );
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                (ctx.influence / 4.0).ceil(),
                -ctx.influence / 2.0,
                InfluenceFalloff::Constant,
            );
        },
    },
    // Houses have no influence on other buildings; everything else spaces
    // out proportionally to the structure's base influence.
    InfluenceRule {
        name: "building_spacing",
        exclusive: false,
        applies: |ctx| ctx.candidate == CandidateKind::Other && !ctx.owned_is_house(),
        apply: |ctx, grid| {
            grid.add_influence(ctx.cx, ctx.cz, ctx.influence, 1.0, InfluenceFalloff::Constant);
        },
    },
    // Keep the area right around a civic center open for fields.
    InfluenceRule {
        name: "civ_centre_field_reserve",
        exclusive: false,
        applies: |ctx| ctx.candidate == CandidateKind::Other && ctx.owned_is_civ_centre(),
        apply: |ctx, grid| {
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                (ctx.influence / 8.0).floor(),
                (-ctx.influence / 2.0).floor(),
                InfluenceFalloff::Constant,
            );
        },
    },
    // Bias houses to an intermediate band around the civic center: an
    // attraction ring plus a linear counter-ring close in.
    InfluenceRule {
        name: "civ_centre_house_band",
        exclusive: false,
        applies: |ctx| ctx.candidate == CandidateKind::House && ctx.owned_is_civ_centre(),
        apply: |ctx, grid| {
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                ctx.influence / 3.0,
                ctx.influence + 1.0,
                InfluenceFalloff::Constant,
            );
            grid.add_influence(
                ctx.cx,
                ctx.cz,
                (ctx.influence / 5.0).ceil(),
                -ctx.influence / 2.0,
                InfluenceFalloff::Linear,
            );
        },
    },
];

/// Run the rule table for one owned structure.
pub fn apply_structure_rules(
    candidate: CandidateKind,
    owned: &EntitySnapshot,
    grid: &mut GridMap,
) {
    let (cx, cz) = grid.world_to_grid(owned.position.x, owned.position.z);
    let mut influence = BASE_INFLUENCE;
    if owned.classes.contains(ClassTags::CIV_CENTRE) {
        influence *= CIV_CENTRE_INFLUENCE_SCALE;
    }

    let ctx = RuleContext {
        candidate,
        owned,
        cx,
        cz,
        influence,
    };

    for rule in STRUCTURE_RULES {
        if (rule.applies)(&ctx) {
            (rule.apply)(&ctx, grid);
            if rule.exclusive {
                break;
            }
        }
    }
}

/// Populate the friendliness grid for a candidate template.
///
/// A hint position short-circuits the structure rules entirely: the agent
/// is explicitly asking to build near there.
pub fn populate_friendliness(
    grid: &mut GridMap,
    snapshot: &dyn WorldSnapshot,
    template: &TemplateSnapshot,
    hint: Option<WorldPos>,
) {
    if let Some(hint) = hint {
        let (hx, hz) = grid.world_to_grid(hint.x, hint.z);
        grid.add_presence(hx, hz, HINT_ATTRACTION_RADIUS);
        return;
    }

    let candidate = CandidateKind::of(template);
    for owned in snapshot.own_entities() {
        if !owned.classes.contains(ClassTags::STRUCTURE) {
            continue;
        }
        apply_structure_rules(candidate, owned, grid);
    }
}

/// Clearance radius (grid cells) required around the candidate's cell.
///
/// Fields stack tightly, docks defer to external shoreline logic, houses
/// and resource drop-sites sit flush, and everything else reserves one
/// extra cell so units can walk between buildings.
pub fn clearance_radius(template: &TemplateSnapshot, cell_size: f32, civ_multiplier: f32) -> f32 {
    let cells = (template.obstruction_radius() / cell_size).ceil();

    let radius = if template.category == BuildCategory::Field {
        cells - 0.7
    } else if template.category == BuildCategory::Dock {
        0.0
    } else if !template.is_house() && !template.classes.is_resource_dropsite() {
        cells + 1.0
    } else {
        cells
    };

    (radius * civ_multiplier).max(0.0)
}
