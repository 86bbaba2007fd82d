//! Synthetic scenario: a 4×4 node grid split into four quadrant zones, with
//! a central study area and one small fleet per traffic class.

use std::fmt::Write as _;
use std::io::Cursor;

use geo::Polygon;
use rand::Rng;

use ct_attributes::{AttributeResult, AttributeTable, load_attributes_reader};
use ct_core::Coord;
use ct_spatial::{
    LinkNetwork, LinkNetworkBuilder, PolygonZoneIndex, PolygonZoneIndexBuilder, SpatialResult,
    VehicleRegistry, polygon,
};

/// Grid spacing in metres.
const SPACING: f64 = 1_000.0;
const NODES_PER_SIDE: usize = 4;
pub const EXTENT: f64 = SPACING * (NODES_PER_SIDE - 1) as f64;

const MODES: [&str; 3] = ["car", "truck18t", "truck40t"];

/// One fleet: vehicle/person id prefix, vehicle type, network mode,
/// subpopulation, and the activity its tours report.
pub struct Fleet {
    pub prefix:        &'static str,
    pub vehicle_type:  &'static str,
    pub mode:          &'static str,
    pub subpopulation: &'static str,
    /// `None` for persons without an analysed activity (transit freight).
    pub activity:      Option<&'static str>,
}

pub const FLEETS: [Fleet; 9] = [
    Fleet { prefix: "goodsTraffic",             vehicle_type: "vwCaddy",                 mode: "car",      subpopulation: "goodsTraffic_trip",               activity: Some("service") },
    Fleet { prefix: "commercialPersonTraffic",  vehicle_type: "golf1.4",                 mode: "car",      subpopulation: "commercialPersonTraffic_service", activity: Some("service") },
    Fleet { prefix: "longDistanceFreight",      vehicle_type: "heavy40t",                mode: "truck40t", subpopulation: "longDistanceFreight",             activity: Some("freight_end") },
    Fleet { prefix: "freight_FTL_kv",           vehicle_type: "heavy40t",                mode: "truck40t", subpopulation: "FTL_kv_trip",                     activity: Some("freight_end") },
    Fleet { prefix: "freight_FTL",              vehicle_type: "heavy40t",                mode: "truck40t", subpopulation: "FTL_trip",                        activity: Some("freight_end") },
    Fleet { prefix: "ParcelDelivery_DHL",       vehicle_type: "mercedes313_parcel",      mode: "car",      subpopulation: "LTL_trip",                        activity: Some("delivery") },
    Fleet { prefix: "WasteCollection_Essen",    vehicle_type: "waste_collection_diesel", mode: "truck18t", subpopulation: "LTL_trip",                        activity: Some("pickup") },
    Fleet { prefix: "GoodsType_140",            vehicle_type: "light8t",                 mode: "truck18t", subpopulation: "LTL_trip",                        activity: Some("delivery") },
    Fleet { prefix: "freight",                  vehicle_type: "medium18t",               mode: "truck18t", subpopulation: "freight",                         activity: None },
];

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon(&[Coord::new(x0, y0), Coord::new(x1, y0), Coord::new(x1, y1), Coord::new(x0, y1)])
}

/// Both directions of every horizontal and vertical grid edge.
pub fn build_network() -> SpatialResult<LinkNetwork> {
    let node = |r: usize, c: usize| Coord::new(c as f64 * SPACING, r as f64 * SPACING);
    let mut b = LinkNetworkBuilder::new();
    for r in 0..NODES_PER_SIDE {
        for c in 0..NODES_PER_SIDE {
            if c + 1 < NODES_PER_SIDE {
                b.add_link_between(format!("h{r}{c}_f"), node(r, c), node(r, c + 1), &MODES);
                b.add_link_between(format!("h{r}{c}_b"), node(r, c + 1), node(r, c), &MODES);
            }
            if r + 1 < NODES_PER_SIDE {
                b.add_link_between(format!("v{r}{c}_f"), node(r, c), node(r + 1, c), &MODES);
                b.add_link_between(format!("v{r}{c}_b"), node(r + 1, c), node(r, c), &MODES);
            }
        }
    }
    b.build()
}

/// Quadrant zones plus a central study area covering the inner grid cell.
pub fn build_zones() -> PolygonZoneIndex {
    let half = EXTENT / 2.0;
    let margin = SPACING * 0.75;
    let mut b = PolygonZoneIndexBuilder::new(rect(margin, margin, EXTENT - margin, EXTENT - margin));
    b.add_zone("Duisburg", rect(0.0, 0.0, half, half))
        .add_zone("Essen", rect(half, 0.0, EXTENT, half))
        .add_zone("Oberhausen", rect(0.0, half, half, EXTENT))
        .add_zone("Gelsenkirchen", rect(half, half, EXTENT, EXTENT));
    b.build()
}

/// `{prefix}_{n}` for every fleet member.
pub fn member_id(fleet: &Fleet, n: usize) -> String {
    format!("{}_{n}", fleet.prefix)
}

pub fn build_vehicles(per_fleet: usize) -> VehicleRegistry {
    let mut reg = VehicleRegistry::new();
    for fleet in &FLEETS {
        for n in 0..per_fleet {
            reg.insert(member_id(fleet, n), fleet.vehicle_type, fleet.mode);
        }
    }
    reg
}

/// Generate the attribute export as text, then load it like a file on disk.
/// Each person's first activity sits at a random point inside the grid.
pub fn build_attributes(
    per_fleet: usize,
    delimiter: char,
    rng:       &mut impl Rng,
) -> AttributeResult<AttributeTable> {
    let d = delimiter;
    let mut text = format!("person{d}subpopulation{d}first_act_x{d}first_act_y\n");
    for fleet in &FLEETS {
        for n in 0..per_fleet {
            let x: f64 = rng.gen_range(0.0..EXTENT);
            let y: f64 = rng.gen_range(0.0..EXTENT);
            // Writing to a String cannot fail.
            let _ = writeln!(text, "{}{d}{}{d}{x:.1}{d}{y:.1}", member_id(fleet, n), fleet.subpopulation);
        }
    }
    load_attributes_reader(Cursor::new(text), delimiter)
}
