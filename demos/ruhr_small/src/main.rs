//! ruhr_small: smallest end-to-end run of the commercial traffic analysis.
//!
//! Builds a synthetic 4×4 grid with four city zones, lets a few vehicles of
//! every traffic class drive random tours, and writes all CSV reports to
//! `output/ruhr_small/`.
//!
//! ```text
//! cargo run -p ruhr_small [config.json]
//! ```
//!
//! The optional JSON file holds an `AnalysisConfig`; missing keys take their
//! defaults.

mod scenario;

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use ct_analysis::{AggregationEngine, AnalysisConfig, Event, Scenario};
use ct_core::{Coord, EventTime, LinkId, PersonId, VehicleId};
use ct_output::{ChargingRanges, CsvReportWriter, write_all};

use scenario::{EXTENT, FLEETS, build_attributes, build_network, build_vehicles, build_zones, member_id};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:           u64   = 42;
const PER_FLEET:      usize = 4;
const TOURS:          usize = 3;
const LINKS_PER_TOUR: usize = 6;
const OUTPUT_DIR:     &str  = "output/ruhr_small";

// ── Events ────────────────────────────────────────────────────────────────────

/// Random tours: each tour leaves `LINKS_PER_TOUR` random links and ends with
/// the fleet's activity at a random point.  Sorted by time.
fn generate_events(link_ids: &[LinkId], rng: &mut SmallRng) -> Vec<Event> {
    let mut events = Vec::new();
    for fleet in &FLEETS {
        for n in 0..PER_FLEET {
            let id = member_id(fleet, n);
            let mut time = rng.gen_range(6.0 * 3_600.0..9.0 * 3_600.0);
            for _ in 0..TOURS {
                events.push(Event::Other { time: EventTime(time), kind: "departure".to_owned() });
                for _ in 0..LINKS_PER_TOUR {
                    time += rng.gen_range(30.0..120.0);
                    events.push(Event::LinkLeave {
                        time:    EventTime(time),
                        vehicle: VehicleId::from(id.as_str()),
                        link:    link_ids[rng.gen_range(0..link_ids.len())].clone(),
                    });
                }
                if let Some(activity) = fleet.activity {
                    time += 60.0;
                    events.push(Event::ActivityStart {
                        time:     EventTime(time),
                        person:   PersonId::from(id.as_str()),
                        activity: activity.to_owned(),
                        coord:    Coord::new(rng.gen_range(0.0..EXTENT), rng.gen_range(0.0..EXTENT)),
                    });
                }
                time += rng.gen_range(600.0..1_800.0);
            }
        }
    }
    events.sort_by(|a, b| a.time().0.total_cmp(&b.time().0));
    events
}

fn load_config() -> Result<AnalysisConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_reader(File::open(&path)?)?,
        None => AnalysisConfig {
            sample_size:     0.25,
            run_id:          "ruhr_small".to_owned(),
            study_area_name: Some("Ruhr core".to_owned()),
            ..AnalysisConfig::default()
        },
    };
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    println!("=== ruhr_small: commercial traffic analysis ===");
    println!(
        "Sample: {}  |  Study area: {}  |  Seed: {SEED}",
        config.sample_size,
        config.study_area_name.as_deref().unwrap_or("-"),
    );
    println!();

    // 1. Scenario.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let network = build_network()?;
    let link_ids: Vec<LinkId> = network.links().map(|l| l.id.clone()).collect();
    let zones = build_zones();
    let vehicles = build_vehicles(PER_FLEET);
    let attributes = build_attributes(PER_FLEET, config.attribute_delimiter, &mut rng)?;
    println!(
        "Network: {} links  |  Zones: {}  |  Vehicles: {}  |  Persons: {}",
        network.link_count(),
        zones.zone_count(),
        vehicles.len(),
        attributes.len(),
    );

    // 2. Events.
    let events = generate_events(&link_ids, &mut rng);
    println!("Events: {}", events.len());
    println!();

    // 3. Aggregate.
    let mut engine = AggregationEngine::new(config, Scenario::new(network, vehicles, zones, attributes))?;
    let t0 = Instant::now();
    let summary = engine.process_iteration(0, &events)?;
    let elapsed = t0.elapsed();
    println!("Processed {} events in {:.3} ms", summary.total(), elapsed.as_secs_f64() * 1e3);
    println!(
        "  link leaves: {}  |  activity starts: {}  |  ignored: {}",
        summary.link_leaves, summary.activity_starts, summary.ignored
    );
    println!();

    // 4. OD matrix.
    let od = engine.od_matrix();
    println!("{:<26} {:<14} {:<14} {:>5}", "Relation", "Origin", "Destination", "Trips");
    println!("{}", "-".repeat(62));
    for (label, pairs) in &od.counts {
        for ((origin, destination), trips) in pairs {
            println!("{label:<26} {origin:<14} {destination:<14} {trips:>5}");
        }
    }
    println!("{} relations with an end outside all zones", od.unmatched);
    println!();

    // 5. Reports.
    let run_id = engine.config().run_id.clone();
    let mut writer = CsvReportWriter::new(Path::new(OUTPUT_DIR), run_id)?;
    write_all(&mut writer, &engine.results(), &ChargingRanges::default())?;
    for path in writer.written() {
        println!("  {}", path.display());
    }

    Ok(())
}
