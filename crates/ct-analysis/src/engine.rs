//! The `AggregationEngine` and its event dispatch.

use ct_attributes::AttributeTable;
use ct_core::{LinkId, VehicleId};
use ct_spatial::ZoneIndex;

use crate::od::{OdMatrix, od_matrix};
use crate::relation::{RelationExtractor, RelationTable};
use crate::volume::{FastMap, LabelTotals, VolumeAggregator};
use crate::{AnalysisConfig, AnalysisResult, Event, Scenario};

// ── Summary ───────────────────────────────────────────────────────────────────

/// Event counts for one [`AggregationEngine::process`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub link_leaves:     u64,
    pub activity_starts: u64,
    pub ignored:         u64,
}

impl ProcessSummary {
    fn count(&mut self, event: &Event) {
        match event {
            Event::LinkLeave { .. }     => self.link_leaves += 1,
            Event::ActivityStart { .. } => self.activity_starts += 1,
            Event::Other { .. }         => self.ignored += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.link_leaves + self.activity_starts + self.ignored
    }
}

// ── Results view ──────────────────────────────────────────────────────────────

/// Read-only view of the result tables.
///
/// Borrowing the engine immutably guarantees nobody dispatches events while
/// the view is alive.
pub struct AnalysisResults<'a> {
    pub link_volumes:          &'a FastMap<LinkId, LabelTotals>,
    pub distances_per_mode:    &'a LabelTotals,
    pub distances_per_class:   &'a LabelTotals,
    pub distances_per_vehicle: &'a FastMap<String, FastMap<VehicleId, f64>>,
    pub relations:             &'a RelationTable,
    /// Person attributes, keyed by the same ids as vehicles where both exist.
    pub attributes:            &'a AttributeTable,
    /// Distinct network modes of the vehicle registry, for report columns.
    pub network_modes:         &'a [String],
    pub sample_factor:         f64,
    pub iteration:             u32,
}

impl AnalysisResults<'_> {
    /// `true` if all four core tables are empty.
    pub fn is_empty(&self) -> bool {
        self.link_volumes.is_empty()
            && self.distances_per_mode.is_empty()
            && self.distances_per_class.is_empty()
            && self.relations.is_empty()
    }
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

/// Composition root: owns the scenario and the two stateful handlers and
/// routes each event to the right one.
///
/// | Event             | Handler                                  |
/// |-------------------|------------------------------------------|
/// | `LinkLeave`       | [`VolumeAggregator::on_link_leave`]      |
/// | `ActivityStart`   | [`RelationExtractor::on_activity_start`] |
/// | anything else     | ignored                                  |
///
/// The first failing event aborts processing.  Tables then hold the effects
/// of the events before it and should be discarded.
pub struct AggregationEngine<Z: ZoneIndex> {
    config:    AnalysisConfig,
    scenario:  Scenario<Z>,
    volumes:   VolumeAggregator,
    relations: RelationExtractor,
    iteration: u32,
}

impl<Z: ZoneIndex> AggregationEngine<Z> {
    /// # Errors
    ///
    /// [`AnalysisError::Config`](crate::AnalysisError::Config) if `config`
    /// fails validation.
    pub fn new(config: AnalysisConfig, scenario: Scenario<Z>) -> AnalysisResult<Self> {
        config.validate()?;
        let factor = config.sample_factor();
        log::info!(
            "analysis engine ready: {} links, {} vehicles, {} persons, sample factor {factor}",
            scenario.network.link_count(),
            scenario.vehicles.len(),
            scenario.attributes.len(),
        );
        Ok(Self {
            config,
            scenario,
            volumes: VolumeAggregator::new(factor),
            relations: RelationExtractor::new(),
            iteration: 0,
        })
    }

    /// Dispatch one event.
    pub fn handle_event(&mut self, event: &Event) -> AnalysisResult<()> {
        match event {
            Event::LinkLeave { vehicle, link, .. } => {
                let leave = self.scenario.resolve_link_leave(vehicle, link)?;
                self.volumes.on_link_leave(&self.scenario.zones, &leave);
            }
            Event::ActivityStart { person, activity, coord, .. } => {
                self.relations
                    .on_activity_start(&self.scenario.attributes, person, activity, *coord)?;
            }
            Event::Other { .. } => {}
        }
        Ok(())
    }

    /// Drain a full event stream, stopping at the first error.
    ///
    /// With the `parallel` feature, link-leave events are sharded by link id
    /// and aggregated on Rayon's pool while activity starts are handled in
    /// stream order on one thread.  On failure the error of the earliest
    /// failing event in the stream is returned.
    pub fn process<'e, I>(&mut self, events: I) -> AnalysisResult<ProcessSummary>
    where
        I: IntoIterator<Item = &'e Event>,
    {
        let mut summary = ProcessSummary::default();

        #[cfg(not(feature = "parallel"))]
        {
            for event in events {
                self.handle_event(event)?;
                summary.count(event);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use ct_core::{Coord, PersonId};
            use rayon::prelude::*;

            use crate::AnalysisError;

            type Failure = (usize, AnalysisError);

            // ── Partition (sequential) ────────────────────────────────────
            let shard_count = rayon::current_num_threads().max(1);
            let mut shards: Vec<Vec<(usize, &VehicleId, &LinkId)>> = vec![Vec::new(); shard_count];
            let mut starts: Vec<(usize, &PersonId, &str, Coord)> = Vec::new();
            for (pos, event) in events.into_iter().enumerate() {
                summary.count(event);
                match event {
                    Event::LinkLeave { vehicle, link, .. } => {
                        shards[shard_of(link, shard_count)].push((pos, vehicle, link));
                    }
                    Event::ActivityStart { person, activity, coord, .. } => {
                        starts.push((pos, person, activity.as_str(), *coord));
                    }
                    Event::Other { .. } => {}
                }
            }

            // ── Relations in order ‖ volumes per shard ────────────────────
            let scenario = &self.scenario;
            let relations = &mut self.relations;
            let factor = self.volumes.sample_factor();

            let (relation_result, shard_results) = rayon::join(
                || -> Result<(), Failure> {
                    for &(pos, person, activity, coord) in &starts {
                        relations
                            .on_activity_start(&scenario.attributes, person, activity, coord)
                            .map_err(|e| (pos, e))?;
                    }
                    Ok(())
                },
                || {
                    shards
                        .into_par_iter()
                        .map(|shard| -> Result<VolumeAggregator, Failure> {
                            let mut partial = VolumeAggregator::new(factor);
                            for (pos, vehicle, link) in shard {
                                let leave = scenario
                                    .resolve_link_leave(vehicle, link)
                                    .map_err(|e| (pos, e))?;
                                partial.on_link_leave(&scenario.zones, &leave);
                            }
                            Ok(partial)
                        })
                        .collect::<Vec<_>>()
                },
            );

            // ── Merge ─────────────────────────────────────────────────────
            let mut first_failure: Option<Failure> = relation_result.err();
            for result in shard_results {
                match result {
                    Ok(partial) => self.volumes.merge(partial),
                    Err((pos, e)) => {
                        if first_failure.as_ref().is_none_or(|(first, _)| pos < *first) {
                            first_failure = Some((pos, e));
                        }
                    }
                }
            }
            if let Some((_, e)) = first_failure {
                return Err(e);
            }
        }

        log::info!(
            "iteration {}: processed {} events ({} link leaves, {} activity starts, {} ignored), {} relations",
            self.iteration,
            summary.total(),
            summary.link_leaves,
            summary.activity_starts,
            summary.ignored,
            self.relations.relations().len(),
        );
        Ok(summary)
    }

    /// Clear every result table before `iteration`.  Idempotent.
    pub fn reset(&mut self, iteration: u32) {
        self.volumes.reset();
        self.relations.reset();
        self.iteration = iteration;
        log::debug!("iteration {iteration}: result tables cleared");
    }

    /// [`reset`](Self::reset) followed by [`process`](Self::process).
    pub fn process_iteration<'e, I>(&mut self, iteration: u32, events: I) -> AnalysisResult<ProcessSummary>
    where
        I: IntoIterator<Item = &'e Event>,
    {
        self.reset(iteration);
        self.process(events)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn results(&self) -> AnalysisResults<'_> {
        AnalysisResults {
            link_volumes:          self.volumes.link_volumes(),
            distances_per_mode:    self.volumes.distances_per_mode(),
            distances_per_class:   self.volumes.distances_per_class(),
            distances_per_vehicle: self.volumes.distances_per_vehicle(),
            relations:             self.relations.relations(),
            attributes:            &self.scenario.attributes,
            network_modes:         self.scenario.vehicles.network_modes(),
            sample_factor:         self.volumes.sample_factor(),
            iteration:             self.iteration,
        }
    }

    /// Zone-to-zone matrix of the relations extracted so far.
    pub fn od_matrix(&self) -> OdMatrix {
        od_matrix(self.relations.relations(), &self.scenario.zones)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn scenario(&self) -> &Scenario<Z> {
        &self.scenario
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }
}

/// Shard index for `link`.  Every event of one link lands in the same shard.
#[cfg(feature = "parallel")]
fn shard_of(link: &LinkId, shard_count: usize) -> usize {
    use std::hash::{DefaultHasher, Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    link.hash(&mut hasher);
    (hasher.finish() % shard_count as u64) as usize
}
