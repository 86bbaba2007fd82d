//! Unit tests for ct-analysis.
//!
//! The shared fixture is a two-link network: `inside` lies in the study area
//! (the west zone), `outside` lies in the east zone beyond it.

#[cfg(test)]
mod helpers {
    use std::io::Cursor;

    use ct_attributes::{AttributeTable, load_attributes_reader};
    use ct_core::{Coord, EventTime, LinkId, PersonId, VehicleId};
    use ct_spatial::{
        LinkNetwork, LinkNetworkBuilder, PolygonZoneIndex, PolygonZoneIndexBuilder, VehicleRegistry, polygon,
    };
    use geo::Polygon;

    use crate::{AggregationEngine, AnalysisConfig, Event, Scenario};

    pub fn square(x0: f64, y0: f64, s: f64) -> Polygon<f64> {
        polygon(&[
            Coord::new(x0, y0),
            Coord::new(x0 + s, y0),
            Coord::new(x0 + s, y0 + s),
            Coord::new(x0, y0 + s),
        ])
    }

    /// `west` = [0,10]², `east` = [10,20]×[0,10]; study area = `west`.
    pub fn zones() -> PolygonZoneIndex {
        let mut b = PolygonZoneIndexBuilder::new(square(0.0, 0.0, 10.0));
        b.add_zone("west", square(0.0, 0.0, 10.0));
        b.add_zone("east", square(10.0, 0.0, 10.0));
        b.build()
    }

    pub fn network() -> LinkNetwork {
        let mut b = LinkNetworkBuilder::new();
        b.add_link("inside", Coord::new(5.0, 5.0), 100.0, &["car", "truck40t"]);
        b.add_link("outside", Coord::new(15.0, 5.0), 200.0, &["car", "truck40t"]);
        b.build().unwrap()
    }

    pub fn vehicles() -> VehicleRegistry {
        let mut reg = VehicleRegistry::new();
        reg.insert("goodsTraffic_1", "vwCaddy", "car")
            .insert("freight_FTL_kv_1", "heavy40t", "truck40t")
            .insert("freight_FTL_2", "heavy40t", "truck40t")
            .insert("freight_3", "medium18t", "truck18t")
            .insert("private_9", "golf1.4", "car");
        reg
    }

    pub const ATTRIBUTES: &str = "\
person;subpopulation;first_act_x;first_act_y
p1;goodsTraffic_trip;1;2
cpt;commercialPersonTraffic_service;3;4
ftl;FTL_trip;12;3
kv;FTL_kv_trip;13;3
ldf;longDistanceFreight;14;3
waste_WasteCollection_1;LTL_trip;2;2
parcel_ParcelDelivery_1;LTL_trip;4;4
ltl_GoodsType_1;LTL_trip;6;6
odd;unknownPop;0;0
bad;FTL_trip;abc;1
";

    pub fn attributes() -> AttributeTable {
        load_attributes_reader(Cursor::new(ATTRIBUTES), ';').unwrap()
    }

    pub fn scenario() -> Scenario<PolygonZoneIndex> {
        Scenario::new(network(), vehicles(), zones(), attributes())
    }

    pub fn engine(sample_size: f64) -> AggregationEngine<PolygonZoneIndex> {
        let config = AnalysisConfig { sample_size, ..AnalysisConfig::default() };
        AggregationEngine::new(config, scenario()).unwrap()
    }

    pub fn leave(vehicle: &str, link: &str) -> Event {
        Event::LinkLeave {
            time:    EventTime(0.0),
            vehicle: VehicleId::from(vehicle),
            link:    LinkId::from(link),
        }
    }

    pub fn act(person: &str, activity: &str, x: f64, y: f64) -> Event {
        Event::ActivityStart {
            time:     EventTime(0.0),
            person:   PersonId::from(person),
            activity: activity.to_owned(),
            coord:    Coord::new(x, y),
        }
    }
}

// ── Classifier ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod classifier {
    use crate::{TrafficClass, classify};

    #[test]
    fn each_pattern_maps_to_its_class() {
        let cases = [
            ("goodsTraffic_0815_1", TrafficClass::SmallScaleCommercial),
            ("commercialPersonTraffic_4_2", TrafficClass::SmallScaleCommercial),
            ("longDistanceFreight_77", TrafficClass::LongDistanceFreight),
            ("freight_FTL_kv_3", TrafficClass::FtlKv),
            ("freight_FTL_3", TrafficClass::Ftl),
            ("ParcelDelivery_DHL_1", TrafficClass::Kep),
            ("WasteCollection_Essen_2", TrafficClass::WasteCollection),
            ("GoodsType_140_7", TrafficClass::Ltl),
            ("freight_12", TrafficClass::TransitFreight),
        ];
        for (id, class) in cases {
            assert_eq!(classify(id), Some(class), "{id}");
        }
    }

    #[test]
    fn ftl_kv_wins_over_ftl() {
        assert_eq!(classify("FTL_kv_FTL_1"), Some(TrafficClass::FtlKv));
    }

    #[test]
    fn earlier_rule_wins() {
        // Contains both the small-scale and the long-distance pattern.
        assert_eq!(
            classify("goodsTraffic_longDistanceFreight"),
            Some(TrafficClass::SmallScaleCommercial)
        );
    }

    #[test]
    fn transit_freight_excludes_ftl() {
        assert_eq!(classify("freight_FTLx"), Some(TrafficClass::Ftl));
        assert_eq!(classify("freight_x"), Some(TrafficClass::TransitFreight));
    }

    #[test]
    fn unmatched_ids() {
        assert_eq!(classify("car_1"), None);
        assert_eq!(classify("goodsTraffic"), None); // no trailing underscore
        assert_eq!(classify(""), None);
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<&str> = TrafficClass::ALL.iter().map(|c| c.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), TrafficClass::ALL.len());
        assert_eq!(TrafficClass::FtlKv.to_string(), "FTL_kv-Traffic");
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use crate::{AnalysisConfig, AnalysisError};

    fn with_rate(sample_size: f64) -> AnalysisConfig {
        AnalysisConfig { sample_size, ..AnalysisConfig::default() }
    }

    #[test]
    fn sample_factor_truncates() {
        assert_eq!(with_rate(0.3).sample_factor(), 3.0);
        assert_eq!(with_rate(1.0).sample_factor(), 1.0);
        assert_eq!(with_rate(0.25).sample_factor(), 4.0);
        assert_eq!(with_rate(0.7).sample_factor(), 1.0);
    }

    #[test]
    fn rejects_out_of_range_rates() {
        for s in [0.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(with_rate(s).validate(), Err(AnalysisError::Config(_))), "{s}");
        }
        assert!(with_rate(0.1).validate().is_ok());
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let config = AnalysisConfig { attribute_delimiter: '¦', ..AnalysisConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "sample_size": 0.25, "run_id": "ruhr-25pct" }"#).unwrap();
        assert_eq!(config.sample_factor(), 4.0);
        assert_eq!(config.attribute_delimiter, ';');
        assert_eq!(config.study_area_name, None);
        assert_eq!(config.report_file_name("linkVolumes"), "ruhr-25pct.linkVolumes.csv");
    }
}

// ── VolumeAggregator ──────────────────────────────────────────────────────────

#[cfg(test)]
mod volume {
    use ct_core::{Coord, LinkId, VehicleId};

    use super::helpers::zones;
    use crate::{ALL_COMMERCIAL_VEHICLES, LinkLeave, VolumeAggregator};

    fn on(agg: &mut VolumeAggregator, vehicle: &str, vehicle_type: &str, mode: &str, inside: bool) {
        let vehicle = VehicleId::from(vehicle);
        let (link, coord, length_m) = if inside {
            (LinkId::from("inside"), Coord::new(5.0, 5.0), 100.0)
        } else {
            (LinkId::from("outside"), Coord::new(15.0, 5.0), 200.0)
        };
        let leave = LinkLeave { vehicle: &vehicle, vehicle_type, mode, link: &link, length_m, coord };
        agg.on_link_leave(&zones(), &leave);
    }

    #[test]
    fn increment_is_truncated_inverse_sample() {
        let mut agg = VolumeAggregator::new(3.0);
        on(&mut agg, "goodsTraffic_1", "vwCaddy", "car", true);

        let bucket = &agg.link_volumes()["inside"];
        assert_eq!(bucket["Small-Scale-Commercial-Traffic"], 3.0);
        assert_eq!(bucket[ALL_COMMERCIAL_VEHICLES], 3.0);
        assert_eq!(bucket["car"], 3.0);
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn unclassified_vehicle_still_counts_umbrella_and_mode() {
        let mut agg = VolumeAggregator::new(1.0);
        on(&mut agg, "private_9", "golf1.4", "car", true);
        on(&mut agg, "private_9", "golf1.4", "car", true);

        let bucket = &agg.link_volumes()["inside"];
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[ALL_COMMERCIAL_VEHICLES], 2.0);
        assert_eq!(bucket["car"], 2.0);
        assert!(agg.distances_per_class().is_empty());
        assert_eq!(agg.distances_per_mode()["car"], 200.0);
    }

    #[test]
    fn distances_only_inside_study_area() {
        let mut agg = VolumeAggregator::new(1.0);
        on(&mut agg, "freight_FTL_2", "heavy40t", "truck40t", false);
        on(&mut agg, "freight_FTL_2", "heavy40t", "truck40t", false);

        assert_eq!(agg.link_volumes()["outside"]["FTL-Traffic"], 2.0);
        assert!(agg.distances_per_mode().is_empty());
        assert!(agg.distances_per_class().is_empty());

        on(&mut agg, "freight_FTL_2", "heavy40t", "truck40t", true);
        assert_eq!(agg.distances_per_mode()["truck40t"], 100.0);
        assert_eq!(agg.distances_per_class()["FTL-Traffic"], 100.0);
    }

    #[test]
    fn per_vehicle_distance_covers_whole_network() {
        let mut agg = VolumeAggregator::new(4.0);
        on(&mut agg, "freight_FTL_2", "heavy40t", "truck40t", false);
        on(&mut agg, "freight_FTL_2", "heavy40t", "truck40t", true);
        on(&mut agg, "freight_FTL_kv_1", "heavy40t", "truck40t", true);

        let heavy = &agg.distances_per_vehicle()["heavy40t"];
        // Unscaled by the sample factor.
        assert_eq!(heavy[&VehicleId::from("freight_FTL_2")], 300.0);
        assert_eq!(heavy[&VehicleId::from("freight_FTL_kv_1")], 100.0);
        assert_eq!(agg.event_count(), 3);
    }

    #[test]
    fn merge_equals_single_pass() {
        let mut whole = VolumeAggregator::new(2.0);
        let mut left = VolumeAggregator::new(2.0);
        let mut right = VolumeAggregator::new(2.0);

        on(&mut whole, "goodsTraffic_1", "vwCaddy", "car", true);
        on(&mut whole, "freight_3", "medium18t", "truck18t", false);
        on(&mut whole, "goodsTraffic_1", "vwCaddy", "car", false);

        on(&mut left, "goodsTraffic_1", "vwCaddy", "car", true);
        on(&mut right, "freight_3", "medium18t", "truck18t", false);
        on(&mut right, "goodsTraffic_1", "vwCaddy", "car", false);
        left.merge(right);

        assert_eq!(left.link_volumes(), whole.link_volumes());
        assert_eq!(left.distances_per_mode(), whole.distances_per_mode());
        assert_eq!(left.distances_per_class(), whole.distances_per_class());
        assert_eq!(left.distances_per_vehicle(), whole.distances_per_vehicle());
        assert_eq!(left.event_count(), 3);
    }

    #[test]
    fn reset_clears_tables_keeps_factor() {
        let mut agg = VolumeAggregator::new(3.0);
        on(&mut agg, "goodsTraffic_1", "vwCaddy", "car", true);
        agg.reset();
        assert!(agg.is_empty());
        assert!(agg.distances_per_vehicle().is_empty());
        assert_eq!(agg.sample_factor(), 3.0);
    }
}

// ── RelationExtractor ─────────────────────────────────────────────────────────

#[cfg(test)]
mod relation {
    use std::collections::BTreeMap;

    use ct_attributes::AttributeError;
    use ct_core::{Coord, PersonId};

    use super::helpers::attributes;
    use crate::{
        AnalysisError, AnalysisResult, RelationExtractor, RelationIndex, RelationTable, RelationWrite, Role,
        TripKey,
    };

    fn start(
        ex: &mut RelationExtractor,
        person: &str,
        activity: &str,
        x: f64,
        y: f64,
    ) -> AnalysisResult<Option<RelationIndex>> {
        ex.on_activity_start(&attributes(), &PersonId::from(person), activity, Coord::new(x, y))
    }

    fn fields(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v)).collect()
    }

    #[test]
    fn goods_traffic_service() {
        let mut ex = RelationExtractor::new();
        let index = start(&mut ex, "p1", "service", 10.0, 20.0).unwrap();
        assert_eq!(index, Some(RelationIndex(0)));

        let rel = ex.relations().get(RelationIndex(0)).unwrap();
        assert_eq!(
            rel.fields(),
            &fields(&[
                ("goodsTraffic_service_X", 10.0),
                ("goodsTraffic_service_Y", 20.0),
                ("goodsTraffic_start_X", 1.0),
                ("goodsTraffic_start_Y", 2.0),
            ])
        );
        assert!(rel.is_complete());
        assert_eq!(rel.origin(), Some(Coord::new(1.0, 2.0)));
        assert_eq!(rel.destination(), Some(Coord::new(10.0, 20.0)));
    }

    #[test]
    fn goods_traffic_end_activity_ignored() {
        let mut ex = RelationExtractor::new();
        assert_eq!(start(&mut ex, "p1", "service_end", 0.0, 0.0).unwrap(), None);
        assert_eq!(start(&mut ex, "p1", "end", 0.0, 0.0).unwrap(), None);
        assert!(ex.relations().is_empty());
    }

    #[test]
    fn goods_traffic_other_activity_fails() {
        let mut ex = RelationExtractor::new();
        match start(&mut ex, "p1", "pickup", 0.0, 0.0) {
            Err(AnalysisError::UnexpectedActivity { person, subpopulation, activity }) => {
                assert_eq!(person.as_str(), "p1");
                assert_eq!(subpopulation, "goodsTraffic");
                assert_eq!(activity, "pickup");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn commercial_person_traffic_markers_stripped() {
        let mut ex = RelationExtractor::new();
        start(&mut ex, "cpt", "service", 7.0, 8.0).unwrap();
        let rel = ex.relations().get(RelationIndex(0)).unwrap();
        assert_eq!(rel.label(), "commercialPersonTraffic");
        assert_eq!(rel.get("commercialPersonTraffic_start_Y"), Some(4.0));
    }

    #[test]
    fn unknown_subpopulation_fails() {
        let mut ex = RelationExtractor::new();
        assert!(matches!(
            start(&mut ex, "odd", "service", 0.0, 0.0),
            Err(AnalysisError::UnknownSubpopulation { subpopulation, .. }) if subpopulation == "unknownPop"
        ));
    }

    #[test]
    fn long_haul_families_use_freight_end() {
        let mut ex = RelationExtractor::new();
        assert_eq!(start(&mut ex, "ftl", "freight_start", 0.0, 0.0).unwrap(), None);
        start(&mut ex, "ftl", "freight_end", 50.0, 60.0).unwrap();
        start(&mut ex, "kv", "freight_end", 51.0, 61.0).unwrap();
        start(&mut ex, "ldf", "freight_end", 52.0, 62.0).unwrap();

        let labels: Vec<&str> = ex.relations().iter().map(|(_, r)| r.label()).collect();
        assert_eq!(labels, ["FTL", "FTL_kv", "longDistanceFreight"]);

        let ftl = ex.relations().get(RelationIndex(0)).unwrap();
        assert_eq!(
            ftl.fields(),
            &fields(&[("FTL_end_X", 50.0), ("FTL_end_Y", 60.0), ("FTL_start_X", 12.0), ("FTL_start_Y", 3.0)])
        );
    }

    #[test]
    fn waste_collection_pickup_only() {
        let mut ex = RelationExtractor::new();
        // A delivery for a waste collection person is ignored, not treated as LTL.
        assert_eq!(start(&mut ex, "waste_WasteCollection_1", "delivery", 0.0, 0.0).unwrap(), None);
        start(&mut ex, "waste_WasteCollection_1", "pickup", 9.0, 9.0).unwrap();

        let rel = ex.relations().get(RelationIndex(0)).unwrap();
        assert_eq!(rel.label(), "WasteCollection");
        assert_eq!(rel.get("WasteCollection_pickup_X"), Some(9.0));
        assert_eq!(rel.get("WasteCollection_delivery_X"), Some(2.0));
    }

    #[test]
    fn ltl_delivery_labels() {
        let mut ex = RelationExtractor::new();
        assert_eq!(start(&mut ex, "ltl_GoodsType_1", "pickup", 0.0, 0.0).unwrap(), None);
        start(&mut ex, "parcel_ParcelDelivery_1", "delivery", 1.0, 1.0).unwrap();
        start(&mut ex, "ltl_GoodsType_1", "delivery", 2.0, 2.0).unwrap();

        let parcel = ex.relations().get(RelationIndex(0)).unwrap();
        assert_eq!(parcel.label(), "ParcelDelivery");
        assert_eq!(parcel.get("ParcelDelivery_pickup_X"), Some(4.0));
        let ltl = ex.relations().get(RelationIndex(1)).unwrap();
        assert_eq!(ltl.label(), "LTL");
        assert_eq!(ltl.get("LTL_delivery_Y"), Some(2.0));
    }

    #[test]
    fn every_match_gets_next_index() {
        let mut ex = RelationExtractor::new();
        let a = start(&mut ex, "p1", "service", 1.0, 1.0).unwrap();
        let b = start(&mut ex, "ftl", "freight_end", 2.0, 2.0).unwrap();
        let c = start(&mut ex, "p1", "service", 3.0, 3.0).unwrap();
        assert_eq!((a, b, c), (Some(RelationIndex(0)), Some(RelationIndex(1)), Some(RelationIndex(2))));

        let key = TripKey { person: PersonId::from("p1"), trip: 1 };
        assert_eq!(ex.relations().index_of(&key), Some(RelationIndex(2)));
    }

    #[test]
    fn unknown_person_fails() {
        let mut ex = RelationExtractor::new();
        assert!(matches!(
            start(&mut ex, "ghost", "service", 0.0, 0.0),
            Err(AnalysisError::Attribute(AttributeError::PersonNotFound(_)))
        ));
    }

    #[test]
    fn non_numeric_first_activity_fails_only_on_match() {
        let mut ex = RelationExtractor::new();
        assert_eq!(start(&mut ex, "bad", "freight_start", 0.0, 0.0).unwrap(), None);
        assert!(matches!(
            start(&mut ex, "bad", "freight_end", 0.0, 0.0),
            Err(AnalysisError::Attribute(AttributeError::InvalidNumber { .. }))
        ));
        assert!(ex.relations().is_empty());
    }

    #[test]
    fn observed_fields_keep_first_write() {
        let mut table = RelationTable::new();
        let key = TripKey { person: PersonId::from("p"), trip: 0 };
        let write = |observed_at: (f64, f64), counterpart_at: (f64, f64)| RelationWrite {
            label:          "FTL",
            observed:       Role::End,
            observed_at:    observed_at.into(),
            counterpart:    Role::Start,
            counterpart_at: counterpart_at.into(),
        };

        let first = table.record(key.clone(), write((1.0, 1.0), (2.0, 2.0))).unwrap();
        let second = table.record(key, write((9.0, 9.0), (8.0, 7.0))).unwrap();
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);

        let rel = table.get(first).unwrap();
        assert_eq!(rel.get("FTL_end_X"), Some(1.0));
        assert_eq!(rel.get("FTL_end_Y"), Some(1.0));
        assert_eq!(rel.get("FTL_start_X"), Some(8.0));
        assert_eq!(rel.get("FTL_start_Y"), Some(7.0));
    }

    #[test]
    fn clear_restarts_indices() {
        let mut ex = RelationExtractor::new();
        start(&mut ex, "p1", "service", 1.0, 1.0).unwrap();
        start(&mut ex, "p1", "service", 1.0, 1.0).unwrap();
        ex.reset();
        assert!(ex.relations().is_empty());
        assert_eq!(start(&mut ex, "p1", "service", 1.0, 1.0).unwrap(), Some(RelationIndex(0)));
    }

    #[test]
    fn exhausted_index_space_fails_without_inserting() {
        let mut table = RelationTable::starting_at(u32::MAX - 1);
        let write = RelationWrite {
            label:          "FTL",
            observed:       Role::End,
            observed_at:    Coord::new(1.0, 1.0),
            counterpart:    Role::Start,
            counterpart_at: Coord::new(2.0, 2.0),
        };
        let key = |person: &str| TripKey { person: PersonId::from(person), trip: 0 };

        let first = table.record(key("a"), write).unwrap();
        assert_eq!(first, RelationIndex(u32::MAX - 1));

        assert!(matches!(
            table.record(key("b"), write),
            Err(AnalysisError::RelationOverflow { person }) if person == PersonId::from("b")
        ));
        assert_eq!(table.len(), 1);
        assert_eq!(table.index_of(&key("b")), None);

        // Known keys still update.
        assert_eq!(table.record(key("a"), write).unwrap(), first);
    }

    #[test]
    fn exhausted_trip_ordinal_fails() {
        let mut ex = RelationExtractor::new();
        ex.seed_trip(&PersonId::from("p1"), u32::MAX);
        assert!(matches!(
            start(&mut ex, "p1", "service", 1.0, 1.0),
            Err(AnalysisError::RelationOverflow { .. })
        ));
        assert!(ex.relations().is_empty());
    }
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use ct_attributes::AttributeError;
    use ct_core::EventTime;
    use ct_spatial::SpatialError;

    use super::helpers::{act, engine, leave, scenario};
    use crate::{
        ALL_COMMERCIAL_VEHICLES, AggregationEngine, AnalysisConfig, AnalysisError, Event, ProcessSummary,
    };

    fn mixed_stream() -> Vec<Event> {
        vec![
            act("p1", "service", 15.0, 5.0),
            leave("goodsTraffic_1", "inside"),
            leave("freight_FTL_kv_1", "outside"),
            Event::Other { time: EventTime(1.0), kind: "departure".to_owned() },
            leave("freight_3", "inside"),
            act("ftl", "freight_end", 50.0, 50.0),
            act("p1", "service_end", 0.0, 0.0),
            leave("goodsTraffic_1", "outside"),
        ]
    }

    #[test]
    fn process_dispatches_by_kind() {
        let mut e = engine(0.5);
        let summary = e.process(&mixed_stream()).unwrap();
        assert_eq!(summary, ProcessSummary { link_leaves: 4, activity_starts: 3, ignored: 1 });

        let r = e.results();
        assert_eq!(r.sample_factor, 2.0);
        assert_eq!(r.link_volumes["inside"][ALL_COMMERCIAL_VEHICLES], 4.0);
        assert_eq!(r.link_volumes["inside"]["Transit-Freight-Traffic"], 2.0);
        assert_eq!(r.link_volumes["outside"]["FTL_kv-Traffic"], 2.0);
        assert_eq!(r.link_volumes["outside"]["car"], 2.0);
        assert_eq!(r.distances_per_mode["car"], 100.0);
        assert_eq!(r.distances_per_mode["truck18t"], 100.0);
        assert!(!r.distances_per_mode.contains_key("truck40t"));
        assert_eq!(r.distances_per_class["Small-Scale-Commercial-Traffic"], 100.0);
        assert_eq!(r.relations.len(), 2);
        assert_eq!(r.network_modes, ["car", "truck40t", "truck18t"]);
    }

    #[test]
    fn unknown_vehicle_is_lookup_error() {
        let mut e = engine(1.0);
        assert!(matches!(
            e.handle_event(&leave("ghost", "inside")),
            Err(AnalysisError::Lookup(SpatialError::VehicleNotFound(_)))
        ));
        assert!(matches!(
            e.handle_event(&leave("goodsTraffic_1", "nowhere")),
            Err(AnalysisError::Lookup(SpatialError::LinkNotFound(_)))
        ));
    }

    #[test]
    fn earliest_failure_in_stream_is_reported() {
        let mut e = engine(1.0);
        let events = vec![
            leave("goodsTraffic_1", "inside"),
            act("ghost", "service", 0.0, 0.0),
            leave("goodsTraffic_1", "inside"),
            leave("goodsTraffic_1", "nowhere"),
        ];
        assert!(matches!(
            e.process(&events),
            Err(AnalysisError::Attribute(AttributeError::PersonNotFound(_)))
        ));
    }

    #[test]
    fn process_matches_event_by_event_dispatch() {
        let events = mixed_stream();

        let mut batch = engine(0.3);
        batch.process(&events).unwrap();

        let mut single = engine(0.3);
        for event in &events {
            single.handle_event(event).unwrap();
        }

        let (a, b) = (batch.results(), single.results());
        assert_eq!(a.link_volumes, b.link_volumes);
        assert_eq!(a.distances_per_mode, b.distances_per_mode);
        assert_eq!(a.distances_per_class, b.distances_per_class);
        assert_eq!(a.distances_per_vehicle, b.distances_per_vehicle);
        let fields = |r: &crate::AnalysisResults<'_>| {
            r.relations.iter().map(|(i, rel)| (i, rel.fields().clone())).collect::<Vec<_>>()
        };
        assert_eq!(fields(&a), fields(&b));
    }

    #[test]
    fn reset_empties_all_tables() {
        let mut e = engine(1.0);
        e.process(&mixed_stream()).unwrap();
        assert!(!e.results().is_empty());

        e.reset(1);
        let r = e.results();
        assert!(r.is_empty());
        assert!(r.link_volumes.is_empty());
        assert!(r.distances_per_mode.is_empty());
        assert!(r.distances_per_class.is_empty());
        assert!(r.relations.is_empty());
        assert!(r.distances_per_vehicle.is_empty());
        assert_eq!(r.iteration, 1);

        // Idempotent.
        e.reset(1);
        assert!(e.results().is_empty());
    }

    #[test]
    fn iterations_do_not_accumulate() {
        let events = mixed_stream();
        let mut e = engine(1.0);
        e.process_iteration(0, &events).unwrap();
        let first = e.results().link_volumes.clone();

        e.process_iteration(1, &events).unwrap();
        let r = e.results();
        assert_eq!(r.link_volumes, &first);
        assert_eq!(r.relations.len(), 2);
        assert_eq!(r.relations.iter().next().map(|(i, _)| i.0), Some(0));
    }

    #[test]
    fn od_matrix_by_zone() {
        let mut e = engine(1.0);
        e.process(&mixed_stream()).unwrap();
        let od = e.od_matrix();
        // p1: first activity (1, 2) in west, service at (15, 5) in east.
        assert_eq!(od.get("goodsTraffic", "west", "east"), 1);
        // ftl ends at (50, 50), outside every zone.
        assert_eq!(od.unmatched, 1);
        assert_eq!(od.total(), 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = AnalysisConfig { sample_size: 2.0, ..AnalysisConfig::default() };
        assert!(matches!(
            AggregationEngine::new(config, scenario()),
            Err(AnalysisError::Config(_))
        ));
    }
}

// ── Event loader ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use ct_core::{Coord, EventTime, PersonId};

    use crate::{AnalysisError, Event, load_events_csv, load_events_reader};

    const LOG: &str = "\
time,type,vehicle,link,person,actType,x,y
21600,actstart,,,p1,service,10.0,20.0
21630,left link,goodsTraffic_1,inside,,,,
21700,departure,,,p1,,,
";

    #[test]
    fn parses_known_and_other_types() {
        let events = load_events_reader(Cursor::new(LOG)).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            Event::ActivityStart {
                time:     EventTime(21600.0),
                person:   PersonId::from("p1"),
                activity: "service".to_owned(),
                coord:    Coord::new(10.0, 20.0),
            }
        );
        assert!(matches!(&events[1], Event::LinkLeave { vehicle, link, .. }
            if vehicle.as_str() == "goodsTraffic_1" && link.as_str() == "inside"));
        assert_eq!(events[2].kind(), "departure");
        assert_eq!(events[2].time(), EventTime(21700.0));
    }

    #[test]
    fn missing_vehicle_reports_line() {
        let log = "time,type,vehicle,link,person,actType,x,y\n1,left link,v,l,,,,\n2,left link,,l,,,,\n";
        match load_events_reader(Cursor::new(log)) {
            Err(AnalysisError::EventParse { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("vehicle"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn activity_without_coordinate_fails() {
        let log = "time,type,vehicle,link,person,actType,x,y\n1,actstart,,,p1,service,,\n";
        assert!(matches!(
            load_events_reader(Cursor::new(log)),
            Err(AnalysisError::EventParse { line: 2, .. })
        ));
    }

    #[test]
    fn non_numeric_time_is_csv_error() {
        let log = "time,type,vehicle,link,person,actType,x,y\nnoon,left link,v,l,,,,\n";
        assert!(matches!(load_events_reader(Cursor::new(log)), Err(AnalysisError::Csv(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();
        assert_eq!(load_events_csv(file.path()).unwrap().len(), 3);
    }
}
