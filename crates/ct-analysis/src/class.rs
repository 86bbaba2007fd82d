//! Traffic-class labels and the vehicle-id classifier.
//!
//! Vehicle ids encode the demand model that generated them.  Classification
//! is an ordered substring test over the raw id; the first matching rule
//! wins.  The order matters: `FTL_kv` ids also contain `FTL`.

use std::fmt;

/// Umbrella label counted for every link-leave event.
pub const ALL_COMMERCIAL_VEHICLES: &str = "allCommercialVehicles";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrafficClass {
    SmallScaleCommercial,
    LongDistanceFreight,
    FtlKv,
    Ftl,
    Kep,
    WasteCollection,
    Ltl,
    TransitFreight,
}

impl TrafficClass {
    /// Every class, in classifier priority order.
    pub const ALL: [TrafficClass; 8] = [
        TrafficClass::SmallScaleCommercial,
        TrafficClass::LongDistanceFreight,
        TrafficClass::FtlKv,
        TrafficClass::Ftl,
        TrafficClass::Kep,
        TrafficClass::WasteCollection,
        TrafficClass::Ltl,
        TrafficClass::TransitFreight,
    ];

    /// Label used as the aggregation key and report column.
    pub const fn label(self) -> &'static str {
        match self {
            TrafficClass::SmallScaleCommercial => "Small-Scale-Commercial-Traffic",
            TrafficClass::LongDistanceFreight  => "Long-Distance-Freight-Traffic",
            TrafficClass::FtlKv                => "FTL_kv-Traffic",
            TrafficClass::Ftl                  => "FTL-Traffic",
            TrafficClass::Kep                  => "KEP",
            TrafficClass::WasteCollection      => "WasteCollection",
            TrafficClass::Ltl                  => "LTL-Traffic",
            TrafficClass::TransitFreight       => "Transit-Freight-Traffic",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Rule table ────────────────────────────────────────────────────────────────

/// One classifier rule: the id must contain at least one of `any_of` and
/// none of `none_of`.
struct Rule {
    any_of:  &'static [&'static str],
    none_of: &'static [&'static str],
    class:   TrafficClass,
}

impl Rule {
    #[inline]
    fn matches(&self, id: &str) -> bool {
        self.any_of.iter().any(|p| id.contains(p)) && !self.none_of.iter().any(|p| id.contains(p))
    }
}

const RULES: [Rule; 8] = [
    Rule { any_of: &["goodsTraffic_", "commercialPersonTraffic"], none_of: &[], class: TrafficClass::SmallScaleCommercial },
    Rule { any_of: &["longDistanceFreight"], none_of: &[],      class: TrafficClass::LongDistanceFreight },
    Rule { any_of: &["FTL_kv"],              none_of: &[],      class: TrafficClass::FtlKv },
    Rule { any_of: &["FTL"],                 none_of: &[],      class: TrafficClass::Ftl },
    Rule { any_of: &["ParcelDelivery_"],     none_of: &[],      class: TrafficClass::Kep },
    Rule { any_of: &["WasteCollection_"],    none_of: &[],      class: TrafficClass::WasteCollection },
    Rule { any_of: &["GoodsType_"],          none_of: &[],      class: TrafficClass::Ltl },
    Rule { any_of: &["freight_"],            none_of: &["FTL"], class: TrafficClass::TransitFreight },
];

/// Classify a raw vehicle id.  `None` if no rule matches.
///
/// ```
/// use ct_analysis::{TrafficClass, classify};
///
/// assert_eq!(classify("freight_FTL_kv_12"), Some(TrafficClass::FtlKv));
/// assert_eq!(classify("freight_7"), Some(TrafficClass::TransitFreight));
/// assert_eq!(classify("car_42"), None);
/// ```
pub fn classify(vehicle_id: &str) -> Option<TrafficClass> {
    RULES.iter().find(|r| r.matches(vehicle_id)).map(|r| r.class)
}
