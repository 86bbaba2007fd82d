//! Zone-to-zone OD matrix from extracted relations.

use std::collections::BTreeMap;

use ct_spatial::ZoneIndex;

use crate::relation::RelationTable;

/// Trip counts per `(origin zone, destination zone)`, grouped by relation
/// label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OdMatrix {
    pub counts: BTreeMap<String, BTreeMap<(String, String), u64>>,

    /// Complete relations with at least one end outside every zone.
    pub unmatched: u64,
}

impl OdMatrix {
    pub fn get(&self, label: &str, origin: &str, destination: &str) -> u64 {
        self.counts
            .get(label)
            .and_then(|pairs| pairs.get(&(origin.to_owned(), destination.to_owned())))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over all labels and zone pairs.
    pub fn total(&self) -> u64 {
        self.counts.values().flat_map(|pairs| pairs.values()).sum()
    }
}

/// Count complete relations by zone pair.  Incomplete relations are
/// skipped.
///
/// Origin is the counterpart (first-activity) coordinate, destination the
/// event-observed one.
pub fn od_matrix<Z: ZoneIndex + ?Sized>(relations: &RelationTable, zones: &Z) -> OdMatrix {
    let mut matrix = OdMatrix::default();
    for (_, relation) in relations.iter() {
        let (Some(origin), Some(destination)) = (relation.origin(), relation.destination()) else {
            continue;
        };
        match (zones.zone_of(origin), zones.zone_of(destination)) {
            (Some(from), Some(to)) => {
                *matrix
                    .counts
                    .entry(relation.label().to_owned())
                    .or_default()
                    .entry((from.to_owned(), to.to_owned()))
                    .or_insert(0) += 1;
            }
            _ => matrix.unmatched += 1,
        }
    }
    matrix
}
