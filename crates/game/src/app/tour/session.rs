use std::collections::BTreeMap;

use tour_engine::SessionContext;

/// The five benefits collected on the benefits stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum BenefitKey {
    Performance,
    MemorySafety,
    Concurrency,
    Ecosystem,
    Portability,
}

impl BenefitKey {
    pub(crate) const ALL: [BenefitKey; 5] = [
        BenefitKey::Performance,
        BenefitKey::MemorySafety,
        BenefitKey::Concurrency,
        BenefitKey::Ecosystem,
        BenefitKey::Portability,
    ];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            BenefitKey::Performance => "performance",
            BenefitKey::MemorySafety => "memory_safety",
            BenefitKey::Concurrency => "concurrency",
            BenefitKey::Ecosystem => "ecosystem",
            BenefitKey::Portability => "portability",
        }
    }
}

/// The four example stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum StationKey {
    Sha256,
    HexEncode,
    RandomId,
    Checksum,
}

impl StationKey {
    pub(crate) const ALL: [StationKey; 4] = [
        StationKey::Sha256,
        StationKey::HexEncode,
        StationKey::RandomId,
        StationKey::Checksum,
    ];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            StationKey::Sha256 => "sha256",
            StationKey::HexEncode => "hex_encode",
            StationKey::RandomId => "random_id",
            StationKey::Checksum => "checksum",
        }
    }
}

/// In-memory progress for one run through the tour.
///
/// Flags only ever go from unset to set; [`SessionState::reset`] is the one
/// way back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionState {
    benefits_collected: BTreeMap<BenefitKey, bool>,
    examples_visited: BTreeMap<StationKey, bool>,
}

impl SessionState {
    /// Returns `true` only the first time `key` is collected.
    pub(crate) fn collect_benefit(&mut self, key: BenefitKey) -> bool {
        let was_collected = self.is_benefit_collected(key);
        self.benefits_collected.insert(key, true);
        !was_collected
    }

    pub(crate) fn is_benefit_collected(&self, key: BenefitKey) -> bool {
        self.benefits_collected.get(&key).copied().unwrap_or(false)
    }

    pub(crate) fn benefits_collected_count(&self) -> usize {
        self.benefits_collected.values().filter(|set| **set).count()
    }

    pub(crate) fn all_benefits_collected(&self) -> bool {
        BenefitKey::ALL
            .iter()
            .all(|key| self.is_benefit_collected(*key))
    }

    /// Returns `true` only the first time `key` is visited.
    pub(crate) fn visit_station(&mut self, key: StationKey) -> bool {
        let was_visited = self.is_station_visited(key);
        self.examples_visited.insert(key, true);
        !was_visited
    }

    pub(crate) fn is_station_visited(&self, key: StationKey) -> bool {
        self.examples_visited.get(&key).copied().unwrap_or(false)
    }

    pub(crate) fn stations_visited_count(&self) -> usize {
        self.examples_visited.values().filter(|set| **set).count()
    }

    pub(crate) fn all_stations_visited(&self) -> bool {
        StationKey::ALL
            .iter()
            .all(|key| self.is_station_visited(*key))
    }

    pub(crate) fn reset(&mut self) {
        self.benefits_collected.clear();
        self.examples_visited.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.benefits_collected.is_empty() && self.examples_visited.is_empty()
    }
}

impl SessionContext for SessionState {
    fn reset(&mut self) {
        SessionState::reset(self);
    }
}
