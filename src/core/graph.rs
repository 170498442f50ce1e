use serde::Serialize;
use std::collections::HashMap;

use crate::core::error::GroupingError;
use crate::core::partition::Partition;
use crate::core::scoring::{PriorityTable, ScoringModel};

/// Stable index of a participant in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u32);

impl ParticipantId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the configured gender set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenderId(u8);

impl GenderId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed set of gender labels for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderSet {
    labels: Vec<String>,
}

impl GenderSet {
    pub fn new<I, S>(labels: I) -> Result<Self, GroupingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() || labels.len() > u8::MAX as usize {
            return Err(GroupingError::InvalidConfig(format!(
                "gender set must hold between 1 and {} labels, got {}",
                u8::MAX,
                labels.len()
            )));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(GroupingError::InvalidConfig(format!(
                    "gender label '{}' listed twice",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn get(&self, label: &str) -> Option<GenderId> {
        self.labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(|i| GenderId(i as u8))
    }

    pub fn label(&self, gender: GenderId) -> &str {
        &self.labels[gender.index()]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = GenderId> {
        (0..self.labels.len()).map(|i| GenderId(i as u8))
    }
}

impl Default for GenderSet {
    fn default() -> Self {
        Self {
            labels: vec!["male".to_string(), "female".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub key: String,
    pub gender: GenderId,
}

/// Relation between two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRelation {
    OneWay { from: ParticipantId, to: ParticipantId },
    Mutual,
}

/// Cached directed weights of an unordered pair (lo < hi)
#[derive(Debug, Clone, Copy, Default)]
struct PairEntry {
    forward: f64,
    backward: f64,
    score: f64,
}

/// Basic shape of the preference graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub total_edges: usize,
    pub total_participants: usize,
    pub mutual_pairs: usize,
    pub avg_out_degree: f64,
    pub with_preferences: usize,
    pub without_preferences: usize,
}

/// Participants plus deduplicated directed preference edges
///
/// Edges are indexed by source and, separately, by unordered pair so that
/// `pair_score` is a single hash lookup.
#[derive(Debug, Clone)]
pub struct PreferenceGraph {
    genders: GenderSet,
    scoring: ScoringModel,
    participants: Vec<Participant>,
    by_key: HashMap<String, ParticipantId>,
    edges: HashMap<(ParticipantId, ParticipantId), f64>,
    out_edges: Vec<Vec<ParticipantId>>,
    pairs: HashMap<(ParticipantId, ParticipantId), PairEntry>,
}

impl PreferenceGraph {
    pub fn new(genders: GenderSet, scoring: ScoringModel) -> Self {
        Self {
            genders,
            scoring,
            participants: Vec::new(),
            by_key: HashMap::new(),
            edges: HashMap::new(),
            out_edges: Vec::new(),
            pairs: HashMap::new(),
        }
    }

    pub fn add_participant(
        &mut self,
        key: impl Into<String>,
        gender: &str,
    ) -> Result<ParticipantId, GroupingError> {
        let key = key.into();
        if self.by_key.contains_key(&key) {
            return Err(GroupingError::DuplicateParticipant { id: key });
        }
        let Some(gender) = self.genders.get(gender) else {
            return Err(GroupingError::UnknownGender {
                id: key,
                gender: gender.to_string(),
            });
        };

        let id = ParticipantId(self.participants.len() as u32);
        self.by_key.insert(key.clone(), id);
        self.participants.push(Participant { key, gender });
        self.out_edges.push(Vec::new());
        Ok(id)
    }

    /// Add a directed edge; duplicates keep the maximum weight
    pub fn add_edge(&mut self, src: &str, dst: &str, weight: f64) -> Result<(), GroupingError> {
        let (from, to) = self.resolve_edge(src, dst, weight)?;
        self.insert_edge(from, to, weight);
        self.refresh_pair(from, to);
        Ok(())
    }

    /// Bulk-load edges and rebuild the pair index once
    ///
    /// Nothing is inserted unless every edge is valid.
    pub fn extend_edges<I, S>(&mut self, edges: I) -> Result<(), GroupingError>
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for (src, dst, weight) in edges {
            let (from, to) = self.resolve_edge(src.as_ref(), dst.as_ref(), weight)?;
            resolved.push((from, to, weight));
        }
        for (from, to, weight) in resolved {
            self.insert_edge(from, to, weight);
        }
        self.rebuild_index();
        Ok(())
    }

    /// Convert a ranked target list into edges using the priority table
    pub fn add_ranking<S: AsRef<str>>(
        &mut self,
        src: &str,
        targets: &[S],
        table: &PriorityTable,
    ) -> Result<(), GroupingError> {
        let mut edges = Vec::with_capacity(targets.len());
        for (rank, target) in targets.iter().enumerate() {
            let Some(weight) = table.weight_for_rank(rank) else {
                return Err(GroupingError::invalid_edge(
                    src,
                    target.as_ref(),
                    format!("rank {} exceeds the {}-entry priority table", rank + 1, table.len()),
                ));
            };
            edges.push((src, target.as_ref(), weight));
        }
        self.extend_edges(edges)
    }

    fn resolve_edge(
        &self,
        src: &str,
        dst: &str,
        weight: f64,
    ) -> Result<(ParticipantId, ParticipantId), GroupingError> {
        let Some(&from) = self.by_key.get(src) else {
            return Err(GroupingError::invalid_edge(src, dst, format!("unknown participant {}", src)));
        };
        let Some(&to) = self.by_key.get(dst) else {
            return Err(GroupingError::invalid_edge(src, dst, format!("unknown participant {}", dst)));
        };
        if from == to {
            return Err(GroupingError::invalid_edge(src, dst, "self-loop"));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GroupingError::invalid_edge(
                src,
                dst,
                format!("weight must be positive, got {}", weight),
            ));
        }
        Ok((from, to))
    }

    fn insert_edge(&mut self, from: ParticipantId, to: ParticipantId, weight: f64) {
        match self.edges.get_mut(&(from, to)) {
            Some(existing) => *existing = existing.max(weight),
            None => {
                self.edges.insert((from, to), weight);
                self.out_edges[from.index()].push(to);
            }
        }
    }

    fn refresh_pair(&mut self, a: ParticipantId, b: ParticipantId) {
        let (lo, hi) = ordered(a, b);
        let forward = self.edges.get(&(lo, hi)).copied().unwrap_or(0.0);
        let backward = self.edges.get(&(hi, lo)).copied().unwrap_or(0.0);
        let score = self.scoring.pair_score(forward, backward);
        self.pairs.insert((lo, hi), PairEntry { forward, backward, score });
    }

    /// Recompute the unordered pair index from the edge map
    pub fn rebuild_index(&mut self) {
        self.pairs.clear();
        let keys: Vec<_> = self.edges.keys().copied().collect();
        for (from, to) in keys {
            self.refresh_pair(from, to);
        }
    }

    #[inline]
    pub fn pair_score(&self, a: ParticipantId, b: ParticipantId) -> f64 {
        self.pairs.get(&ordered(a, b)).map_or(0.0, |entry| entry.score)
    }

    /// Sum of pair scores over all unordered pairs of the group
    pub fn group_score(&self, group: &[ParticipantId]) -> f64 {
        let mut score = 0.0;
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                score += self.pair_score(a, b);
            }
        }
        score
    }

    pub fn total_score(&self, partition: &Partition) -> f64 {
        partition
            .groups()
            .iter()
            .map(|group| self.group_score(group))
            .sum()
    }

    pub fn relation(&self, a: ParticipantId, b: ParticipantId) -> Option<PairRelation> {
        let (lo, hi) = ordered(a, b);
        let entry = self.pairs.get(&(lo, hi))?;
        match (entry.forward > 0.0, entry.backward > 0.0) {
            (true, true) => Some(PairRelation::Mutual),
            (true, false) => Some(PairRelation::OneWay { from: lo, to: hi }),
            (false, true) => Some(PairRelation::OneWay { from: hi, to: lo }),
            (false, false) => None,
        }
    }

    /// Mutual pairs as (lo, hi), sorted
    pub fn mutual_pairs(&self) -> Vec<(ParticipantId, ParticipantId)> {
        let mut pairs: Vec<_> = self
            .pairs
            .iter()
            .filter(|(_, entry)| entry.forward > 0.0 && entry.backward > 0.0)
            .map(|(&key, _)| key)
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Directed edges whose reverse edge is absent, sorted
    pub fn one_way_edges(&self) -> Vec<(ParticipantId, ParticipantId)> {
        let mut edges: Vec<_> = self
            .edges
            .keys()
            .filter(|(from, to)| !self.edges.contains_key(&(*to, *from)))
            .copied()
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Pairs carrying a positive score, as (lo, hi, score), sorted
    pub fn scored_pairs(&self) -> Vec<(ParticipantId, ParticipantId, f64)> {
        let mut pairs: Vec<_> = self
            .pairs
            .iter()
            .filter(|(_, entry)| entry.score > 0.0)
            .map(|(&(lo, hi), entry)| (lo, hi, entry.score))
            .collect();
        pairs.sort_unstable_by_key(|&(lo, hi, _)| (lo, hi));
        pairs
    }

    pub fn edge_weight(&self, src: ParticipantId, dst: ParticipantId) -> Option<f64> {
        self.edges.get(&(src, dst)).copied()
    }

    pub fn targets_of(&self, src: ParticipantId) -> &[ParticipantId] {
        &self.out_edges[src.index()]
    }

    pub fn stats(&self) -> GraphStats {
        let total_participants = self.participants.len();
        let with_preferences = self.out_edges.iter().filter(|targets| !targets.is_empty()).count();
        GraphStats {
            total_edges: self.edges.len(),
            total_participants,
            mutual_pairs: self.mutual_pairs().len(),
            avg_out_degree: if total_participants > 0 {
                self.edges.len() as f64 / total_participants as f64
            } else {
                0.0
            },
            with_preferences,
            without_preferences: total_participants - with_preferences,
        }
    }

    pub fn id(&self, key: &str) -> Option<ParticipantId> {
        self.by_key.get(key).copied()
    }

    pub fn participant(&self, id: ParticipantId) -> &Participant {
        &self.participants[id.index()]
    }

    pub fn key(&self, id: ParticipantId) -> &str {
        &self.participants[id.index()].key
    }

    pub fn gender(&self, id: ParticipantId) -> GenderId {
        self.participants[id.index()].gender
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> {
        (0..self.participants.len()).map(|i| ParticipantId(i as u32))
    }

    /// Participants of one gender in arena order
    pub fn members_of(&self, gender: GenderId) -> Vec<ParticipantId> {
        self.ids().filter(|&id| self.gender(id) == gender).collect()
    }

    pub fn genders(&self) -> &GenderSet {
        &self.genders
    }

    pub fn scoring(&self) -> ScoringModel {
        self.scoring
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[inline]
fn ordered(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
