use std::collections::HashSet;

use crate::core::error::GroupingError;
use crate::core::graph::{GenderId, ParticipantId, PreferenceGraph};
use crate::models::GroupingConfig;

/// Ordered groups plus participants left out (pairing surplus)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Vec<ParticipantId>>,
    unassigned: Vec<ParticipantId>,
}

impl Partition {
    pub fn new(groups: Vec<Vec<ParticipantId>>, unassigned: Vec<ParticipantId>) -> Self {
        Self { groups, unassigned }
    }

    pub fn groups(&self) -> &[Vec<ParticipantId>] {
        &self.groups
    }

    pub fn unassigned(&self) -> &[ParticipantId] {
        &self.unassigned
    }

    /// Group index per participant, `None` when unassigned
    pub fn assignment(&self, participant_count: usize) -> Vec<Option<usize>> {
        let mut assignment = vec![None; participant_count];
        for (g, group) in self.groups.iter().enumerate() {
            for member in group {
                if let Some(slot) = assignment.get_mut(member.index()) {
                    *slot = Some(g);
                }
            }
        }
        assignment
    }

    /// Sort members inside each group and the unassigned list
    pub fn normalized(mut self) -> Self {
        for group in &mut self.groups {
            group.sort_unstable();
        }
        self.unassigned.sort_unstable();
        self
    }
}

/// Target shape of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSlot {
    pub size: usize,
    /// Required head count per gender, indexed by `GenderId`
    pub quota: Option<Vec<usize>>,
}

/// Group sizes and gender quotas implied by a roster and a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    slots: Vec<GroupSlot>,
    unassigned: usize,
    pairing: bool,
}

impl GroupLayout {
    /// Plan the layout, failing when the hard constraints cannot hold
    pub fn plan(graph: &PreferenceGraph, config: &GroupingConfig) -> Result<Self, GroupingError> {
        if graph.is_empty() {
            return Err(GroupingError::InvalidConfig("roster is empty".to_string()));
        }
        let genders = graph.genders();
        let counts: Vec<usize> = genders.ids().map(|g| graph.members_of(g).len()).collect();

        if config.pairing {
            if genders.len() != 2 {
                return Err(GroupingError::InvalidConfig(format!(
                    "pairing mode needs exactly two genders, got {}",
                    genders.len()
                )));
            }
            if let Some(empty) = genders.ids().find(|g| counts[g.index()] == 0) {
                return Err(GroupingError::Infeasible {
                    reason: format!("no {} participants to pair", genders.label(empty)),
                    group: None,
                    gender: Some(genders.label(empty).to_string()),
                });
            }
            let pairs = counts[0].min(counts[1]);
            return Ok(Self {
                slots: vec![
                    GroupSlot {
                        size: 2,
                        quota: Some(vec![1, 1]),
                    };
                    pairs
                ],
                unassigned: graph.len() - 2 * pairs,
                pairing: true,
            });
        }

        let size = config.group_size;
        let total = graph.len();
        let group_count = total.div_ceil(size);
        let last_size = total - size * (group_count - 1);

        if !config.balance_genders {
            let mut slots = vec![GroupSlot { size, quota: None }; group_count];
            if let Some(last) = slots.last_mut() {
                last.size = last_size;
            }
            return Ok(Self {
                slots,
                unassigned: 0,
                pairing: false,
            });
        }

        let k = genders.len();
        if size % k != 0 {
            return Err(GroupingError::infeasible(format!(
                "group size {} cannot be split evenly across {} genders",
                size, k
            )));
        }
        if last_size % k != 0 {
            return Err(GroupingError::Infeasible {
                reason: format!(
                    "last group {} would hold {} participants, which cannot be split evenly across {} genders",
                    group_count - 1,
                    last_size,
                    k
                ),
                group: Some(group_count - 1),
                gender: None,
            });
        }

        let per_gender = size / k;
        let last_per_gender = last_size / k;
        let needed = per_gender * (group_count - 1) + last_per_gender;
        for gender in genders.ids() {
            let have = counts[gender.index()];
            if have != needed {
                return Err(GroupingError::Infeasible {
                    reason: format!(
                        "{} groups need {} {} participants, roster has {}",
                        group_count,
                        needed,
                        genders.label(gender),
                        have
                    ),
                    group: None,
                    gender: Some(genders.label(gender).to_string()),
                });
            }
        }

        let mut slots = vec![
            GroupSlot {
                size,
                quota: Some(vec![per_gender; k]),
            };
            group_count
        ];
        if let Some(last) = slots.last_mut() {
            last.size = last_size;
            last.quota = Some(vec![last_per_gender; k]);
        }

        Ok(Self {
            slots,
            unassigned: 0,
            pairing: false,
        })
    }

    pub fn slots(&self) -> &[GroupSlot] {
        &self.slots
    }

    pub fn group_count(&self) -> usize {
        self.slots.len()
    }

    pub fn expected_unassigned(&self) -> usize {
        self.unassigned
    }

    pub fn is_pairing(&self) -> bool {
        self.pairing
    }

    /// Whether the layout constrains gender composition
    pub fn has_quotas(&self) -> bool {
        self.slots.iter().any(|slot| slot.quota.is_some())
    }

    /// Number of leading slots with identical shape
    pub fn interchangeable_prefix(&self) -> usize {
        match self.slots.first() {
            Some(first) => self.slots.iter().take_while(|slot| *slot == first).count(),
            None => 0,
        }
    }

    /// Check a partition against this layout, returning every violation
    pub fn validate(&self, graph: &PreferenceGraph, partition: &Partition) -> Vec<String> {
        let mut errors = Vec::new();
        let genders = graph.genders();

        if partition.groups().len() != self.slots.len() {
            errors.push(format!(
                "expected {} groups, found {}",
                self.slots.len(),
                partition.groups().len()
            ));
        }

        for (g, (group, slot)) in partition.groups().iter().zip(&self.slots).enumerate() {
            if group.len() != slot.size {
                errors.push(format!(
                    "group {} should hold {} participants, holds {}",
                    g,
                    slot.size,
                    group.len()
                ));
            }
            if let Some(quota) = &slot.quota {
                let mut tally = vec![0usize; genders.len()];
                for &member in group {
                    if member.index() < graph.len() {
                        tally[graph.gender(member).index()] += 1;
                    }
                }
                for gender in genders.ids() {
                    let (want, got) = (quota[gender.index()], tally[gender.index()]);
                    if want != got {
                        errors.push(format!(
                            "group {} should hold {} {} participants, holds {}",
                            g,
                            want,
                            genders.label(gender),
                            got
                        ));
                    }
                }
            }
        }

        if partition.unassigned().len() != self.unassigned {
            errors.push(format!(
                "expected {} unassigned participants, found {}",
                self.unassigned,
                partition.unassigned().len()
            ));
        }
        if self.pairing {
            let minority = minority_gender(graph);
            for &member in partition.unassigned() {
                if member.index() < graph.len() && Some(graph.gender(member)) == minority {
                    errors.push(format!(
                        "{} is unassigned but belongs to the smaller gender",
                        graph.key(member)
                    ));
                }
            }
        }

        let mut seen = HashSet::with_capacity(graph.len());
        for &member in partition.groups().iter().flatten().chain(partition.unassigned()) {
            if member.index() >= graph.len() {
                errors.push(format!("unknown participant index {}", member.index()));
            } else if !seen.insert(member) {
                errors.push(format!("{} appears more than once", graph.key(member)));
            }
        }
        for id in graph.ids() {
            if !seen.contains(&id) {
                errors.push(format!("{} is missing", graph.key(id)));
            }
        }

        errors
    }
}

/// The strictly smaller gender, if the two counts differ
fn minority_gender(graph: &PreferenceGraph) -> Option<GenderId> {
    let mut ids = graph.genders().ids();
    let (a, b) = (ids.next()?, ids.next()?);
    let (na, nb) = (graph.members_of(a).len(), graph.members_of(b).len());
    match na.cmp(&nb) {
        std::cmp::Ordering::Less => Some(a),
        std::cmp::Ordering::Greater => Some(b),
        std::cmp::Ordering::Equal => None,
    }
}
