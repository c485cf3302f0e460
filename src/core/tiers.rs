use std::collections::BTreeSet;

use crate::models::{CandidateQuery, CandidateSort, TierLimits, UserProfile};

/// Suggestion tiers, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// They speak what I learn and learn what I speak
    Reciprocal,
    /// They speak what I learn
    NativeSpeaker,
    /// Anyone onboarded, most recently active first
    Community,
}

impl Tier {
    /// Build the directory query for this tier
    pub fn query(self, requester: &UserProfile, excluded: &ExclusionSet, limit: usize) -> CandidateQuery {
        let base = CandidateQuery {
            onboarded: Some(true),
            exclude_user_ids: excluded.to_vec(),
            limit: Some(limit),
            ..Default::default()
        };

        match self {
            Tier::Reciprocal => CandidateQuery {
                native_language: Some(requester.learning_language.clone()),
                learning_language: Some(requester.native_language.clone()),
                sort: CandidateSort::IdAscending,
                ..base
            },
            Tier::NativeSpeaker => CandidateQuery {
                native_language: Some(requester.learning_language.clone()),
                sort: CandidateSort::IdAscending,
                ..base
            },
            Tier::Community => CandidateQuery {
                sort: CandidateSort::RecentlyUpdated,
                ..base
            },
        }
    }
}

/// One step of the tier plan: which tier, and its own cap if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    pub tier: Tier,
    pub cap: Option<usize>,
}

impl TierSpec {
    /// Slots this tier may fill once `used` slots are taken
    pub fn budget(&self, total_slots: usize, used: usize) -> usize {
        let remaining = total_slots.saturating_sub(used);
        self.cap.map_or(remaining, |cap| cap.min(remaining))
    }
}

/// Ordered tier plan for the given limits
pub fn tier_plan(limits: &TierLimits) -> [TierSpec; 3] {
    [
        TierSpec {
            tier: Tier::Reciprocal,
            cap: Some(limits.reciprocal_limit),
        },
        TierSpec {
            tier: Tier::NativeSpeaker,
            cap: None,
        },
        TierSpec {
            tier: Tier::Community,
            cap: None,
        },
    ]
}

/// Ids that must not be suggested to the requester
///
/// Ordered so the generated queries are identical between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: BTreeSet<String>,
}

impl ExclusionSet {
    /// Seeded with the requester and their current friends
    pub fn for_requester(requester: &UserProfile) -> Self {
        let mut ids: BTreeSet<String> = requester.friends.iter().cloned().collect();
        ids.insert(requester.id.clone());
        Self { ids }
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}
