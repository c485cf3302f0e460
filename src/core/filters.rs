use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{CandidateQuery, CandidateSort, PublicProfile, UserProfile};

/// Check if a profile satisfies every predicate of a candidate query
#[inline]
pub fn matches_candidate_query(profile: &UserProfile, query: &CandidateQuery) -> bool {
    if let Some(onboarded) = query.onboarded {
        if profile.is_onboarded != onboarded {
            return false;
        }
    }

    if let Some(native) = &query.native_language {
        if &profile.native_language != native {
            return false;
        }
    }

    if let Some(learning) = &query.learning_language {
        if &profile.learning_language != learning {
            return false;
        }
    }

    !query.exclude_user_ids.contains(&profile.id)
}

/// Ordering used by candidate queries
///
/// Ids are compared bytewise, matching `ORDER BY id` under the C collation.
pub fn compare_candidates(a: &UserProfile, b: &UserProfile, sort: CandidateSort) -> Ordering {
    match sort {
        CandidateSort::IdAscending => a.id.cmp(&b.id),
        CandidateSort::RecentlyUpdated => b
            .updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id)),
    }
}

/// Run a candidate query over an in-memory set of profiles
///
/// Filter, sort, limit, then project to the public shape.
pub fn apply_candidate_query<'a, I>(profiles: I, query: &CandidateQuery) -> Vec<PublicProfile>
where
    I: IntoIterator<Item = &'a UserProfile>,
{
    let mut selected: Vec<&UserProfile> = profiles
        .into_iter()
        .filter(|profile| matches_candidate_query(profile, query))
        .collect();

    selected.sort_by(|a, b| compare_candidates(a, b, query.sort));

    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }

    selected.into_iter().map(UserProfile::to_public).collect()
}

/// Reorder profiles to follow `ids`, dropping ids that did not resolve
pub fn order_by_ids(profiles: Vec<PublicProfile>, ids: &[String]) -> Vec<PublicProfile> {
    let mut by_id: HashMap<String, PublicProfile> = profiles
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
