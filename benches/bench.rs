// Criterion benchmarks for Tandem Match

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tandem_match::core::{apply_candidate_query, ExclusionSet, MatchRanker, Tier};
use tandem_match::models::UserProfile;
use tandem_match::services::InMemoryStore;

const LANGUAGES: [&str; 6] = ["english", "spanish", "french", "german", "japanese", "korean"];

fn create_candidate(id: usize) -> UserProfile {
    UserProfile {
        id: format!("user-{:06}", id),
        full_name: format!("User {}", id),
        bio: String::new(),
        profile_pic: String::new(),
        native_language: LANGUAGES[id % LANGUAGES.len()].to_string(),
        learning_language: LANGUAGES[(id / LANGUAGES.len()) % LANGUAGES.len()].to_string(),
        location: String::new(),
        is_onboarded: id % 7 != 0,
        friends: vec![],
        updated_at: Utc::now() - Duration::seconds(id as i64),
    }
}

fn create_requester() -> UserProfile {
    let mut requester = create_candidate(0);
    requester.id = "requester".to_string();
    requester.native_language = "english".to_string();
    requester.learning_language = "spanish".to_string();
    requester.is_onboarded = true;
    requester.friends = (0..50).map(|i| format!("user-{:06}", i * 3)).collect();
    requester
}

fn bench_rank_matches(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let ranker = MatchRanker::with_default_limits();

    let mut group = c.benchmark_group("rank_matches");

    for population in [100, 1_000, 10_000].iter() {
        let store = InMemoryStore::with_users(
            (0..*population)
                .map(create_candidate)
                .chain(std::iter::once(create_requester())),
        );

        group.bench_with_input(
            BenchmarkId::new("in_memory", population),
            population,
            |b, _| {
                b.iter(|| {
                    runtime
                        .block_on(ranker.rank_matches(&store, &store, black_box("requester")))
                        .expect("ranking should succeed")
                });
            },
        );
    }

    group.finish();
}

fn bench_community_query(c: &mut Criterion) {
    let requester = create_requester();
    let excluded = ExclusionSet::for_requester(&requester);
    let query = Tier::Community.query(&requester, &excluded, 10);
    let candidates: Vec<UserProfile> = (0..1_000).map(create_candidate).collect();

    c.bench_function("community_query_1000_candidates", |b| {
        b.iter(|| black_box(apply_candidate_query(&candidates, black_box(&query))));
    });
}

criterion_group!(benches, bench_rank_matches, bench_community_query);

criterion_main!(benches);
