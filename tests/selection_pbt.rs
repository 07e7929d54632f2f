use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kupu_backend::services::quiz::{build_options, merge_candidate_ids};
use kupu_backend::services::review::{is_due, review_interval};

fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

proptest! {
    #[test]
    fn due_follows_the_interval_table(count in 0i64..8, elapsed_hours in 0i64..400) {
        let now = reference_time();
        let last = now - Duration::hours(elapsed_hours);

        let days = if count >= 3 { 7 } else if count == 2 { 3 } else { 1 };
        prop_assert_eq!(review_interval(count), Duration::days(days));
        prop_assert_eq!(is_due(count, Some(last), now), elapsed_hours >= days * 24);
        prop_assert!(!is_due(count, None, now));
    }

    #[test]
    fn candidates_are_unique_and_fill_the_limit(
        total in 1usize..30,
        wrong_picks in prop::collection::vec(0usize..30, 0..12),
        limit in 1usize..40,
        seed in any::<u64>(),
    ) {
        let all_ids: Vec<String> = (0..total).map(|i| format!("w{i}")).collect();

        // wrong ids are a deduplicated subset of the store, order preserved
        let mut wrong_ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for pick in wrong_picks {
            let id = format!("w{}", pick % total);
            if seen.insert(id.clone()) {
                wrong_ids.push(id);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let candidates = merge_candidate_ids(&wrong_ids, all_ids, limit, &mut rng);

        let unique: HashSet<&String> = candidates.iter().collect();
        prop_assert_eq!(unique.len(), candidates.len());
        prop_assert_eq!(candidates.len(), limit.min(total));

        let prefix = wrong_ids.len().min(limit);
        prop_assert_eq!(&candidates[..prefix], &wrong_ids[..prefix]);
    }

    #[test]
    fn options_include_the_answer_and_stay_small(
        pool_size in 1usize..12,
        correct_pick in 0usize..12,
        seed in any::<u64>(),
    ) {
        let targets: Vec<String> = (0..pool_size).map(|i| format!("t{i}")).collect();
        let correct = targets[correct_pick % pool_size].clone();

        let mut rng = StdRng::seed_from_u64(seed);
        let options = build_options(&correct, &targets, &mut rng);

        prop_assert!(options.contains(&correct));
        prop_assert_eq!(options.len(), 1 + (pool_size - 1).min(3));

        let unique: HashSet<&String> = options.iter().collect();
        prop_assert_eq!(unique.len(), options.len());
    }
}
