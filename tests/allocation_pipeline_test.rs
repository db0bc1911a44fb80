use examdesk_backend::error::Error;
use examdesk_backend::services::allocation::{
    allocate, plan_groups, replacement_candidates, PoolQuestion, QuestionPool, SubtopicKey,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// A bank of `total` questions spread round-robin over `subtopics` subtopics
/// belonging to two topics.
fn question_bank(subtopics: u128, total: u128) -> Vec<PoolQuestion> {
    (0..total)
        .map(|i| PoolQuestion {
            id: uid(0x5000 + i),
            topic_id: uid(1 + i % 2),
            subtopic_id: Some(uid(0x100 + i % subtopics)),
        })
        .collect()
}

#[test]
fn full_pipeline_respects_both_invariants() {
    let bank = question_bank(10, 80);
    let keys: HashMap<Uuid, SubtopicKey> = bank.iter().map(|q| (q.id, q.key())).collect();

    let (plan, slots) = allocate(&bank, 25, 7, 4, 3, 99).expect("valid configuration");
    assert_eq!(plan.sizes.iter().sum::<i32>(), 25);
    assert_eq!(slots.len(), 25 * 3);

    // no two students of a group share a subtopic within a round
    let mut round_keys: HashSet<(i32, i32, SubtopicKey)> = HashSet::new();
    // no student sees the same question id twice
    let mut student_questions: HashSet<(i32, i32, Uuid)> = HashSet::new();

    for slot in &slots {
        assert!(round_keys.insert((slot.group_number, slot.round, keys[&slot.question_id])));
        assert!(student_questions.insert((
            slot.group_number,
            slot.student_number,
            slot.question_id
        )));
    }
}

#[test]
fn configuration_arithmetic_matches_contract() {
    // 28 seats hold 25 students
    assert!(plan_groups(25, 7, 4).is_ok());

    // 20 seats do not; shortfall is 5
    match plan_groups(25, 5, 4) {
        Err(Error::GroupConfig { shortfall, .. }) => assert_eq!(shortfall, 5),
        other => panic!("expected GroupConfig error, got {other:?}"),
    }
}

#[test]
fn four_subtopics_cannot_serve_groups_of_five() {
    let bank = question_bank(4, 40);
    match allocate(&bank, 10, 2, 5, 1, 0) {
        Err(Error::PoolExhausted {
            available,
            required,
            suggestion,
        }) => {
            assert_eq!(available, 4);
            assert_eq!(required, 5);
            assert!(!suggestion.is_empty());
        }
        other => panic!("expected PoolExhausted, got {other:?}"),
    }
}

#[test]
fn assignment_is_reproducible_under_a_fixed_seed() {
    let bank = question_bank(8, 48);
    let first = allocate(&bank, 16, 4, 4, 3, 0xDEAD).unwrap().1;
    let second = allocate(&bank, 16, 4, 4, 3, 0xDEAD).unwrap().1;
    assert_eq!(first, second);
}

#[test]
fn exchange_candidates_respect_group_state() {
    let bank = question_bank(5, 20);
    let (_, slots) = allocate(&bank, 5, 1, 5, 2, 11).unwrap();

    let keys: HashMap<Uuid, SubtopicKey> = bank.iter().map(|q| (q.id, q.key())).collect();
    let used: HashSet<Uuid> = slots.iter().map(|s| s.question_id).collect();

    // replace student 1's round-1 question
    let target = slots
        .iter()
        .find(|s| s.student_number == 1 && s.round == 1)
        .unwrap();
    let blocked: HashSet<SubtopicKey> = slots
        .iter()
        .filter(|s| s.round == 1 && s.student_number != 1)
        .map(|s| keys[&s.question_id])
        .collect();

    let candidates = replacement_candidates(&bank, &used, &blocked, target.question_id);
    for id in &candidates {
        assert!(!used.contains(id), "candidate already used in the group");
        assert!(
            !blocked.contains(&keys[id]),
            "candidate collides with a round-1 subtopic"
        );
    }

    // consuming the entire pool leaves nothing to swap in
    let all_used: HashSet<Uuid> = bank.iter().map(|q| q.id).collect();
    let none = replacement_candidates(&bank, &all_used, &HashSet::new(), target.question_id);
    assert!(none.is_empty());
}

#[test]
fn pool_indexer_counts_topic_fallbacks_as_subtopics() {
    let bank = vec![
        PoolQuestion {
            id: uid(1),
            topic_id: uid(7),
            subtopic_id: None,
        },
        PoolQuestion {
            id: uid(2),
            topic_id: uid(8),
            subtopic_id: None,
        },
        PoolQuestion {
            id: uid(3),
            topic_id: uid(7),
            subtopic_id: Some(uid(9)),
        },
    ];
    let pool = QuestionPool::index(&bank);
    assert_eq!(pool.subtopic_count(), 3);

    // two topic-fallback questions of the same topic share one bucket
    let same_topic = vec![
        PoolQuestion {
            id: uid(1),
            topic_id: uid(7),
            subtopic_id: None,
        },
        PoolQuestion {
            id: uid(2),
            topic_id: uid(7),
            subtopic_id: None,
        },
    ];
    assert_eq!(QuestionPool::index(&same_topic).subtopic_count(), 1);
}
