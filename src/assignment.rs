//! 마니또 배정 엔진
//!
//! Fisher-Yates 셔플 후 원형 연결 (A -> B -> C -> A).
//! 결과는 항상 길이 n 의 단일 사이클이라 자기 자신은 배정되지 않는다.

use crate::models::Member;
use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("At least 2 participants are required (got {count})")]
    InsufficientParticipants { count: usize },
}

/// 기본 난수 소스로 배정
pub fn assign(members: &[Member]) -> Result<Vec<Member>, AssignError> {
    assign_with(members, &mut rand::thread_rng())
}

/// 배정 결과는 셔플 이후 순서로 반환된다.
/// 같은 id 가 중복되면 첫 항목만 사용한다.
pub fn assign_with<R: Rng + ?Sized>(
    members: &[Member],
    rng: &mut R,
) -> Result<Vec<Member>, AssignError> {
    let mut seen = HashSet::with_capacity(members.len());
    let mut shuffled: Vec<Member> = members
        .iter()
        .filter(|m| seen.insert(m.id.as_str()))
        .cloned()
        .collect();

    let n = shuffled.len();
    if n < 2 {
        return Err(AssignError::InsufficientParticipants { count: n });
    }

    // 1. 셔플 (Fisher-Yates)
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }

    // 2. 원형 연결
    let names: Vec<String> = shuffled.iter().map(|m| m.name.clone()).collect();
    for (k, member) in shuffled.iter_mut().enumerate() {
        member.target_name = Some(names[(k + 1) % n].clone());
    }

    Ok(shuffled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn members(names: &[&str]) -> Vec<Member> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Member::new(format!("id-{i}"), name.to_string(), format!("tok-{i}")))
            .collect()
    }

    fn targets(assigned: &[Member]) -> HashMap<String, String> {
        assigned
            .iter()
            .map(|m| (m.name.clone(), m.target_name.clone().unwrap()))
            .collect()
    }

    #[test]
    fn every_member_gets_a_distinct_non_self_target() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 2..=12 {
            let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let assigned = assign_with(&members(&refs), &mut rng).unwrap();

            assert_eq!(assigned.len(), n);
            let map = targets(&assigned);
            let distinct: HashSet<&String> = map.values().collect();
            assert_eq!(distinct.len(), n);
            for (source, target) in &map {
                assert_ne!(source, target);
                assert!(map.contains_key(target));
            }
        }
    }

    #[test]
    fn targets_form_a_single_cycle() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 2..=12 {
            let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let map = targets(&assign_with(&members(&refs), &mut rng).unwrap());

            let start = "P0".to_string();
            let mut visited = HashSet::new();
            let mut current = start.clone();
            for _ in 0..n {
                assert!(visited.insert(current.clone()));
                current = map[&current].clone();
            }
            assert_eq!(current, start);
            assert_eq!(visited.len(), n);
        }
    }

    #[test]
    fn fewer_than_two_fails_the_same_way_every_time() {
        let single = members(&["A"]);
        let first = assign(&single);
        let second = assign(&single);
        assert_eq!(first, Err(AssignError::InsufficientParticipants { count: 1 }));
        assert_eq!(first, second);

        assert_eq!(
            assign(&[]),
            Err(AssignError::InsufficientParticipants { count: 0 })
        );
    }

    #[test]
    fn duplicate_ids_count_once() {
        let a = Member::new("same".into(), "A".into(), "t1".into());
        let err = assign(&[a.clone(), a]).unwrap_err();
        assert_eq!(err, AssignError::InsufficientParticipants { count: 1 });
    }

    #[test]
    fn two_members_swap() {
        let map = targets(&assign(&members(&["A", "B"])).unwrap());
        assert_eq!(map["A"], "B");
        assert_eq!(map["B"], "A");
    }

    #[test]
    fn three_members_form_one_of_two_cycles() {
        let map = targets(&assign(&members(&["A", "B", "C"])).unwrap());
        let a = "A".to_string();
        assert_eq!(map[&map[&map[&a]]], a);
        assert!(map.iter().all(|(s, t)| s != t));
        let forward = map["A"] == "B" && map["B"] == "C" && map["C"] == "A";
        let backward = map["A"] == "C" && map["C"] == "B" && map["B"] == "A";
        assert!(forward ^ backward);
    }

    #[test]
    fn input_is_not_mutated() {
        let input = members(&["A", "B", "C"]);
        let before = input.clone();
        let _ = assign(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn targets_are_roughly_uniform_for_three() {
        let mut rng = StdRng::seed_from_u64(2024);
        let input = members(&["A", "B", "C"]);
        let trials = 6000;
        let pairs = [("A", "B"), ("B", "C"), ("C", "A")];
        let mut hits = [0usize; 3];

        for _ in 0..trials {
            let map = targets(&assign_with(&input, &mut rng).unwrap());
            for (count, (source, target)) in hits.iter_mut().zip(pairs) {
                if map[source] == target {
                    *count += 1;
                }
            }
        }

        for (count, (source, target)) in hits.iter().zip(pairs) {
            let ratio = *count as f64 / trials as f64;
            assert!(
                (0.45..=0.55).contains(&ratio),
                "{source}->{target} ratio {ratio}"
            );
        }
    }
}
