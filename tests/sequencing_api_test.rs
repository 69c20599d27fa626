// ==========================================
// Mat assignment / sequencing integration tests
// ==========================================


#[cfg(test)]
mod sequencing_api_test {
    use crate::test_helpers::*;
    use dual_meet_aps::api::ErrorKind;
    use dual_meet_aps::domain::{Bout, MatRule, MatSettings};
    use dual_meet_aps::engine::total_rest_penalty;
    use dual_meet_aps::UserRole;
    use std::collections::HashMap;

    fn mat_settings(num_mats: u32) -> MatSettings {
        MatSettings {
            num_mats,
            min_rest_bouts: 3,
            rest_penalty: 10.0,
        }
    }

    /// Asserts mats are in range and orders on each mat are exactly 1..=n
    fn assert_well_formed(bouts: &[Bout], num_mats: u32) {
        let mut per_mat: HashMap<u32, Vec<u32>> = HashMap::new();
        for b in bouts {
            assert!(b.mat < num_mats, "bout {} on mat {}", b.bout_id, b.mat);
            per_mat.entry(b.mat).or_default().push(b.order);
        }
        for (mat, orders) in per_mat.iter_mut() {
            orders.sort();
            let expected: Vec<u32> = (1..=orders.len() as u32).collect();
            assert_eq!(*orders, expected, "orders on mat {}", mat);
        }
    }

    fn generated_squad(env: &TestEnv) -> (String, dual_meet_aps::ActingUser) {
        let (meet_id, coach) = seed_squad(env);
        env.api
            .generate_pairings(&meet_id, &coach, &squad_settings())
            .unwrap();
        (meet_id, coach)
    }

    #[test]
    fn test_assign_mats_produces_valid_schedule() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);
        let count = env.api.list_bouts(&meet_id).unwrap().len();

        let response = env.api.assign_mats(&meet_id, &coach, &mat_settings(2)).unwrap();
        assert_eq!(response.assigned_count, count);

        let bouts = env.api.list_bouts(&meet_id).unwrap();
        assert_well_formed(&bouts, 2);

        let report = env.api.rest_penalty_report(&meet_id).unwrap();
        assert_eq!(report.bout_count, count);
        assert_eq!(report.total_penalty, response.total_penalty);
        assert_eq!(report.mat_loads.len(), 2);
        assert_eq!(report.mat_loads.iter().sum::<usize>(), count);
    }

    #[test]
    fn test_assign_mats_persists_settings() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);

        let settings = MatSettings {
            num_mats: 1,
            min_rest_bouts: 5,
            rest_penalty: 2.5,
        };
        env.api.assign_mats(&meet_id, &coach, &settings).unwrap();
        assert_eq!(env.api.meet_mat_settings(&meet_id).unwrap(), settings);
        assert_well_formed(&env.api.list_bouts(&meet_id).unwrap(), 1);
    }

    #[test]
    fn test_reorder_keeps_mats() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);
        env.api.assign_mats(&meet_id, &coach, &mat_settings(2)).unwrap();

        let before: HashMap<String, u32> = env
            .api
            .list_bouts(&meet_id)
            .unwrap()
            .into_iter()
            .map(|b| (b.bout_id, b.mat))
            .collect();

        let response = env.api.reorder_bouts(&meet_id, &coach).unwrap();
        assert_eq!(response.reordered_count, before.len());

        let after = env.api.list_bouts(&meet_id).unwrap();
        for b in &after {
            assert_eq!(before[&b.bout_id], b.mat);
        }
        assert_well_formed(&after, 2);

        let report = env.api.rest_penalty_report(&meet_id).unwrap();
        assert_eq!(report.total_penalty, response.penalty_after);
        assert!(response.penalty_after <= response.penalty_before);
    }

    #[test]
    fn test_reorder_never_worsens_schedule() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);

        for num_mats in [1, 2, 3] {
            env.api
                .assign_mats(&meet_id, &coach, &mat_settings(num_mats))
                .unwrap();
            for _ in 0..2 {
                let response = env.api.reorder_bouts(&meet_id, &coach).unwrap();
                assert!(
                    response.penalty_after <= response.penalty_before,
                    "mats={} before={} after={}",
                    num_mats,
                    response.penalty_before,
                    response.penalty_after
                );
            }
        }
    }

    #[test]
    fn test_locked_bout_keeps_its_slot() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);
        env.api.assign_mats(&meet_id, &coach, &mat_settings(2)).unwrap();

        let target = env.api.list_bouts(&meet_id).unwrap().remove(0);
        env.api.set_bout_locked(&target.bout_id, &coach, true).unwrap();

        env.api.assign_mats(&meet_id, &coach, &mat_settings(2)).unwrap();
        env.api.reorder_bouts(&meet_id, &coach).unwrap();

        let bouts = env.api.list_bouts(&meet_id).unwrap();
        let locked = bouts.iter().find(|b| b.bout_id == target.bout_id).unwrap();
        assert_eq!((locked.mat, locked.order), (target.mat, target.order));
        assert_well_formed(&bouts, 2);
    }

    #[test]
    fn test_penalty_grows_with_min_rest() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);
        env.api.assign_mats(&meet_id, &coach, &mat_settings(1)).unwrap();
        let bouts = env.api.list_bouts(&meet_id).unwrap();

        let mut last = 0.0;
        for min_rest in 0..6 {
            let penalty = total_rest_penalty(&bouts, min_rest, 10.0);
            assert!(penalty >= last);
            last = penalty;
        }
        assert_eq!(total_rest_penalty(&bouts, 0, 10.0), 0.0);
    }

    #[test]
    fn test_invalid_mat_settings_rejected() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);

        for bad in [
            MatSettings { num_mats: 0, min_rest_bouts: 3, rest_penalty: 10.0 },
            MatSettings { num_mats: 2, min_rest_bouts: 3, rest_penalty: -1.0 },
        ] {
            let err = env.api.assign_mats(&meet_id, &coach, &bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_forced_bout_appended_to_mat() {
        let env = setup_env();
        let (meet_id, coach) = generated_squad(&env);
        env.api.assign_mats(&meet_id, &coach, &mat_settings(1)).unwrap();
        let count = env.api.list_bouts(&meet_id).unwrap().len() as u32;

        // X1 and X2 share a team, so generation never paired them
        let forced = env.api.force_pair(&meet_id, &coach, "X1", "X2").unwrap();
        assert_eq!(forced.mat, 0);
        assert_eq!(forced.order, count + 1);
    }

    // ==========================================
    // team mat rules
    // ==========================================

    #[test]
    fn test_replace_and_list_mat_rules() {
        let env = setup_env();
        let (_meet_id, coach) = seed_squad(&env);

        let rules = vec![
            MatRule::new(1, "blue", (0, 99), (10.0, 99.0)),
            MatRule::new(0, "green", (0, 2), (0.0, 9.5)),
        ];
        assert_eq!(env.api.replace_mat_rules("X", &coach, &rules).unwrap(), 2);

        let listed = env.api.list_mat_rules("X").unwrap();
        let mut expected = rules.clone();
        expected.sort_by_key(|r| r.mat_index);
        assert_eq!(listed, expected);

        // replacing drops the previous set
        env.api.replace_mat_rules("X", &coach, &rules[..1]).unwrap();
        assert_eq!(env.api.list_mat_rules("X").unwrap().len(), 1);
    }

    #[test]
    fn test_mat_rule_validation_and_permissions() {
        let env = setup_env();
        let (_meet_id, coach) = seed_squad(&env);

        let inverted = vec![MatRule::new(0, "green", (3, 1), (0.0, 9.5))];
        let err = env.api.replace_mat_rules("X", &coach, &inverted).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let duplicate = vec![
            MatRule::new(0, "green", (0, 1), (0.0, 9.5)),
            MatRule::new(0, "blue", (2, 4), (0.0, 12.0)),
        ];
        let err = env.api.replace_mat_rules("X", &coach, &duplicate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let valid = vec![MatRule::new(0, "green", (0, 1), (0.0, 9.5))];
        let err = env.api.replace_mat_rules("Y", &coach, &valid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = env.api.replace_mat_rules("NOPE", &coach, &valid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let admin = seed_user(&env, "admin", UserRole::Admin, None);
        assert!(env.api.replace_mat_rules("Y", &admin, &valid).is_ok());
    }
}
