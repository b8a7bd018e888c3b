use chrono::NaiveDate;
use goaltrack_core::db::{open_db, open_db_in_memory};
use goaltrack_core::{
    ActivityDraft, ErrorKind, FixedClock, GoalDraft, GoalService, NoopNotificationSink,
    ProgressPolicy, SqliteTrackerStore, TrackerConfig, TrackerError, ValidationError,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

fn service(conn: &Connection, policy: ProgressPolicy) -> GoalService<SqliteTrackerStore<'_>> {
    let store = SqliteTrackerStore::try_new(conn).unwrap();
    GoalService::new(store, TrackerConfig::new(policy))
        .with_clock(FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        .with_notification_sink(NoopNotificationSink)
}

fn goal_id(service: &GoalService<SqliteTrackerStore<'_>>) -> i64 {
    service
        .add_goal(GoalDraft::new(
            "Budget",
            "weights",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        ))
        .unwrap()
        .id
}

fn persisted_weight(conn: &Connection, goal_id: i64) -> f64 {
    conn.query_row(
        "SELECT COALESCE(SUM(weight), 0) FROM activities WHERE goal_id = ?1;",
        [goal_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn empty_goal_has_full_budget() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);

    assert_eq!(service.remaining_weight(goal_id).unwrap(), 100.0);
    assert!(service.would_fit(goal_id, 100.0, None).unwrap());
}

#[test]
fn over_budget_activity_is_rejected_and_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);
    service
        .add_activity(goal_id, ActivityDraft::weighted("a", 10, 40.0))
        .unwrap();
    service
        .add_activity(goal_id, ActivityDraft::weighted("b", 10, 40.0))
        .unwrap();

    let err = service
        .add_activity(goal_id, ActivityDraft::weighted("c", 10, 30.0))
        .unwrap_err();

    match err {
        TrackerError::WeightBudgetExceeded {
            goal_id: rejected_goal,
            requested,
            available,
        } => {
            assert_eq!(rejected_goal, goal_id);
            assert_eq!(requested, 30.0);
            assert!((available - 20.0).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.activity_count(goal_id).unwrap(), 2);
    assert!((persisted_weight(&conn, goal_id) - 80.0).abs() < 1e-9);
    assert!((service.remaining_weight(goal_id).unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn budget_holds_across_a_sequence_of_adds() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);

    for weight in [25.0, 30.0, 50.0, 20.0, 10.0, 15.0, 1.0] {
        let _ = service.add_activity(goal_id, ActivityDraft::weighted("w", 50, weight));
        assert!(persisted_weight(&conn, goal_id) <= 100.0 + 1e-9);
    }
    assert!((persisted_weight(&conn, goal_id) - 100.0).abs() < 1e-9);
    assert!(!service.would_fit(goal_id, 1.0, None).unwrap());
}

#[test]
fn decimal_weights_fill_budget_exactly() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);

    for weight in [33.33, 33.33, 33.34] {
        service
            .add_activity(goal_id, ActivityDraft::weighted("part", 100, weight))
            .unwrap();
    }

    assert_eq!(service.remaining_weight(goal_id).unwrap(), 0.0);
    assert_eq!(service.get_goal(goal_id).unwrap().unwrap().progress, 100);
}

#[test]
fn update_excludes_the_activitys_own_weight() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);
    let activity = service
        .add_activity(goal_id, ActivityDraft::weighted("big", 20, 90.0))
        .unwrap();

    assert!(service.would_fit(goal_id, 100.0, Some(activity)).unwrap());
    assert!(!service.would_fit(goal_id, 100.0, None).unwrap());

    service
        .update_activity(goal_id, activity, ActivityDraft::weighted("big", 20, 100.0))
        .unwrap();
    assert_eq!(service.remaining_weight(goal_id).unwrap(), 0.0);
}

#[test]
fn update_beyond_budget_leaves_activity_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);
    service
        .add_activity(goal_id, ActivityDraft::weighted("a", 50, 60.0))
        .unwrap();
    let second = service
        .add_activity(goal_id, ActivityDraft::weighted("b", 50, 30.0))
        .unwrap();

    let err = service
        .update_activity(goal_id, second, ActivityDraft::weighted("b", 100, 50.0))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WeightBudgetExceeded);
    let activities = service.list_activities(goal_id).unwrap();
    assert_eq!(activities[1].weight, Some(30.0));
    assert_eq!(activities[1].progress, 50);
}

#[test]
fn would_fit_rejects_out_of_range_candidates() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Weighted);
    let goal_id = goal_id(&service);

    for candidate in [0.0, -5.0, 150.0] {
        assert!(matches!(
            service.would_fit(goal_id, candidate, None),
            Err(TrackerError::Validation(ValidationError::WeightOutOfRange(_)))
        ));
    }
}

#[test]
fn average_policy_still_budget_checks_supplied_weights() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, ProgressPolicy::Average);
    let goal_id = goal_id(&service);
    service
        .add_activity(goal_id, ActivityDraft::weighted("a", 10, 70.0))
        .unwrap();
    service
        .add_activity(goal_id, ActivityDraft::new("unweighted", 10))
        .unwrap();

    let err = service
        .add_activity(goal_id, ActivityDraft::weighted("b", 10, 40.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WeightBudgetExceeded);
    assert_eq!(service.activity_count(goal_id).unwrap(), 2);
}

#[test]
fn concurrent_adds_on_one_goal_never_overspend_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goals.db");
    let conn = open_db(&path).unwrap();
    let setup = service(&conn, ProgressPolicy::Weighted);

    for _ in 0..5 {
        let goal_id = goal_id(&setup);
        let barrier = Arc::new(Barrier::new(2));
        let workers: Vec<_> = (0..2)
            .map(|_| {
                let path: PathBuf = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let conn = open_db(&path).unwrap();
                    let service = service(&conn, ProgressPolicy::Weighted);
                    barrier.wait();
                    service
                        .add_activity(goal_id, ActivityDraft::weighted("half+", 50, 60.0))
                        .map_err(|err| err.kind())
                })
            })
            .collect();

        let outcomes: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();

        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(outcomes.contains(&Err(ErrorKind::WeightBudgetExceeded)));
        assert!((persisted_weight(&conn, goal_id) - 60.0).abs() < 1e-9);
        assert_eq!(setup.get_goal(goal_id).unwrap().unwrap().progress, 50);
    }
}
