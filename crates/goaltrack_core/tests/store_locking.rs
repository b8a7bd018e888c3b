use chrono::NaiveDate;
use goaltrack_core::db::open_db;
use goaltrack_core::{
    ActivityDraft, ErrorKind, FixedClock, GoalDraft, GoalListQuery, GoalService,
    NoopNotificationSink, ProgressPolicy, SqliteTrackerStore, TrackerConfig,
};
use rusqlite::Connection;
use std::time::Duration;

fn service(conn: &Connection) -> GoalService<SqliteTrackerStore<'_>> {
    let store = SqliteTrackerStore::try_new(conn).unwrap();
    GoalService::new(store, TrackerConfig::new(ProgressPolicy::Weighted))
        .with_clock(FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        .with_notification_sink(NoopNotificationSink)
}

#[test]
fn reads_do_not_wait_for_a_writer_on_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goals.db");
    let writer = open_db(&path).unwrap();
    let reader = open_db(&path).unwrap();
    reader.busy_timeout(Duration::from_millis(100)).unwrap();

    let service = service(&reader);
    let goal = service
        .add_goal(GoalDraft::new(
            "Shared",
            "two connections",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        ))
        .unwrap();
    let activity = service
        .add_activity(goal.id, ActivityDraft::weighted("step", 50, 40.0))
        .unwrap();

    writer.execute_batch("BEGIN IMMEDIATE;").unwrap();

    assert_eq!(service.list_activities(goal.id).unwrap().len(), 1);
    assert!((service.remaining_weight(goal.id).unwrap() - 60.0).abs() < 1e-9);
    assert!(service.would_fit(goal.id, 60.0, None).unwrap());
    assert_eq!(service.activity_count(goal.id).unwrap(), 1);
    assert_eq!(service.goal_detail(goal.id).unwrap().goal.progress, 50);
    assert_eq!(service.goal_views(&GoalListQuery::default()).unwrap().len(), 1);
    assert_eq!(service.activity_views(goal.id).unwrap().len(), 1);

    let blocked = service
        .update_activity(goal.id, activity, ActivityDraft::weighted("step", 90, 40.0))
        .unwrap_err();
    assert_eq!(blocked.kind(), ErrorKind::Store);

    writer.execute_batch("COMMIT;").unwrap();

    let updated = service
        .update_activity(goal.id, activity, ActivityDraft::weighted("step", 90, 40.0))
        .unwrap();
    assert_eq!(updated.progress, 90);
    assert!(reader.is_autocommit());
}
