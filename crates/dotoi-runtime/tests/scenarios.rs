//! End-to-end scenarios through the bus, task service and repository.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use dotoi_events::{subscriber_fn, RecordingSubscriber, Subscriber};
use dotoi_models::{DataEvent, ModelError, RecurrenceRule, RecurrenceType, Task};
use dotoi_repository::InMemoryTaskRepository;
use dotoi_runtime::{Engine, FixedClock, SchedulerConfig};

/// Monday 2026-10-19 09:00.
fn monday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn engine_at(now: NaiveDateTime) -> (Engine, Arc<FixedClock>, Arc<RecordingSubscriber>) {
    let clock = Arc::new(FixedClock::new(now));
    let engine = Engine::with_parts(
        SchedulerConfig::default(),
        Arc::new(InMemoryTaskRepository::new()),
        clock.clone(),
    )
    .unwrap();
    let recorder = Arc::new(RecordingSubscriber::new());
    engine.bus().subscribe(recorder.clone());
    (engine, clock, recorder)
}

#[test]
fn test_request_on_empty_repository() {
    let (engine, _, recorder) = engine_at(monday());

    engine.publish(DataEvent::RequestTasks);

    let fetched: Vec<_> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            DataEvent::TasksFetched(tasks) => Some(tasks),
            _ => None,
        })
        .collect();
    assert_eq!(fetched.len(), 1);
    assert!(fetched[0].is_empty());
}

#[test]
fn test_overdue_until_completed() {
    let (engine, _, recorder) = engine_at(monday());
    let yesterday = monday() - chrono::Duration::days(1);
    let task = Arc::new(
        Task::builder("File taxes")
            .deadline(yesterday)
            .build()
            .unwrap(),
    );
    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));

    engine.publish(DataEvent::CheckDeadlines);
    let overdue = recorder.count(|e| matches!(e, DataEvent::TaskOverdue(t) if t.id() == task.id()));
    assert_eq!(overdue, 1);

    assert!(engine.service().complete_task(&task));
    recorder.clear();

    engine.publish(DataEvent::CheckDeadlines);
    assert_eq!(
        recorder.count(|e| matches!(e, DataEvent::TaskOverdue(_))),
        0
    );
}

#[test]
fn test_weekly_task_reset_on_its_day() {
    let (engine, clock, recorder) = engine_at(monday());
    let rule = RecurrenceRule::builder(RecurrenceType::Weekly)
        .day_of_week(Weekday::Mon)
        .build()
        .unwrap();
    let task = Arc::new(
        Task::builder("Weekly review")
            .recurrence_rule(rule)
            .completed(true)
            .build()
            .unwrap(),
    );
    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));

    // Tuesday: not its day.
    clock.advance(chrono::Duration::days(1));
    engine.publish(DataEvent::CheckRecurrence);
    assert!(task.is_completed());

    // The following Monday.
    clock.set(monday() + chrono::Duration::days(7));
    recorder.clear();
    engine.publish(DataEvent::CheckRecurrence);

    assert!(!task.is_completed());
    assert_eq!(
        recorder.kinds(),
        vec!["task_uncompleted", "task_update", "check_recurrence"]
    );
    let stored = engine.repository().find_by_id(task.id()).unwrap();
    assert!(!stored.is_completed());
    assert_eq!(engine.repository().len(), 1);
}

#[test]
fn test_double_complete_publishes_once() {
    let (engine, _, recorder) = engine_at(monday());
    let task = Arc::new(Task::builder("Call plumber").build().unwrap());
    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));

    assert!(engine.service().complete_task(&task));
    assert!(!engine.service().complete_task(&task));

    assert_eq!(
        recorder.count(|e| matches!(e, DataEvent::TaskCompleted(_))),
        1
    );
}

#[test]
fn test_update_replaces_by_id() {
    let (engine, _, _) = engine_at(monday());
    let task = Arc::new(Task::builder("Draft").build().unwrap());
    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));

    let edited = Arc::new(task.to_builder().content("Final").build().unwrap());
    engine.publish(DataEvent::TaskUpdate(edited));

    let stored = engine.repository().find_all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content(), "Final");
}

#[test]
fn test_duplicate_add_and_missing_delete_are_ignored() {
    let (engine, _, _) = engine_at(monday());
    let task = Arc::new(Task::builder("Once").build().unwrap());
    let stranger = Arc::new(Task::builder("Never saved").build().unwrap());

    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));
    engine.publish(DataEvent::TaskAdded(Arc::clone(&task)));
    engine.publish(DataEvent::TaskDeleted(stranger));

    assert_eq!(engine.repository().len(), 1);
}

#[test]
fn test_fetched_snapshot_is_detached() {
    let (engine, _, recorder) = engine_at(monday());
    engine.publish(DataEvent::TaskAdded(Arc::new(
        Task::builder("First").build().unwrap(),
    )));
    engine.publish(DataEvent::RequestTasks);

    engine.publish(DataEvent::TaskAdded(Arc::new(
        Task::builder("Second").build().unwrap(),
    )));

    let snapshot = recorder
        .events()
        .into_iter()
        .find_map(|e| match e {
            DataEvent::TasksFetched(tasks) => Some(tasks),
            _ => None,
        })
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(engine.repository().len(), 2);
}

#[test]
fn test_unsubscribe_during_delivery() {
    let (engine, _, _) = engine_at(monday());
    let bus = engine.bus();
    let calls = Arc::new(AtomicUsize::new(0));
    let me: Arc<OnceLock<Arc<dyn Subscriber>>> = Arc::new(OnceLock::new());

    let one_shot = {
        let bus = engine.bus();
        let calls = Arc::clone(&calls);
        let me = Arc::clone(&me);
        subscriber_fn("one-shot", move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = me.get() {
                bus.unsubscribe(me);
            }
            Ok(())
        })
    };
    let _ = me.set(Arc::clone(&one_shot));
    bus.subscribe(one_shot);
    let after = Arc::new(RecordingSubscriber::new());
    bus.subscribe(after.clone());

    let report = bus.publish(DataEvent::CheckDeadlines);
    assert_eq!(report.failed, 0);
    // Subscribers after the one that left still got the event.
    assert_eq!(after.count(|e| matches!(e, DataEvent::CheckDeadlines)), 1);

    bus.publish(DataEvent::CheckDeadlines);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_blank_title_rejected() {
    let result = Task::builder("   ").build();
    assert_eq!(result.unwrap_err(), ModelError::EmptyTitle);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_drives_checks() {
    let (mut engine, _, recorder) = engine_at(monday());
    let task = Arc::new(
        Task::builder("Overdue")
            .deadline(monday() - chrono::Duration::hours(1))
            .build()
            .unwrap(),
    );
    engine.publish(DataEvent::TaskAdded(task));

    engine.start().unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;
    engine.shutdown().await.unwrap();

    // Ticks at 0s and 60s.
    assert_eq!(
        recorder.count(|e| matches!(e, DataEvent::TaskOverdue(_))),
        2
    );
}
