use pocketcal_core::db::open_db_in_memory;
use pocketcal_core::{
    Category, EventRecord, EventRepository, EventStatus, ReminderOffset, RepoError,
    SqliteEventRepository, StoredEvent,
};
use uuid::Uuid;

fn event(date: &str, time: &str, category: Category) -> StoredEvent {
    StoredEvent::new(EventRecord::new(date, time, category), ReminderOffset::None)
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let stored = StoredEvent::new(
        EventRecord::new("2030-01-01", "10:00", Category::Meeting)
            .with_description("Standup")
            .with_location("Room 2")
            .with_contact("team@example.com"),
        ReminderOffset::FifteenMinutesBefore,
    );
    let id = repo.create_event(&stored).unwrap();
    assert_eq!(id, stored.id);

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded, stored);
}

#[test]
fn get_missing_event_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    assert!(repo.get_event(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_rejects_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let err = repo
        .create_event(&event("2030-13-01", "10:00", Category::Exam))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_events().unwrap().is_empty());
}

#[test]
fn update_existing_event() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let mut stored = event("2030-01-01", "10:00", Category::Exam);
    repo.create_event(&stored).unwrap();

    stored.record = stored
        .record
        .clone()
        .with_status(EventStatus::Completed)
        .with_description("Graded");
    repo.update_event(&stored).unwrap();

    let loaded = repo.get_event(stored.id).unwrap().unwrap();
    assert_eq!(loaded.record.status, EventStatus::Completed);
    assert_eq!(loaded.record.description, "Graded");
}

#[test]
fn update_and_delete_not_found_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let missing = event("2030-01-01", "10:00", Category::Other);
    let err = repo.update_event(&missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));

    let err = repo.delete_event(missing.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
}

#[test]
fn delete_removes_event() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let stored = event("2030-01-01", "10:00", Category::Appointment);
    repo.create_event(&stored).unwrap();
    repo.delete_event(stored.id).unwrap();

    assert!(repo.get_event(stored.id).unwrap().is_none());
}

#[test]
fn list_orders_by_date_then_time_descending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let early = event("2030-01-01", "08:00", Category::Exam);
    let late = event("2030-01-01", "18:00", Category::Exam);
    let newest = event("2030-02-01", "07:00", Category::Exam);
    for stored in [&early, &late, &newest] {
        repo.create_event(stored).unwrap();
    }

    let ids = repo
        .list_events()
        .unwrap()
        .into_iter()
        .map(|stored| stored.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![newest.id, late.id, early.id]);
}

#[test]
fn replace_all_swaps_every_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    repo.create_event(&event("2030-01-01", "10:00", Category::Exam))
        .unwrap();
    repo.create_event(&event("2030-01-02", "10:00", Category::Exam))
        .unwrap();

    let replacement = event("2031-05-05", "12:00", Category::Meeting);
    repo.replace_all(std::slice::from_ref(&replacement)).unwrap();

    let events = repo.list_events().unwrap();
    assert_eq!(events, vec![replacement]);
}

#[test]
fn replace_all_with_invalid_record_keeps_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let existing = event("2030-01-01", "10:00", Category::Exam);
    repo.create_event(&existing).unwrap();

    let err = repo
        .replace_all(&[
            event("2031-01-01", "10:00", Category::Other),
            event("not-a-date", "10:00", Category::Other),
        ])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.list_events().unwrap(), vec![existing]);
}

#[test]
fn replace_all_rolls_back_on_duplicate_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    let existing = event("2030-01-01", "10:00", Category::Exam);
    repo.create_event(&existing).unwrap();

    let duplicate = event("2031-01-01", "10:00", Category::Other);
    let err = repo
        .replace_all(&[duplicate.clone(), duplicate])
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.list_events().unwrap(), vec![existing]);
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);

    conn.execute(
        "INSERT INTO events (uuid, event_date, event_time, category, status)
         VALUES (?1, '2030-1-1', '10:00', 'exam', 'pending');",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();

    let err = repo.list_events().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
