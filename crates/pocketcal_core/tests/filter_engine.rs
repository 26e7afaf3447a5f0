use chrono::NaiveDate;
use pocketcal_core::{
    filter_events, Category, CategoryFilter, DateFilter, EventQuery, EventRecord, QueryError,
    QueryMode, QueryParams,
};

fn record(date: &str, category: Category, description: &str) -> EventRecord {
    EventRecord::new(date, "10:00", category).with_description(description)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn descriptions(events: &[EventRecord]) -> Vec<&str> {
    events
        .iter()
        .map(|event| event.description.as_str())
        .collect()
}

#[test]
fn category_filter_keeps_only_matching_category() {
    let events = vec![
        record("2024-07-15", Category::Exam, "exam"),
        record("2024-07-16", Category::Meeting, "meeting"),
    ];
    let query = EventQuery::new(CategoryFilter::Only(Category::Exam), DateFilter::None);

    assert_eq!(descriptions(&filter_events(&events, &query)), vec!["exam"]);
}

#[test]
fn all_sentinel_keeps_every_category_sorted_by_date() {
    let events = vec![
        record("2024-07-16", Category::Meeting, "second"),
        record("2024-07-15", Category::Exam, "first"),
    ];
    let query = EventQuery::new(CategoryFilter::from_label("All").unwrap(), DateFilter::None);

    assert_eq!(
        descriptions(&filter_events(&events, &query)),
        vec!["first", "second"]
    );
}

#[test]
fn range_is_inclusive_on_both_ends() {
    let events = vec![
        record("2024-06-30", Category::Other, "before"),
        record("2024-07-01", Category::Other, "start"),
        record("2024-07-10", Category::Other, "middle"),
        record("2024-07-31", Category::Other, "end"),
        record("2024-08-01", Category::Other, "after"),
    ];
    let query = EventQuery::new(
        CategoryFilter::All,
        DateFilter::Range {
            start: day(2024, 7, 1),
            end: day(2024, 7, 31),
        },
    );

    assert_eq!(
        descriptions(&filter_events(&events, &query)),
        vec!["start", "middle", "end"]
    );
}

#[test]
fn inverted_range_matches_nothing() {
    let events = vec![record("2024-07-10", Category::Other, "middle")];
    let query = EventQuery::new(
        CategoryFilter::All,
        DateFilter::Range {
            start: day(2024, 7, 31),
            end: day(2024, 7, 1),
        },
    );

    assert!(filter_events(&events, &query).is_empty());
}

#[test]
fn month_matches_month_of_year_not_day_digits() {
    let events = vec![
        record("2024-07-15", Category::Other, "july-2024"),
        record("2030-07-01", Category::Other, "july-2030"),
        record("2024-01-07", Category::Other, "january-seventh"),
    ];
    let params = QueryParams {
        month: Some("07".to_string()),
        ..QueryParams::default()
    };
    let query = EventQuery::from_parts(QueryMode::Month, &params).unwrap();

    assert_eq!(
        descriptions(&filter_events(&events, &query)),
        vec!["july-2024", "july-2030"]
    );
}

#[test]
fn year_and_day_modes_match_exactly() {
    let events = vec![
        record("2023-12-31", Category::Other, "old"),
        record("2024-03-03", Category::Other, "march"),
        record("2024-12-31", Category::Other, "eve"),
    ];

    let year = EventQuery::new(CategoryFilter::All, DateFilter::Year(2024));
    assert_eq!(
        descriptions(&filter_events(&events, &year)),
        vec!["march", "eve"]
    );

    let single = EventQuery::new(CategoryFilter::All, DateFilter::Day(day(2024, 3, 3)));
    assert_eq!(descriptions(&filter_events(&events, &single)), vec!["march"]);
}

#[test]
fn equal_dates_keep_input_order() {
    let events = vec![
        record("2024-07-15", Category::Other, "b"),
        record("2024-07-14", Category::Other, "a"),
        record("2024-07-15", Category::Other, "c"),
        record("2024-07-15", Category::Other, "d"),
    ];
    let query = EventQuery::default();

    assert_eq!(
        descriptions(&filter_events(&events, &query)),
        vec!["a", "b", "c", "d"]
    );
}

#[test]
fn malformed_dates_are_excluded_in_every_mode() {
    let events = vec![
        record("2024-7-15", Category::Other, "unpadded"),
        record("garbage", Category::Other, "garbage"),
        record("2024-07-15", Category::Other, "valid"),
    ];

    for date in [
        DateFilter::None,
        DateFilter::Month(7),
        DateFilter::Year(2024),
        DateFilter::Day(day(2024, 7, 15)),
    ] {
        let query = EventQuery::new(CategoryFilter::All, date);
        assert_eq!(descriptions(&filter_events(&events, &query)), vec!["valid"]);
    }
}

#[test]
fn empty_input_yields_empty_output() {
    let events: Vec<EventRecord> = Vec::new();
    assert!(filter_events(&events, &EventQuery::default()).is_empty());
}

#[test]
fn from_parts_builds_typed_queries() {
    let params = QueryParams {
        category: Some("Project Delivery".to_string()),
        start_date: Some("2024-07-01".to_string()),
        end_date: Some("2024-07-31".to_string()),
        ..QueryParams::default()
    };
    let query = EventQuery::from_parts(QueryMode::from_label("RANGE").unwrap(), &params).unwrap();

    assert_eq!(query.category, CategoryFilter::Only(Category::ProjectDelivery));
    assert_eq!(
        query.date,
        DateFilter::Range {
            start: day(2024, 7, 1),
            end: day(2024, 7, 31),
        }
    );
}

#[test]
fn from_parts_rejects_missing_and_malformed_parameters() {
    let only_start = QueryParams {
        start_date: Some("2024-07-01".to_string()),
        ..QueryParams::default()
    };
    assert_eq!(
        EventQuery::from_parts(QueryMode::Range, &only_start),
        Err(QueryError::MissingParameter("end_date"))
    );

    let blank_year = QueryParams {
        year: Some("  ".to_string()),
        ..QueryParams::default()
    };
    assert_eq!(
        EventQuery::from_parts(QueryMode::Year, &blank_year),
        Err(QueryError::MissingParameter("year"))
    );

    let short_month = QueryParams {
        month: Some("7".to_string()),
        ..QueryParams::default()
    };
    assert_eq!(
        EventQuery::from_parts(QueryMode::Month, &short_month),
        Err(QueryError::InvalidMonth("7".to_string()))
    );

    let bad_day = QueryParams {
        date: Some("2024-02-30".to_string()),
        ..QueryParams::default()
    };
    assert!(matches!(
        EventQuery::from_parts(QueryMode::Day, &bad_day),
        Err(QueryError::InvalidDate { field: "date", .. })
    ));

    let bad_category = QueryParams {
        category: Some("Party".to_string()),
        ..QueryParams::default()
    };
    assert!(matches!(
        EventQuery::from_parts(QueryMode::None, &bad_category),
        Err(QueryError::UnknownLabel(_))
    ));
}
