use portfolio_core::db::open_db_in_memory;
use portfolio_core::{
    NewProject, ProjectFilter, ProjectListQuery, ProjectPatch, ProjectRepository, RepoError,
    SqliteProjectRepository,
};
use rusqlite::Connection;

fn dated(code: &str, start: Option<&str>, end: Option<&str>) -> NewProject {
    NewProject {
        code: code.to_string(),
        archived: false,
        start_date: start.map(str::to_string),
        end_date: end.map(str::to_string),
    }
}

fn codes(conn: &Connection, query: &ProjectListQuery) -> (Vec<String>, u64) {
    let repo = SqliteProjectRepository::new(conn);
    let page = repo.list_projects(query).unwrap();
    (
        page.items.into_iter().map(|project| project.code).collect(),
        page.total,
    )
}

fn filtered(filter: ProjectFilter) -> ProjectListQuery {
    ProjectListQuery {
        filter,
        ..ProjectListQuery::default()
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let draft = NewProject {
        archived: true,
        ..dated("P1", Some("2024-01-01"), Some("2024-06-30"))
    };
    let id = repo.create_project(&draft).unwrap();
    assert_eq!(id, 1);

    let loaded = repo.get_project_by_code("P1").unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.code, "P1");
    assert!(loaded.archived);
    assert_eq!(loaded.start_date.as_deref(), Some("2024-01-01"));
    assert_eq!(loaded.end_date.as_deref(), Some("2024-06-30"));
}

#[test]
fn duplicate_code_is_rejected_and_original_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    repo.create_project(&dated("P1", Some("2024-01-01"), None))
        .unwrap();
    let err = repo
        .create_project(&NewProject {
            archived: true,
            ..dated("P1", Some("2030-01-01"), None)
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(ref message) if message.contains("P1")));

    let loaded = repo.get_project_by_code("P1").unwrap();
    assert!(!loaded.archived);
    assert_eq!(loaded.start_date.as_deref(), Some("2024-01-01"));
}

#[test]
fn blank_code_and_malformed_dates_are_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let err = repo.create_project(&NewProject::new("")).unwrap_err();
    assert!(matches!(err, RepoError::InvalidArgument(_)));

    let err = repo
        .create_project(&dated("P2", Some("2024-13-01"), None))
        .unwrap_err();
    assert!(
        matches!(err, RepoError::InvalidArgument(ref message) if message.contains("start_date"))
    );

    let (items, total) = codes(&conn, &ProjectListQuery::default());
    assert!(items.is_empty());
    assert_eq!(total, 0);
}

#[test]
fn get_missing_project_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let err = repo.get_project_by_code("nope").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn list_paginates_by_id_and_reports_full_total() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    for index in 1..=12 {
        repo.create_project(&NewProject::new(format!("P{index:02}")))
            .unwrap();
    }

    let (first, total) = codes(&conn, &ProjectListQuery::default());
    assert_eq!(first.len(), 10);
    assert_eq!(total, 12);
    assert_eq!(first[0], "P01");
    assert_eq!(first[9], "P10");

    let (second, total) = codes(
        &conn,
        &ProjectListQuery {
            page: 2,
            ..ProjectListQuery::default()
        },
    );
    assert_eq!(second, vec!["P11".to_string(), "P12".to_string()]);
    assert_eq!(total, 12);

    let (beyond, total) = codes(
        &conn,
        &ProjectListQuery {
            page: 9,
            size: 5,
            ..ProjectListQuery::default()
        },
    );
    assert!(beyond.is_empty());
    assert_eq!(total, 12);
}

#[test]
fn list_rejects_zero_page_or_size() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    for (page, size) in [(0, 10), (1, 0)] {
        let err = repo
            .list_projects(&ProjectListQuery {
                page,
                size,
                ..ProjectListQuery::default()
            })
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(_)));
    }
}

#[test]
fn date_filters_are_inclusive_and_skip_null_dates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    repo.create_project(&dated("EARLY", Some("2023-12-31"), Some("2024-03-31")))
        .unwrap();
    repo.create_project(&dated("EDGE", Some("2024-01-01"), Some("2024-06-30")))
        .unwrap();
    repo.create_project(&dated("LATE", Some("2024-02-01"), Some("2024-07-01")))
        .unwrap();
    repo.create_project(&dated("OPEN", None, None)).unwrap();

    let (items, total) = codes(
        &conn,
        &filtered(ProjectFilter {
            start_date: Some("2024-01-01".to_string()),
            ..ProjectFilter::default()
        }),
    );
    assert_eq!(items, vec!["EDGE".to_string(), "LATE".to_string()]);
    assert_eq!(total, 2);

    let (items, _) = codes(
        &conn,
        &filtered(ProjectFilter {
            end_date: Some("2024-06-30".to_string()),
            ..ProjectFilter::default()
        }),
    );
    assert_eq!(items, vec!["EARLY".to_string(), "EDGE".to_string()]);

    let (items, _) = codes(
        &conn,
        &filtered(ProjectFilter {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-06-30".to_string()),
            ..ProjectFilter::default()
        }),
    );
    assert_eq!(items, vec!["EDGE".to_string()]);
}

#[test]
fn code_filter_is_substring_match_with_literal_wildcards() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    for code in ["ALPHA-1", "BETA-1", "ALPHA_2", "ALPHAX2", "100%"] {
        repo.create_project(&NewProject::new(code)).unwrap();
    }

    let by_code = |needle: &str| {
        codes(
            &conn,
            &filtered(ProjectFilter {
                code: Some(needle.to_string()),
                ..ProjectFilter::default()
            }),
        )
        .0
    };

    assert_eq!(
        by_code("ALPHA"),
        vec!["ALPHA-1".to_string(), "ALPHA_2".to_string(), "ALPHAX2".to_string()]
    );
    assert_eq!(by_code("A_2"), vec!["ALPHA_2".to_string()]);
    assert_eq!(by_code("0%"), vec!["100%".to_string()]);
    assert!(by_code("GAMMA").is_empty());
}

#[test]
fn filters_combine_conjunctively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    repo.create_project(&NewProject::new("P1")).unwrap();
    repo.create_project(&NewProject {
        archived: true,
        ..NewProject::new("P2")
    })
    .unwrap();
    repo.create_project(&NewProject {
        archived: true,
        ..NewProject::new("Q3")
    })
    .unwrap();

    let (items, total) = codes(
        &conn,
        &filtered(ProjectFilter {
            code: Some("P".to_string()),
            archived: Some(true),
            ..ProjectFilter::default()
        }),
    );
    assert_eq!(items, vec!["P2".to_string()]);
    assert_eq!(total, 1);
}

#[test]
fn update_changes_only_requested_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    repo.create_project(&dated("P1", Some("2024-01-01"), Some("2024-12-31")))
        .unwrap();

    repo.update_project(
        "P1",
        &ProjectPatch {
            archived: Some(true),
            ..ProjectPatch::default()
        },
    )
    .unwrap();

    let loaded = repo.get_project_by_code("P1").unwrap();
    assert!(loaded.archived);
    assert_eq!(loaded.start_date.as_deref(), Some("2024-01-01"));
    assert_eq!(loaded.end_date.as_deref(), Some("2024-12-31"));

    repo.update_project(
        "P1",
        &ProjectPatch {
            end_date: Some(None),
            ..ProjectPatch::default()
        },
    )
    .unwrap();
    let loaded = repo.get_project_by_code("P1").unwrap();
    assert!(loaded.archived);
    assert_eq!(loaded.end_date, None);
}

#[test]
fn update_with_empty_patch_or_missing_code_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    repo.create_project(&NewProject::new("P1")).unwrap();

    let err = repo
        .update_project("P1", &ProjectPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidArgument(_)));

    let err = repo
        .update_project(
            "MISSING",
            &ProjectPatch {
                archived: Some(true),
                ..ProjectPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn delete_removes_project_and_missing_code_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    repo.create_project(&NewProject::new("P1")).unwrap();

    repo.delete_project("P1").unwrap();
    assert!(matches!(
        repo.get_project_by_code("P1").unwrap_err(),
        RepoError::NotFound(_)
    ));

    let err = repo.delete_project("P1").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn invalid_persisted_flag_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO projects (code, archived) VALUES ('BROKEN', 7);",
    )
    .unwrap();

    let repo = SqliteProjectRepository::new(&conn);
    let err = repo.get_project_by_code("BROKEN").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("archived")));
}
