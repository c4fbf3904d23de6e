use portfolio_core::{
    AssociationRepository, NewProject, NewSoftware, ProjectRepository, RepoError, RepoResult,
    SoftwareRepository, SqliteAssociationRepository, SqliteProjectRepository,
    SqliteSoftwareRepository, Store,
};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn file_store(dir: &tempfile::TempDir) -> Arc<Store> {
    Arc::new(Store::open(dir.path().join("portfolio.db")).unwrap())
}

/// Runs `op` on two threads released at the same instant.
fn race<T, F>(store: &Arc<Store>, op: F) -> Vec<RepoResult<T>>
where
    T: Send + 'static,
    F: Fn(&Store) -> RepoResult<T> + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(store);
            let op = Arc::clone(&op);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                op(&store)
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

fn assert_one_winner<T: std::fmt::Debug>(results: &[RepoResult<T>]) {
    let wins = results.iter().filter(|result| result.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|result| matches!(result, Err(RepoError::DuplicateKey(_))))
        .count();
    assert_eq!((wins, duplicates), (1, 1), "unexpected outcomes: {results:?}");
}

fn count(store: &Store, sql: &str) -> i64 {
    store
        .acquire()
        .unwrap()
        .query_row(sql, [], |row| row.get(0))
        .unwrap()
}

#[test]
fn held_connection_does_not_block_other_readers() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let _held = store.acquire().unwrap();

    let (sender, receiver) = mpsc::channel();
    let reader_store = Arc::clone(&store);
    thread::spawn(move || {
        let total = count(&reader_store, "SELECT COUNT(*) FROM projects;");
        let _ = sender.send(total);
    });

    let total = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("reader waited on an unrelated checked-out connection");
    assert_eq!(total, 0);
}

#[test]
fn racing_project_creates_leave_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let results = race(&store, |store| {
        let conn = store.acquire()?;
        SqliteProjectRepository::new(&conn).create_project(&NewProject::new("RACE"))
    });

    assert_one_winner(&results);
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM projects WHERE code = 'RACE';"),
        1
    );
}

#[test]
fn racing_links_of_same_pair_leave_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    {
        let conn = store.acquire().unwrap();
        SqliteProjectRepository::new(&conn)
            .create_project(&NewProject::new("P1"))
            .unwrap();
        SqliteSoftwareRepository::new(&conn)
            .create_software(&NewSoftware::new("nginx", "1.25"))
            .unwrap();
    }

    let results = race(&store, |store| {
        let conn = store.acquire()?;
        SqliteAssociationRepository::new(&conn).associate("P1", "nginx", "1.25")
    });

    assert_one_winner(&results);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM project_software;"), 1);
}
