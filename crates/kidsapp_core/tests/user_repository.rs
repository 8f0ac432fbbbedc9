use kidsapp_core::db::open_db_in_memory;
use kidsapp_core::{RepoError, StoreConfig, User, UserRepository, UsersSnapshot};
use std::time::Duration;

const LIVE_TIMEOUT: Duration = Duration::from_secs(5);

fn memory_repository() -> UserRepository {
    UserRepository::open(&StoreConfig::in_memory()).unwrap()
}

#[test]
fn insert_then_get_by_id_returns_matching_record() {
    let repo = memory_repository();

    let id = repo.insert(User::new("Alice", 5)).wait().unwrap();
    let loaded = repo.get_user_by_id(id).wait().unwrap().unwrap();

    assert_eq!(loaded, User::with_id(id, "Alice", 5));
}

#[test]
fn update_then_get_by_id_reflects_new_values() {
    let repo = memory_repository();
    let id = repo.insert(User::new("Alice", 5)).wait().unwrap();

    repo.update(User::with_id(id, "Alicia", 6)).wait().unwrap();

    let loaded = repo.get_user_by_id(id).wait().unwrap().unwrap();
    assert_eq!(loaded.name, "Alicia");
    assert_eq!(loaded.age, 6);
}

#[test]
fn delete_then_get_by_id_is_absent() {
    let repo = memory_repository();
    let id = repo.insert(User::new("Bob", 7)).wait().unwrap();

    repo.delete(User::with_id(id, "Bob", 7)).wait().unwrap();

    assert!(repo.get_user_by_id(id).wait().unwrap().is_none());
}

#[test]
fn reads_queued_behind_unawaited_writes_observe_them() {
    let repo = memory_repository();

    let first = repo.insert(User::new("Alice", 5));
    let second = repo.insert(User::new("Bob", 7));
    let listed = repo.list_users().wait().unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(first.wait().unwrap(), 1);
    assert_eq!(second.wait().unwrap(), 2);
}

#[test]
fn list_after_n_inserts_returns_n_records() {
    let repo = memory_repository();
    let pending: Vec<_> = (0..25)
        .map(|age| repo.insert(User::new(format!("kid-{age}"), age)))
        .collect();
    let ids: Vec<_> = pending.into_iter().map(|p| p.wait().unwrap()).collect();

    let listed = repo.list_users().wait().unwrap();

    assert_eq!(listed.len(), 25);
    for (age, (user, id)) in listed.iter().zip(&ids).enumerate() {
        assert_eq!(user.id, Some(*id));
        assert_eq!(user.name, format!("kid-{age}"));
        assert_eq!(user.age, i32::try_from(age).unwrap());
    }
}

#[test]
fn identities_follow_submission_order() {
    let repo = memory_repository();

    let pending: Vec<_> = ["A", "B", "C", "D"]
        .into_iter()
        .map(|name| repo.insert(User::new(name, 1)))
        .collect();
    let ids: Vec<_> = pending.into_iter().map(|p| p.wait().unwrap()).collect();

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]), "{ids:?}");
}

#[test]
fn failed_writes_are_surfaced_to_the_caller() {
    let repo = memory_repository();

    let update_err = repo.update(User::with_id(3, "Ghost", 1)).wait().unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(3)));

    let delete_err = repo.delete(User::new("Draft", 2)).wait().unwrap_err();
    assert!(matches!(delete_err, RepoError::MissingId));
}

#[test]
fn dropped_pending_handles_still_apply_writes() {
    let repo = memory_repository();

    let _ = repo.insert(User::new("Alice", 5));
    let _ = repo.insert(User::new("Bob", 7));

    assert_eq!(repo.list_users().wait().unwrap().len(), 2);
}

#[test]
fn live_handle_starts_with_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_table (name, age) VALUES ('Alice', 5), ('Bob', 7);",
        [],
    )
    .unwrap();

    let repo = UserRepository::from_connection(conn, 4).unwrap();
    let snapshot = repo.all_users().current();

    assert_eq!(snapshot.version, 1);
    assert_eq!(names(&snapshot), vec!["Alice", "Bob"]);
}

#[test]
fn live_handle_pushes_a_snapshot_after_each_successful_write() {
    let repo = memory_repository();
    let mut subscription = repo.all_users().subscribe();
    assert!(subscription.recv_timeout(LIVE_TIMEOUT).unwrap().users.is_empty());

    let id = repo.insert(User::new("Alice", 5)).wait().unwrap();
    let after_insert = subscription.recv_timeout(LIVE_TIMEOUT).unwrap();
    assert_eq!(names(&after_insert), vec!["Alice"]);

    repo.update(User::with_id(id, "Alice", 6)).wait().unwrap();
    let after_update = subscription.recv_timeout(LIVE_TIMEOUT).unwrap();
    assert_eq!(after_update.users[0].age, 6);
    assert!(after_update.version > after_insert.version);

    repo.delete_by_id(id).wait().unwrap();
    let after_delete = subscription.recv_timeout(LIVE_TIMEOUT).unwrap();
    assert!(after_delete.users.is_empty());
}

#[test]
fn idle_subscriber_catches_up_with_a_single_snapshot() {
    let repo = memory_repository();
    let mut subscription = repo.all_users().subscribe();

    let pending: Vec<_> = (0..50)
        .map(|age| repo.insert(User::new(format!("kid-{age}"), age)))
        .collect();
    for write in pending {
        write.wait().unwrap();
    }

    let caught_up = subscription.try_recv().unwrap();
    assert_eq!(caught_up.users.len(), 50);
    assert_eq!(caught_up.version, repo.all_users().version());
    assert!(subscription.try_recv().is_none());
}

#[test]
fn failed_writes_do_not_publish() {
    let repo = memory_repository();
    let live = repo.all_users();
    let before = live.version();

    let _ = repo.delete_by_id(404).wait();

    assert_eq!(live.version(), before);
}

#[test]
fn file_backed_repository_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file(dir.path().join("users.sqlite3"));

    let repo = UserRepository::open(&config).unwrap();
    let id = repo.insert(User::new("Alice", 5)).wait().unwrap();
    drop(repo);

    let reopened = UserRepository::open(&config).unwrap();
    assert_eq!(
        reopened.get_user_by_id(id).wait().unwrap(),
        Some(User::with_id(id, "Alice", 5))
    );
    assert_eq!(names(&reopened.all_users().current()), vec!["Alice"]);
}

#[test]
fn reference_scenario() {
    let repo = memory_repository();

    let alice = repo.insert(User::new("Alice", 5)).wait().unwrap();
    assert_eq!(alice, 1);
    let bob = repo.insert(User::new("Bob", 7)).wait().unwrap();
    assert_eq!(bob, 2);

    repo.update(User::with_id(1, "Alice", 6)).wait().unwrap();
    assert_eq!(
        repo.get_user_by_id(1).wait().unwrap(),
        Some(User::with_id(1, "Alice", 6))
    );

    repo.delete(User::with_id(2, "Bob", 7)).wait().unwrap();
    assert_eq!(
        repo.list_users().wait().unwrap(),
        vec![User::with_id(1, "Alice", 6)]
    );
    assert_eq!(
        *repo.all_users().current().users,
        vec![User::with_id(1, "Alice", 6)]
    );
}

fn names(snapshot: &UsersSnapshot) -> Vec<&str> {
    snapshot.users.iter().map(|user| user.name.as_str()).collect()
}
