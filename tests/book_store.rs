use books::{Book, BookEngine, BookError, CsvBookStore, NewBook, Statistics};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::thread;
use tempfile::TempDir;

fn open_temp_store() -> (TempDir, CsvBookStore) {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = CsvBookStore::open(&temp_dir.path().join("books.csv")).unwrap();
    (temp_dir, store)
}

fn dune() -> NewBook {
    NewBook::new("Dune", "Herbert", 1965, "978-0441013593")
}

fn nineteen_eighty_four() -> NewBook {
    NewBook::new("1984", "Orwell", 1949, "978-0451524935")
}

#[test]
fn open_creates_file_with_header() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("books.csv");
    let store = CsvBookStore::open(&path).unwrap();

    assert_eq!(store.path(), path.as_path());
    assert_eq!(fs::read_to_string(&path).unwrap(), "id,title,author,year,isbn\n");
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn add_assigns_sequential_ids() {
    let (_temp_dir, store) = open_temp_store();

    let first = store.add(dune()).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(NewBook::from(first.clone()), dune());

    let second = store.add(nineteen_eighty_four()).unwrap();
    assert_eq!(second.id, 2);

    assert_eq!(store.list_all().unwrap(), vec![first, second]);
}

#[test]
fn add_uses_max_id_plus_one() {
    let (_temp_dir, store) = open_temp_store();
    fs::write(
        store.path(),
        "id,title,author,year,isbn\n7,Emma,Austen,1815,isbn-0141439587\n3,Ulysses,Joyce,1922,978-0679722762\n",
    )
    .unwrap();

    let added = store.add(dune()).unwrap();
    assert_eq!(added.id, 8);
}

#[test]
fn get_returns_added_book() {
    let (_temp_dir, store) = open_temp_store();
    let added = store.add(dune()).unwrap();

    assert_eq!(store.get(added.id).unwrap(), Some(added.clone()));
    assert_eq!(store.fetch(added.id).unwrap(), added);
}

#[test]
fn get_missing_book() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();

    assert_eq!(store.get(42).unwrap(), None);
    assert!(matches!(
        store.fetch(42),
        Err(BookError::NotFound { id: 42, .. })
    ));
}

#[test]
fn remove_then_get_is_not_found() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    let orwell = store.add(nineteen_eighty_four()).unwrap();

    assert!(store.remove(1).unwrap());
    assert!(matches!(store.fetch(1), Err(BookError::NotFound { id: 1, .. })));
    assert_eq!(store.fetch(2).unwrap(), orwell);
    assert_eq!(store.list_all().unwrap(), vec![orwell]);
}

#[test]
fn remove_twice_is_a_no_op() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    store.add(nineteen_eighty_four()).unwrap();

    assert!(store.remove(1).unwrap());
    let before = store.list_all().unwrap();
    assert!(!store.remove(1).unwrap());
    assert_eq!(store.list_all().unwrap(), before);

    assert!(matches!(store.delete(1), Err(BookError::NotFound { id: 1, .. })));
}

#[test]
fn removed_ids_below_the_max_are_not_reused() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    store.add(nineteen_eighty_four()).unwrap();
    store.remove(1).unwrap();

    assert_eq!(store.add(dune()).unwrap().id, 3);
}

#[test]
fn update_replaces_fields_but_keeps_id() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    let added = store.add(nineteen_eighty_four()).unwrap();

    let replacement = NewBook::new("Animal Farm", "George Orwell", 1945, "ISBN 0451526341");
    let updated = store.update(added.id, replacement.clone()).unwrap().unwrap();
    assert_eq!(updated.id, added.id);
    assert_eq!(NewBook::from(updated.clone()), replacement);

    assert_eq!(store.fetch(added.id).unwrap(), updated);
    assert_eq!(store.list_all().unwrap().len(), 2);
}

#[test]
fn update_missing_book_leaves_collection_unchanged() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    assert_eq!(store.update(9, nineteen_eighty_four()).unwrap(), None);
    assert!(matches!(
        store.replace(9, nineteen_eighty_four()),
        Err(BookError::NotFound { id: 9, .. })
    ));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn invalid_book_is_rejected_and_not_stored() {
    let (_temp_dir, store) = open_temp_store();

    let res = store.add(NewBook::new("Dune", "Herbert", 1965, "no-marker-here"));
    assert!(matches!(res, Err(BookError::InvalidRecord { field: "isbn", .. })));
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn invalid_update_is_rejected_and_not_stored() {
    let (_temp_dir, store) = open_temp_store();
    let added = store.add(dune()).unwrap();

    let res = store.update(added.id, NewBook::new("", "Herbert", 1965, "978-0441013593"));
    assert!(matches!(res, Err(BookError::InvalidRecord { field: "title", .. })));
    assert_eq!(store.fetch(added.id).unwrap(), added);
}

#[test]
fn reopen_reloads_persisted_books() {
    let (temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    store.add(NewBook::new("Gödel, Escher, Bach", "Douglas \"Doug\" Hofstadter", 1979, "978-0465026562")).unwrap();
    store.add(nineteen_eighty_four()).unwrap();
    store.update(1, NewBook::new("Dune Messiah", "Herbert", 1969, "978-0593098233")).unwrap();
    store.remove(3).unwrap();
    let expected = store.list_all().unwrap();
    drop(store);

    let store = CsvBookStore::open(&temp_dir.path().join("books.csv")).unwrap();
    assert_eq!(store.list_all().unwrap(), expected);
}

#[test]
fn every_operation_reads_the_file() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();

    // another writer replaces the file behind the store's back
    fs::write(
        store.path(),
        "id,title,author,year,isbn\n5,Emma,Austen,1815,isbn-0141439587\n",
    )
    .unwrap();

    let books = store.list_all().unwrap();
    assert_eq!(
        books,
        vec![Book {
            id: 5,
            title: String::from("Emma"),
            author: String::from("Austen"),
            year: 1815,
            isbn: String::from("isbn-0141439587"),
        }]
    );
    assert_eq!(store.get(1).unwrap(), None);
}

#[test]
fn file_matches_the_csv_layout() {
    let (_temp_dir, store) = open_temp_store();
    store
        .add(NewBook::new("The Pragmatic Programmer", "Andrew Hunt", 1999, "978-0201616224"))
        .unwrap();

    let contents = fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        contents,
        "id,title,author,year,isbn\n1,The Pragmatic Programmer,Andrew Hunt,1999,978-0201616224\n"
    );
}

#[test]
fn malformed_file_is_read_as_empty() {
    let (_temp_dir, store) = open_temp_store();
    fs::write(store.path(), "this is,not\na book,file,at all\n").unwrap();

    assert!(store.list_all().unwrap().is_empty());
    assert_eq!(store.add(dune()).unwrap().id, 1);
}

#[test]
fn missing_or_empty_file_is_read_as_empty() {
    let (_temp_dir, store) = open_temp_store();

    fs::write(store.path(), "").unwrap();
    assert!(store.list_all().unwrap().is_empty());

    fs::remove_file(store.path()).unwrap();
    assert!(store.list_all().unwrap().is_empty());
    assert_eq!(store.add(dune()).unwrap().id, 1);
    assert!(store.path().exists());
}

#[test]
fn unreadable_file_is_a_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path: PathBuf = temp_dir.path().join("books.csv");
    fs::create_dir(&path).unwrap();
    let store = CsvBookStore::open(&path).unwrap();

    assert!(matches!(
        store.list_all(),
        Err(BookError::Storage { op: "read", .. })
    ));
    assert!(matches!(
        store.add(dune()),
        Err(BookError::Storage { .. })
    ));
}

#[test]
fn statistics_of_empty_store() {
    let (_temp_dir, store) = open_temp_store();

    let stats = store.statistics().unwrap();
    assert_eq!(stats.total_books(), 0);
    assert!(matches!(stats, Statistics::Empty { .. }));
}

#[test]
fn statistics_of_two_books() {
    let (_temp_dir, store) = open_temp_store();
    store.add(dune()).unwrap();
    store.add(nineteen_eighty_four()).unwrap();

    let summary = match store.statistics().unwrap() {
        Statistics::Summary(summary) => summary,
        other => panic!("expected a summary, got {:?}", other),
    };
    assert_eq!(summary.total_books, 2);
    assert_eq!(summary.authors_count, 2);
    assert_eq!(summary.publication_years.oldest, 1949);
    assert_eq!(summary.publication_years.newest, 1965);
    assert_eq!(summary.publication_years.average, 1957.0);
    assert_eq!(summary.books_per_author.get("Herbert"), Some(&1));
    assert_eq!(summary.books_per_author.get("Orwell"), Some(&1));
}

#[test]
fn statistics_counts_books_per_author() {
    let (_temp_dir, store) = open_temp_store();
    store.add(NewBook::new("Dune", "Herbert", 1965, "978-1")).unwrap();
    store.add(NewBook::new("Dune Messiah", "Herbert", 1969, "978-2")).unwrap();
    store.add(NewBook::new("Children of Dune", "Herbert", 1976, "978-3")).unwrap();

    let summary = match store.statistics().unwrap() {
        Statistics::Summary(summary) => summary,
        other => panic!("expected a summary, got {:?}", other),
    };
    assert_eq!(summary.authors_count, 1);
    // 5910 / 3 = 1970.0
    assert_eq!(summary.publication_years.average, 1970.0);
    assert_eq!(summary.books_per_author.get("Herbert"), Some(&3));

    store.remove(3).unwrap();
    let stats = serde_json::to_value(store.statistics().unwrap()).unwrap();
    assert_eq!(stats["publication_years"]["average"], 1967.0);
}

fn average_of(years: &[i32]) -> f64 {
    let books: Vec<Book> = years
        .iter()
        .enumerate()
        .map(|(i, &year)| Book::from_new(i as u64 + 1, NewBook::new("t", "a", year, "978-1")))
        .collect();
    match Statistics::from_books(&books) {
        Statistics::Summary(summary) => summary.publication_years.average,
        other => panic!("expected a summary, got {:?}", other),
    }
}

#[test]
fn statistics_average_rounds_to_one_decimal() {
    // 1957.25 is an exact tie, it goes to the even digit
    assert_eq!(average_of(&[1957, 1957, 1957, 1958]), 1957.2);
    // 1957.75 is an exact tie as well
    assert_eq!(average_of(&[1957, 1958, 1958, 1958]), 1957.8);
    // 39147 / 20 is stored as 1957.3499.., which rounds down
    let mut years = vec![1957; 13];
    years.extend(vec![1958; 7]);
    assert_eq!(average_of(&years), 1957.3);
    // 5872 / 3 = 1957.333..
    assert_eq!(average_of(&[1957, 1957, 1958]), 1957.3);
    // 5873 / 3 = 1957.666..
    assert_eq!(average_of(&[1957, 1958, 1958]), 1957.7);
}

#[test]
fn add_fails_when_ids_are_exhausted() {
    let (_temp_dir, store) = open_temp_store();
    let contents = format!(
        "id,title,author,year,isbn\n{},Emma,Austen,1815,isbn-0141439587\n",
        u64::MAX
    );
    fs::write(store.path(), &contents).unwrap();

    assert!(matches!(
        store.add(dune()),
        Err(BookError::IdsExhausted { max: u64::MAX })
    ));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), contents);
}

#[cfg(unix)]
#[test]
fn failed_write_leaves_file_unchanged() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("library");
    let store = CsvBookStore::open(&dir.join("books.csv")).unwrap();
    let dune = store.add(dune()).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    // a read-only directory still lets the file be read, but no temp file can be created
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();
    if fs::File::create(dir.join("writable")).is_ok() {
        // running with privileges that ignore directory permissions
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let added = store.add(nineteen_eighty_four());
    let updated = store.update(dune.id, nineteen_eighty_four());
    let removed = store.remove(dune.id);
    let after = fs::read_to_string(store.path()).unwrap();
    let listed = store.list_all();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(added, Err(BookError::Storage { op: "write", .. })));
    assert!(matches!(updated, Err(BookError::Storage { op: "write", .. })));
    assert!(matches!(removed, Err(BookError::Storage { op: "write", .. })));
    assert_eq!(after, before);
    assert_eq!(listed.unwrap(), vec![dune]);
}

#[test]
fn concurrent_adds_do_not_lose_updates() {
    let (_temp_dir, store) = open_temp_store();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    let title = format!("book {} of thread {}", i, t);
                    store.add(NewBook::new(title, "Anon", 2000, "isbn-x")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let books = store.list_all().unwrap();
    assert_eq!(books.len(), 80);
    let ids: HashSet<u64> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, (1..=80).collect());
}
