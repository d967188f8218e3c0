//! Unit tests for the in-memory source

use nasbak::source::MemorySource;
use nasbak::{Error, RemoteFileSource};
use std::io::Read;

#[test]
fn test_lists_children_in_name_order() {
    let source = MemorySource::new()
        .with_file("/b.txt", b"bb".to_vec(), 20)
        .with_file("/a.txt", b"a".to_vec(), 10)
        .with_dir("/photos", 30);

    let children = source.list_children("/").unwrap();
    let names: Vec<&str> = children.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "photos"]);

    assert_eq!(children[0].full_path, "/a.txt");
    assert_eq!(children[0].size, 1);
    assert_eq!(children[0].modified_at_epoch_millis, 10);
    assert!(children[2].is_directory);
    assert_eq!(children[2].size, 0);
}

#[test]
fn test_parents_are_created() {
    let source = MemorySource::new().with_file("/x/y/z.bin", vec![0u8; 3], 1);

    let root = source.list_children("").unwrap();
    assert_eq!(root.len(), 1);
    assert!(root[0].is_directory);
    assert_eq!(root[0].full_path, "/x");

    let nested = source.list_children("/x/y/").unwrap();
    assert_eq!(nested[0].name, "z.bin");
}

#[test]
fn test_listing_errors() {
    let source = MemorySource::new().with_file("/f", b"data".to_vec(), 1);
    assert!(matches!(
        source.list_children("/missing"),
        Err(Error::Listing { .. })
    ));
    assert!(matches!(source.list_children("/f"), Err(Error::Listing { .. })));
}

#[test]
fn test_open_for_read() {
    let source = MemorySource::new()
        .with_file("/docs/readme", b"hello".to_vec(), 1)
        .with_dir("/empty", 1);

    let mut buf = Vec::new();
    source
        .open_for_read("/docs/readme")
        .unwrap()
        .read_to_end(&mut buf)
        .unwrap();
    assert_eq!(buf, b"hello");

    assert!(matches!(source.open_for_read("/docs"), Err(Error::Open { .. })));
    assert!(matches!(source.open_for_read("/nope"), Err(Error::Open { .. })));
}

#[test]
fn test_mutation_and_removal() {
    let mut source = MemorySource::new().with_file("/a/one", b"1".to_vec(), 1);
    source.insert_file("/a/one", b"111".to_vec(), 2);
    assert_eq!(source.list_children("/a").unwrap()[0].size, 3);

    source.remove("/a");
    assert!(source.list_children("/").unwrap().is_empty());
    assert!(source.list_children("/a").is_err());
}
