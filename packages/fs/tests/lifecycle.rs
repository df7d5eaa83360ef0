use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use metafile_fs::{FileKind, Filesystem, MetaFs, MetaFsConfig, OsFs, ValidatorConfig};
use metafile_serde_store::TypedStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Review {
    reviewer: String,
    approved: bool,
    score: f64,
}

#[test]
fn metadata_follows_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let fs = MetaFs::os(dir.path());

    fs.create_dir_all("billytests").unwrap();
    let mut file = fs.create("billytests/mytestfile.txt").unwrap();
    file.write_all(b"Hello World!\n").unwrap();
    drop(file);

    let review = Review {
        reviewer: "alice".to_string(),
        approved: true,
        score: 0.75,
    };
    fs.put_as("billytests/mytestfile.txt", "review", &review).unwrap();
    fs.put_as("billytests", "owner", "team-a").unwrap();

    // truncating the file forgets its metadata but not the directory's
    fs.create("billytests/mytestfile.txt").unwrap();
    assert_eq!(
        fs.get_as::<Review>("billytests/mytestfile.txt", "review").unwrap(),
        None
    );
    assert_eq!(
        fs.get_as::<String>("billytests/", "owner").unwrap().as_deref(),
        Some("team-a")
    );

    fs.put_as("billytests/mytestfile.txt", "review", &review).unwrap();
    fs.rename("billytests", "renamed").unwrap();
    assert_eq!(
        fs.get_as::<Review>("renamed/mytestfile.txt", "review").unwrap(),
        Some(review)
    );
    assert_eq!(fs.filesystem().kind("renamed").unwrap(), FileKind::Dir);

    fs.remove("renamed/mytestfile.txt").unwrap();
    fs.remove("renamed").unwrap();
    assert_eq!(fs.store().bucket_count(), 0);
}

#[test]
fn existing_bucket_survives_deletion_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let fs = MetaFs::os(dir.path());

    fs.create("f").unwrap();
    fs.put_as("f", "k", &1).unwrap();

    // removed behind the wrapper's back: the bucket is still known
    std::fs::remove_file(dir.path().join("f")).unwrap();
    fs.put_as("f", "k2", &2).unwrap();
    assert_eq!(fs.store().len("f"), 2);
}

#[test]
fn config_with_prefix_validator() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(
        r#"{{"root": {}, "validator": {{"type": "prefix", "prefixes": ["x"]}}}}"#,
        serde_json::to_string(dir.path()).unwrap()
    );
    let fs = MetaFs::from_config(MetaFsConfig::from_json(&json).unwrap());

    fs.put_as("xpath", "key", &0).unwrap();
    assert!(fs.put_as("ypath", "key", &0).unwrap_err().is_bad_bucket());
    assert_eq!(fs.store().base(), dir.path().to_string_lossy());
}

#[test]
fn custom_filesystem_with_always_valid() {
    let dir = tempfile::tempdir().unwrap();
    let fs = MetaFs::with_validator(OsFs::new(dir.path()), &ValidatorConfig::Always);
    fs.put_as("nowhere", "k", &true).unwrap();
    assert_eq!(fs.get_as::<bool>("nowhere", "k").unwrap(), Some(true));
}

#[test]
fn shared_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Arc::new(MetaFs::os(dir.path()));
    for t in 0..4 {
        fs.create(&format!("f{t}")).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let fs = Arc::clone(&fs);
            std::thread::spawn(move || {
                let path = format!("f{t}");
                for i in 0..25 {
                    fs.put_as(&path, &format!("k{i}"), &i).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for t in 0..4 {
        assert_eq!(fs.store().len(&format!("f{t}")), 25);
    }
}
