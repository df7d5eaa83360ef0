use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use metafile_core_store::{Codec, Error, MetaStore, PrefixValidator};
use metafile_serde_store::{from_value, json_store, to_value, JsonCodec, TypedStore};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Xyz {
    x: i32,
    y: i32,
    z: i32,
}

fn roundtrip<T>(value: T)
where
    T: Serialize + DeserializeOwned + Default + PartialEq + Debug,
{
    let codec = JsonCodec;
    let bytes = codec.encode(&to_value(&value).unwrap()).unwrap();
    let back: T = from_value(codec.decode(&bytes).unwrap()).unwrap();
    assert_eq!(back, value);

    let store = json_store("");
    store.put_as("v", "value", &value).unwrap();
    let mut target = T::default();
    assert!(store.get_into("v", "value", &mut target).unwrap());
    assert_eq!(target, value);
}

#[test]
fn codec_roundtrips_common_shapes() {
    roundtrip(true);
    roundtrip(42i64);
    roundtrip(u64::MAX);
    roundtrip(i64::MIN);
    roundtrip('x' as i32);
    roundtrip(2.75f64);
    roundtrip("hello".to_string());
    roundtrip(vec![0, 1, 2, 3]);
    roundtrip(HashMap::from([("one".to_string(), 1), ("two".to_string(), 2)]));
    roundtrip(Xyz { x: 3, y: 4, z: 5 });
}

#[test]
fn non_finite_floats_are_refused_not_nulled() {
    let store = json_store("");
    store.put_as("x", "ratio", &0.5f64).unwrap();

    for f in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let err = store.put_as("x", "ratio", &f).unwrap_err();
        assert!(matches!(err, Error::Encode { .. }), "{f}");
    }
    assert_eq!(store.get_as::<f64>("x", "ratio").unwrap(), Some(0.5));
}

#[test]
fn every_spelling_reaches_the_same_bucket() {
    let spellings = ["x", "x/", "/x", "./x", "//x", "x//", "/./x", "y/../x"];
    let store = json_store("");
    for (i, path) in spellings.iter().enumerate() {
        store.put_as(path, "key", &i).unwrap();
        for other in spellings {
            let mut j = usize::MAX;
            assert!(store.get_into(other, "key", &mut j).unwrap(), "{other}");
            assert_eq!(i, j, "put via {path:?}, get via {other:?}");
        }
    }
}

#[test]
fn missing_key_leaves_target_unchanged() {
    let store = json_store("");
    store.put_as("", "foo", "dummy").unwrap();
    let mut got = "dummy".to_string();
    assert!(!store.get_into("", "missing", &mut got).unwrap());
    assert_eq!(got, "dummy");
}

#[test]
fn delete_then_get() {
    let store = json_store("");
    store.put_as("X", "a", &1).unwrap();
    store.delete("X", "a").unwrap();
    let mut got = 0;
    assert!(!store.get_into("X", "a", &mut got).unwrap());
}

fn fill(store: &MetaStore, path: &str) {
    for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        store.put_as(path, k, &i).unwrap();
    }
}

#[test]
fn empty_removes_nested_buckets_only() {
    let store = json_store("");
    fill(&store, "X");
    fill(&store, "Y");
    fill(&store, "X/Z");
    fill(&store, "foobar");
    fill(&store, "foo");

    store.empty("X").unwrap();
    store.empty("foo").unwrap();

    assert_eq!(store.len("X"), 0);
    assert_eq!(store.len("X/Z"), 0);
    assert_eq!(store.len("Y"), 5);
    assert_eq!(store.len("foo"), 0);
    assert_eq!(store.len("foobar"), 5);
}

#[test]
fn move_replaces_destination_contents() {
    let store = json_store("");
    fill(&store, "X");
    store.put_as("Y", "dummy", &42).unwrap();

    store.move_bucket("X", "Y").unwrap();

    assert_eq!(store.len("X"), 0);
    assert_eq!(store.len("Y"), 5);
    assert_eq!(store.get_as::<i32>("Y", "dummy").unwrap(), None);
    assert_eq!(store.get_as::<usize>("Y", "e").unwrap(), Some(4));
}

#[test]
fn validators_gate_new_buckets() {
    let reject = MetaStore::with_validator("", JsonCodec, |_: &str| false);
    assert!(reject.put_as("X", "key", &0).unwrap_err().is_bad_bucket());

    let accept = MetaStore::with_validator("", JsonCodec, |_: &str| true);
    accept.put_as("X", "key", &0).unwrap();

    let x_only = MetaStore::with_validator("", JsonCodec, PrefixValidator::new(["x"]));
    x_only.put_as("xpath", "key", &0).unwrap();
    assert!(x_only.put_as("ypath", "key", &0).unwrap_err().is_bad_bucket());
}

#[test]
fn get_into_racing_empty_sees_all_or_nothing() {
    let store = Arc::new(json_store(""));
    let expected = Xyz { x: 3, y: 4, z: 5 };

    let writer = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            for _ in 0..200 {
                store.put_as("d/f", "xyz", &Xyz { x: 3, y: 4, z: 5 }).unwrap();
                store.empty("d").unwrap();
            }
        })
    };

    for _ in 0..200 {
        let mut target = Xyz::default();
        if store.get_into("d/f", "xyz", &mut target).unwrap() {
            assert_eq!(target, expected);
        } else {
            assert_eq!(target, Xyz::default());
        }
    }
    writer.join().unwrap();
}
