//! Serde support for the option types.

use rstest::rstest;

use pmap::control::DeferredOptions;
use pmap::mapping::{Concurrency, MapOptions};

#[rstest]
#[case(r#"{"concurrency": 4}"#, Concurrency::new(4))]
#[case(r#"{"concurrency": null}"#, Concurrency::Unbounded)]
#[case(r#"{"concurrency": 0}"#, Concurrency::Unbounded)]
#[case(r#"{"concurrency": -1}"#, Concurrency::Unbounded)]
#[case(r#"{}"#, Concurrency::Unbounded)]
fn map_options_deserialize(#[case] json: &str, #[case] expected: Concurrency) {
    let options: MapOptions = serde_json::from_str(json).unwrap();
    assert_eq!(options.concurrency, expected);
}

#[rstest]
fn map_options_serialize_limit_as_integer() {
    let json = serde_json::to_string(&MapOptions::from(3)).unwrap();
    assert_eq!(json, r#"{"concurrency":3}"#);

    let json = serde_json::to_string(&MapOptions::default()).unwrap();
    assert_eq!(json, r#"{"concurrency":null}"#);
}

#[rstest]
fn deferred_options_round_trip() {
    let options: DeferredOptions =
        serde_json::from_str(r#"{"error_on_double_settle": true}"#).unwrap();
    assert_eq!(options, DeferredOptions::strict());

    let options: DeferredOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, DeferredOptions::new());
}
