mod common;
use common::TrackingFactory;

use wash_lib::{Wash, WashError};

const PAGE: &str = r#"open html '<ul><li id="a">A</li><li id="b">B</li></ul>'"#;

fn wash(body: &str) -> Wash {
    Wash::from_string(&format!("{}\n{}", PAGE, body)).unwrap()
}

#[test]
fn released_after_success() {
    let factory = TrackingFactory::default();
    let result = wash("click id 'a'\nv = tag 'li' data 'text'").execute(&factory).unwrap();

    assert_eq!(result.execution_result.to_json().unwrap(), r#"{"v":["A","B"]}"#);
    assert_eq!(factory.quits(), 1);
    assert_eq!(factory.events().first().map(String::as_str), Some("open"));
    assert_eq!(factory.events().last().map(String::as_str), Some("quit"));
}

#[test]
fn released_after_failure() {
    let factory = TrackingFactory::default();
    let err = wash("click id 'a'\nv = tag 'li' index 3 data 'text'\nrun 'never'")
        .execute(&factory)
        .unwrap_err();

    assert!(matches!(err, WashError::Runtime(_)));
    assert_eq!(factory.quits(), 1);
    assert_eq!(factory.events().last().map(String::as_str), Some("quit"));
    assert!(!factory.events().contains(&"script never".to_string()));
}

#[test]
fn released_after_command_failure() {
    let factory = TrackingFactory::default();
    let err = wash("click id 'missing'").execute(&factory).unwrap_err();

    assert!(matches!(err, WashError::Runtime(_)));
    assert_eq!(
        factory.events(),
        vec!["open", "find id missing", "quit"]
    );
}

#[test]
fn nothing_to_release_when_open_fails() {
    let factory = TrackingFactory {
        fail_open: true,
        ..TrackingFactory::default()
    };
    let err = wash("v = tag 'li' data 'text'").execute(&factory).unwrap_err();

    assert!(matches!(err, WashError::Session(_)));
    assert!(factory.events().is_empty());
}

#[test]
fn release_failure_is_reported() {
    let factory = TrackingFactory {
        fail_quit: true,
        ..TrackingFactory::default()
    };
    let err = wash("v = tag 'li' data 'text'").execute(&factory).unwrap_err();

    assert!(matches!(err, WashError::Session(_)));
    assert_eq!(factory.quits(), 1);
}

#[test]
fn evaluation_error_wins_over_release_failure() {
    let factory = TrackingFactory {
        fail_quit: true,
        ..TrackingFactory::default()
    };
    let err = wash("v = tag 'li' index -3 data 'text'").execute(&factory).unwrap_err();

    assert!(matches!(err, WashError::Runtime(_)));
    assert_eq!(factory.quits(), 1);
}
