//! Instance construction and attribute access on models with deprecated
//! fields.

mod common;

use common::{album, capture_logs, genre};
use deprecated_field::{override_strict, DeprecatedFieldAccessError, TouchKind, LOG_TARGET};
use deprecated_field_core::{Field, Value};

const NO_KWARGS: [(&str, Value); 0] = [];

#[test]
fn test_init_without_deprecated_field_not_in_db() {
    let (logs, _guard) = capture_logs();

    genre().init(NO_KWARGS).unwrap();
    assert!(logs.errors().is_empty());
}

#[test]
fn test_init_with_deprecated_field_not_in_db() {
    let (logs, _guard) = capture_logs();

    let instance = genre().init([("name", "test")]).unwrap();
    assert_eq!(
        logs.error_messages(),
        vec!["Tried to set deprecated field \"name\" on instance of \"tests.models.Genre\""]
    );
    assert!(!instance.has_value("name"));
}

#[test]
fn test_init_with_deprecated_field_not_in_db_strict() {
    let _strict = override_strict(true);

    let err = genre().init([("name", "test")]).unwrap_err();
    let access = err.downcast_ref::<DeprecatedFieldAccessError>().unwrap();
    assert_eq!(access.kind(), TouchKind::InstanceSet);
    assert_eq!(
        access.message(),
        "Tried to set deprecated field \"name\" on instance of \"tests.models.Genre\""
    );
}

#[test]
fn test_diagnostic_fields() {
    let (logs, _guard) = capture_logs();

    genre().init([("name", "test")]).unwrap();
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);

    let record = &errors[0];
    assert_eq!(record.target, LOG_TARGET);
    assert_eq!(record.fields["field"], "name");
    assert_eq!(record.fields["model"], "tests.models.Genre");
    assert_eq!(record.fields["kind"], "instance_set");
    assert!(record.fields.contains_key("stack"));
}

#[test]
fn test_instance_get_returns_none_every_time() {
    let model = album();
    let instance = model.init(NO_KWARGS).unwrap();
    let (logs, _guard) = capture_logs();

    assert_eq!(instance.get("title").unwrap(), None);
    assert_eq!(instance.get("title").unwrap(), None);

    let expected = "Accessed deprecated field \"title\" on instance of \"tests.models.Album\"";
    assert_eq!(logs.error_messages(), vec![expected, expected]);
}

#[test]
fn test_instance_set_is_discarded() {
    let model = album();
    let mut instance = model.init(NO_KWARGS).unwrap();
    let (logs, _guard) = capture_logs();

    instance.set("artist", 3).unwrap();
    assert!(!instance.has_value("artist_id"));
    assert_eq!(
        logs.error_messages(),
        vec!["Tried to set deprecated field \"artist\" on instance of \"tests.models.Album\""]
    );
}

#[test]
fn test_class_access() {
    let model = genre();
    let (logs, _guard) = capture_logs();

    assert_eq!(model.class_attr("name").unwrap(), None);
    assert_eq!(
        logs.error_messages(),
        vec!["Accessed deprecated field \"name\" on model class \"tests.models.Genre\""]
    );

    let _strict = override_strict(true);
    let err = model.class_attr("name").unwrap_err();
    assert_eq!(
        err.downcast_ref::<DeprecatedFieldAccessError>()
            .map(DeprecatedFieldAccessError::kind),
        Some(TouchKind::ClassGet)
    );
}

#[test]
fn test_strict_get_fails() {
    let model = album();
    let instance = model.init(NO_KWARGS).unwrap();
    let _strict = override_strict(true);

    let err = instance.get("title").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Accessed deprecated field \"title\" on instance of \"tests.models.Album\""
    );
}

#[test]
fn test_deprecated_fields_are_not_concrete() {
    let model = album();

    let concrete: Vec<_> = model.concrete_fields().map(|f| f.name().to_string()).collect();
    assert_eq!(concrete, vec!["id"]);
    assert_eq!(model.fields().count(), 3);

    let artist = model.get_field("artist").unwrap();
    assert_eq!(artist.attname(), "artist_id");
    assert_eq!(artist.model(), Some(model.meta()));
}
