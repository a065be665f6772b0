//! Shared fixtures: the `tests` app models, a database migrated from its
//! history and a log capture layer.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use deprecated_field::deprecated;
use deprecated_field_core::{
    FieldDef, Model, OnDelete, Operation, ProjectState, QuerySet, SchemaEditor, SqliteConnection,
};
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// `Artist` declares `name` deprecated; migrations have not caught up yet.
pub fn artist() -> Model {
    Model::builder("tests.models", "Artist")
        .field("name", deprecated(FieldDef::char(256)))
        .build()
}

/// `Album` has a deprecated char field and a deprecated foreign key.
pub fn album() -> Model {
    Model::builder("tests.models", "Album")
        .field("title", deprecated(FieldDef::char(256)))
        .field(
            "artist",
            deprecated(
                FieldDef::foreign_key("tests.Artist", OnDelete::Cascade)
                    .with_related_name("albums"),
            ),
        )
        .build()
}

/// `Genre` has a deprecated field with no column in the database.
pub fn genre() -> Model {
    Model::builder("tests.models", "Genre")
        .field("name", deprecated(FieldDef::char_unbounded()))
        .build()
}

/// Migration history of the `tests` app.
pub fn history() -> Vec<Operation> {
    vec![
        Operation::CreateModel {
            app_label: "tests".into(),
            name: "Artist".into(),
            fields: vec![
                ("id".into(), FieldDef::auto()),
                ("name".into(), FieldDef::char(256)),
            ],
        },
        Operation::CreateModel {
            app_label: "tests".into(),
            name: "Album".into(),
            fields: vec![
                ("id".into(), FieldDef::auto()),
                ("title".into(), FieldDef::char(256).null()),
                (
                    "artist".into(),
                    FieldDef::foreign_key("tests.Artist", OnDelete::Cascade)
                        .with_related_name("albums")
                        .null(),
                ),
            ],
        },
        Operation::CreateModel {
            app_label: "tests".into(),
            name: "Genre".into(),
            fields: vec![("id".into(), FieldDef::auto())],
        },
    ]
}

/// An in-memory database migrated to the end of [`history`].
pub struct TestContext {
    pub conn: SqliteConnection,
    pub state: ProjectState,
    pub artist: Model,
    pub album: Model,
    pub genre: Model,
}

impl TestContext {
    pub fn new() -> Self {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let mut state = ProjectState::new();
        let editor = SchemaEditor::new(&conn);
        for operation in history() {
            editor.apply(&mut state, &operation).unwrap();
        }

        Self {
            conn,
            state,
            artist: artist(),
            album: album(),
            genre: genre(),
        }
    }

    pub fn artists(&self) -> QuerySet<'_> {
        self.artist.objects(&self.conn)
    }

    pub fn albums(&self) -> QuerySet<'_> {
        self.album.objects(&self.conn)
    }

    pub fn genres(&self) -> QuerySet<'_> {
        self.genre.objects(&self.conn)
    }

    /// Apply a further operation to the database.
    pub fn migrate(&mut self, operation: Operation) {
        SchemaEditor::new(&self.conn)
            .apply(&mut self.state, &operation)
            .unwrap();
    }
}

/// One captured event.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

/// Layer recording every event, installed per thread by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<Record>>>,
}

impl LogCapture {
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Error-level records.
    pub fn errors(&self) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|record| record.level == Level::ERROR)
            .collect()
    }

    /// Messages of error-level records.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors()
            .into_iter()
            .map(|record| record.message)
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.records.lock().push(Record {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}

/// Capture events on the current thread until the guard drops.
pub fn capture_logs() -> (LogCapture, DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
