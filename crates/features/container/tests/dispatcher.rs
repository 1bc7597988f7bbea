use cfgd_container::{
    Command, Configuration, Container, ContainerListener, ListenerError, MemoryConfiguration,
    Method, Outcome, Registry, RequestParams,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Add(String, String, Option<String>),
    Delete(String, String),
    Modified(String, String, Option<String>),
    Command(Command),
}

/// Records every notification together with the value visible at that moment.
#[derive(Debug, Default)]
struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    fn take(&self) -> Vec<Seen> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl ContainerListener for Recorder {
    fn on_add(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        let value = config.get_property(key).map(str::to_owned);
        self.seen.lock().push(Seen::Add(config.id().to_owned(), key.to_owned(), value));
        Ok(())
    }

    fn on_delete(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        self.seen.lock().push(Seen::Delete(config.id().to_owned(), key.to_owned()));
        Ok(())
    }

    fn on_modified(&self, config: &dyn Configuration, key: &str) -> Result<(), ListenerError> {
        let value = config.get_property(key).map(str::to_owned);
        self.seen.lock().push(Seen::Modified(config.id().to_owned(), key.to_owned(), value));
        Ok(())
    }

    fn on_command(&self, command: Command) -> Result<(), ListenerError> {
        self.seen.lock().push(Seen::Command(command));
        Ok(())
    }
}

#[derive(Debug)]
struct Exploding;

impl ContainerListener for Exploding {
    fn on_add(&self, _config: &dyn Configuration, _key: &str) -> Result<(), ListenerError> {
        panic!("listener bug");
    }
}

fn setup() -> (Container, Arc<Recorder>) {
    let registry = Registry::new();
    registry.insert(
        MemoryConfiguration::new("db", "Database")
            .with_property("a", "1")
            .with_property("x", "1"),
    );
    registry.insert(MemoryConfiguration::new("cache", "Cache"));

    let container = Container::new(registry);
    let recorder = Arc::new(Recorder::default());
    container.add_listener(recorder.clone());
    (container, recorder)
}

fn params(pairs: &[(&str, &str)]) -> RequestParams {
    pairs.iter().copied().collect()
}

fn property(container: &Container, id: &str, key: &str) -> Option<String> {
    let shared = container.registry().get(id)?;
    let config = shared.lock();
    config.get_property(key).map(str::to_owned)
}

#[test]
fn index_lists_every_configuration_once() {
    let (container, recorder) = setup();

    let outcome = container.handle_get(&RequestParams::new());

    let Outcome::Index { entries, commands } = outcome else { panic!("expected index") };
    let ids: Vec<_> = entries.iter().map(|e| (e.id.as_str(), e.display_name.as_str())).collect();
    assert_eq!(ids, vec![("cache", "Cache"), ("db", "Database")]);
    assert_eq!(commands, vec![Command::Exit]);
    assert!(recorder.take().is_empty());
}

#[test]
fn index_reflects_registry_changes() {
    let (container, _) = setup();
    container.registry().insert(MemoryConfiguration::new("auth", "Auth"));
    container.registry().remove("cache");

    let Outcome::Index { entries, .. } = container.handle_get(&RequestParams::new()) else {
        panic!("expected index");
    };
    let ids: Vec<_> = entries.into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["auth", "db"]);
}

#[test]
fn unknown_identifier_is_not_found_regardless_of_command() {
    let (container, recorder) = setup();

    for command in ["VIEW", "ADD", "UPDATE", "DELETE", "EXIT", "bogus"] {
        let outcome = container.handle_get(&params(&[("config", "nope"), ("command", command)]));
        assert_eq!(outcome, Outcome::ConfigNotFound { id: Some("nope".to_owned()) });
    }
    assert!(recorder.take().is_empty());
}

#[test]
fn get_forms_carry_the_configuration() {
    let (container, _) = setup();

    let add = container.handle_get(&params(&[("config", "db"), ("command", "ADD")]));
    let update = container.handle_get(&params(&[("config", "db"), ("command", "UPDATE")]));
    let delete = container.handle_get(&params(&[("config", "db"), ("command", "DELETE")]));

    assert!(matches!(add, Outcome::AddForm { ref config } if config.id == "db"));
    assert!(matches!(update, Outcome::UpdateFormRequested { ref config } if config.get("x") == Some("1")));
    assert!(matches!(delete, Outcome::DeleteFormRequested { ref config } if config.properties.len() == 2));
}

#[test]
fn get_with_unknown_command_is_reported() {
    let (container, _) = setup();

    let outcome = container.handle_get(&params(&[("config", "db"), ("command", "view")]));
    assert_eq!(outcome, Outcome::UnknownCommand { token: "view".to_owned() });

    let outcome = container.handle_get(&params(&[("command", "REBOOT")]));
    assert_eq!(outcome, Outcome::UnknownCommand { token: "REBOOT".to_owned() });
}

#[test]
fn get_exit_stops_without_mutation() {
    let (container, recorder) = setup();

    let outcome = container.handle_get(&params(&[("config", "db"), ("command", "EXIT")]));

    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(recorder.take(), vec![Seen::Command(Command::Exit)]);
    assert_eq!(property(&container, "db", "a").as_deref(), Some("1"));
    assert_eq!(property(&container, "db", "x").as_deref(), Some("1"));
}

#[test]
fn get_exit_without_identifier_stops() {
    let (container, recorder) = setup();

    let outcome = container.dispatch(Method::Get, &params(&[("command", "EXIT")]));

    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(recorder.take(), vec![Seen::Command(Command::Exit)]);
}

#[test]
fn get_other_command_without_identifier_shows_index() {
    let (container, recorder) = setup();
    let outcome = container.handle_get(&params(&[("command", "DELETE")]));

    assert!(matches!(outcome, Outcome::Index { .. }));
    assert!(recorder.take().is_empty());
}

#[test]
fn delete_skips_absent_keys() {
    let (container, recorder) = setup();

    let outcome = container.handle_post(&params(&[
        ("config_id", "db"),
        ("command", "DELETE"),
        ("a", "on"),
        ("b", "on"),
    ]));

    assert_eq!(
        outcome,
        Outcome::MutationAck { id: "db".to_owned(), command: Command::Delete, changed: vec!["a".to_owned()] }
    );
    assert_eq!(recorder.take(), vec![Seen::Delete("db".to_owned(), "a".to_owned())]);
    assert_eq!(property(&container, "db", "a"), None);
    assert_eq!(property(&container, "db", "x").as_deref(), Some("1"));
}

#[test]
fn repeated_delete_of_absent_key_is_silent() {
    let (container, recorder) = setup();
    let request = params(&[("config_id", "db"), ("command", "DELETE"), ("ghost", "on")]);

    for _ in 0..2 {
        let outcome = container.handle_post(&request);
        assert!(matches!(outcome, Outcome::MutationAck { ref changed, .. } if changed.is_empty()));
    }
    assert!(recorder.take().is_empty());
}

#[test]
fn add_sets_and_notifies_once() {
    let (container, recorder) = setup();

    let outcome = container.handle_post(&params(&[
        ("config_id", "cache"),
        ("command", "ADD"),
        ("key", "ttl"),
        ("value", "60"),
    ]));

    assert!(matches!(outcome, Outcome::MutationAck { command: Command::Add, .. }));
    assert_eq!(property(&container, "cache", "ttl").as_deref(), Some("60"));
    assert_eq!(
        recorder.take(),
        vec![Seen::Add("cache".to_owned(), "ttl".to_owned(), Some("60".to_owned()))]
    );
}

#[test]
fn add_overwrites_existing_key() {
    let (container, recorder) = setup();

    container.handle_post(&params(&[
        ("config_id", "db"),
        ("command", "ADD"),
        ("key", "x"),
        ("value", "7"),
    ]));

    assert_eq!(property(&container, "db", "x").as_deref(), Some("7"));
    assert_eq!(recorder.take().len(), 1);
}

#[test]
fn add_without_key_is_invalid() {
    let (container, recorder) = setup();

    let outcome = container.handle_post(&params(&[("config_id", "db"), ("command", "ADD"), ("value", "1")]));

    assert!(matches!(outcome, Outcome::InvalidCommand { .. }));
    assert!(recorder.take().is_empty());
}

#[test]
fn update_only_touches_existing_keys() {
    let (container, recorder) = setup();

    let outcome = container.handle_post(&params(&[
        ("config_id", "db"),
        ("command", "UPDATE"),
        ("x", "2"),
        ("y", "9"),
    ]));

    assert!(matches!(outcome, Outcome::MutationAck { ref changed, .. } if changed == &["x"]));
    assert_eq!(property(&container, "db", "x").as_deref(), Some("2"));
    assert_eq!(property(&container, "db", "y"), None);
    assert_eq!(
        recorder.take(),
        vec![Seen::Modified("db".to_owned(), "x".to_owned(), Some("2".to_owned()))]
    );
}

#[test]
fn post_exit_and_view_are_invalid() {
    let (container, recorder) = setup();

    for command in ["EXIT", "VIEW"] {
        let outcome = container.handle_post(&params(&[("config_id", "db"), ("command", command)]));
        assert!(matches!(outcome, Outcome::InvalidCommand { .. }), "{command}");
    }
    let outcome = container.handle_post(&params(&[("config_id", "db")]));
    assert!(matches!(outcome, Outcome::InvalidCommand { .. }), "absent command means VIEW");

    assert!(recorder.take().is_empty());
}

#[test]
fn post_unknown_or_missing_config_is_not_found() {
    let (container, recorder) = setup();

    let unknown = container.handle_post(&params(&[("config_id", "nope"), ("command", "ADD"), ("key", "k")]));
    let missing = container.handle_post(&params(&[("command", "ADD"), ("key", "k")]));

    assert_eq!(unknown, Outcome::ConfigNotFound { id: Some("nope".to_owned()) });
    assert_eq!(missing, Outcome::ConfigNotFound { id: None });
    assert!(recorder.take().is_empty());
}

#[test]
fn post_unknown_command_is_reported() {
    let (container, recorder) = setup();

    let outcome = container.handle_post(&params(&[("config_id", "db"), ("command", "Delete"), ("a", "on")]));

    assert_eq!(outcome, Outcome::UnknownCommand { token: "Delete".to_owned() });
    assert_eq!(property(&container, "db", "a").as_deref(), Some("1"));
    assert!(recorder.take().is_empty());
}

#[test]
fn get_never_mutates() {
    let (container, _) = setup();
    let before = container.registry().get("db").unwrap().lock().snapshot();

    for command in ["VIEW", "ADD", "UPDATE", "DELETE"] {
        container.handle_get(&params(&[("config", "db"), ("command", command), ("a", "zzz")]));
    }

    let after = container.registry().get("db").unwrap().lock().snapshot();
    assert_eq!(before, after);
}

#[test]
fn every_listener_is_notified() {
    let (container, first) = setup();
    let second = Arc::new(Recorder::default());
    container.add_listener(second.clone());

    container.handle_post(&params(&[("config_id", "db"), ("command", "DELETE"), ("x", "on")]));

    assert_eq!(first.take().len(), 1);
    assert_eq!(second.take().len(), 1);
}

#[test]
fn concurrent_adds_on_one_configuration_are_serialized() {
    let (container, recorder) = setup();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let container = container.clone();
            scope.spawn(move || {
                for i in 0..25 {
                    let value = format!("{worker}-{i}");
                    container.handle_post(&params(&[
                        ("config_id", "db"),
                        ("command", "ADD"),
                        ("key", "shared"),
                        ("value", value.as_str()),
                    ]));
                }
            });
        }
    });

    let seen = recorder.take();
    assert_eq!(seen.len(), 100);

    // Each notification saw exactly the value its own request wrote.
    let values: BTreeSet<_> = seen
        .into_iter()
        .map(|event| match event {
            Seen::Add(_, _, Some(value)) => value,
            other => panic!("unexpected notification {other:?}"),
        })
        .collect();
    assert_eq!(values.len(), 100);
}

proptest! {
    #[test]
    fn index_matches_registry(ids in prop::collection::btree_set("[a-z]{1,8}", 0..12)) {
        let registry = Registry::new();
        for id in &ids {
            registry.insert(MemoryConfiguration::new(id.clone(), id.to_uppercase()));
        }
        let container = Container::new(registry);

        let Outcome::Index { entries, .. } = container.handle_get(&RequestParams::new()) else {
            panic!("expected index");
        };
        let listed: Vec<_> = entries.into_iter().map(|e| e.id).collect();
        prop_assert_eq!(listed, ids.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn delete_notifies_exactly_the_present_keys(
        present in prop::collection::btree_set("[a-e]", 0..5),
        requested in prop::collection::btree_set("[a-g]", 0..7),
    ) {
        let config = present
            .iter()
            .fold(MemoryConfiguration::new("p", "P"), |config, key| config.with_property(key.clone(), "v"));
        let registry = Registry::new();
        registry.insert(config);
        let container = Container::new(registry);
        let recorder = Arc::new(Recorder::default());
        container.add_listener(recorder.clone());

        let mut request = RequestParams::from_iter([("config_id", "p"), ("command", "DELETE")]);
        for key in &requested {
            request.insert(key.clone(), "on");
        }
        container.handle_post(&request);

        let deleted: BTreeSet<_> = recorder
            .take()
            .into_iter()
            .map(|event| match event {
                Seen::Delete(_, key) => key,
                other => panic!("unexpected notification {other:?}"),
            })
            .collect();
        let expected: BTreeSet<_> = present.intersection(&requested).cloned().collect();
        prop_assert_eq!(deleted, expected);
    }
}

#[test]
fn panicking_listener_does_not_abort_the_request() {
    let registry = Registry::new();
    registry.insert(MemoryConfiguration::new("db", "Database"));
    let container = Container::new(registry);
    let recorder = Arc::new(Recorder::default());
    container.add_listener(Arc::new(Exploding));
    container.add_listener(recorder.clone());

    let outcome = container.dispatch(
        Method::Post,
        &params(&[("config_id", "db"), ("command", "ADD"), ("key", "x"), ("value", "1")]),
    );

    assert_eq!(
        outcome,
        Outcome::MutationAck { id: "db".to_owned(), command: Command::Add, changed: vec!["x".to_owned()] }
    );
    assert_eq!(property(&container, "db", "x").as_deref(), Some("1"));
    assert_eq!(recorder.take(), vec![Seen::Add("db".to_owned(), "x".to_owned(), Some("1".to_owned()))]);

    // The configuration lock was released despite the panic.
    let again = container.dispatch(
        Method::Post,
        &params(&[("config_id", "db"), ("command", "UPDATE"), ("x", "2")]),
    );
    assert!(matches!(again, Outcome::MutationAck { .. }));
    assert_eq!(property(&container, "db", "x").as_deref(), Some("2"));
}
