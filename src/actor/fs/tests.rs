use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};

use super::debouncer::{Debouncer, IDLE_SLEEP};
use super::types::{notify_kind, to_notifications};
use crate::classify::{NotifyKind, RawNotification};

const ROOT: &str = "/srv/mods";

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(ModifyKind::Data(DataChange::Any))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(CreateKind::Folder)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(RemoveKind::File)
}

fn rename_kind(mode: RenameMode) -> notify::EventKind {
    notify::EventKind::Modify(ModifyKind::Name(mode))
}

fn notifications(event: &notify::Event) -> Vec<RawNotification> {
    to_notifications(event, Path::new(ROOT))
}

// =============================================================================
// notify → RawNotification
// =============================================================================

#[test]
fn test_kind_mapping() {
    assert_eq!(notify_kind(&create_kind()), Some(NotifyKind::Rename));
    assert_eq!(notify_kind(&remove_kind()), Some(NotifyKind::Rename));
    assert_eq!(notify_kind(&rename_kind(RenameMode::From)), Some(NotifyKind::Rename));
    assert_eq!(notify_kind(&rename_kind(RenameMode::To)), Some(NotifyKind::Rename));
    assert_eq!(notify_kind(&rename_kind(RenameMode::Any)), Some(NotifyKind::Rename));
    assert_eq!(notify_kind(&rename_kind(RenameMode::Both)), None);
    assert_eq!(notify_kind(&modify_kind()), Some(NotifyKind::Modify));
    assert_eq!(
        notify_kind(&notify::EventKind::Modify(ModifyKind::Any)),
        Some(NotifyKind::Modify)
    );
}

#[test]
fn test_metadata_and_access_ignored() {
    let chmod = notify::EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions));
    let read = notify::EventKind::Access(AccessKind::Any);
    assert_eq!(notify_kind(&chmod), None);
    assert_eq!(notify_kind(&read), None);
    assert!(notifications(&make_event(vec!["/srv/mods/foo/a.ts"], chmod)).is_empty());
}

#[test]
fn test_paths_become_root_relative() {
    let event = make_event(vec!["/srv/mods/foo/bar.ts"], modify_kind());
    assert_eq!(
        notifications(&event),
        [RawNotification::modify("foo/bar.ts")]
    );
}

#[test]
fn test_root_itself_and_outside_paths_dropped() {
    let event = make_event(vec!["/srv/mods", "/srv/elsewhere/foo"], remove_kind());
    assert!(notifications(&event).is_empty());
}

#[test]
fn test_rename_reported_once_per_side() {
    let from = make_event(vec!["/srv/mods/foo/a.ts"], rename_kind(RenameMode::From));
    let to = make_event(vec!["/srv/mods/foo/b.ts"], rename_kind(RenameMode::To));
    let both = make_event(
        vec!["/srv/mods/foo/a.ts", "/srv/mods/foo/b.ts"],
        rename_kind(RenameMode::Both),
    );

    assert_eq!(notifications(&from), [RawNotification::rename("foo/a.ts")]);
    assert_eq!(notifications(&to), [RawNotification::rename("foo/b.ts")]);
    assert!(notifications(&both).is_empty());
}

#[test]
fn test_duplicate_paths_in_one_event() {
    let event = make_event(vec!["/srv/mods/foo", "/srv/mods/foo"], create_kind());
    assert_eq!(notifications(&event), [RawNotification::rename("foo")]);
}

// =============================================================================
// Debouncer
// =============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(Duration::from_millis(50));
    assert!(!debouncer.is_ready());
    assert_eq!(debouncer.sleep_duration(), IDLE_SLEEP);
}

#[test]
fn test_debouncer_keeps_first_seen_order() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(RawNotification::rename("foo"));
    debouncer.add(RawNotification::rename("foo/bar.ts"));
    debouncer.add(RawNotification::modify("foo/mod.json"));

    let batch = debouncer.take_if_ready().unwrap();
    assert_eq!(
        batch,
        [
            RawNotification::rename("foo"),
            RawNotification::rename("foo/bar.ts"),
            RawNotification::modify("foo/mod.json"),
        ]
    );
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_rename_dominates_modify() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(RawNotification::modify("foo/bar.ts"));
    debouncer.add(RawNotification::rename("foo/bar.ts"));
    debouncer.add(RawNotification::modify("foo/bar.ts"));

    assert_eq!(
        debouncer.take_if_ready().unwrap(),
        [RawNotification::rename("foo/bar.ts")]
    );
}

#[test]
fn test_same_kind_coalesced() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(RawNotification::modify("foo/bar.ts"));
    debouncer.add(RawNotification::modify("foo/bar.ts"));
    assert_eq!(debouncer.pending.len(), 1);
    assert_eq!(debouncer.index.len(), 1);
}

#[test]
fn test_not_ready_inside_window() {
    let mut debouncer = Debouncer::new(Duration::from_secs(60));
    debouncer.add(RawNotification::modify("foo/bar.ts"));

    assert!(!debouncer.is_ready());
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() > Duration::from_secs(1));
    assert_eq!(debouncer.pending.len(), 1);
}

#[test]
fn test_ready_after_window() {
    let mut debouncer = Debouncer::new(Duration::from_millis(10));
    debouncer.add(RawNotification::modify("foo/bar.ts"));
    std::thread::sleep(Duration::from_millis(20));

    assert!(debouncer.is_ready());
    assert_eq!(debouncer.take_if_ready().unwrap().len(), 1);
    assert!(debouncer.last_event.is_none());
    assert!(debouncer.index.is_empty());
}

// =============================================================================
// Live watcher (inotify reports renames as From, To and Both)
// =============================================================================

#[cfg(target_os = "linux")]
mod live {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::runtime::Runtime;
    use tokio::sync::mpsc;

    use super::super::FsActor;
    use crate::actor::messages::HubMsg;
    use crate::classify::classify;
    use crate::compiler::testing::EchoCompiler;
    use crate::model::{ChangeEvent, Script};
    use crate::utils::path::normalize_path;

    /// No notification for this long ends a batch.
    const QUIET: Duration = Duration::from_millis(500);

    struct LiveWatch {
        rt: Runtime,
        rx: mpsc::Receiver<HubMsg>,
        root: PathBuf,
        _temp: TempDir,
    }

    impl LiveWatch {
        fn start(setup: impl FnOnce(&Path)) -> Self {
            let temp = TempDir::new().unwrap();
            let root = normalize_path(temp.path());
            setup(&root);

            let rt = Runtime::new().unwrap();
            let (tx, rx) = mpsc::channel(64);
            let actor = FsActor::new(root.clone(), Duration::ZERO, tx).unwrap();
            rt.spawn(actor.run());

            let mut watch = Self { rt, rx, root, _temp: temp };
            watch.settle();
            watch
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.root.join(rel)
        }

        /// Classify everything the actor forwards until the watcher goes quiet.
        fn settle(&mut self) -> Vec<ChangeEvent> {
            let mut events = Vec::new();
            loop {
                let next = self
                    .rt
                    .block_on(async { tokio::time::timeout(QUIET, self.rx.recv()).await });
                match next {
                    Ok(Some(HubMsg::Notify(raw))) => {
                        if let Some(event) = classify(&self.root, &raw, &EchoCompiler).unwrap() {
                            events.push(event);
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => break,
                }
            }
            events
        }
    }

    #[test]
    fn test_rename_away_yields_one_delete() {
        let mut watch = LiveWatch::start(|root| {
            fs::create_dir(root.join("foo")).unwrap();
            fs::write(root.join("foo/bar.ts"), "x").unwrap();
        });

        fs::rename(watch.path("foo/bar.ts"), watch.path("foo/bar.ts.bak")).unwrap();
        assert_eq!(
            watch.settle(),
            [ChangeEvent::DeleteScript("foo".into(), "bar".into())]
        );
    }

    #[test]
    fn test_rename_between_scripts() {
        let mut watch = LiveWatch::start(|root| {
            fs::create_dir(root.join("foo")).unwrap();
            fs::write(root.join("foo/a.ts"), "src").unwrap();
        });

        fs::rename(watch.path("foo/a.ts"), watch.path("foo/b.ts")).unwrap();
        assert_eq!(
            watch.settle(),
            [
                ChangeEvent::DeleteScript("foo".into(), "a".into()),
                ChangeEvent::AddScript("foo".into(), Script::new("b", "compiled:src")),
            ]
        );
    }

    #[test]
    fn test_create_then_modify() {
        let mut watch = LiveWatch::start(|_| {});

        fs::create_dir(watch.path("foo")).unwrap();
        assert_eq!(watch.settle(), [ChangeEvent::NewMod("foo".into())]);

        fs::write(watch.path("foo/new.ts"), "one").unwrap();
        let events = watch.settle();
        assert!(
            matches!(&events[0], ChangeEvent::AddScript(m, s) if m == "foo" && s.name == "new"),
            "{events:?}"
        );
        assert_eq!(
            events.last(),
            Some(&ChangeEvent::UpdateScript(
                "foo".into(),
                Script::new("new", "compiled:one")
            ))
        );

        fs::write(watch.path("foo/new.ts"), "two").unwrap();
        let events = watch.settle();
        assert!(!events.is_empty());
        assert!(
            events
                .iter()
                .all(|e| matches!(e, ChangeEvent::UpdateScript(m, s) if m == "foo" && s.name == "new")),
            "{events:?}"
        );
        assert_eq!(
            events.last(),
            Some(&ChangeEvent::UpdateScript(
                "foo".into(),
                Script::new("new", "compiled:two")
            ))
        );
    }
}
