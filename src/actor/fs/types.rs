use std::path::Path;

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

use crate::classify::{NotifyKind, RawNotification};
use crate::utils::path::relative_to;

/// Collapse a notify event kind into the two notification classes.
///
/// Creations, removals and renames are all `Rename`; content writes are
/// `Modify`. Metadata-only changes (mtime/atime/chmod) and access events
/// carry nothing for observers.
///
/// A rename with both endpoints is dropped: backends that report it (inotify)
/// have already sent the `From` and `To` halves separately.
pub(super) fn notify_kind(kind: &EventKind) -> Option<NotifyKind> {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => Some(NotifyKind::Rename),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(NotifyKind::Rename),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(NotifyKind::Modify),
        _ => None,
    }
}

/// Split one notify event into root-relative notifications.
///
/// Each path becomes one notification; the classifier decides from disk
/// state whether it appeared or disappeared.
pub(super) fn to_notifications(event: &notify::Event, root: &Path) -> Vec<RawNotification> {
    let Some(kind) = notify_kind(&event.kind) else {
        return Vec::new();
    };

    let mut out: Vec<RawNotification> = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        let Some(relative) = relative_to(path, root) else {
            continue;
        };
        let notification = RawNotification::new(kind, relative);
        if !out.contains(&notification) {
            out.push(notification);
        }
    }
    out
}
