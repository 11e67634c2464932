//! Last-write-wins conflict resolution.

/// Which side of a conflict keeps its version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    Local,
    Remote,
}

/// Compare `updated_at` timestamps; the strictly greater one wins. Ties go
/// to the remote, which is authoritative by convention.
pub fn resolve(local_updated_at: i64, remote_updated_at: i64) -> Winner {
    if local_updated_at > remote_updated_at {
        Winner::Local
    } else {
        Winner::Remote
    }
}
