/// Per-listener delivery configuration. All options default to off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenOptions {
    include_document_metadata_changes: bool,
    include_query_metadata_changes: bool,
    wait_for_sync_when_online: bool,
}

impl ListenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also deliver snapshots whose only change is document-level metadata
    /// (e.g. a pending write being acknowledged without a value change).
    pub fn with_include_document_metadata_changes(mut self, include: bool) -> Self {
        self.include_document_metadata_changes = include;
        self
    }

    /// Also deliver snapshots whose only change is query-level metadata
    /// (`from_cache` / `has_pending_writes`).
    pub fn with_include_query_metadata_changes(mut self, include: bool) -> Self {
        self.include_query_metadata_changes = include;
        self
    }

    /// Hold the initial event until a server-confirmed snapshot arrives,
    /// unless the client is known to be offline.
    pub fn with_wait_for_sync_when_online(mut self, wait: bool) -> Self {
        self.wait_for_sync_when_online = wait;
        self
    }

    pub fn include_document_metadata_changes(&self) -> bool {
        self.include_document_metadata_changes
    }

    pub fn include_query_metadata_changes(&self) -> bool {
        self.include_query_metadata_changes
    }

    pub fn wait_for_sync_when_online(&self) -> bool {
        self.wait_for_sync_when_online
    }
}
