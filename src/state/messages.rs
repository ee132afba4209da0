use pool_engine::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRequest {
    /// Initial load on startup.
    LoadEntries,
    /// Periodic re-fetch of the whole pool.
    RefreshEntries,
}

#[derive(Debug)]
pub enum NetworkResponse {
    /// Full snapshot; replaces whatever was loaded before.
    EntriesLoaded { entries: Vec<Entry> },
    Error { message: String, retryable: bool },
}
