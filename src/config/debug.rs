//! Debugging feature flags.

pub struct LogFlags {
    /// Log every reconciliation pass (series counts, header values)
    pub log_reconcile: bool,

    /// Log computed scale margins
    pub log_layout: bool,

    /// Log annotation state transitions and commits
    pub log_annotations: bool,

    /// Log key-value store reads and writes
    pub log_store: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_reconcile: true,
    log_annotations: true,

    log_layout: false,
    log_store: false,
    log_performance: false,
};
