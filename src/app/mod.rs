mod root;
mod state;

pub(crate) use state::{PendingWork, PersistedView};

pub use root::ChartApp;
