use chrono::{DateTime, FixedOffset, Utc};

use crate::store::StoreHandle;
use crate::utils::config::Config;

pub struct AppState {
    pub store: StoreHandle,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: StoreHandle::new(config.store_backend()),
            config,
        }
    }

    /// Current instant in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.config.utc_offset)
    }
}
