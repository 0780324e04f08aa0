use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::auspost::LocalityDirectory;
use crate::config::Config;
use crate::verify::AddressReconciler;

pub struct AppState {
    pub reconciler: AddressReconciler,
    pub activity: ActivityLog,
}

impl AppState {
    pub fn new(config: &Config) -> color_eyre::Result<Arc<Self>> {
        let directory = LocalityDirectory::new(
            config.aus_post_base_url.as_str(),
            &config.aus_post_token,
            config.upstream_timeout,
        )?;
        let activity = ActivityLog::new(
            &config.elastic_node,
            &config.elastic_index,
            &config.elastic_api_key,
            config.upstream_timeout,
        )?;

        Ok(Arc::new(Self {
            reconciler: AddressReconciler::new(directory),
            activity,
        }))
    }
}
