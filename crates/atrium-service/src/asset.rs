//! Asset update collaborator port.

use std::sync::Arc;

use async_trait::async_trait;

use atrium_core::result::AppResult;
use atrium_database::repositories::asset::AssetRepository;
use atrium_entity::asset::AssetPatch;

/// Applies approved field diffs to assets.
///
/// Used only on the mirror-fallback decision path; when the remote store
/// is reachable the patch lands inside the decision transaction instead.
#[async_trait]
pub trait AssetUpdater: Send + Sync {
    /// Apply a typed field diff. Returns whether an asset was rewritten.
    async fn apply_patch(&self, asset_id: &str, patch: &AssetPatch) -> AppResult<bool>;
}

/// Asset updater backed by the local PostgreSQL repository.
#[derive(Debug, Clone)]
pub struct PgAssetUpdater {
    assets: Arc<AssetRepository>,
}

impl PgAssetUpdater {
    /// Create a new PostgreSQL-backed asset updater.
    pub fn new(assets: Arc<AssetRepository>) -> Self {
        Self { assets }
    }
}

#[async_trait]
impl AssetUpdater for PgAssetUpdater {
    async fn apply_patch(&self, asset_id: &str, patch: &AssetPatch) -> AppResult<bool> {
        self.assets.apply_patch(asset_id, patch).await
    }
}
