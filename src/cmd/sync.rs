/*!
 * Batch synchronization command
 */

use tokio::io::AsyncReadExt;
use tracing::info;

use crate::config::BatchConfig;
use crate::error::Result;
use crate::framing::{self, Response};
use crate::input;
use crate::reconcile::Reconciler;
use crate::store::CatalogStore;

async fn read_payload(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut payload = Vec::new();
        tokio::io::stdin().read_to_end(&mut payload).await?;
        Ok(payload)
    } else {
        Ok(tokio::fs::read(path).await?)
    }
}

pub async fn from_file<S>(store: &mut S, options: &BatchConfig, path: &str) -> Response
where
    S: CatalogStore + ?Sized,
{
    match read_payload(path).await {
        Ok(payload) => from_payload(store, options, &payload).await,
        Err(e) => framing::failure(&e),
    }
}

pub async fn from_payload<S>(store: &mut S, options: &BatchConfig, payload: &[u8]) -> Response
where
    S: CatalogStore + ?Sized,
{
    let result = async {
        let batch = input::parse_batch(payload)?;
        info!("synchronizing {} games", batch.len());
        Reconciler::new(options.clone()).reconcile(store, &batch).await
    }
    .await;
    framing::reconciliation(result)
}
