//! Batch-fetching of paginated list endpoints.

use std::future::Future;

use crate::{
  api::{ServerApi, ServerQuery},
  server::{OperatingSystem, Server},
};

/// The largest page size the API accepts.
pub const API_MAX_LIMIT: u32 = 50;

/// Collect up to `limit` items (all of them when `limit == 0`) starting at
/// `offset`, calling `fetch(batch_limit, offset)` once per page.
///
/// Stops on a short page or once the limit is reached.
pub async fn collect_pages<T, E, F, Fut>(
  limit: u32,
  offset: u32,
  mut fetch: F,
) -> Result<Vec<T>, E>
where
  F: FnMut(u32, u32) -> Fut,
  Fut: Future<Output = Result<Vec<T>, E>>,
{
  let fetch_all = limit == 0;
  let wanted = limit as usize;
  let mut items = Vec::new();
  let mut offset = offset;

  loop {
    let batch = if fetch_all {
      API_MAX_LIMIT
    } else {
      let remaining = u32::try_from(wanted - items.len()).unwrap_or(u32::MAX);
      API_MAX_LIMIT.min(remaining)
    };

    let page = fetch(batch, offset).await?;
    let received = page.len();
    items.extend(page);

    if received < batch as usize {
      break;
    }
    if !fetch_all && items.len() >= wanted {
      break;
    }
    offset = offset.saturating_add(batch);
  }

  if !fetch_all {
    items.truncate(wanted);
  }
  Ok(items)
}

/// Fetch every server matching `filters`, honouring `limit` (0 = all) and
/// `offset`. The `limit`/`offset` fields of `filters` are ignored.
pub async fn fetch_all_servers<A: ServerApi>(
  api: &A,
  filters: &ServerQuery,
  limit: u32,
  offset: u32,
) -> Result<Vec<Server>, A::Error> {
  collect_pages(limit, offset, |batch, offset| {
    let query = ServerQuery {
      limit: Some(batch),
      offset: Some(offset),
      ..filters.clone()
    };
    async move {
      tracing::debug!(limit = batch, offset, "fetching server page");
      api.list_servers(&query).await.map(|page| page.servers)
    }
  })
  .await
}

/// Fetch installable operating systems, honouring `limit` (0 = all) and
/// `offset`.
pub async fn fetch_all_operating_systems<A: ServerApi>(
  api: &A,
  limit: u32,
  offset: u32,
) -> Result<Vec<OperatingSystem>, A::Error> {
  collect_pages(limit, offset, |batch, offset| async move {
    api
      .list_operating_systems(batch, offset)
      .await
      .map(|page| page.operating_systems)
  })
  .await
}
