// Rate-limited gate
//
// The single serialization point for all outbound calls. Real dispatches
// are spaced at least `min_spacing` apart process-wide; cache-eligible
// reads are answered from the page cache without taking the lock or paying
// the spacing cost. The last-dispatch timestamp advances after every real
// dispatch, success or failure, so failed calls cannot burst through on
// retry.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::client::transport::{ApiRequest, ApiResponse, Transport, Verb};
use crate::errors::{self, Result};
use crate::storage::page_cache::{PageCache, PageKey};

pub struct Gate {
    transport: Arc<dyn Transport>,
    cache: Arc<PageCache>,
    state: Mutex<GateState>,
    min_spacing: std::time::Duration,
}

struct GateState {
    last_dispatch: Option<Instant>,
}

impl Gate {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<PageCache>,
        min_spacing: std::time::Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            state: Mutex::new(GateState { last_dispatch: None }),
            min_spacing,
        }
    }

    pub fn is_test(&self) -> bool {
        self.transport.is_test()
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Sends one request through the gate: cache consult for eligible
    /// reads, spacing under the lock, fault classification, cache offer.
    pub async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let cacheable = request.verb == Verb::Get && !self.is_test() && cache_eligible(&request.path);
        if cacheable {
            if let Some(payload) = self.cache.get(&page_key(request)) {
                debug!("cache hit for {}", request.path);
                return Ok(ApiResponse { status: 200, body: payload });
            }
        }

        let result = {
            let mut state = self.state.lock().await;
            if !self.is_test() {
                if let Some(last) = state.last_dispatch {
                    let elapsed = last.elapsed();
                    if elapsed < self.min_spacing {
                        sleep(self.min_spacing - elapsed).await;
                    }
                }
            }
            let result = self.transport.send(request).await;
            state.last_dispatch = Some(Instant::now());
            result
        };

        let response = result?;
        if !response.is_success() {
            return Err(errors::classify_fault(response.status, &response.body));
        }
        if cacheable {
            if let Err(err) = self.cache.put(&page_key(request), response.body.clone()) {
                warn!("failed to cache {}: {err}", request.path);
            }
        }
        Ok(response)
    }
}

/// Which resources may be served from the page cache. Market data must
/// always be live; paginated waypoint listings change slowly enough to
/// cache.
pub(crate) fn cache_eligible(path: &str) -> bool {
    if path.ends_with("/market") {
        return false;
    }
    path.ends_with("/waypoints")
}

pub(crate) fn page_key(request: &ApiRequest) -> PageKey {
    let mut page = 1u32;
    let mut page_size = 20u32;
    let mut filter_parts: Vec<String> = Vec::new();
    for (key, value) in &request.query {
        match key.as_str() {
            "page" => page = value.parse().unwrap_or(1),
            "limit" => page_size = value.parse().unwrap_or(20),
            _ => filter_parts.push(format!("{key}={value}")),
        }
    }
    filter_parts.sort();
    PageKey {
        collection: request.path.clone(),
        page,
        page_size,
        filter: filter_parts.join("&"),
    }
}
