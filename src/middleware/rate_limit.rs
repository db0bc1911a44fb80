use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Fixed one-second window over the whole router. Coarse on purpose; the
/// operator-facing API sees at most a handful of clients.
#[derive(Clone)]
pub struct RpsState {
    limit: u32,
    count: Arc<AtomicU32>,
    window_start: Arc<Mutex<Instant>>,
}

pub fn new_rps_state(rps: u32) -> RpsState {
    RpsState {
        limit: rps.max(1),
        count: Arc::new(AtomicU32::new(0)),
        window_start: Arc::new(Mutex::new(Instant::now())),
    }
}

impl RpsState {
    fn allow(&self) -> bool {
        {
            let mut start = self.window_start.lock().expect("rate limiter mutex poisoned");
            if start.elapsed().as_secs() >= 1 {
                *start = Instant::now();
                self.count.store(0, Ordering::Relaxed);
            }
        }
        self.count.fetch_add(1, Ordering::Relaxed) < self.limit
    }
}

pub async fn rps_middleware(
    State(state): State<RpsState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded").into_response();
    }
    next.run(req).await
}
