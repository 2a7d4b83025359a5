//! Runs lookups off the caller's task, keeping only the newest one alive.

use std::sync::Arc;

use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    error::WeatherError,
    model::{DisplayUnits, FormattedReport},
    pipeline::WeatherLookup,
};

/// Handle to the outcome of one submitted lookup.
#[derive(Debug)]
pub struct Ticket {
    pub id: u64,
    rx: oneshot::Receiver<Result<FormattedReport, WeatherError>>,
}

impl Ticket {
    /// Wait for the lookup. Resolves to `Cancelled` if it was superseded or cancelled.
    pub async fn outcome(self) -> Result<FormattedReport, WeatherError> {
        self.rx.await.unwrap_or(Err(WeatherError::Cancelled))
    }
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    handle: JoinHandle<()>,
}

/// Single-flight lookup runner: a new submission aborts the previous one.
#[derive(Debug)]
pub struct LookupSession {
    lookup: Arc<WeatherLookup>,
    in_flight: Option<InFlight>,
    next_id: u64,
}

impl LookupSession {
    pub fn new(lookup: WeatherLookup) -> Self {
        Self { lookup: Arc::new(lookup), in_flight: None, next_id: 1 }
    }

    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, city: impl Into<String>, units: DisplayUnits) -> Ticket {
        self.cancel();

        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = oneshot::channel();
        let lookup = Arc::clone(&self.lookup);
        let city = city.into();

        let handle = tokio::spawn(async move {
            let result = lookup.lookup(&city, units).await;
            // The receiver may already be gone; nothing to do then.
            let _ = tx.send(result);
        });

        tracing::debug!(id, "lookup submitted");
        self.in_flight = Some(InFlight { id, handle });
        Ticket { id, rx }
    }

    /// Abort the in-flight lookup, if any. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(prev) if !prev.handle.is_finished() => {
                tracing::debug!(id = prev.id, "cancelling in-flight lookup");
                prev.handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|f| !f.handle.is_finished())
    }
}

impl Drop for LookupSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
