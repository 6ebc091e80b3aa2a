//! Waiting for newly created services to report ready.
//!
//! Each cycle probes every outstanding service, so the operator always sees
//! the full pending set. Between cycles the poller sleeps according to
//! [`Backoff`]. There is no retry limit and no deadline; only an interrupt
//! ends the wait early.

mod backoff;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

pub use backoff::{Backoff, INITIAL_UNITS, MAX_UNITS};

use crate::gateway::{Broker, Management};

#[derive(Debug, Error)]
pub enum ReadyError {
  #[error("interrupted while waiting for services: {}", pending.join(", "))]
  Interrupted { pending: Vec<String> },
}

/// Readiness of every polled service in one cycle, in polling order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessState {
  states: Vec<(String, bool)>,
}

impl ReadinessState {
  pub fn all_ready(&self) -> bool {
    self.states.iter().all(|(_, ready)| *ready)
  }

  /// Services that are not ready yet.
  pub fn pending(&self) -> Vec<&str> {
    self
      .states
      .iter()
      .filter(|(_, ready)| !ready)
      .map(|(name, _)| name.as_str())
      .collect()
  }
}

/// Summary of a completed wait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessReport {
  /// Number of poll cycles run, including the final successful one.
  pub cycles: u32,
  /// Wait before each retry, in order.
  pub waits: Vec<Duration>,
}

pub struct ReadinessPoller<'a, M, B> {
  management: &'a M,
  broker: &'a B,
  unit: Duration,
}

impl<'a, M: Management, B: Broker> ReadinessPoller<'a, M, B> {
  pub fn new(management: &'a M, broker: &'a B, unit: Duration) -> Self {
    Self {
      management,
      broker,
      unit,
    }
  }

  /// Probe one service. Lookup or transport failures count as not ready.
  pub async fn probe(&self, name: &str) -> bool {
    let guid = match self.management.service_guid(name).await {
      Ok(guid) => guid,
      Err(e) => {
        warn!(service = %name, error = %e, "could not resolve service guid");
        return false;
      }
    };

    match self.broker.is_running(&guid).await {
      Ok(running) => running,
      Err(e) => {
        warn!(service = %name, error = %e, "readiness probe failed");
        false
      }
    }
  }

  /// Probe every service once.
  pub async fn poll_once(&self, names: &[String]) -> ReadinessState {
    let mut states = Vec::with_capacity(names.len());
    for name in names {
      let ready = self.probe(name).await;
      debug!(service = %name, ready, "probed service");
      states.push((name.clone(), ready));
    }
    ReadinessState { states }
  }

  /// Block until every service in `names` is ready, or the process is interrupted.
  pub async fn await_ready(&self, names: &[String]) -> Result<ReadinessReport, ReadyError> {
    let interrupt = async {
      if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for interrupts");
        std::future::pending::<()>().await;
      }
    };
    self.await_ready_until(names, interrupt).await
  }

  /// Like [`await_ready`](Self::await_ready), stopping when `interrupt` completes.
  pub async fn await_ready_until(
    &self,
    names: &[String],
    interrupt: impl Future<Output = ()>,
  ) -> Result<ReadinessReport, ReadyError> {
    let mut report = ReadinessReport::default();
    if names.is_empty() {
      return Ok(report);
    }

    tokio::pin!(interrupt);
    let mut backoff = Backoff::new(self.unit);
    let mut pending: Vec<String> = names.to_vec();

    loop {
      let state = tokio::select! {
        state = self.poll_once(names) => state,
        _ = &mut interrupt => return Err(ReadyError::Interrupted { pending }),
      };
      report.cycles += 1;

      if state.all_ready() {
        info!(services = names.len(), cycles = report.cycles, "all services ready");
        return Ok(report);
      }

      pending = state.pending().into_iter().map(str::to_string).collect();
      let wait = backoff.next().unwrap_or(self.unit * MAX_UNITS);
      info!(
        pending = ?pending,
        wait = %humantime::format_duration(wait),
        "waiting for services to start"
      );
      report.waits.push(wait);

      tokio::select! {
        _ = tokio::time::sleep(wait) => {}
        _ = &mut interrupt => return Err(ReadyError::Interrupted { pending }),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use tracing_test::traced_test;

  use super::*;
  use crate::util::testutil::{Call, FakeCloud};

  const UNIT: Duration = Duration::from_millis(1);

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test]
  async fn empty_list_returns_immediately() {
    let cloud = FakeCloud::new();
    let poller = ReadinessPoller::new(&cloud, &cloud, UNIT);

    let report = poller.await_ready_until(&[], std::future::pending::<()>()).await.unwrap();

    assert_eq!(report, ReadinessReport::default());
    assert!(cloud.calls().is_empty());
  }

  #[tokio::test]
  #[traced_test]
  async fn waits_follow_backoff_until_ready() {
    let cloud = FakeCloud::new().with_readiness("db", &[false, false, false, false, true]);
    let poller = ReadinessPoller::new(&cloud, &cloud, UNIT);

    let report = poller
      .await_ready_until(&names(&["db"]), std::future::pending::<()>())
      .await
      .unwrap();

    assert_eq!(report.cycles, 5);
    assert_eq!(
      report.waits,
      vec![
        Duration::from_millis(2),
        Duration::from_millis(4),
        Duration::from_millis(8),
        Duration::from_millis(15),
      ]
    );
    assert!(logs_contain("waiting for services to start"));
    assert!(logs_contain("all services ready"));
  }

  #[tokio::test]
  async fn every_cycle_queries_every_service() {
    let cloud = FakeCloud::new()
      .with_readiness("db", &[true])
      .with_readiness("cache", &[false, false, true]);
    let poller = ReadinessPoller::new(&cloud, &cloud, UNIT);

    let report = poller
      .await_ready_until(&names(&["db", "cache"]), std::future::pending::<()>())
      .await
      .unwrap();

    assert_eq!(report.cycles, 3);
    let probes: Vec<_> = cloud
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::IsRunning(guid) => Some(guid),
        _ => None,
      })
      .collect();
    assert_eq!(
      probes,
      vec!["guid-db", "guid-cache", "guid-db", "guid-cache", "guid-db", "guid-cache"]
    );
  }

  #[tokio::test]
  async fn poll_once_reports_pending_services() {
    let cloud = FakeCloud::new().with_readiness("cache", &[false]);
    let poller = ReadinessPoller::new(&cloud, &cloud, UNIT);

    let state = poller.poll_once(&names(&["db", "cache"])).await;

    assert!(!state.all_ready());
    assert_eq!(state.pending(), vec!["cache"]);
  }

  #[tokio::test]
  async fn interrupt_aborts_with_pending_services() {
    let cloud = FakeCloud::new().with_readiness("db", &[false]);
    let poller = ReadinessPoller::new(&cloud, &cloud, Duration::from_secs(60));

    let interrupt = tokio::time::sleep(Duration::from_millis(20));
    let err = poller.await_ready_until(&names(&["db"]), interrupt).await.unwrap_err();

    let ReadyError::Interrupted { pending } = err;
    assert_eq!(pending, vec!["db".to_string()]);
  }
}
