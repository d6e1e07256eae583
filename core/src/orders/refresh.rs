// core/src/orders/refresh.rs

//! Background polling of the order board.

use crate::orders::view_model::OrderListViewModel;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, Instrument};

struct RefreshTask {
  stop: watch::Sender<bool>,
  handle: JoinHandle<()>,
}

/// Repeating silent load plus active sweep while enabled.
///
/// Turning it off only prevents future ticks; a tick already running finishes
/// on its own. Dropping the refresher turns it off.
pub struct AutoRefresher {
  vm: OrderListViewModel,
  period: Duration,
  ticks: Arc<watch::Sender<u64>>,
  task: Option<RefreshTask>,
}

impl AutoRefresher {
  pub fn new(vm: OrderListViewModel, period: Duration) -> Self {
    let (ticks, _) = watch::channel(0);
    Self {
      vm,
      period,
      ticks: Arc::new(ticks),
      task: None,
    }
  }

  pub fn is_running(&self) -> bool {
    self.task.is_some()
  }

  /// Completed tick count, bumped after each load and sweep.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.ticks.subscribe()
  }

  /// Must be called from within a Tokio runtime when enabling.
  pub fn set_enabled(&mut self, enabled: bool) {
    self.vm.set_auto_refresh_flag(enabled);
    if enabled && self.task.is_none() {
      self.task = Some(self.spawn());
      info!(period_ms = self.period.as_millis() as u64, "Auto refresh enabled.");
    } else if !enabled {
      if let Some(task) = self.task.take() {
        let _ = task.stop.send(true);
        info!("Auto refresh disabled.");
      }
    }
  }

  /// Disables the refresher and waits for a running tick to finish.
  pub async fn shutdown(mut self) {
    self.vm.set_auto_refresh_flag(false);
    if let Some(task) = self.task.take() {
      let _ = task.stop.send(true);
      let _ = task.handle.await;
    }
  }

  fn spawn(&self) -> RefreshTask {
    let (stop, stop_rx) = watch::channel(false);
    let vm = self.vm.clone();
    let ticks = self.ticks.clone();
    let period = self.period;
    let handle = tokio::spawn(run_ticks(vm, period, ticks, stop_rx).instrument(tracing::debug_span!("auto_refresh")));
    RefreshTask { stop, handle }
  }
}

impl Drop for AutoRefresher {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      let _ = task.stop.send(true);
    }
  }
}

impl std::fmt::Debug for AutoRefresher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AutoRefresher")
      .field("period", &self.period)
      .field("running", &self.is_running())
      .finish()
  }
}

async fn run_ticks(
  vm: OrderListViewModel,
  period: Duration,
  ticks: Arc<watch::Sender<u64>>,
  mut stop: watch::Receiver<bool>,
) {
  let mut interval = interval_at(Instant::now() + period, period);
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      biased;
      changed = stop.changed() => {
        if changed.is_err() || *stop.borrow() {
          break;
        }
      }
      _ = interval.tick() => {
        vm.load(true).await;
        let swept = vm.reconcile_active_sweep().await;
        ticks.send_modify(|n| *n += 1);
        debug!(swept, "Auto refresh tick finished.");
      }
    }
  }
  debug!("Auto refresh loop stopped.");
}
