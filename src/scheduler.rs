//! Browser tick scheduler built on `gloo_timers`.

use crate::TickScheduler;
use gloo_timers::callback::Interval;
use log::debug;
use yew::Callback;

/// Emits `on_tick` every interval while scheduled.
///
/// Each firing is pushed onto the local task queue instead of running inside
/// the timer closure, so the receiver may cancel this scheduler (dropping the
/// `Interval`) from its tick handler.
pub struct IntervalScheduler {
    on_tick: Callback<()>,
    handle: Option<Interval>,
}

impl IntervalScheduler {
    pub fn new(on_tick: Callback<()>) -> Self {
        Self {
            on_tick,
            handle: None,
        }
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, interval_ms: u32) {
        // Dropping the previous handle clears its interval.
        self.cancel();

        let on_tick = self.on_tick.clone();
        let handle = Interval::new(interval_ms, move || {
            let on_tick = on_tick.clone();
            wasm_bindgen_futures::spawn_local(async move {
                on_tick.emit(());
            });
        });
        self.handle = Some(handle);
        debug!("Tick interval scheduled every {} ms", interval_ms);
    }

    fn cancel(&mut self) {
        if self.handle.take().is_some() {
            debug!("Tick interval cancelled");
        }
    }

    fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }
}
