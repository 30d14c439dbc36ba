use bevy::prelude::*;
use constants::loading::PROGRESS_HIDE_DELAY_SECS;
use std::time::Duration;

use crate::rpc::web_rpc::WebRpcInterface;

/// Loader bar state: percentage shown and whether the bar is on screen.
#[derive(Resource, Debug, Clone)]
pub struct LoadingProgress {
    percent: u8,
    visible: bool,
    hide_delay: f32,
    hide_timer: Option<Timer>,
}

impl Default for LoadingProgress {
    fn default() -> Self {
        Self::with_hide_delay(PROGRESS_HIDE_DELAY_SECS)
    }
}

impl LoadingProgress {
    pub fn with_hide_delay(hide_delay: f32) -> Self {
        Self {
            percent: 0,
            visible: true,
            hide_delay: hide_delay.max(0.0),
            hide_timer: None,
        }
    }

    /// Show the bar again at 0% for a new load.
    pub fn begin(&mut self) {
        self.percent = 0;
        self.visible = true;
        self.hide_timer = None;
    }

    /// Record a completion fraction and return the percentage now displayed.
    ///
    /// The first time 100% is reached the hide timer starts.
    pub fn report(&mut self, fraction: f32) -> u8 {
        self.percent = fraction_to_percent(fraction);
        if self.percent == 100 && self.hide_timer.is_none() {
            self.hide_timer = Some(Timer::from_seconds(self.hide_delay, TimerMode::Once));
        }
        self.percent
    }

    /// Advance the hide timer. Returns true on the tick the bar gets hidden.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.hide_timer.as_mut() else {
            return false;
        };
        if !self.visible {
            return false;
        }
        timer.tick(delta);
        if timer.finished() {
            self.visible = false;
            return true;
        }
        false
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Convert a load fraction in `[0, 1]` to a whole percentage.
pub fn fraction_to_percent(fraction: f32) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn tick_loading_progress(time: Res<Time>, mut progress: ResMut<LoadingProgress>) {
    // Avoid flagging change detection every frame.
    if !progress.is_visible() || progress.percent() < 100 {
        return;
    }
    if progress.tick(time.delta()) {
        debug!("Loader hidden");
    }
}

/// Mirror progress changes to the host frontend.
pub fn update_loading_frontend(
    progress: Res<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last_sent: Local<Option<u8>>,
) {
    if !progress.is_changed() {
        return;
    }
    let percent = progress.percent();
    if *last_sent == Some(percent) {
        return;
    }
    *last_sent = Some(percent);
    rpc_interface.send_notification(
        "loading_progress",
        serde_json::json!({
            "percent": percent
        }),
    );
}
