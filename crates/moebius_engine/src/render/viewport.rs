//! Viewport size and debounced resize handling
//!
//! Hosts report size changes through a [`ResizeSender`] (any thread). The
//! frame loop owns the [`ViewportController`], drains the channel once per
//! frame and only adopts a size after no newer report arrived for the
//! debounce interval.
//!
//! Time is passed in explicitly as the duration since scene start so the
//! behaviour is identical under a fixed-step headless clock.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::foundation::math::Vec2;

/// Default resize debounce
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Drawable size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1 for a degenerate size
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size as the resolution uniform
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// A new drawable size reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    /// Reported size
    pub viewport: Viewport,
}

/// Sending half of the resize channel
pub type ResizeSender = Sender<ResizeEvent>;

/// One pending payload with a due time; scheduling again replaces it
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask<T> {
    pending: Option<(Duration, T)>,
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> ScheduledTask<T> {
    /// Create an idle task
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire `delay` after `now`
    ///
    /// Returns the payload that was cancelled, if one was pending.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> Option<T> {
        self.pending
            .replace((now.saturating_add(delay), payload))
            .map(|(_, cancelled)| cancelled)
    }

    /// Drop the pending payload
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Whether something is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Due time of the pending payload
    pub fn due(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Take the payload if it is due at `now`
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match self.pending {
            Some((due, _)) if due <= now => self.cancel(),
            _ => None,
        }
    }
}

/// Owns the current viewport and the debounce state
#[derive(Debug)]
pub struct ViewportController {
    viewport: Viewport,
    debounce: Duration,
    sender: ResizeSender,
    receiver: Receiver<ResizeEvent>,
    pending: ScheduledTask<Viewport>,
}

impl ViewportController {
    /// Create a controller with an initial size
    pub fn new(initial: Viewport, debounce: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            viewport: initial,
            debounce,
            sender,
            receiver,
            pending: ScheduledTask::new(),
        }
    }

    /// A handle hosts use to report resizes
    pub fn sender(&self) -> ResizeSender {
        self.sender.clone()
    }

    /// Current applied viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether a resize is waiting out its debounce
    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Drain reports and apply a settled size
    ///
    /// Returns the new viewport when it changed at this call.
    pub fn poll(&mut self, now: Duration) -> Option<Viewport> {
        while let Ok(ResizeEvent { viewport }) = self.receiver.try_recv() {
            if viewport.width == 0 || viewport.height == 0 {
                log::warn!("Ignoring resize to {}x{}", viewport.width, viewport.height);
                continue;
            }
            if self.pending.schedule(now, self.debounce, viewport).is_some() {
                log::trace!("Resize rescheduled to {}x{}", viewport.width, viewport.height);
            }
        }

        let settled = self.pending.poll(now)?;
        if settled == self.viewport {
            return None;
        }
        log::debug!(
            "Viewport resized {}x{} -> {}x{}",
            self.viewport.width,
            self.viewport.height,
            settled.width,
            settled.height
        );
        self.viewport = settled;
        Some(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn report(sender: &ResizeSender, width: u32, height: u32) {
        sender
            .send(ResizeEvent {
                viewport: Viewport::new(width, height),
            })
            .unwrap();
    }

    #[test]
    fn test_task_reschedule_cancels_previous() {
        let mut task = ScheduledTask::new();
        assert_eq!(task.schedule(ms(0), ms(100), 1), None);
        assert_eq!(task.schedule(ms(50), ms(100), 2), Some(1));
        assert_eq!(task.poll(ms(120)), None);
        assert_eq!(task.poll(ms(150)), Some(2));
        assert!(!task.is_pending());
    }

    #[test]
    fn test_latest_size_wins_after_quiet_period() {
        let mut controller = ViewportController::new(Viewport::new(800, 600), DEFAULT_RESIZE_DEBOUNCE);
        let sender = controller.sender();

        report(&sender, 1024, 768);
        assert_eq!(controller.poll(ms(0)), None);
        report(&sender, 1280, 720);
        assert_eq!(controller.poll(ms(60)), None);
        // 100 ms after the first report but only 40 ms after the second
        assert_eq!(controller.poll(ms(100)), None);
        assert_eq!(controller.viewport(), Viewport::new(800, 600));

        assert_eq!(controller.poll(ms(160)), Some(Viewport::new(1280, 720)));
        assert_eq!(controller.viewport().aspect(), 1280.0 / 720.0);
        assert!(!controller.has_pending());
    }

    #[test]
    fn test_reports_from_another_thread() {
        let mut controller = ViewportController::new(Viewport::new(8, 8), Duration::ZERO);
        let sender = controller.sender();
        std::thread::spawn(move || report(&sender, 16, 9)).join().unwrap();
        assert_eq!(controller.poll(ms(1)), Some(Viewport::new(16, 9)));
    }

    #[test]
    fn test_zero_and_unchanged_sizes_are_ignored() {
        let mut controller = ViewportController::new(Viewport::new(8, 8), Duration::ZERO);
        let sender = controller.sender();
        report(&sender, 0, 10);
        report(&sender, 8, 8);
        assert_eq!(controller.poll(ms(0)), None);
        assert_eq!(Viewport::new(0, 5).aspect(), 1.0);
    }
}
