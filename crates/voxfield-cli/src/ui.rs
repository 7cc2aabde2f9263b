use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;
use voxfield::engine::progress::{Progress, ProgressCallback};

const UI_CHANNEL_CAPACITY: usize = 1024;
const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal progress display and drains [`UiEvent`]s until shutdown.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        Self::with_draw_target(ProgressDrawTarget::stderr_with_hz(12))
    }

    fn with_draw_target(
        target: ProgressDrawTarget,
    ) -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(UI_CHANNEL_CAPACITY);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(target);
        let sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: BarState::default(),
            event_receiver,
            shutdown_receiver,
            sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        if let Some(bar) = self.state.active_bar.take() {
            bar.finish_and_clear();
        }
        self.sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_style(Self::spinner_style());
                pb.set_message(name.to_string());

                self.state.active_bar = Some(pb);
                self.state.base_message = name.to_string();
            }
            Progress::PhaseFinish => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let final_message = format!("✓ {}", self.state.base_message);
                self.mp.println(final_message).ok();

                self.state.base_message.clear();
            }
            Progress::TaskStart { total_steps } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.disable_steady_tick();
                    bar.set_style(Self::bar_style());
                    bar.set_length(total_steps);
                    bar.set_position(0);
                }
            }
            Progress::TaskIncrement => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    if let Some(length) = bar.length() {
                        bar.set_position(length);
                    }
                    bar.finish();
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("━╸ ")
    }
}

/// Forwards engine progress events to the [`UiManager`].
///
/// Events are sent with `try_send`, so a full channel drops the event instead of stalling a
/// worker thread.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> (UiManager, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        UiManager::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn handle_phase_start_creates_new_spinner() {
        let (mut manager, _, _) = setup_manager();
        assert!(manager.state.active_bar.is_none());

        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Preparation",
        }));

        assert!(manager.state.active_bar.is_some());
        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Preparation");
        assert_eq!(manager.state.base_message, "Preparation");
    }

    #[test]
    fn handle_phase_start_replaces_existing_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Preparation",
        }));
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Forward Modelling",
        }));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Forward Modelling");
        assert_eq!(manager.state.base_message, "Forward Modelling");
    }

    #[test]
    fn handle_phase_finish_clears_active_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Preparation",
        }));

        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.base_message.is_empty());
    }

    #[test]
    fn task_events_drive_the_bar() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Forward Modelling",
        }));

        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total_steps: 40 }));
        {
            let bar = manager.state.active_bar.as_ref().unwrap();
            assert_eq!(bar.length(), Some(40));
            assert_eq!(bar.position(), 0);
        }

        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement));
        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement));
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 2);

        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        let bar = manager.state.active_bar.as_ref().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.position(), 40);
    }

    #[test]
    fn task_events_without_a_phase_are_ignored() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total_steps: 5 }));
        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement));
        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        assert!(manager.state.active_bar.is_none());
    }

    #[test]
    fn handle_log_and_message_events_print() {
        let (mut manager, _, _) = setup_manager();
        manager.handle_event(UiEvent::Log("Test log message".to_string()));
        manager.handle_event(UiEvent::Progress(Progress::Message(
            "12 contributing cells".to_string(),
        )));
    }

    #[tokio::test]
    async fn cli_progress_handler_sends_progress_event() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Testing" });

        match receiver.recv().await {
            Some(UiEvent::Progress(Progress::PhaseStart { name })) => assert_eq!(name, "Testing"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_channel_drops_events_without_blocking() {
        let (sender, mut receiver) = mpsc::channel(1);
        let callback = CliProgressHandler::new(sender).get_callback();

        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);

        assert!(matches!(
            receiver.recv().await,
            Some(UiEvent::Progress(Progress::TaskIncrement))
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn manager_stops_on_shutdown_signal() {
        let (manager, sender, shutdown) = setup_manager();
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Progress(Progress::PhaseStart { name: "Survey" }))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("UI manager did not stop")
            .unwrap();
    }
}
