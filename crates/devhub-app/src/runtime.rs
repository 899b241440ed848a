//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: view state machine
//! - [`Driver`]: platform-specific I/O, including the realtime client

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App<D::Instant>,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime with the given driver.
    pub fn new(driver: D) -> Self {
        Self { driver, app: App::new() }
    }

    /// Run the main event loop until the App asks to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to poll or render. Failed
    /// subscriptions and typing sends are reported to the App instead.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let Some(event) = self.driver.poll_event().await? else {
            return Ok(false);
        };

        self.dispatch(event).await
    }

    /// Feed one event to the App and execute what it asks for.
    ///
    /// Returns `true` if the application should quit.
    pub async fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let now = self.driver.now();
        let actions = self.app.handle(event, now);
        self.process_actions(actions).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect { topic_id } => {
                        if let Err(e) = self.driver.connect(&topic_id).await {
                            tracing::error!(%topic_id, error = %e, "subscription failed");
                            let now = self.driver.now();
                            let event = AppEvent::Error { message: e.to_string() };
                            pending_actions.extend(self.app.handle(event, now));
                        }
                    },
                    AppAction::Disconnect => self.driver.disconnect(),
                    AppAction::SendTyping { is_typing } => {
                        if let Err(e) = self.driver.send_typing(is_typing).await {
                            tracing::warn!(is_typing, error = %e, "typing indicator not sent");
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<D::Instant> {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App<D::Instant> {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
