//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Session`]: synchronization core
//! - [`Driver`]: platform-specific I/O

use relaychat_client::{Environment, Identity, Session, SessionAction, SessionEvent};

use crate::{App, AppAction, Driver, DriverEvent, compose, notify};

/// Generic runtime that orchestrates App, Session and Driver.
///
/// # Type Parameters
///
/// - `D`: platform-specific I/O driver
/// - `E`: environment of the session
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    session: Session<E>,
    /// State changed since the last render.
    dirty: bool,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a runtime.
    pub fn new(driver: D, app: App, session: Session<E>) -> Self {
        Self { driver, app, session, dirty: true }
    }

    /// Run the main event loop until the user quits.
    ///
    /// Connects immediately if the App already has an identity. On exit the
    /// session is torn down and the driver stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        while !self.step().await? {}

        self.shutdown().await
    }

    /// Render once and connect if the App is already logged in.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        self.render()?;

        if let Some(identity) = self.app.identity().cloned() {
            self.connect(identity).await?;
            self.flush()?;
        }
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// 1. Polls the driver for one input
    /// 2. Routes it to the App or the session
    /// 3. Ticks the session with the current time
    /// 4. Renders if anything changed
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let mut quit = false;

        match self.driver.poll_event().await? {
            Some(DriverEvent::App(event)) => {
                let actions = self.app.handle(event);
                quit = self.process_app_actions(actions).await?;
            },
            Some(DriverEvent::Delivery { epoch, frame }) => {
                let actions = self.session.handle(SessionEvent::Delivery { epoch, frame });
                self.execute(actions).await?;
            },
            None => {},
        }

        let now = self.driver.now();
        let actions = self.session.handle(SessionEvent::Tick { now });
        self.execute(actions).await?;

        self.flush()?;
        Ok(quit)
    }

    /// Tear the session down and stop the driver.
    pub async fn shutdown(mut self) -> Result<(), D::Error> {
        let actions = self.session.teardown();
        self.execute(actions).await?;
        self.driver.stop();
        Ok(())
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_app_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            let now = self.driver.now();
            let session_actions = match action {
                AppAction::Render => {
                    self.dirty = true;
                    continue;
                },
                AppAction::Quit => return Ok(true),
                AppAction::Connect { identity } => {
                    self.connect(identity).await?;
                    continue;
                },
                AppAction::Disconnect => self.session.disconnect(),
                AppAction::SendMessage { text } => {
                    self.require_connection();
                    self.session.send_message(&text)
                },
                AppAction::SendPrivate { to, text } => {
                    self.require_connection();
                    match self.session.find_user(&to).map(|user| user.id.clone()) {
                        Some(id) => self.session.send_private_message(id, &text),
                        None => {
                            self.app.set_status(format!("No user named {to}"));
                            Vec::new()
                        },
                    }
                },
                AppAction::Keystroke => self.session.set_typing(true, now),
                AppAction::JoinRoom { room } => {
                    if room == self.session.active_room() {
                        continue;
                    }
                    self.require_connection();
                    self.session.join_room(&room, now)
                },
                AppAction::NextRoom => match self.next_room() {
                    Some(room) => self.session.join_room(&room, now),
                    None => Vec::new(),
                },
                AppAction::LoadOlder => self.session.load_older(),
                AppAction::Attach { path } => self.attach(&path),
            };

            self.execute(session_actions).await?;
        }
        Ok(false)
    }

    async fn connect(&mut self, identity: Identity) -> Result<(), D::Error> {
        let actions = self.session.connect(identity);
        self.execute(actions).await
    }

    fn require_connection(&mut self) {
        if !self.session.connection_state().is_connected() {
            self.app.set_status("Not connected");
        }
    }

    fn next_room(&self) -> Option<String> {
        let rooms = self.session.known_rooms();
        let active = rooms.iter().position(|room| room == self.session.active_room())?;
        let next = rooms.get((active + 1) % rooms.len())?;
        (next != self.session.active_room()).then(|| next.clone())
    }

    fn attach(&mut self, path: &str) -> Vec<SessionAction> {
        let file = match self.driver.describe_file(path) {
            Ok(file) => file,
            Err(err) => {
                self.app.set_status(format!("Cannot attach {path}: {err}"));
                return Vec::new();
            },
        };

        match compose::attachment_label(&file) {
            Ok(label) => {
                self.require_connection();
                self.session.send_message(&label)
            },
            Err(err) => {
                self.app.set_status(err.to_string());
                Vec::new()
            },
        }
    }

    /// Execute actions returned by the session.
    async fn execute(&mut self, actions: Vec<SessionAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                SessionAction::Open { epoch } => self.driver.open(epoch).await?,
                SessionAction::Close => self.driver.close().await?,
                SessionAction::Send(frame) => self.driver.send(frame).await?,
                SessionAction::Appended(message) => {
                    self.dirty = true;
                    let username = self.session.identity().map(|i| i.username.as_str());
                    if let Some(notification) =
                        notify::notification_for(&message, username, self.app.is_focused())
                    {
                        self.driver.notify(notification)?;
                    }
                },
                SessionAction::Changed(field) => {
                    tracing::trace!(%field, "state changed");
                    self.dirty = true;
                },
                SessionAction::Notice(notice) => {
                    self.app.notice(&notice);
                    self.dirty = true;
                },
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), D::Error> {
        if self.dirty { self.render() } else { Ok(()) }
    }

    fn render(&mut self) -> Result<(), D::Error> {
        self.dirty = false;
        self.app.set_log_len(self.session.messages().len());
        self.driver.render(&self.app, &self.session)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the session
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
