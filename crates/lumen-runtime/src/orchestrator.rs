//! Screen/module orchestrator
//!
//! The top-level state machine: routes input, per-tick updates, and
//! rendering between the main menu, the screensaver, and whichever module is
//! active; detects activity timeouts; and coordinates state save/load around
//! transitions.
//!
//! Every call into a module goes through a panic guard. A module that
//! panics inside any contract operation is logged, surfaced as an
//! error-category notification, and the shell drops back to the main menu;
//! one misbehaving application never takes the kiosk down.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use lumen_core::{
    InputEvent, InputOutcome, KioskConfig, Module, ModuleId, Notification, NotificationQueue,
    NotificationView, Notifier, PersistentStore, Surface, TextStyle,
};

use crate::menu::MenuState;
use crate::registry::ModuleRegistry;
use crate::screen::ScreenState;

// ----------------------------------------------------------------------------
// Panic Guard
// ----------------------------------------------------------------------------

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one contract operation under a panic guard.
fn guarded<R>(
    module: &mut dyn Module,
    f: impl FnOnce(&mut dyn Module) -> R,
) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(|| f(module))).map_err(panic_message)
}

// ----------------------------------------------------------------------------
// Orchestrator
// ----------------------------------------------------------------------------

pub struct Orchestrator {
    registry: ModuleRegistry,
    menu: MenuState,
    screen: ScreenState,
    /// Screen to restore when the screensaver is dismissed.
    resume_screen: ScreenState,
    store: PersistentStore,
    queue: NotificationQueue,
    notifier: Notifier,
    notifications: mpsc::UnboundedReceiver<Notification>,
    last_activity: Instant,
    screensaver_timeout: Duration,
}

impl Orchestrator {
    /// Build the orchestrator and run the startup import sweep: every
    /// registered module gets its previously persisted state, if any.
    pub fn new(
        mut registry: ModuleRegistry,
        store: PersistentStore,
        config: &KioskConfig,
        notifier: Notifier,
        notifications: mpsc::UnboundedReceiver<Notification>,
        now: Instant,
    ) -> Self {
        for module in registry.iter_mut() {
            let id = module.id();
            if let Some(value) = store.get(id.key()).cloned() {
                if let Err(message) = guarded(module, |m| m.import_state(value)) {
                    error!(module = %id, message, "state import panicked");
                }
            }
        }

        let menu = MenuState::new(registry.len(), config.items_per_page);
        info!(modules = registry.len(), "orchestrator ready");

        Self {
            registry,
            menu,
            screen: ScreenState::MainMenu,
            resume_screen: ScreenState::MainMenu,
            store,
            queue: NotificationQueue::new(config.notification_capacity),
            notifier,
            notifications,
            last_activity: now,
            screensaver_timeout: config.screensaver_timeout(),
        }
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Handle to feed the notification queue; cloneable for modules and
    /// workers.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route one input event. Any event dismisses the screensaver and is
    /// otherwise swallowed: waking the device must not also act on the
    /// revealed screen.
    pub fn dispatch_input(&mut self, event: &InputEvent, now: Instant) {
        self.last_activity = now;

        if self.screen.is_screensaver() {
            debug!("screensaver dismissed");
            self.screen = self.resume_screen;
            return;
        }

        match self.screen {
            ScreenState::MainMenu => self.handle_menu_input(event),
            ScreenState::ActiveModule(id) => self.handle_module_input(id, event),
            ScreenState::Screensaver { .. } => unreachable!("handled above"),
        }
    }

    fn handle_menu_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Up => self.menu.move_up(),
            InputEvent::Down => self.menu.move_down(),
            InputEvent::Left => self.menu.page_left(),
            InputEvent::Right => self.menu.page_right(),
            InputEvent::Confirm => {
                if let Some(id) = self.registry.id_at(self.menu.selected()) {
                    self.enter_module(id);
                }
            }
            _ => {}
        }
    }

    fn enter_module(&mut self, id: ModuleId) {
        let Some(module) = self.registry.get_mut(id) else {
            return;
        };
        match guarded(module, |m| m.on_enter()) {
            Ok(()) => {
                info!(module = %id, "module entered");
                self.screen = ScreenState::ActiveModule(id);
            }
            Err(message) => self.module_failed(id, "enter", message),
        }
    }

    fn handle_module_input(&mut self, id: ModuleId, event: &InputEvent) {
        let Some(module) = self.registry.get_mut(id) else {
            self.screen = ScreenState::MainMenu;
            return;
        };
        match guarded(module, |m| m.handle_input(event)) {
            Ok(InputOutcome::Stay) => {}
            Ok(InputOutcome::Back) => self.leave_module(id),
            Err(message) => self.module_failed(id, "input", message),
        }
    }

    /// Export and persist the outgoing module's state, then return to the
    /// menu.
    fn leave_module(&mut self, id: ModuleId) {
        self.save_module_state(id);
        self.screen = ScreenState::MainMenu;
        debug!(module = %id, "returned to menu");
    }

    fn save_module_state(&mut self, id: ModuleId) {
        let Some(module) = self.registry.get_mut(id) else {
            return;
        };
        match guarded(module, |m| m.export_state()) {
            Ok(value) => {
                if let Err(err) = self.store.set(id.key(), value) {
                    error!(module = %id, %err, "state save failed");
                    self.notifier
                        .error("Save failed", format!("{} state not saved", id));
                }
            }
            Err(message) => {
                error!(module = %id, message, "state export panicked");
                self.notifier
                    .error("Save failed", format!("{} state not saved", id));
            }
        }
    }

    fn module_failed(&mut self, id: ModuleId, operation: &str, message: String) {
        error!(module = %id, operation, message, "module failure, returning to menu");
        self.notifier
            .error(format!("{} error", id), message);
        self.screen = ScreenState::MainMenu;
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance time-driven state: idle detection, the active module's tick,
    /// and the notification queue.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.queue.enqueue(notification);
        }

        let idle = now.saturating_duration_since(self.last_activity);
        if idle >= self.screensaver_timeout && !self.screen.is_screensaver() {
            info!(idle_secs = idle.as_secs(), "idle timeout, screensaver on");
            self.resume_screen = self.screen;
            self.screen = ScreenState::Screensaver { since: now };
        }

        // The menu has no dynamic state and the screensaver only shows a
        // clock, so module ticks happen only with a module active.
        if let ScreenState::ActiveModule(id) = self.screen {
            if let Some(module) = self.registry.get_mut(id) {
                if let Err(message) = guarded(module, |m| m.tick(now)) {
                    self.module_failed(id, "tick", message);
                }
            }
        }

        self.queue.tick(now);
    }

    // ------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------

    /// Draw the current screen, then overlay pending notifications.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        surface.clear();

        match self.screen {
            ScreenState::MainMenu => self.render_menu(surface),
            ScreenState::Screensaver { .. } => render_screensaver(surface),
            ScreenState::ActiveModule(id) => {
                if let Some(module) = self.registry.get_mut(id) {
                    if let Err(message) = guarded(module, |m| m.render(surface)) {
                        self.module_failed(id, "render", message);
                        self.render_menu(surface);
                    }
                }
            }
        }

        for (slot, notification) in self.queue.pending().enumerate() {
            surface.notification(
                slot,
                &NotificationView {
                    title: &notification.title,
                    message: &notification.message,
                    category: notification.category,
                    opacity: notification.opacity,
                },
            );
        }
    }

    fn render_menu(&self, surface: &mut dyn Surface) {
        let (_, rows) = surface.size();
        surface.text(1, 0, "Lumen", TextStyle::Title);

        let ids = self.registry.ids();
        for (row, index) in self.menu.visible_range().enumerate() {
            let style = if index == self.menu.selected() {
                TextStyle::Highlight
            } else {
                TextStyle::Normal
            };
            let marker = if index == self.menu.selected() { ">" } else { " " };
            let label = format!("{} {}", marker, ids[index].title());
            surface.text(2, 2 + row as u16, &label, style);
        }

        if self.menu.page_count() > 1 {
            let pages = format!("Page {}/{}", self.menu.page() + 1, self.menu.page_count());
            surface.text(2, rows.saturating_sub(2), &pages, TextStyle::Dim);
        }
        surface.text(
            2,
            rows.saturating_sub(1),
            "Up/Down navigate  Left/Right page  Enter select",
            TextStyle::Dim,
        );
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    /// Export every module's state and write one coalesced save.
    pub fn shutdown(&mut self) {
        for id in self.registry.ids() {
            let Some(module) = self.registry.get_mut(id) else {
                continue;
            };
            match guarded(module, |m| m.export_state()) {
                Ok(value) => self.store.put(id.key(), value),
                Err(message) => {
                    error!(module = %id, message, "state export panicked at shutdown")
                }
            }
        }
        if let Err(err) = self.store.save() {
            error!(%err, "final state save failed");
        } else {
            info!("state saved at shutdown");
        }
    }
}

fn render_screensaver(surface: &mut dyn Surface) {
    let (cols, rows) = surface.size();
    let now = chrono::Local::now();

    let time = now.format("%H:%M:%S").to_string();
    let col = cols.saturating_sub(time.len() as u16) / 2;
    surface.text(col, rows / 2, &time, TextStyle::Title);

    let date = now.format("%A, %B %d, %Y").to_string();
    let col = cols.saturating_sub(date.len() as u16) / 2;
    surface.text(col, rows / 2 + 2, &date, TextStyle::Dim);
}
