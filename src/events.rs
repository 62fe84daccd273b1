use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// File written by the export key.
pub const EXPORT_FILE: &str = "spark-console-export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Position selection
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Polling
        KeyCode::Char('p') => app.toggle_pause(),

        // Theme
        KeyCode::Char('t') => app.toggle_theme(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_surface(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Handle;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_esc_closes_help_before_quitting() {
        let mut app = App::new(Vec::new(), Handle::current());

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_pause_and_theme_keys() {
        let mut app = App::new(Vec::new(), Handle::current());
        let light = app.theme.light;

        press(&mut app, KeyCode::Char('p'));
        assert!(app.paused);
        assert_eq!(app.get_status_message(), Some("Polling paused"));
        press(&mut app, KeyCode::Char('p'));
        assert!(!app.paused);

        press(&mut app, KeyCode::Char('t'));
        assert_ne!(app.theme.light, light);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = App::new(Vec::new(), Handle::current());
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(!app.running);
    }
}
