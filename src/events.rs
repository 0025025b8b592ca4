use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;

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
    // If help is shown, any key closes it
    if app.show_help {
        app.toggle_help();
        return;
    }

    // If window input is active, handle text input
    if app.window_input.is_some() {
        handle_window_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Selector focus
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_selector();
            } else {
                app.next_selector();
            }
        }
        KeyCode::BackTab => app.prev_selector(),

        // Change the focused selector
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            app.change_selected(-1)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            app.change_selected(1)
        }

        // Window
        KeyCode::Char('<') | KeyCode::Char('-') => app.halve_window(),
        KeyCode::Char('>') | KeyCode::Char('+') => app.double_window(),
        KeyCode::Char('w') => app.start_window_input(),

        // Zoom
        KeyCode::Char('z') | KeyCode::Esc | KeyCode::Backspace => app.zoom_out(),

        // Fetch now
        KeyCode::Char('r') => app.force_fetch(),

        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("instrument_export.json");
            match app.export_series(&export_path) {
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

/// Handle key input while the window is being typed
fn handle_window_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.confirm_window_input(),
        KeyCode::Esc => app.cancel_window_input(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cancel_window_input();
        }
        KeyCode::Backspace => app.window_input_pop(),
        KeyCode::Char(c) => app.window_input_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Drag across the plot to zoom
        MouseEventKind::Down(MouseButton::Left) => {
            if app.in_plot(mouse.column, mouse.row) {
                app.begin_drag(mouse.column);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => app.update_drag(mouse.column),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(mouse.column),

        // Right-click zooms out
        MouseEventKind::Down(MouseButton::Right) => app.zoom_out(),

        // Scroll wheel changes the focused selector
        MouseEventKind::ScrollUp => app.change_selected(-1),
        MouseEventKind::ScrollDown => app.change_selected(1),

        _ => {}
    }
}
