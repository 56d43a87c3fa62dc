use std::time::{Duration, SystemTime};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::export::default_export_path;

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
        app.show_help = false;
        return;
    }

    // The add-host form captures all input while open
    if app.form.is_some() {
        handle_form_input(app, key);
        return;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow scrolling through hosts while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Map),
        KeyCode::Char('2') => app.set_view(View::Hosts),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Enter detail overlay
        KeyCode::Enter => app.enter_detail(),

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Force redraw; also picks up a round that landed between polls
        KeyCode::Char('r') => {
            let _ = app.reload_data();
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting (Hosts view)
        KeyCode::Char('s') => {
            if app.current_view == View::Hosts {
                app.cycle_sort();
            }
        }
        KeyCode::Char('S') => {
            if app.current_view == View::Hosts {
                app.toggle_sort_direction();
            }
        }

        // Filter (start typing to filter)
        KeyCode::Char('/') => {
            app.set_view(View::Hosts);
            app.start_filter();
        }

        // Clear filter
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        // Add host
        KeyCode::Char('n') => app.open_form(),

        // Export
        KeyCode::Char('e') => {
            let export_path = default_export_path(SystemTime::now());
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while the add-host form is open
fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.focus_next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.focus_prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.form.as_mut() {
                form.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form.as_mut() {
                form.push(c);
            }
        }
        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        // Backspace
        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        // Type characters
        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Hosts table rows start after the block border and table header
            if app.current_view == View::Hosts && clicked_row > content_start_row + 1 {
                let item_row = (clicked_row - content_start_row - 2) as usize;
                if item_row < app.visible_rows().len() {
                    app.selected_host_index = item_row;
                }
            }

            // Check for tab clicks (row 1, after header)
            if clicked_row == 1 {
                let col = mouse.column;
                // Approximate tab positions: Map (0-7), Hosts (8-17)
                if col < 8 {
                    app.set_view(View::Map);
                } else if col < 18 {
                    app.set_view(View::Hosts);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => {
            app.go_back();
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn help_swallows_next_key() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn form_captures_typing_until_escape() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert!(app.form.is_some());

        // 'q' is text while the form is open
        for c in "qa".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Tab));
        handle_key_event(&mut app, key(KeyCode::Char('x')));

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.values[0], "qa");
        assert_eq!(form.values[1], "x");
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.form.is_none());
    }

    #[test]
    fn form_enter_submits() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        app.form
            .as_mut()
            .unwrap()
            .set_values(["lab", "192.0.2.10", "51.5", "-0.1", "London"]);
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert!(app.form.is_none());
        assert!(app.registry.read().get("lab").is_some());
    }

    #[test]
    fn tabs_and_number_keys_switch_views() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Hosts);
        handle_key_event(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.current_view, View::Map);
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::Hosts);
    }

    #[test]
    fn sort_keys_only_apply_on_hosts_view() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.sort_column, crate::ui::SortColumn::Name);

        app.set_view(View::Hosts);
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        handle_key_event(&mut app, key(KeyCode::Char('S')));
        assert_eq!(app.sort_column, crate::ui::SortColumn::Last);
        assert!(!app.sort_ascending);
    }

    #[test]
    fn filter_mode_collects_text() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        assert_eq!(app.current_view, View::Hosts);

        for c in "eu".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.filter_text, "eu");

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn detail_overlay_closes_on_escape() {
        let mut app = test_app();
        app.set_view(View::Hosts);
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_host_index, 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Hosts);
    }

    #[test]
    fn q_quits() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn mouse_clicks_switch_tabs_and_select_rows() {
        let mut app = test_app();
        handle_mouse_event(&mut app, click(10, 1), 2);
        assert_eq!(app.current_view, View::Hosts);

        // Border at row 2, table header at row 3, first host at row 4
        handle_mouse_event(&mut app, click(20, 6), 2);
        assert_eq!(app.selected_host_index, 2);

        handle_mouse_event(&mut app, click(2, 1), 2);
        assert_eq!(app.current_view, View::Map);
    }
}
