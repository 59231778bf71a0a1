use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::AppState;
use super::terminal::viewport_width_px;

/// Main event handler.
pub fn handle_event(event: Event, state: &mut AppState, now: Instant) {
    match event {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            handle_key(key_event, state, now)
        }
        Event::Resize(..) => {
            if let Ok(width) = viewport_width_px() {
                state.set_viewport_width(width);
            }
        }
        _ => {}
    }
}

fn handle_key(event: KeyEvent, state: &mut AppState, now: Instant) {
    if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return;
    }

    // While zoomed, any key is a tap on the overlay.
    if state.zoom.is_active() {
        state.dismiss_zoom(now);
        return;
    }

    match event.code {
        KeyCode::Char('u') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            state.clear_query(now);
        }
        KeyCode::Char(c)
            if !event
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            state.insert_char(c, now)
        }
        KeyCode::Backspace => state.backspace(now),
        KeyCode::Delete => state.delete(now),
        KeyCode::Left => state.move_left(),
        KeyCode::Right => state.move_right(),
        KeyCode::Home => state.move_home(),
        KeyCode::End => state.move_end(),
        KeyCode::Up => state.results.select_prev(),
        KeyCode::Down => state.results.select_next(),
        KeyCode::PageUp => state.results.select_by(-10),
        KeyCode::PageDown => state.results.select_by(10),
        KeyCode::Enter => {
            state.show_selected_image(now);
        }
        KeyCode::Esc => {
            state.should_quit = true;
        }
        _ => {}
    }
}
