//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Esc => {
            app.directory.dismiss_error();
            app.status_message = None;
        }

        KeyCode::Char('r') | KeyCode::F(5) => app.refresh(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),

        KeyCode::Left | KeyCode::Char('h') => app.select_prev(),
        KeyCode::Right | KeyCode::Char('l') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_up(),
        KeyCode::Down | KeyCode::Char('j') => app.select_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, users};
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let (mut app, _source, _store) = app_with(Vec::new(), Vec::new(), false);

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, _source, _store) = app_with(Vec::new(), Vec::new(), false);
        app.directory.users = users("u", 4);

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.selection, 0);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_escape_dismisses_error() {
        let (mut app, _source, _store) = app_with(Vec::new(), Vec::new(), false);
        app.directory.error = Some("Failed to delete user".to_string());

        press(&mut app, KeyCode::Esc);
        assert!(app.directory.error.is_none());
    }

    #[test]
    fn test_arrow_keys_move_selection() {
        let (mut app, _source, _store) = app_with(Vec::new(), Vec::new(), false);
        app.directory.users = users("u", 6);
        app.grid_columns = 2;

        press(&mut app, KeyCode::Down);
        assert_eq!(app.selection, 2);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.selection, 3);
        press(&mut app, KeyCode::End);
        assert_eq!(app.selection, 5);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.selection, 0);
    }

    #[tokio::test]
    async fn test_refresh_key_starts_refresh() {
        let (mut app, _source, _store) = app_with(Vec::new(), users("n", 3), false);

        press(&mut app, KeyCode::Char('r'));
        assert!(app.directory.loading);

        app.wait_for_background_task().await;
        assert_eq!(app.directory.users.len(), 3);
    }
}
