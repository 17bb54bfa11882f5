use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{contains, App, AppMode, PreviewFocus};
use crate::components::attachment_list::scroll_for;
use crate::navigation::Direction;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Help => handle_help_key(app, key),
        AppMode::ConfirmDelete { .. } => handle_confirm_key(app, key, now),
        AppMode::Normal if app.is_preview_open() => handle_preview_key(app, key, now),
        AppMode::Normal => handle_list_key(app, key, now),
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => app.mode = AppMode::Normal,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_help(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_help(false),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(now),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_dialog(),
        _ => {}
    }
}

fn is_submit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('S')
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn handle_list_key(app: &mut App, key: KeyEvent, now: Instant) {
    let holding = app.reorder.picked_up_index().is_some();

    if holding {
        match key.code {
            KeyCode::Down => {
                app.keyboard_move(Direction::Next, now);
            }
            KeyCode::Up => {
                app.keyboard_move(Direction::Prev, now);
            }
            // Cursor only: Space then drops the held item onto the cursor.
            KeyCode::Char('j') => app.select_next(),
            KeyCode::Char('k') => app.select_previous(),
            KeyCode::Char(' ') => {
                app.keyboard_activate(app.selected, now);
            }
            KeyCode::Esc => {
                app.keyboard_escape(now);
            }
            _ => {}
        }
        return;
    }

    if is_submit(&key) {
        app.submit();
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.selected = 0,
        KeyCode::Char('G') | KeyCode::End => app.selected = app.store.len().saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('p') => app.open_preview(app.selected, now),
        KeyCode::Char(' ') => {
            app.keyboard_activate(app.selected, now);
        }
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(now),
        KeyCode::Char('?') => app.open_help(),
        _ => {}
    }
}

fn handle_preview_key(app: &mut App, key: KeyEvent, now: Instant) {
    let focus = match &app.preview {
        Some(p) => p.focus,
        None => return,
    };

    if let Some(held) = app.reorder.picked_up_index() {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                app.keyboard_move(Direction::Prev, now);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.keyboard_move(Direction::Next, now);
            }
            KeyCode::Tab => app.move_thumbnail_focus(Direction::Next),
            KeyCode::BackTab => app.move_thumbnail_focus(Direction::Prev),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let target = match focus {
                    PreviewFocus::Thumbnails { focused } => focused,
                    PreviewFocus::Image => held,
                };
                app.keyboard_activate(target, now);
            }
            KeyCode::Esc => {
                app.keyboard_escape(now);
            }
            _ => {}
        }
        return;
    }

    if is_submit(&key) {
        app.submit();
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_preview_focus(),
        KeyCode::Char('s') => app.save_current(now),
        KeyCode::Char('d') | KeyCode::Delete if app.reorder.dragged_index().is_some() => {}
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(now),
        KeyCode::Char('q') => app.close_preview(),
        KeyCode::Char('?') => app.open_help(),
        _ => match focus {
            PreviewFocus::Image => match key.code {
                KeyCode::Char('h') => app.navigation_key(KeyCode::Left, now),
                KeyCode::Char('l') => app.navigation_key(KeyCode::Right, now),
                code => app.navigation_key(code, now),
            },
            PreviewFocus::Thumbnails { focused } => match key.code {
                KeyCode::Left | KeyCode::Char('h') => app.move_thumbnail_focus(Direction::Prev),
                KeyCode::Right | KeyCode::Char('l') => app.move_thumbnail_focus(Direction::Next),
                KeyCode::Enter => app.select_thumbnail(focused, now),
                KeyCode::Char(' ') => {
                    app.keyboard_activate(focused, now);
                }
                KeyCode::Esc => app.close_preview(),
                _ => {}
            },
        },
    }
}

/// Handle a mouse event.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, now: Instant) {
    if app.mode != AppMode::Normal {
        return;
    }
    if app.is_preview_open() {
        handle_preview_mouse(app, mouse, now);
    } else {
        handle_list_mouse(app, mouse, now);
    }
}

fn handle_preview_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = app.layout.thumbnail_at(column, row) {
                app.pointer_press = Some(index);
            } else if contains(app.layout.image, column, row) {
                app.click_image(column, now);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(index) = app.pointer_press {
                if app.reorder.dragged_index().is_none() {
                    app.pointer_pick_up(index, now);
                }
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let pressed = app.pointer_press.take();
            let over = app.layout.thumbnail_at(column, row);
            if app.reorder.dragged_index().is_some() {
                match over {
                    Some(index) => {
                        app.pointer_drop(index, now);
                    }
                    None => app.pointer_cancel(),
                }
            } else if let (Some(pressed), Some(over)) = (pressed, over) {
                if pressed == over {
                    app.select_thumbnail(over, now);
                }
            }
        }
        MouseEventKind::ScrollDown => {
            app.navigate(Direction::Next, now);
        }
        MouseEventKind::ScrollUp => {
            app.navigate(Direction::Prev, now);
        }
        _ => {}
    }
}

fn handle_list_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let list = app.layout.list;
            // Rows start below the top border.
            if !contains(list, mouse.column, mouse.row) || mouse.row <= list.y {
                return;
            }
            let visible = list.height.saturating_sub(2) as usize;
            let index = scroll_for(app.selected, visible) + (mouse.row - list.y - 1) as usize;
            if index >= app.store.len() {
                return;
            }
            if index == app.selected {
                app.open_preview(index, now);
            } else {
                app.selected = index;
            }
        }
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with_images;
    use crate::reorder::ReorderState;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use ratatui::layout::Rect;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn names(app: &App) -> Vec<String> {
        app.store.items().iter().map(|i| i.name().to_string()).collect()
    }

    /// Fake a rendered preview: image on top, three 10-wide thumbnails below.
    fn fake_layout(app: &mut App) {
        app.layout.image = Rect::new(0, 0, 30, 10);
        app.layout.thumbnails = (0..app.store.len())
            .map(|i| (i, Rect::new(i as u16 * 10, 12, 10, 3)))
            .collect();
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = app_with_images(&["a"]);
        app.open_help();
        let mut ev = key(KeyCode::Char('c'));
        ev.modifiers = KeyModifiers::CONTROL;
        handle_key_event(&mut app, ev, Instant::now());
        assert!(app.should_quit);
    }

    #[test]
    fn enter_opens_preview_and_escape_closes() {
        let mut app = app_with_images(&["a", "b"]);
        let now = Instant::now();
        handle_key_event(&mut app, key(KeyCode::Down), now);
        handle_key_event(&mut app, key(KeyCode::Enter), now);
        assert_eq!(app.current_index(), Some(1));

        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert!(!app.is_preview_open());
        assert_eq!(app.registry.live_count(), 0);
    }

    #[test]
    fn arrows_navigate_with_cooldown() {
        let mut app = app_with_images(&["a", "b", "c"]);
        let now = Instant::now();
        app.open_preview(0, now);

        handle_key_event(&mut app, key(KeyCode::Right), now);
        handle_key_event(&mut app, key(KeyCode::Right), now + Duration::from_millis(50));
        assert_eq!(app.current_index(), Some(1));

        let later = now + Duration::from_millis(300);
        app.tick(later);
        handle_key_event(&mut app, key(KeyCode::Left), later);
        let after = later + Duration::from_millis(300);
        app.tick(after);
        handle_key_event(&mut app, key(KeyCode::Left), after);
        assert_eq!(app.current_index(), Some(2));
    }

    #[test]
    fn keyboard_reorder_through_thumbnail_strip() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        app.open_preview(0, now);

        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        assert_eq!(app.reorder.state(), ReorderState::PickedUp { index: 0 });
        handle_key_event(&mut app, key(KeyCode::Right), now);
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);

        assert_eq!(names(&app), vec!["B", "A", "C"]);
        assert_eq!(app.reorder.state(), ReorderState::Idle);
        assert_eq!(app.current_index(), Some(1));
    }

    #[test]
    fn escape_while_holding_cancels_without_closing() {
        let mut app = app_with_images(&["A", "B"]);
        let now = Instant::now();
        app.open_preview(0, now);
        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        handle_key_event(&mut app, key(KeyCode::Esc), now);

        assert!(app.is_preview_open());
        assert_eq!(app.reorder.state(), ReorderState::Idle);
        assert_eq!(app.announcer.message(), Some("Cancelled move operation"));

        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert!(!app.is_preview_open());
    }

    #[test]
    fn list_keyboard_reorder() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        handle_key_event(&mut app, key(KeyCode::Down), now);
        handle_key_event(&mut app, key(KeyCode::Down), now);
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        assert_eq!(names(&app), vec!["B", "C", "A"]);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn confirm_dialog_keys() {
        let mut config = crate::config::AppConfig::default();
        config.general.confirm_delete = Some(true);
        let mut app = App::new(config);
        app.stage_urls(vec!["https://example.com/a.png".into()]);
        let now = Instant::now();

        handle_key_event(&mut app, key(KeyCode::Char('d')), now);
        handle_key_event(&mut app, key(KeyCode::Char('n')), now);
        assert_eq!(app.store.len(), 1);

        handle_key_event(&mut app, key(KeyCode::Char('d')), now);
        handle_key_event(&mut app, key(KeyCode::Char('y')), now);
        assert!(app.store.is_empty());
    }

    #[test]
    fn click_thirds_of_image() {
        let mut app = app_with_images(&["a", "b", "c"]);
        let now = Instant::now();
        app.open_preview(1, now);
        fake_layout(&mut app);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 15, 5), now);
        assert_eq!(app.current_index(), Some(1));

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 5), now);
        assert_eq!(app.current_index(), Some(0));
    }

    #[test]
    fn drag_thumbnail_onto_another() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        app.open_preview(0, now);
        fake_layout(&mut app);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 13), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 12, 13), now);
        assert_eq!(app.reorder.dragged_index(), Some(0));
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 25, 13), now);

        assert_eq!(names(&app), vec!["B", "C", "A"]);
        assert_eq!(app.current_index(), Some(2));
        assert_eq!(app.reorder.state(), ReorderState::Idle);
    }

    #[test]
    fn drag_released_off_strip_is_cancelled() {
        let mut app = app_with_images(&["A", "B"]);
        let now = Instant::now();
        app.open_preview(0, now);
        fake_layout(&mut app);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 13), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 5, 5), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 5, 5), now);

        assert_eq!(names(&app), vec!["A", "B"]);
        assert_eq!(app.reorder.state(), ReorderState::Idle);
    }

    #[test]
    fn plain_click_on_thumbnail_selects_it() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        app.open_preview(0, now);
        fake_layout(&mut app);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 22, 13), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 22, 13), now);

        assert_eq!(app.current_index(), Some(2));
        assert_eq!(names(&app), vec!["A", "B", "C"]);
    }

    #[test]
    fn list_click_selects_then_opens() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        app.layout.list = Rect::new(0, 0, 40, 10);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2), now);
        assert_eq!(app.selected, 1);
        assert!(!app.is_preview_open());

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2), now);
        assert_eq!(app.current_index(), Some(1));
    }

    #[test]
    fn delete_is_ignored_while_dragging() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        app.open_preview(0, now);
        fake_layout(&mut app);

        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 12, 13), now);
        handle_mouse_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 5, 13), now);
        handle_key_event(&mut app, key(KeyCode::Char('d')), now);
        assert_eq!(app.store.len(), 3);
        assert_eq!(app.reorder.dragged_index(), Some(1));

        handle_mouse_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 5, 13), now);
        assert_eq!(names(&app), vec!["B", "A", "C"]);
        assert_eq!(app.current_index(), Some(0));
    }

    #[test]
    fn tab_while_holding_picks_a_drop_target() {
        let mut app = app_with_images(&["A", "B", "C", "D"]);
        let now = Instant::now();
        app.open_preview(0, now);

        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::Tab), now);
        handle_key_event(&mut app, key(KeyCode::BackTab), now);
        assert_eq!(app.reorder.state(), ReorderState::PickedUp { index: 0 });
        assert_eq!(
            app.preview.as_ref().unwrap().focus,
            PreviewFocus::Thumbnails { focused: 2 }
        );

        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        assert_eq!(names(&app), vec!["B", "C", "A", "D"]);
        assert_eq!(app.reorder.state(), ReorderState::Idle);
        assert_eq!(app.current_index(), Some(2));
        assert_eq!(
            app.announcer.message(),
            Some("Moved image from position 1 to position 3")
        );
    }

    #[test]
    fn list_cursor_picks_a_drop_target_while_holding() {
        let mut app = app_with_images(&["A", "B", "C"]);
        let now = Instant::now();
        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        handle_key_event(&mut app, key(KeyCode::Char('j')), now);
        handle_key_event(&mut app, key(KeyCode::Char('j')), now);
        assert_eq!(app.reorder.picked_up_index(), Some(0));
        assert_eq!(names(&app), vec!["A", "B", "C"]);

        handle_key_event(&mut app, key(KeyCode::Char(' ')), now);
        assert_eq!(names(&app), vec!["B", "C", "A"]);
        assert_eq!(app.selected, 2);
    }
}
