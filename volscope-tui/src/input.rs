//! Keyboard input dispatch — global keys, then panel-specific keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Panel, ViewerState};

pub fn handle_key(state: &mut ViewerState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.running = false;
            return;
        }
        KeyCode::Char('1') => {
            state.active_panel = Panel::Volatility;
            return;
        }
        KeyCode::Char('2') => {
            state.active_panel = Panel::Correlation;
            return;
        }
        KeyCode::Tab => {
            state.active_panel = if key.modifiers.contains(KeyModifiers::SHIFT) {
                state.active_panel.prev()
            } else {
                state.active_panel.next()
            };
            return;
        }
        KeyCode::BackTab => {
            state.active_panel = state.active_panel.prev();
            return;
        }
        _ => {}
    }

    match state.active_panel {
        Panel::Volatility => match key.code {
            KeyCode::Right | KeyCode::Char('l') => state.select_next(),
            KeyCode::Left | KeyCode::Char('h') => state.select_prev(),
            _ => {}
        },
        Panel::Correlation => {} // display only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use proptest::prelude::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_stop_the_viewer() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut state = ViewerState::new(3);
            handle_key(&mut state, press(code));
            assert!(!state.running);
        }
    }

    #[test]
    fn number_keys_and_tab_switch_panels() {
        let mut state = ViewerState::new(3);
        handle_key(&mut state, press(KeyCode::Char('2')));
        assert_eq!(state.active_panel, Panel::Correlation);
        handle_key(&mut state, press(KeyCode::Char('1')));
        assert_eq!(state.active_panel, Panel::Volatility);
        handle_key(&mut state, press(KeyCode::Tab));
        assert_eq!(state.active_panel, Panel::Correlation);
        handle_key(&mut state, press(KeyCode::BackTab));
        assert_eq!(state.active_panel, Panel::Volatility);
    }

    #[test]
    fn arrows_move_selection_only_on_volatility_panel() {
        let mut state = ViewerState::new(3);
        handle_key(&mut state, press(KeyCode::Right));
        assert_eq!(state.selected, 1);
        handle_key(&mut state, press(KeyCode::Left));
        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.selected, 2);

        state.active_panel = Panel::Correlation;
        handle_key(&mut state, press(KeyCode::Right));
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewerState::new(3);
        let key = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key(&mut state, key);
        assert!(state.running);
    }

    fn arb_key() -> impl Strategy<Value = KeyCode> {
        prop::sample::select(vec![
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::Tab,
            KeyCode::BackTab,
            KeyCode::Char('1'),
            KeyCode::Char('2'),
            KeyCode::Char('h'),
            KeyCode::Char('l'),
            KeyCode::Char('x'),
        ])
    }

    proptest! {
        /// No key sequence moves the highlight off the ticker list.
        #[test]
        fn selection_stays_in_bounds(
            tickers in 1usize..6,
            keys in prop::collection::vec(arb_key(), 0..50),
        ) {
            let mut state = ViewerState::new(tickers);
            for code in keys {
                handle_key(&mut state, press(code));
                prop_assert!(state.selected < tickers);
                prop_assert!(state.running);
            }
        }
    }
}
