use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Type(char),
    Backspace,
    ClearQuery,
    Submit,
    CycleEngine(i32),
    HudToggle,
    Hidden,
    Shown,
    Resized,
}

/// Drains pending terminal events, waiting at most `wait` for the first.
pub(crate) fn collect_input(wait: Duration) -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();
    let mut timeout = wait;
    while event::poll(timeout)? {
        if let Some(a) = map_event(event::read()?) {
            out.push(a);
            if out.len() >= 32 {
                break;
            }
        }
        timeout = Duration::ZERO;
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<Action> {
    match ev {
        Event::Key(k) if k.kind != KeyEventKind::Release => map_key(k),
        Event::FocusLost => Some(Action::Hidden),
        Event::FocusGained => Some(Action::Shown),
        Event::Resize(_, _) => Some(Action::Resized),
        _ => None,
    }
}

fn map_key(k: KeyEvent) -> Option<Action> {
    let ctrl = k.modifiers.contains(KeyModifiers::CONTROL);
    match k.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => Some(Action::Quit),
        KeyCode::Char('u') | KeyCode::Char('U') if ctrl => Some(Action::ClearQuery),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(ch) if !ch.is_control() => Some(Action::Type(ch)),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Tab => Some(Action::CycleEngine(1)),
        KeyCode::BackTab => Some(Action::CycleEngine(-1)),
        KeyCode::F(1) => Some(Action::HudToggle),
        _ => None,
    }
}
