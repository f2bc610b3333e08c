//! Four-button panel with a speed-up switch
//!
//! Buttons and switch pull their inputs low when closed. Each button yields
//! one [`PanelInput::Press`] per closing edge; the switch yields
//! [`PanelInput::SpeedUp`] whenever its position changes, and once on the
//! first poll so the controller learns the initial position.
//!
//! Contact bounce is not filtered here: the controller's debounce window
//! handles button presses.

use arbor_core::state::{Button, PanelInput};
use arbor_core::traits::Keypad;
use embedded_hal::digital::InputPin;

/// Button order on the panel
const BUTTONS: [Button; 4] = [Button::Mode, Button::Select, Button::Increment, Button::Clear];

/// Polled GPIO button panel
pub struct ButtonPanel<P> {
    /// Mode, select, increment, clear
    buttons: [P; 4],
    speed: P,
    /// Closed state seen on the previous poll
    held: [bool; 4],
    /// Last reported switch position
    fast: Option<bool>,
}

impl<P: InputPin> ButtonPanel<P> {
    /// Create a panel from its five inputs
    pub fn new(mode: P, select: P, increment: P, clear: P, speed: P) -> Self {
        Self {
            buttons: [mode, select, increment, clear],
            speed,
            held: [false; 4],
            fast: None,
        }
    }

    /// Read errors count as an open contact
    fn closed(pin: &mut P) -> bool {
        pin.is_low().unwrap_or(false)
    }
}

impl<P: InputPin> Keypad for ButtonPanel<P> {
    fn poll(&mut self) -> Option<PanelInput> {
        let fast = Self::closed(&mut self.speed);
        if self.fast != Some(fast) {
            self.fast = Some(fast);
            return Some(PanelInput::SpeedUp(fast));
        }

        for ((pin, held), button) in self.buttons.iter_mut().zip(self.held.iter_mut()).zip(BUTTONS) {
            let closed = Self::closed(pin);
            let edge = closed && !*held;
            *held = closed;
            if edge {
                return Some(PanelInput::Press(button));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Input wired to a test-controlled level
    struct MockInput<'a> {
        low: &'a Cell<bool>,
    }

    impl ErrorType for MockInput<'_> {
        type Error = Infallible;
    }

    impl InputPin for MockInput<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.low.get())
        }
    }

    struct Rig {
        lines: [Cell<bool>; 5],
    }

    impl Rig {
        fn new() -> Self {
            Self {
                lines: Default::default(),
            }
        }

        fn panel(&self) -> ButtonPanel<MockInput<'_>> {
            let [m, s, i, c, f] = &self.lines;
            ButtonPanel::new(
                MockInput { low: m },
                MockInput { low: s },
                MockInput { low: i },
                MockInput { low: c },
                MockInput { low: f },
            )
        }
    }

    #[test]
    fn test_initial_switch_position_reported() {
        let rig = Rig::new();
        let mut panel = rig.panel();
        assert_eq!(panel.poll(), Some(PanelInput::SpeedUp(false)));
        assert_eq!(panel.poll(), None);
    }

    #[test]
    fn test_one_press_per_edge() {
        let rig = Rig::new();
        let mut panel = rig.panel();
        panel.poll();

        rig.lines[0].set(true);
        assert_eq!(panel.poll(), Some(PanelInput::Press(Button::Mode)));
        assert_eq!(panel.poll(), None);

        rig.lines[0].set(false);
        assert_eq!(panel.poll(), None);
        rig.lines[0].set(true);
        assert_eq!(panel.poll(), Some(PanelInput::Press(Button::Mode)));
    }

    #[test]
    fn test_simultaneous_presses_queue() {
        let rig = Rig::new();
        let mut panel = rig.panel();
        panel.poll();

        rig.lines[2].set(true);
        rig.lines[3].set(true);
        assert_eq!(panel.poll(), Some(PanelInput::Press(Button::Increment)));
        assert_eq!(panel.poll(), Some(PanelInput::Press(Button::Clear)));
        assert_eq!(panel.poll(), None);
    }

    #[test]
    fn test_switch_toggle() {
        let rig = Rig::new();
        let mut panel = rig.panel();
        panel.poll();

        rig.lines[4].set(true);
        assert_eq!(panel.poll(), Some(PanelInput::SpeedUp(true)));
        assert_eq!(panel.poll(), None);
        rig.lines[4].set(false);
        assert_eq!(panel.poll(), Some(PanelInput::SpeedUp(false)));
    }

    #[test]
    fn test_drives_controller_cursor() {
        use arbor_core::config::TimingConfig;
        use arbor_core::Controller;
        use arbor_hal::MemoryStorage;

        let rig = Rig::new();
        let mut panel = rig.panel();
        let (mut ctrl, _) =
            Controller::boot(MemoryStorage::<256>::new(), TimingConfig::default(), 0).unwrap();

        rig.lines[0].set(true);
        let mut now = 1_000;
        while let Some(input) = panel.poll() {
            ctrl.handle_input(input, now).unwrap();
            now += 1_000;
        }
        assert_eq!(ctrl.cursor().program_number(), 1);
    }
}
