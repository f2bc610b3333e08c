//! Inputs from the button panel

/// The four panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Cycle program 0, 1-5, 9
    Mode,
    /// Advance station (edit) or run selector (idle)
    Select,
    /// Increase duration (edit) or start a run (idle)
    Increment,
    /// Zero duration (edit) or stop the run
    Clear,
}

/// Raw input event from the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelInput {
    /// A button edge
    Press(Button),
    /// Speed-up toggle changed position
    SpeedUp(bool),
}

