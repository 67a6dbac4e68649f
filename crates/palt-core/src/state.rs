use std::fmt;

/// Display category for a list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateColor {
    Green,
    Yellow,
    Red,
    /// Rows that are not state-classified (modules).
    Neutral,
}

impl StateColor {
    /// Colour name as understood by Tk-style toolkits.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateColor::Green => "green",
            StateColor::Yellow => "yellow",
            StateColor::Red => "red",
            StateColor::Neutral => "#323232",
        }
    }
}

impl fmt::Display for StateColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw device state token to its display category.
///
/// Running and idle devices are green, suspended ones yellow; everything else,
/// including states this tool doesn't know about, is red.
pub fn classify_state(raw_state: &str) -> StateColor {
    match raw_state.to_ascii_uppercase().as_str() {
        "RUNNING" | "IDLE" => StateColor::Green,
        "SUSPENDED" => StateColor::Yellow,
        _ => StateColor::Red,
    }
}
