//! # Display Collaborator
//!
//! The poll loop pushes every tick's snapshot to a [`SnapshotDisplay`]. The
//! display only renders values the core already computed; it is never on the
//! path between controller and serial port.
//!
//! [`LogDisplay`] is the built-in renderer: one debug log line with the two
//! stick indicators, the button row and the hat directions.

use tracing::debug;

use crate::controller::snapshot::ControllerSnapshot;

/// Receives controller state for visualization.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotDisplay: Send {
    /// Render one tick.
    ///
    /// `live` is false when `snapshot` is the last-known state of a
    /// disconnected controller (or empty if none was ever seen).
    fn render(&mut self, snapshot: &ControllerSnapshot, live: bool);
}

/// Renders snapshots as tracing debug lines, skipping unchanged output.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_line: Option<String>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the readout the way the operator panel lays it out.
    ///
    /// Positions are -100..=100 per axis; movement is axes 0/1, camera is
    /// axes 3/4.
    ///
    /// # Examples
    ///
    /// ```
    /// use motor_bridge::controller::snapshot::{ControllerSnapshot, HatDirection};
    /// use motor_bridge::display::LogDisplay;
    ///
    /// let snapshot = ControllerSnapshot::new(
    ///     vec![0.5, -1.0, 0.0, 0.0, 0.25],
    ///     vec![true, false],
    ///     vec![HatDirection::North],
    /// );
    /// assert_eq!(
    ///     LogDisplay::format(&snapshot, true),
    ///     "movement=(50,-100) camera=(0,25) buttons=10 hats=2"
    /// );
    /// ```
    pub fn format(snapshot: &ControllerSnapshot, live: bool) -> String {
        let position = |index: usize| {
            snapshot
                .axis(index)
                .map_or(0, |v| (v.clamp(-1.0, 1.0) * 100.0).round() as i32)
        };

        let buttons: String = snapshot
            .buttons()
            .iter()
            .map(|&pressed| if pressed { '1' } else { '0' })
            .collect();

        let hats = snapshot
            .hats()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut line = format!(
            "movement=({},{}) camera=({},{}) buttons={} hats={}",
            position(0),
            position(1),
            position(3),
            position(4),
            buttons,
            hats
        );
        if !live {
            line.push_str(" (no controller)");
        }
        line
    }
}

impl SnapshotDisplay for LogDisplay {
    fn render(&mut self, snapshot: &ControllerSnapshot, live: bool) {
        let line = Self::format(snapshot, live);
        if self.last_line.as_deref() != Some(line.as_str()) {
            debug!("{}", line);
            self.last_line = Some(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::snapshot::HatDirection;

    #[test]
    fn test_format_empty_snapshot() {
        let line = LogDisplay::format(&ControllerSnapshot::default(), false);
        assert_eq!(line, "movement=(0,0) camera=(0,0) buttons= hats= (no controller)");
    }

    #[test]
    fn test_format_clamps_positions() {
        let snapshot = ControllerSnapshot::new(vec![3.0, f32::NEG_INFINITY, 0.0, -0.333, 0.0], vec![], vec![]);
        let line = LogDisplay::format(&snapshot, true);
        assert!(line.starts_with("movement=(100,-100) camera=(-33,0)"), "{}", line);
    }

    #[test]
    fn test_format_multiple_hats() {
        let snapshot = ControllerSnapshot::new(
            vec![],
            vec![false, true, true],
            vec![HatDirection::SouthWest, HatDirection::Centered],
        );
        let line = LogDisplay::format(&snapshot, true);
        assert!(line.ends_with("buttons=011 hats=7,0"), "{}", line);
    }

    #[test]
    fn test_render_remembers_last_line() {
        let mut display = LogDisplay::new();
        let snapshot = ControllerSnapshot::new(vec![0.0; 5], vec![false; 10], vec![]);

        display.render(&snapshot, true);
        let first = display.last_line.clone();
        display.render(&snapshot, true);
        assert_eq!(display.last_line, first);

        display.render(&snapshot, false);
        assert!(display.last_line.unwrap().ends_with("(no controller)"));
    }
}
