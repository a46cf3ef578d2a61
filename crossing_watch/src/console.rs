//! Line-oriented terminal view and operator commands.

use crate::sync::View;
use crossing::direction::Direction;
use crossing::state::{CountSource, Lamp};
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Select(Direction),
    EndOverride,
    Pause,
    Resume,
    Refresh,
    Help,
    Quit,
}

impl OperatorCommand {
    /// `None` for blank input; `Some(Err(_))` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let word = line.trim();
        if word.is_empty() {
            return None;
        }
        let cmd = match word.to_ascii_lowercase().as_str() {
            "end" | "release" | "auto" => OperatorCommand::EndOverride,
            "pause" | "stop" => OperatorCommand::Pause,
            "resume" | "start" | "live" => OperatorCommand::Resume,
            "refresh" | "r" => OperatorCommand::Refresh,
            "help" | "?" => OperatorCommand::Help,
            "quit" | "q" | "exit" => OperatorCommand::Quit,
            other => match other.parse::<Direction>() {
                Ok(d) => OperatorCommand::Select(d),
                Err(e) => return Some(Err(e.to_string())),
            },
        };
        Some(Ok(cmd))
    }
}

pub const HELP: &str = "commands: n|s|e|w (force green), end (release override), pause, resume, refresh, quit";

/// One status line per published view.
pub fn status_line(view: &View) -> String {
    let state = &view.state;
    let mut line = format!("[{:<7}]", view.status.as_str());

    for lamp in state.lamps() {
        let glyph = match lamp.lamp {
            Lamp::Green => '*',
            Lamp::Red => ' ',
        };
        let _ = write!(
            line,
            " {}{}{:>3}",
            glyph,
            &lamp.direction.as_str()[..1].to_ascii_uppercase(),
            state.counts.get(lamp.direction)
        );
    }

    let _ = write!(line, " | total {:>3}", state.counts.total());
    line.push_str(if state.manual_override {
        " | MANUAL"
    } else {
        " | auto  "
    });
    if let Some(t) = state.last_updated {
        let _ = write!(line, " | {}", utc_clock(t));
    }
    if state.source == CountSource::Simulated {
        line.push_str(" | SIMULATED");
    }
    line
}

/// `HH:MM:SS UTC`.
fn utc_clock(t: SystemTime) -> String {
    let secs = t
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        % 86_400;
    format!(
        "{:02}:{:02}:{:02} UTC",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
