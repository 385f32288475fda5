//! Platform-neutral input events, queued by the host and drained once per frame.

use crate::types::Vec3;

/// Direction of a debug velocity push.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PushDirection {
    NegX,
    PosX,
    NegZ,
    PosZ,
    Up,
}

impl PushDirection {
    pub fn unit(&self) -> Vec3 {
        match self {
            PushDirection::NegX => -Vec3::x(),
            PushDirection::PosX => Vec3::x(),
            PushDirection::NegZ => -Vec3::z(),
            PushDirection::PosZ => Vec3::z(),
            PushDirection::Up => Vec3::y(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Leave the title screen and begin play.
    Start,
    ChargePressed,
    ChargeReleased,
    /// Put the ball back on the level's spawn.
    ///
    /// Counts a stroke in every state after the session has started. On the
    /// title screen the ball is not in play and the event is ignored.
    Reset,
    AimLeft,
    AimRight,
    /// Ignored unless debug input is enabled.
    DebugPush(PushDirection),
    /// Drawable surface resized (pixels).
    Resize { width: u32, height: u32 },
}
