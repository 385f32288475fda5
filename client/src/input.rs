use crate::{config::Settings, game::PendingInput};
use bevy::{prelude::*, window::WindowResized};
use leafwing_input_manager::prelude::*;
use minigolf::{InputEvent, PushDirection};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Start,
    Charge,
    Reset,
    AimLeft,
    AimRight,
    PushNegX,
    PushPosX,
    PushNegZ,
    PushPosZ,
    PushUp,
}

const PUSHES: [(InputAction, PushDirection); 5] = [
    (InputAction::PushNegX, PushDirection::NegX),
    (InputAction::PushPosX, PushDirection::PosX),
    (InputAction::PushNegZ, PushDirection::NegZ),
    (InputAction::PushPosZ, PushDirection::PosZ),
    (InputAction::PushUp, PushDirection::Up),
];

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Start, KeyCode::Enter);
    input_map.insert(InputAction::Charge, KeyCode::Space);
    input_map.insert(InputAction::Reset, KeyCode::KeyR);
    input_map.insert(InputAction::AimLeft, KeyCode::KeyA);
    input_map.insert(InputAction::AimLeft, KeyCode::ArrowLeft);
    input_map.insert(InputAction::AimRight, KeyCode::KeyD);
    input_map.insert(InputAction::AimRight, KeyCode::ArrowRight);
    input_map.insert(InputAction::PushNegX, KeyCode::KeyJ);
    input_map.insert(InputAction::PushPosX, KeyCode::KeyL);
    input_map.insert(InputAction::PushNegZ, KeyCode::KeyI);
    input_map.insert(InputAction::PushPosZ, KeyCode::KeyK);
    input_map.insert(InputAction::PushUp, KeyCode::KeyU);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}

/// Translate this frame's key edges into gameplay events.
pub(super) fn queue_actions(
    actions: Res<ActionState<InputAction>>,
    mut resized: MessageReader<WindowResized>,
    settings: Res<Settings>,
    mut pending: ResMut<PendingInput>,
) {
    let events = &mut pending.0;

    for msg in resized.read() {
        events.push(InputEvent::Resize {
            width: msg.width.max(0.0) as u32,
            height: msg.height.max(0.0) as u32,
        });
    }

    if actions.just_pressed(&InputAction::Start) {
        events.push(InputEvent::Start);
    }
    if actions.just_pressed(&InputAction::Charge) {
        events.push(InputEvent::ChargePressed);
    }
    if actions.just_released(&InputAction::Charge) {
        events.push(InputEvent::ChargeReleased);
    }
    if actions.just_pressed(&InputAction::Reset) {
        events.push(InputEvent::Reset);
    }
    // Held keys keep turning the aim every frame.
    if actions.pressed(&InputAction::AimLeft) {
        events.push(InputEvent::AimLeft);
    }
    if actions.pressed(&InputAction::AimRight) {
        events.push(InputEvent::AimRight);
    }

    if settings.game.debug.enabled {
        for (action, direction) in PUSHES {
            if actions.just_pressed(&action) {
                events.push(InputEvent::DebugPush(direction));
            }
        }
    }
}
