//! Keyboard control surface
//!
//! Keys are translated into `ViewerCommand`s; the window consumes every key
//! it maps so the surrounding scroll area never sees it.

use super::controller::{PanDirection, ZoomDirection};
use crate::config::ViewerVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    Pan(PanDirection),
    Zoom(ZoomDirection),
    /// Positive scrolls down
    ScrollRows(i64),
    JumpHome,
    JumpEnd,
    CloseFullScreen,
}

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Plus,
    Equals,
    /// Also delivered for `_` (shift is ignored when matching)
    Minus,
    Home,
    End,
    Escape,
}

impl ViewerKey {
    pub const ALL: [ViewerKey; 10] = [
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::ArrowUp,
        Self::ArrowDown,
        Self::Plus,
        Self::Equals,
        Self::Minus,
        Self::Home,
        Self::End,
        Self::Escape,
    ];

    pub fn to_egui(self) -> egui::Key {
        match self {
            Self::ArrowLeft => egui::Key::ArrowLeft,
            Self::ArrowRight => egui::Key::ArrowRight,
            Self::ArrowUp => egui::Key::ArrowUp,
            Self::ArrowDown => egui::Key::ArrowDown,
            Self::Plus => egui::Key::Plus,
            Self::Equals => egui::Key::Equals,
            Self::Minus => egui::Key::Minus,
            Self::Home => egui::Key::Home,
            Self::End => egui::Key::End,
            Self::Escape => egui::Key::Escape,
        }
    }
}

/// Context a key is interpreted in
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub virtualized: bool,
    pub variant: ViewerVariant,
    pub scroll_step_rows: usize,
}

/// `None` means the key is not handled in this context and must be left alone.
pub fn command_for_key(key: ViewerKey, ctx: &KeyContext) -> Option<ViewerCommand> {
    let step = ctx.scroll_step_rows as i64;
    match key {
        ViewerKey::ArrowLeft => Some(ViewerCommand::Pan(PanDirection::Left)),
        ViewerKey::ArrowRight => Some(ViewerCommand::Pan(PanDirection::Right)),
        ViewerKey::ArrowUp if ctx.virtualized => Some(ViewerCommand::ScrollRows(-step)),
        ViewerKey::ArrowDown if ctx.virtualized => Some(ViewerCommand::ScrollRows(step)),
        ViewerKey::ArrowUp | ViewerKey::ArrowDown => None,
        ViewerKey::Plus | ViewerKey::Equals => Some(ViewerCommand::Zoom(ZoomDirection::In)),
        ViewerKey::Minus => Some(ViewerCommand::Zoom(ZoomDirection::Out)),
        ViewerKey::Home => Some(ViewerCommand::JumpHome),
        ViewerKey::End => Some(ViewerCommand::JumpEnd),
        ViewerKey::Escape => match ctx.variant {
            ViewerVariant::FullScreen => Some(ViewerCommand::CloseFullScreen),
            ViewerVariant::Inline => None,
        },
    }
}

/// Take every mapped key press out of this frame's input
pub fn consume_commands(input: &mut egui::InputState, ctx: &KeyContext) -> Vec<ViewerCommand> {
    let mut commands = Vec::new();
    for key in ViewerKey::ALL {
        let Some(command) = command_for_key(key, ctx) else {
            continue;
        };
        let presses = input.count_and_consume_key(egui::Modifiers::NONE, key.to_egui());
        commands.extend(std::iter::repeat(command).take(presses));
    }
    commands
}
