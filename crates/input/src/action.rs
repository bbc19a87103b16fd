use cubeview_common::MoveDirection;

/// A high-level action produced by a key binding.
///
/// Movement actions are polled every frame while their key is held; the rest
/// fire once on key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Translate the camera along a view axis.
    Move(MoveDirection),
    /// Request the window to close.
    Quit,
    /// Show or hide the camera HUD.
    ToggleHud,
}
