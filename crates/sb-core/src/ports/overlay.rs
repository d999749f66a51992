/// Port for the floating capture overlay (the always-on-top trigger widget).
///
/// The coordinator hides it before grabbing pixels so it never appears in
/// its own screenshots, and restores the previous visibility afterwards.
pub trait OverlayPort: Send + Sync {
    fn is_visible(&self) -> bool;

    fn hide(&self);

    fn show(&self);
}
