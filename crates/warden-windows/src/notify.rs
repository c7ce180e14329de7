use std::thread;

use tracing::warn;
use warden_core::{MessageKind, Notifier};

use windows::Win32::UI::WindowsAndMessaging::{
    MB_ICONINFORMATION, MB_ICONWARNING, MB_OK, MB_TOPMOST, MESSAGEBOX_STYLE, MessageBoxW,
};
use windows::core::PCWSTR;

const CAPTION: &str = "warden";

/// Shows popups as topmost message boxes.
///
/// Each box runs on its own thread so the caller (often a reaction script
/// on the sampling thread) is never blocked waiting for the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBoxNotifier;

impl Notifier for MessageBoxNotifier {
    fn popup(&self, kind: MessageKind, text: &str) {
        let icon = match kind {
            MessageKind::Plain => MESSAGEBOX_STYLE(0),
            MessageKind::Warning => MB_ICONWARNING,
            MessageKind::Information => MB_ICONINFORMATION,
        };
        let text: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();

        let spawned = thread::Builder::new()
            .name("warden-popup".into())
            .spawn(move || {
                let caption: Vec<u16> = CAPTION.encode_utf16().chain(std::iter::once(0)).collect();
                // SAFETY: both buffers are NUL-terminated and outlive the
                // call, which returns when the box is dismissed.
                unsafe {
                    let _ = MessageBoxW(
                        None,
                        PCWSTR(text.as_ptr()),
                        PCWSTR(caption.as_ptr()),
                        MB_OK | MB_TOPMOST | icon,
                    );
                }
            });
        if let Err(e) = spawned {
            warn!("could not show popup: {e}");
        }
    }
}
