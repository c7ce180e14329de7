//! Canonical window style bit tables.
//!
//! Reaction scripts refer to these bits as literal hex values, so the
//! positions here must never change.

use crate::window::StyleKind;
use crate::{Error, Result};

/// A named bit (or bit group) in a style bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleBit {
    pub name: &'static str,
    pub bits: u32,
}

const fn bit(name: &'static str, bits: u32) -> StyleBit {
    StyleBit { name, bits }
}

/// The visible bit of the basic style.
pub const WS_VISIBLE: u32 = 0x1000_0000;

/// Basic (`GWL_STYLE`) bits.
pub const BASIC: &[StyleBit] = &[
    bit("WS_OVERLAPPED", 0x0000_0000),
    bit("WS_TABSTOP", 0x0001_0000),
    bit("WS_MINIMIZEBOX", 0x0002_0000),
    bit("WS_THICKFRAME", 0x0004_0000),
    bit("WS_SYSMENU", 0x0008_0000),
    bit("WS_HSCROLL", 0x0010_0000),
    bit("WS_VSCROLL", 0x0020_0000),
    bit("WS_DLGFRAME", 0x0040_0000),
    bit("WS_BORDER", 0x0080_0000),
    bit("WS_CAPTION", 0x00C0_0000),
    bit("WS_MAXIMIZE", 0x0100_0000),
    bit("WS_CLIPCHILDREN", 0x0200_0000),
    bit("WS_CLIPSIBLINGS", 0x0400_0000),
    bit("WS_DISABLED", 0x0800_0000),
    bit("WS_VISIBLE", WS_VISIBLE),
    bit("WS_MINIMIZE", 0x2000_0000),
    bit("WS_CHILD", 0x4000_0000),
    bit("WS_POPUP", 0x8000_0000),
];

/// Extended (`GWL_EXSTYLE`) bits.
pub const EXTENDED: &[StyleBit] = &[
    bit("WS_EX_LEFT", 0x0000_0000),
    bit("WS_EX_DLGMODALFRAME", 0x0000_0001),
    bit("WS_EX_NOPARENTNOTIFY", 0x0000_0004),
    bit("WS_EX_TOPMOST", 0x0000_0008),
    bit("WS_EX_ACCEPTFILES", 0x0000_0010),
    bit("WS_EX_TRANSPARENT", 0x0000_0020),
    bit("WS_EX_MDICHILD", 0x0000_0040),
    bit("WS_EX_TOOLWINDOW", 0x0000_0080),
    bit("WS_EX_WINDOWEDGE", 0x0000_0100),
    bit("WS_EX_CLIENTEDGE", 0x0000_0200),
    bit("WS_EX_CONTEXTHELP", 0x0000_0400),
    bit("WS_EX_RIGHT", 0x0000_1000),
    bit("WS_EX_RTLREADING", 0x0000_2000),
    bit("WS_EX_LEFTSCROLLBAR", 0x0000_4000),
    bit("WS_EX_CONTROLPARENT", 0x0001_0000),
    bit("WS_EX_STATICEDGE", 0x0002_0000),
    bit("WS_EX_APPWINDOW", 0x0004_0000),
    bit("WS_EX_LAYERED", 0x0008_0000),
    bit("WS_EX_NOINHERITLAYOUT", 0x0010_0000),
    bit("WS_EX_NOREDIRECTIONBITMAP", 0x0020_0000),
    bit("WS_EX_LAYOUTRTL", 0x0040_0000),
    bit("WS_EX_COMPOSITED", 0x0200_0000),
    bit("WS_EX_NOACTIVATE", 0x0800_0000),
];

/// Returns the table for a style kind.
pub fn table(kind: StyleKind) -> &'static [StyleBit] {
    match kind {
        StyleKind::Basic => BASIC,
        StyleKind::Extended => EXTENDED,
    }
}

/// Renders a table as aligned `NAME  XXXXXXXX` lines.
pub fn render(kind: StyleKind) -> Vec<String> {
    let bits = table(kind);
    let width = bits.iter().map(|b| b.name.len()).max().unwrap_or(0) + 4;
    bits.iter()
        .map(|b| format!("{:<width$}{:08X}", b.name, b.bits))
        .collect()
}

/// Parses a hex bitmask as written in scripts (`80000000`, `0x80000000`).
pub fn parse_bits(text: &str) -> Result<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| Error::InvalidArgument {
        what: "style",
        value: text.into(),
    })
}
