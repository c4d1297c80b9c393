use std::fmt;

/// Infer a frame number from the last run of ASCII digits in `name`.
///
/// Trailing non-digits are skipped first, so `"render_0007.exr"` yields 7
/// and `"v10_take2.exr"` yields 2. The whole string is scanned, directory
/// components included. Values past `u32::MAX` saturate.
pub fn frame_id(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let begin = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);

    let value = bytes[begin..end].iter().fold(0u32, |acc, &digit| {
        acc.saturating_mul(10)
            .saturating_add(u32::from(digit - b'0'))
    });
    Some(value)
}

/// Display wrapper for an optional frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLabel(pub Option<u32>);

impl fmt::Display for FrameLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "unnumbered"),
        }
    }
}
