use crate::consts::FRAME_PLACEHOLDER;

/// Compute the output path for `frame` from `template`.
///
/// The rightmost run of `#` is replaced by the frame number, zero-padded to
/// the run's width. Wider numbers are written in full. The template is
/// returned unchanged when there is no frame number or no placeholder.
pub fn output_path(template: &str, frame: Option<u32>) -> String {
    let Some(frame) = frame else {
        return template.to_string();
    };
    let Some(last) = template.rfind(FRAME_PLACEHOLDER) else {
        return template.to_string();
    };

    let begin = template[..last].trim_end_matches(FRAME_PLACEHOLDER).len();
    let end = last + FRAME_PLACEHOLDER.len_utf8();
    let width = end - begin;

    format!(
        "{}{:0width$}{}",
        &template[..begin],
        frame,
        &template[end..],
        width = width
    )
}
