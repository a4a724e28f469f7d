/// Returns the next whitespace-delimited word of `line` at or after byte offset `cursor`,
/// advancing `cursor` past it, or `None` if only whitespace remains.
pub fn next_word<'line>(line: &'line str, cursor: &mut usize) -> Option<&'line str> {
    let rest = &line[*cursor..];
    let start = match rest.find(|c: char| !c.is_whitespace()) {
        None => {
            *cursor = line.len();
            return None;
        }
        Some(offset) => *cursor + offset,
    };

    let end = match line[start..].find(char::is_whitespace) {
        None => line.len(),
        Some(offset) => start + offset,
    };

    *cursor = end;
    Some(&line[start..end])
}

/// Returns true if nothing but whitespace follows byte offset `cursor` in `line`.
pub fn at_line_end(line: &str, cursor: usize) -> bool {
    line[cursor..].chars().all(char::is_whitespace)
}
