//! File system path utilities

/// Shortens a `/`-separated path for display within `max_length` characters
///
/// Components are shortened from the left (`component` → `comp..`) until the
/// path fits; each shortened component keeps at least one character, so very
/// deep paths can still exceed the limit.
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let mut components: Vec<String> = path.split('/').map(str::to_string).collect();
    let mut total = path.chars().count();

    for component in components.iter_mut() {
        if total <= max_length {
            break;
        }
        let len = component.chars().count();
        if len <= 3 {
            continue;
        }
        let excess = total - max_length - 1;
        let keep = len.saturating_sub(excess + 3).max(1);
        let shortened: String = component.chars().take(keep).chain("..".chars()).collect();
        total = total + keep + 2 - len;
        *component = shortened;
    }

    components.join("/")
}
