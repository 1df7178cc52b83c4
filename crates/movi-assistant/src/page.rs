/// Title-cased label for a camelCase page id, e.g. `busDashboard` → `Bus Dashboard`.
pub fn page_label(page: &str) -> String {
    let mut label = String::with_capacity(page.len() + 4);
    let mut prev_lower = false;
    for (i, ch) in page.trim().chars().enumerate() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !label.ends_with(' ') && !label.is_empty() {
                label.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            label.push(' ');
        }
        if i == 0 || label.ends_with(' ') || label.is_empty() {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    label
}
