pub fn suffix(num: usize) -> &'static str {
    let s = num.to_string();
    if s.ends_with('1') && !s.ends_with("11") {
        "st"
    } else if s.ends_with('2') && !s.ends_with("12") {
        "nd"
    } else if s.ends_with('3') && !s.ends_with("13") {
        "rd"
    } else {
        "th"
    }
}

/// Escape text for HTML element content and attribute values.
/// Only `& < > " '` are replaced.
pub fn escape_html(input: &str) -> String {
    input.chars().fold(String::with_capacity(input.len()), |mut acc, c| {
        match c {
            '&' => acc.push_str("&amp;"),
            '<' => acc.push_str("&lt;"),
            '>' => acc.push_str("&gt;"),
            '"' => acc.push_str("&quot;"),
            '\'' => acc.push_str("&#39;"),
            c => acc.push(c),
        };
        acc
    })
}

/// Points as shown to users: no trailing ".0" on whole numbers.
pub fn format_points(points: f64) -> String {
    match points.fract() == 0.0 {
        true => format!("{}", points as i64),
        false => format!("{}", points),
    }
}
