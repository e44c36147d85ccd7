use crate::models::Submission;

/// Render a submission as one quoted CSV line, newline-terminated.
///
/// Embedded double quotes are doubled. Nothing else is escaped, so a value
/// containing a newline spans lines inside its quotes.
pub fn render_row(sub: &Submission) -> String {
    let submitted_at = sub.submitted_at_iso();
    let fields = [
        sub.name.as_str(),
        sub.email.as_str(),
        sub.censorship.as_str(),
        sub.address.as_str(),
        sub.phone.as_str(),
        submitted_at.as_str(),
    ];

    let mut line = fields
        .iter()
        .map(|f| quote(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
