// Dataset rows are comma-separated, but position lists and some club names
// carry embedded commas inside double quotes.

pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    // An unbalanced quote leaves in_quotes set; the remainder is kept as
    // the tail of the open field rather than erroring out.
    fields.push(current.trim().to_string());
    fields
}
