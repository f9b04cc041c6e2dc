/// Split a raw input line into tokens.
///
/// Spaces and tabs separate tokens outside quotes. A single or double quote
/// opens a region that only the same quote character closes; the quotes are
/// stripped and do not nest. An unterminated quote swallows the rest of the
/// line without complaint.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    // A quoted region can produce an empty token (`""`).
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_token = true;
                }
                ' ' | '\t' => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}
