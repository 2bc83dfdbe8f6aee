//! rust identifiers for graphql names

/// upper camel case type name, e.g. `search_result` -> `SearchResult`
pub fn to_rust_ident(name: &str) -> String {
    let mut out = String::new();
    let mut upper = true;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    match out.as_str() {
        "" => "Value".to_string(),
        "Self" | "Type" | "Box" | "Result" | "Option" | "String" | "Vec" => format!("{out}Type"),
        _ => out,
    }
}

/// snake case field name, e.g. `userID` -> `user_id`
///
/// leading underscores are dropped so `__typename` becomes `typename`.
pub fn to_rust_field(name: &str) -> String {
    let chars: Vec<char> = name.trim_start_matches('_').chars().collect();
    let mut out = String::new();
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                let prev = chars[idx - 1];
                let next_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_lower)
                {
                    out.push('_');
                }
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    if out.is_empty() {
        return "field".to_string();
    }
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    match out.as_str() {
        // not valid as raw identifiers
        "self" | "crate" | "super" => format!("{out}_"),
        _ if is_rust_keyword(&out) => format!("r#{out}"),
        _ => out,
    }
}

/// upper camel case variant name for an enum value, e.g. `READ_ONLY` -> `ReadOnly`
pub fn to_variant_name(value: &str) -> String {
    let mut out = String::new();
    for segment in value.split('_').filter(|segment| !segment.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    if out.is_empty() || out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, 'V');
    }
    if out == "Self" {
        out.push('_');
    }
    out
}

/// screaming snake case constant name, e.g. `GetUser` -> `GET_USER`
pub fn to_const_name(name: &str) -> String {
    to_rust_field(name)
        .trim_start_matches("r#")
        .trim_end_matches('_')
        .to_uppercase()
}

pub(crate) fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "gen"
            | "box"
            | "try"
            | "yield"
            | "macro"
            | "abstract"
            | "become"
            | "do"
            | "final"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
    )
}
