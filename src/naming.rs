//! Operation-id naming derived from handler class names.

/// Words whose plural is the word itself.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "information",
    "metadata",
    "obs",
    "series",
    "species",
];

/// Irregular singular/plural pairs, lowercase.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("criterion", "criteria"),
    ("foot", "feet"),
    ("man", "men"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Title used in operation ids.
///
/// The handler class name with a trailing `<digit>_<1-2 digits>` version and
/// then a trailing `Resource` removed. With `plural`, the last camel-case
/// word is pluralised: `ConceptResource1_8` gives `Concept` or `Concepts`.
pub fn operation_title(class_name: &str, plural: bool) -> String {
    let title = strip_resource_suffix(strip_version_suffix(class_name));
    if !plural {
        return title.to_string();
    }

    let words = split_camel_case(title);
    match words.split_last() {
        Some((last, init)) => {
            let mut out: String = init.concat();
            out.push_str(&pluralize(last));
            out
        }
        None => String::new(),
    }
}

fn strip_version_suffix(name: &str) -> &str {
    let bytes = name.as_bytes();
    for minor_digits in [2, 1] {
        // <digit> '_' <minor_digits digits>
        let len = minor_digits + 2;
        if bytes.len() < len {
            continue;
        }
        let tail = &bytes[bytes.len() - len..];
        if tail[0].is_ascii_digit()
            && tail[1] == b'_'
            && tail[2..].iter().all(u8::is_ascii_digit)
        {
            return &name[..name.len() - len];
        }
    }
    name
}

fn strip_resource_suffix(name: &str) -> &str {
    name.strip_suffix("Resource").unwrap_or(name)
}

/// Split a camel-case identifier into words.
///
/// A boundary falls before an uppercase letter that follows a non-uppercase
/// letter, and before an uppercase letter followed by a lowercase one, so
/// acronyms stay together: `HL7MessageSource` gives `HL7`, `Message`, `Source`.
pub fn split_camel_case(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (offset, c) = chars[i];
        if !c.is_uppercase() {
            continue;
        }
        let prev_upper = chars[i - 1].1.is_uppercase();
        let next_lower = chars.get(i + 1).map_or(false, |(_, n)| n.is_lowercase());
        if !prev_upper || next_lower {
            words.push(&name[start..offset]);
            start = offset;
        }
    }
    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}

/// English plural of a single word, keeping the case of its stem.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| lower == *singular) {
        return if word.chars().next().map_or(false, char::is_uppercase) {
            crate::types::capitalize(plural)
        } else {
            plural.to_string()
        };
    }

    let consonant_before_last = lower
        .chars()
        .rev()
        .nth(1)
        .map_or(false, |c| !"aeiou".contains(c));

    if lower.ends_with("is") {
        // diagnosis, analysis
        return format!("{}es", &word[..word.len() - 2]);
    }
    if lower.ends_with('y') && consonant_before_last {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
