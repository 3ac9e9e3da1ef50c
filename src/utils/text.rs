/// Converts a key such as `appPush`, `user_id` or `HTTPStatus` to start case
/// (`App Push`, `User Id`, `HTTP Status`).
///
/// Apostrophes are removed. Words are split on other non-alphanumeric
/// characters, lower-to-upper case transitions, letter/digit transitions and
/// at the end of an acronym.
/// The first character of every word is upper-cased, the rest is kept.
#[must_use]
pub fn start_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '\'' | '\u{2019}') {
            continue;
        }
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let camel = prev.is_lowercase() && c.is_uppercase();
            let digits = prev.is_numeric() != c.is_numeric();
            let acronym_end = prev.is_uppercase()
                && c.is_uppercase()
                && next.is_some_and(char::is_lowercase);

            if camel || digits || acronym_end {
                flush(&mut current, &mut words);
            }
        }
        current.push(c);
    }
    flush(&mut current, &mut words);

    words
        .iter()
        .map(|word| upper_first(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
