#![no_main]

use choice_widgets::autocomplete::{join_tokens, parse_tokens};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the delimiter/spacer pair, the rest is the text.
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let (delimiter, spacer) = match selector % 4 {
        0 => (",", " "),
        1 => (";", ""),
        2 => (" | ", " "),
        _ => ("", ""),
    };

    let tokens = parse_tokens(text, delimiter, spacer);

    // The in-progress token is always a suffix of the input.
    assert!(text.ends_with(tokens.in_progress.as_str()));
    assert_eq!(
        tokens.head(text).len() + tokens.in_progress.len(),
        text.len()
    );
    for token in &tokens.confirmed {
        assert!(!token.is_empty());
        assert_eq!(token.trim(), token);
    }

    // Joined tokens parse back to themselves when they contain no delimiter.
    if !delimiter.is_empty()
        && tokens
            .confirmed
            .iter()
            .all(|token| !token.contains(delimiter.trim()))
    {
        let joined = join_tokens(
            tokens.confirmed.iter().map(String::as_str),
            delimiter,
            spacer,
            true,
        );
        assert_eq!(parse_tokens(&joined, delimiter, spacer).confirmed, tokens.confirmed);
    }
});
