// Best-effort parsing of module argument strings such as
// `sink_name=foo sink_properties=device.description="Foo Bar" rate=48000`
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// key=value, where value is either a double-quoted span or a run of non-whitespace
static ARGUMENT_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\S+?)=("[^"]+"|\S+)"#).expect("argument pattern is valid")
});

/// Extract `key=value` pairs from a module's raw argument string.
///
/// Fragments that don't look like a pair are skipped. A value wrapped in
/// double quotes has exactly one pair of quotes removed.
pub fn parse_module_arguments(argument: &str) -> HashMap<String, String> {
    ARGUMENT_PAIR
        .captures_iter(argument)
        .map(|caps| {
            let key = caps[1].to_string();
            let value = strip_quotes(&caps[2]).to_string();
            (key, value)
        })
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
