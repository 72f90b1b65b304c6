//! Conversion between gpgconf's text encoding of option values and
//! [`ConfigValue`].
//!
//! gpgconf does not really percent-encode. It only encodes `%`, `:` and `,`
//! and expects everything else to be UTF-8. String-like values additionally
//! carry a leading `"` on the wire, and list elements are separated by
//! unescaped commas.

use crate::model::{ArgType, ConfigValue};

/// Escape `%`, `:` and (optionally) `,` for a gpgconf field.
pub fn escape(input: &str, handle_comma: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3a"),
            ',' if handle_comma => out.push_str("%2c"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. Decodes in a single left-to-right pass, so
/// `%253a` becomes `%3a` and not `:`. Unknown `%` sequences are kept as is.
pub fn unescape(input: &str, handle_comma: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(1..3) {
            Some("25") => Some('%'),
            Some(code) if code.eq_ignore_ascii_case("3a") => Some(':'),
            Some(code) if handle_comma && code.eq_ignore_ascii_case("2c") => Some(','),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape a user, password or base-DN part of an LDAP server value.
///
/// These parts are escaped twice and without comma handling: the whole
/// server value gets escaped once more as an outer field, and an escaped `:`
/// is what separates the parts inside it.
pub fn urlpart_escape(input: &str) -> String {
    escape(&escape(input, false), false)
}

pub fn urlpart_unescape(input: &str) -> String {
    unescape(&unescape(input, false), false)
}

/// Decode one wire field (DEFAULT or VALUE) into a value.
///
/// With `unescape_wire` the string is taken as gpgconf emitted it: string
/// elements must start with `"` and are unescaped. Without it the text is
/// trusted as typed by a caller. Malformed input never fails; it is logged
/// and replaced by a fallback.
pub fn decode_value(
    name: &str,
    arg_type: ArgType,
    is_list: bool,
    input: &str,
    unescape_wire: bool,
) -> ConfigValue {
    if is_list {
        if arg_type == ArgType::None {
            return ConfigValue::Count(parse_number(name, input, "list-of-none count"));
        }
        if input.is_empty() {
            return empty_list(arg_type);
        }
        let items = input.split(',');
        return match arg_type {
            ArgType::Int => ConfigValue::IntList(
                items
                    .map(|item| parse_number(name, &maybe_unescape(item, unescape_wire), "int"))
                    .collect(),
            ),
            ArgType::UInt => ConfigValue::UIntList(
                items
                    .map(|item| parse_number(name, &maybe_unescape(item, unescape_wire), "uint"))
                    .collect(),
            ),
            _ => ConfigValue::StringList(
                items
                    .map(|item| decode_string(name, item, unescape_wire))
                    .collect(),
            ),
        };
    }

    match arg_type {
        ArgType::None => ConfigValue::Bool(parse_flag(input)),
        ArgType::Int | ArgType::UInt if input.is_empty() => ConfigValue::Empty,
        ArgType::Int => ConfigValue::Int(parse_number(
            name,
            &maybe_unescape(input, unescape_wire),
            "int",
        )),
        ArgType::UInt => ConfigValue::UInt(parse_number(
            name,
            &maybe_unescape(input, unescape_wire),
            "uint",
        )),
        // empty string means "not set"
        _ if input.is_empty() => ConfigValue::Empty,
        _ => ConfigValue::String(decode_string(name, input, unescape_wire)),
    }
}

/// Encode a value for the wire (`escape == true`) or for display.
pub fn encode_value(arg_type: ArgType, is_list: bool, value: &ConfigValue, escape_wire: bool) -> String {
    let quote = |s: &str| {
        if escape_wire {
            format!("\"{}", escape(s, true))
        } else {
            s.to_string()
        }
    };

    match value {
        ConfigValue::Empty => {
            if is_list && arg_type == ArgType::None {
                "0".to_string()
            } else {
                String::new()
            }
        }
        ConfigValue::Bool(b) => {
            if *b {
                "1".to_string()
            } else {
                String::new()
            }
        }
        ConfigValue::Count(n) => n.to_string(),
        ConfigValue::Int(i) => i.to_string(),
        ConfigValue::UInt(u) => u.to_string(),
        ConfigValue::String(s) => {
            if arg_type.is_string_like() {
                quote(s)
            } else {
                s.clone()
            }
        }
        ConfigValue::IntList(items) => join(items.iter().map(|i| i.to_string())),
        ConfigValue::UIntList(items) => join(items.iter().map(|u| u.to_string())),
        ConfigValue::StringList(items) => join(items.iter().map(|s| quote(s))),
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}

fn empty_list(arg_type: ArgType) -> ConfigValue {
    match arg_type {
        ArgType::Int => ConfigValue::IntList(Vec::new()),
        ArgType::UInt => ConfigValue::UIntList(Vec::new()),
        _ => ConfigValue::StringList(Vec::new()),
    }
}

fn maybe_unescape(input: &str, unescape_wire: bool) -> String {
    if unescape_wire {
        unescape(input, true)
    } else {
        input.to_string()
    }
}

fn decode_string(name: &str, input: &str, unescape_wire: bool) -> String {
    if !unescape_wire || input.is_empty() {
        return input.to_string();
    }
    let body = match input.strip_prefix('"') {
        Some(body) => body,
        None => {
            tracing::warn!("value of '{name}' should start with '\"': {input}");
            input
        }
    };
    unescape(body, true)
}

fn parse_flag(input: &str) -> bool {
    let trimmed = input.trim();
    !(trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("false"))
}

fn parse_number<T>(name: &str, input: &str, what: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return T::default();
    }
    trimmed.parse().unwrap_or_else(|_| {
        tracing::warn!("malformed {what} value for '{name}': {input}");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldap::LdapServer;

    #[test]
    fn escape_handles_percent_colon_and_comma() {
        assert_eq!(escape("a%b:c,d", true), "a%25b%3ac%2cd");
        assert_eq!(escape("a%b:c,d", false), "a%25b%3ac,d");
    }

    #[test]
    fn unescape_is_single_pass() {
        assert_eq!(unescape("%253a", true), "%3a");
        assert_eq!(unescape(&escape("%3a", true), true), "%3a");
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape("100%", true), "100%");
        assert_eq!(unescape("%zz%2C", true), "%zz,");
        assert_eq!(unescape("%2c", false), "%2c");
    }

    #[test]
    fn urlpart_escape_is_double_escape_without_comma() {
        assert_eq!(urlpart_escape("a:b,c"), "a%253ab,c");
        assert_eq!(urlpart_unescape("a%253ab,c"), "a:b,c");
    }

    #[test]
    fn string_value_needs_leading_quote() {
        let v = decode_value("x", ArgType::String, false, "\"hello%3aworld", true);
        assert_eq!(v, ConfigValue::String("hello:world".into()));

        // missing quote is logged and the text is used as is
        let v = decode_value("x", ArgType::String, false, "bare", true);
        assert_eq!(v, ConfigValue::String("bare".into()));
    }

    #[test]
    fn empty_string_is_not_set() {
        assert_eq!(
            decode_value("x", ArgType::Path, false, "", true),
            ConfigValue::Empty
        );
    }

    #[test]
    fn list_of_none_counts() {
        assert_eq!(
            decode_value("v", ArgType::None, true, "3", true),
            ConfigValue::Count(3)
        );
        assert_eq!(
            decode_value("v", ArgType::None, true, "", true),
            ConfigValue::Count(0)
        );
        assert_eq!(
            decode_value("v", ArgType::None, true, "many", true),
            ConfigValue::Count(0)
        );
    }

    #[test]
    fn malformed_numbers_fall_back_to_zero() {
        assert_eq!(
            decode_value("n", ArgType::Int, false, "12x", true),
            ConfigValue::Int(0)
        );
        assert_eq!(
            decode_value("n", ArgType::UInt, true, "1,-2,3", true),
            ConfigValue::UIntList(vec![1, 0, 3])
        );
    }

    #[test]
    fn string_list_keeps_empty_elements() {
        let v = decode_value("s", ArgType::String, true, "\"a,,\"b%2cc", true);
        assert_eq!(
            v,
            ConfigValue::StringList(vec!["a".into(), "".into(), "b,c".into()])
        );
    }

    #[test]
    fn encode_quotes_and_escapes_strings() {
        let v = ConfigValue::StringList(vec!["a,b".into(), "".into()]);
        assert_eq!(encode_value(ArgType::String, true, &v, true), "\"a%2cb,\"");
        assert_eq!(encode_value(ArgType::String, true, &v, false), "a,b,");
    }

    #[test]
    fn encode_flags() {
        assert_eq!(
            encode_value(ArgType::None, false, &ConfigValue::Bool(true), true),
            "1"
        );
        assert_eq!(
            encode_value(ArgType::None, false, &ConfigValue::Bool(false), true),
            ""
        );
        assert_eq!(
            encode_value(ArgType::None, true, &ConfigValue::Count(2), true),
            "2"
        );
    }

    #[test]
    fn ldap_base_dn_with_delimiters_survives_the_wire() {
        let server = LdapServer {
            host: "ldap.example.org".into(),
            port: Some(636),
            user: "cn=reader".into(),
            password: "pw".into(),
            base_dn: "ou=a:b,dc=x".into(),
        };
        let value = ConfigValue::StringList(vec![server.to_value()]);
        let wire = encode_value(ArgType::LdapUrl, true, &value, true);
        assert!(!wire.contains(','), "{wire}");

        let back = decode_value("ldapserver", ArgType::LdapUrl, true, &wire, true);
        let ConfigValue::StringList(items) = back else {
            panic!("expected a string list");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(LdapServer::parse(&items[0]), Some(server));
    }

    #[test]
    fn round_trip_across_types() {
        let cases = [
            (ArgType::String, false, ConfigValue::String("50%: a,b".into())),
            (ArgType::String, false, ConfigValue::String(String::new())),
            (ArgType::Int, false, ConfigValue::Int(-42)),
            (ArgType::UInt, false, ConfigValue::UInt(4096)),
            (ArgType::Path, false, ConfigValue::String("/home/u/.gnupg/x:y".into())),
            (ArgType::None, false, ConfigValue::Bool(true)),
            (ArgType::None, true, ConfigValue::Count(5)),
            (ArgType::Int, true, ConfigValue::IntList(vec![-1, 0, 7])),
            (ArgType::UInt, true, ConfigValue::UIntList(vec![1, 2])),
            (
                ArgType::String,
                true,
                ConfigValue::StringList(vec!["%,".into(), "".into(), "x:y".into()]),
            ),
            (ArgType::Path, true, ConfigValue::StringList(vec!["/tmp/a".into()])),
            (ArgType::Int, true, ConfigValue::IntList(Vec::new())),
        ];

        for (arg_type, is_list, value) in cases {
            let wire = encode_value(arg_type, is_list, &value, true);
            let back = decode_value("rt", arg_type, is_list, &wire, true);
            assert_eq!(back, value, "{arg_type} list={is_list} wire={wire}");
        }
    }
}
