//! `defaults.parm` parameter files
//!
//! One `NAME VALUE` or `NAME,VALUE` pair per line, `#` comments ignored.

use std::collections::BTreeMap;

/// Parse parameter defaults. Lines without a value are skipped.
pub fn parse_defaults(content: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let is_separator = |c: char| c.is_whitespace() || c == ',';
        let Some(split) = line.find(is_separator) else {
            continue;
        };
        let (name, rest) = line.split_at(split);
        let value = rest.trim_start_matches(is_separator);
        if !value.is_empty() {
            params.insert(name.to_string(), value.to_string());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let params = parse_defaults(
            "# defaults for this board\n\
             SERIAL1_PROTOCOL 23\n\
             OSD_TYPE,1\n\
             BATT_MONITOR ,  4\n\
             LONELY\n\
             \n\
             NTF_LED_TYPES 257 # trailing note\n",
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params["SERIAL1_PROTOCOL"], "23");
        assert_eq!(params["OSD_TYPE"], "1");
        assert_eq!(params["BATT_MONITOR"], "4");
        assert_eq!(params["NTF_LED_TYPES"], "257 # trailing note");
        assert!(!params.contains_key("LONELY"));
    }
}
