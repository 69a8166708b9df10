use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

type Fields = IndexMap<String, String>;

/// One row of a feed, keyed by the header row. Keys keep the header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    pub fn new() -> Record {
        Record(Fields::new())
    }

    /// Value of a field, or "" when the feed does not define it.
    pub fn field(&self, name: &str) -> &str {
        self.get(name).map(|v| v.as_str()).unwrap_or_default()
    }
}

impl Deref for Record {
    type Target = Fields;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Record {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parse CSV text (header row first) into records.
///
/// Quoted values may contain commas, escaped quotes (`""`) and line breaks.
/// Blank lines are dropped and short rows are padded with empty values.
pub fn parse(text: &str) -> Vec<Record> {
    let lines = split_lines(text);
    let mut lines = lines.iter();

    let headers = match lines.next() {
        Some(header) => split_fields(header),
        None => return vec![],
    };

    lines
        .map(|line| split_fields(line))
        .filter(|fields| !(fields.is_empty() || (fields.len() == 1 && fields[0].is_empty())))
        .map(|fields| {
            let mut record = Record::new();
            for (idx, header) in headers.iter().enumerate() {
                let value = fields.get(idx).cloned().unwrap_or_default();
                record.insert(header.clone(), value);
            }
            record
        })
        .collect()
}

/// Split raw text into logical lines. Quote characters are kept so that
/// `split_fields` can handle them; line breaks inside quotes are content.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = vec![];
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '\n' | '\r' if !in_quotes => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                // \r\n is a single line break
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    lines
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match (in_quotes, ch) {
            (true, '"') => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            (false, '"') => in_quotes = true,
            (false, ',') => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            (_, ch) => field.push(ch),
        }
    }
    fields.push(field.trim().to_string());

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn empty_input_gives_no_records() {
        assert!(parse("").is_empty());
        assert!(parse("\n\r\n  \n").is_empty());
    }

    #[test]
    fn header_only_gives_no_records() {
        assert!(parse("Name,Points\n").is_empty());
    }

    #[test]
    fn parses_simple_rows() {
        let records = parse("Name,Points\nAlice,10\nBob,5");
        assert_eq!(
            records,
            vec![
                record(&[("Name", "Alice"), ("Points", "10")]),
                record(&[("Name", "Bob"), ("Points", "5")]),
            ]
        );
    }

    #[test]
    fn keys_follow_header_order() {
        let records = parse("Zeta,Alpha,Mid\n1,2,3\n");
        let keys = records[0].keys().map(|k| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn quoted_value_with_comma_quote_and_newline() {
        let original = "Say \"hi\", then\nleave";
        let text = "Name,Description\r\nAlice,\"Say \"\"hi\"\", then\nleave\"\r\n";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("Description"), original);
    }

    #[test]
    fn crlf_and_lone_cr_are_line_breaks() {
        let records = parse("A,B\r\n1,2\r3,4");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].field("A"), "3");
    }

    #[test]
    fn blank_line_between_header_and_data_is_dropped() {
        let records = parse("Name,Points\n\n   \nAlice,3\n");
        assert_eq!(records, vec![record(&[("Name", "Alice"), ("Points", "3")])]);
    }

    #[test]
    fn short_rows_are_padded_and_trailing_field_is_kept() {
        let records = parse("Name,Challenge,Points\nAlice,Dishes\nBob,Laundry,");
        assert_eq!(records[0].field("Points"), "");
        assert_eq!(records[0].field("Challenge"), "Dishes");
        assert_eq!(records[1].field("Points"), "");
        assert_eq!(records[1].len(), 3);
    }

    #[test]
    fn fields_are_trimmed_outside_quotes() {
        let records = parse(" Name , Points \n  Alice  ,  7 ");
        assert_eq!(records, vec![record(&[("Name", "Alice"), ("Points", "7")])]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let records = parse("Name\nAlice,surplus");
        assert_eq!(records, vec![record(&[("Name", "Alice")])]);
    }

    #[test]
    fn row_with_single_empty_field_is_skipped() {
        let records = parse("Name,Points\n\"\"\nBob,1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("Name"), "Bob");
    }

    #[test]
    fn reparsing_a_requoted_row_is_stable() {
        let records = parse("Name,Challenge\n\"Smith, Jo\",\"The \"\"Big\"\" One\"\n");
        let requoted = records[0]
            .values()
            .map(|v| format!("\"{}\"", v.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        let again = parse(&format!("Name,Challenge\n{requoted}\n"));
        assert_eq!(again, records);
    }

    #[test]
    fn snapshot_json_keeps_field_order() {
        let records = parse("Zeta,Alpha\n1,2\n");
        let json = serde_json::to_string(&records).unwrap();
        assert_eq!(json, r#"[{"Zeta":"1","Alpha":"2"}]"#);
        let back: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }
}
