//! Human-readable row labels built from the dictionary.
//!
//! Labels carry light HTML markup (`<b>`, `<i>`) because their consumers are dashboard tables.

use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
use crate::selection::ONE_HOT_SEPARATOR;

/// Default maximum label length in descriptive tables.
pub const TABLE_LABEL_MAX_LEN: usize = 100;

/// Shorten `label` to at most `max_len` characters at a word boundary and append `" ..."`.
///
/// Labels within the limit are returned unchanged.
pub fn trim_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        return label.to_string();
    }
    let head: String = label.chars().take(max_len).collect();
    let words: Vec<&str> = head.split(' ').collect();
    format!("{} ...", words[..words.len() - 1].join(" "))
}

/// Strip a conditional prefix: `"If yes: Which drug"` becomes `" Which drug"`.
fn strip_condition(label: &str) -> &str {
    if label.starts_with("If") {
        label.rsplit(':').next().unwrap_or(label)
    } else {
        label
    }
}

fn is_one_hot_child(field: &FieldDescriptor, separator: &str) -> bool {
    field.field_name.contains(separator)
}

/// Row label for a descriptive table.
///
/// - one-hot children are indented with `"   ↳ "`, everything else is bold,
/// - sections are additionally italic,
/// - non-children get a type marker: `" (*)"` for count/percent rows, `" (+)"` for
///   median/IQR rows.
///
/// One-hot children are recognized by `separator` in their name.
pub fn table_row_label(field: &FieldDescriptor, max_len: usize, separator: &str) -> String {
    let child = is_one_hot_child(field, separator);
    let section = field.field_type == FieldType::Section;
    let text = trim_label(strip_condition(&field.field_label), max_len);

    let mut out = String::new();
    out.push_str(if child { "   ↳ " } else { "<b>" });
    if section {
        out.push_str("<i>");
    }
    out.push_str(&text);
    if section {
        out.push_str("</i>");
    }
    if !child {
        out.push_str("</b>");
        out.push_str(type_marker(&field.field_type));
    }
    out
}

fn type_marker(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Categorical | FieldType::Binary => " (*)",
        FieldType::Numeric => " (+)",
        FieldType::Section | FieldType::Other(_) => "",
    }
}

/// Standalone variable label, used by frequency charts.
///
/// One-hot children read `"<b>Parent question</b>, Answer"`; other fields read
/// `"<b>Label</b>"`. Children are recognized by the default `"___"` separator. Conditional
/// prefixes are stripped and both parts are trimmed to `max_len`.
pub fn variable_label(dictionary: &Dictionary, field: &FieldDescriptor, max_len: usize) -> String {
    let name = trim_label(strip_condition(&field.field_label), max_len);
    if is_one_hot_child(field, ONE_HOT_SEPARATOR) {
        let parent = dictionary.parent_label(field).unwrap_or_default();
        let parent = trim_label(strip_condition(parent), max_len);
        format!("<b>{parent}</b>, {name}")
    } else {
        format!("<b>{name}</b>")
    }
}

/// [`variable_label`] by field name, falling back to the bare name for unknown fields.
pub fn variable_label_for(dictionary: &Dictionary, name: &str, max_len: usize) -> String {
    dictionary
        .get(name)
        .map_or_else(|| name.to_string(), |f| variable_label(dictionary, f, max_len))
}

#[cfg(test)]
mod tests {
    use super::{table_row_label, trim_label, variable_label, variable_label_for};
    use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};

    #[test]
    fn trim_label_cuts_at_word_boundary() {
        assert_eq!(trim_label("short", 40), "short");
        assert_eq!(
            trim_label("Chronic cardiac disease including congenital", 20),
            "Chronic cardiac ..."
        );
    }

    #[test]
    fn table_row_labels_by_kind() {
        let section = FieldDescriptor::new("compl", FieldType::Section, "Complications");
        let numeric = FieldDescriptor::new("demog_age", FieldType::Numeric, "Age (years)");
        let question =
            FieldDescriptor::new("demog_sex", FieldType::Categorical, "If known: Sex at birth");
        let child = FieldDescriptor::new("demog_sex___Male", FieldType::Binary, "Male")
            .with_parent("demog_sex");

        assert_eq!(table_row_label(&section, 100, "___"), "<b><i>Complications</i></b>");
        assert_eq!(table_row_label(&numeric, 100, "___"), "<b>Age (years)</b> (+)");
        assert_eq!(table_row_label(&question, 100, "___"), "<b> Sex at birth</b> (*)");
        assert_eq!(table_row_label(&child, 100, "___"), "   ↳ Male");

        let custom = FieldDescriptor::new("demog_sex::Male", FieldType::Binary, "Male")
            .with_parent("demog_sex");
        assert_eq!(table_row_label(&custom, 100, "::"), "   ↳ Male");
        assert_eq!(table_row_label(&custom, 100, "___"), "<b>Male</b> (*)");
    }

    #[test]
    fn variable_labels_prefix_parent_for_children() {
        let dict = Dictionary::new(vec![
            FieldDescriptor::new("demog_sex", FieldType::Categorical, "Sex at birth"),
            FieldDescriptor::new("demog_sex___Male", FieldType::Binary, "Male")
                .with_parent("demog_sex"),
            FieldDescriptor::new("compl_anaemia", FieldType::Binary, "Anaemia"),
        ])
        .unwrap();
        let child = dict.get("demog_sex___Male").unwrap();
        assert_eq!(variable_label(&dict, child, 40), "<b>Sex at birth</b>, Male");
        assert_eq!(variable_label_for(&dict, "compl_anaemia", 40), "<b>Anaemia</b>");
        assert_eq!(variable_label_for(&dict, "unknown", 40), "unknown");
    }
}
