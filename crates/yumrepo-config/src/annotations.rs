//! Renders struct documentation as TOML comments.
//!
//! Used when writing a fresh configuration file so that every key arrives with
//! the description of what it controls.

use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{ArrayOfTables, Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Prepends `docs` to the existing prefix of `decor`, one `#` comment per line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let comments: String = docs
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                "#\n".to_string()
            } else {
                format!("# {}\n", line.trim_end())
            }
        })
        .collect();

    let existing = decor
        .prefix()
        .and_then(RawString::as_str)
        .unwrap_or_default();

    let prefix = if existing.is_empty() || existing.ends_with('\n') {
        format!("{existing}{comments}")
    } else {
        format!("{existing}\n{comments}")
    };
    decor.set_prefix(prefix);
}

/// Attaches field documentation of `T` to the matching keys of `table`.
///
/// Nested tables get the type-level docs of `T` when `is_root` is false. Keys without
/// matching field docs are left untouched.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let name = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&name) else {
            warn!(
                "No documentation for key '{}' on '{}'",
                name,
                type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(name)),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    append_docs_as_toml_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}

/// Annotates the first table of `array` with the docs of `T`.
///
/// All tables in the array share one shape, so the first one carries the comments.
pub fn annotate_toml_array_of_tables<T>(array: &mut ArrayOfTables) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if let Some(first) = array.iter_mut().next() {
        annotate_toml_table::<T>(first, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_append_docs_as_toml_comments() {
        let mut decor = Decor::new("", "");
        append_docs_as_toml_comments(&mut decor, "Cache directory\n\nDefault: none");

        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "# Cache directory\n#\n# Default: none\n");
    }

    #[test]
    fn test_append_docs_keeps_existing_prefix() {
        let mut decor = Decor::new("\n", "");
        append_docs_as_toml_comments(&mut decor, "Enabled");

        let prefix = decor.prefix().and_then(|p| p.as_str()).unwrap();
        assert_eq!(prefix, "\n# Enabled\n");
    }

    #[test]
    fn test_annotated_document_mentions_every_cache_key() {
        let doc = Config::default_config().to_annotated_document().unwrap();
        let rendered = doc.to_string();

        assert!(rendered.contains("cache_path"));
        assert!(rendered.contains("cache_expire"));
        assert!(rendered.contains("cache_enabled"));
        assert!(rendered.contains("# Whether fetched metadata is kept on disk."));
    }
}
