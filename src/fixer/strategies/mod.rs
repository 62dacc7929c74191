//! Built-in remediation strategies

mod dynamic_import;
mod extract_shared;
mod import_type;

pub use dynamic_import::DynamicImportStrategy;
pub use extract_shared::ExtractSharedStrategy;
pub use import_type::ImportTypeStrategy;

use super::types::FixStrategy;

/// The built-in strategies in registration order
pub fn default_strategies() -> Vec<Box<dyn FixStrategy>> {
    vec![
        Box::new(ImportTypeStrategy),
        Box::new(DynamicImportStrategy),
        Box::new(ExtractSharedStrategy),
    ]
}

/// Rewrite the 1-based `line` of `content`, keeping every line ending intact
///
/// Returns `None` when the line does not exist or `rewrite` declines it.
fn rewrite_line<F>(content: &str, line: usize, rewrite: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    let index = line.checked_sub(1)?;
    let original = content.split_inclusive('\n').nth(index)?;

    let body = original.trim_end_matches(['\n', '\r']);
    let ending = &original[body.len()..];
    let replaced = rewrite(body)?;

    let mut out = String::with_capacity(content.len() + replaced.len());
    for (i, current) in content.split_inclusive('\n').enumerate() {
        if i == index {
            out.push_str(&replaced);
            out.push_str(ending);
        } else {
            out.push_str(current);
        }
    }
    Some(out)
}
