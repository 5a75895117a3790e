//! Alternate-name suggestions for duplicate conflicts.

use std::collections::HashSet;

use uuid::Uuid;

use docvault_core::types::ObjectKind;
use docvault_entity::record::ListingQuery;

use crate::api::DocumentApi;
use crate::context::RequestContext;

/// Split `name` into stem and extension. Dotfiles and names without a dot
/// have no extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Remove a trailing ` (n)` disambiguator so `a (1).txt` suggests
/// `a (2).txt` rather than `a (1) (1).txt`.
fn strip_counter(stem: &str) -> &str {
    let Some(open) = stem.rfind(" (") else {
        return stem;
    };
    let tail = &stem[open + 2..];
    match tail.strip_suffix(')') {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            &stem[..open]
        }
        _ => stem,
    }
}

/// Suggest a name not in `taken`, appending ` (1)`, ` (2)`, ... to the
/// stem.
///
/// Files keep their extension after the counter; folders and groups
/// (`keep_extension == false`) treat the whole name as the stem. Once
/// `limit` counters are exhausted a short random fragment is used.
pub fn suggest_name(name: &str, taken: &HashSet<String>, keep_extension: bool, limit: u32) -> String {
    let (stem, ext) = if keep_extension {
        split_extension(name)
    } else {
        (name, None)
    };
    let stem = strip_counter(stem);
    let render = |tag: &str| match ext {
        Some(ext) => format!("{stem} ({tag}).{ext}"),
        None => format!("{stem} ({tag})"),
    };

    for counter in 1..=limit {
        let candidate = render(&counter.to_string());
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    let fragment = Uuid::new_v4().simple().to_string();
    render(&fragment[..8])
}

/// Suggest a free name for `name` among what is listed at `query`.
///
/// Groups are checked against the groups listing, files and folders
/// against the folder listing. A failed listing still yields a
/// suggestion, just without knowledge of existing names.
pub(crate) async fn suggest_at(
    api: &dyn DocumentApi,
    ctx: &RequestContext,
    kind: ObjectKind,
    name: &str,
    query: &ListingQuery,
    limit: u32,
) -> String {
    let mut taken: HashSet<String> = match kind {
        ObjectKind::Group => api
            .list_groups(&ctx.principal, query)
            .await
            .map(|records| records.into_iter().map(|r| r.name).collect())
            .unwrap_or_default(),
        ObjectKind::File | ObjectKind::Folder => api
            .list_folder(&ctx.principal, query)
            .await
            .map(|records| records.into_iter().map(|r| r.name).collect())
            .unwrap_or_default(),
    };
    taken.insert(name.to_string());
    suggest_name(name, &taken, kind == ObjectKind::File, limit)
}
