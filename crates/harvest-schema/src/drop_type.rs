//! Parser for the `drop_type` item list
//!
//! The source stores loot items as one string of comma-separated, double-quoted
//! tokens: `"wood","seed","stick"`. Unquoted tokens are accepted too.

use harvest_core::ItemId;

/// Split a `drop_type` value into item ids, keeping declaration order
pub fn parse_item_list(raw: &str) -> Result<Vec<ItemId>, String> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .enumerate()
        .map(|(index, token)| parse_token(token).ok_or_else(|| describe(index, token)))
        .collect()
}

fn parse_token(token: &str) -> Option<ItemId> {
    let token = token.trim();
    let inner = match (token.strip_prefix('"'), token.strip_suffix('"')) {
        (Some(_), Some(_)) if token.len() >= 2 => &token[1..token.len() - 1],
        (None, None) => token,
        // unbalanced quote
        _ => return None,
    };
    let inner = inner.trim();
    if inner.is_empty() || inner.contains('"') {
        return None;
    }
    Some(ItemId::new(inner))
}

fn describe(index: usize, token: &str) -> String {
    format!("item {} ({:?}) is not a non-empty quoted name", index + 1, token.trim())
}
