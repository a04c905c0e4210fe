use std::collections::BTreeMap;

use super::{AstNode, EvalError};

/// Hash-map storage. Ordered by key so that printing is deterministic.
pub type Map = BTreeMap<MapKey, AstNode>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Canonical string form of a map key.
///
/// Strings keep their quotes and symbols get a leading `'`, so `"a"`, `:a`, `a` and `1`
/// stay distinct even when a symbol is built from text like `":a"` or `"1"`.
pub struct MapKey(String);

impl MapKey {
    pub fn from_node(node: &AstNode) -> Result<Self, EvalError> {
        match node {
            AstNode::String(s) => Ok(MapKey(format!("\"{s}\""))),
            AstNode::Keyword(k) => Ok(MapKey(k.clone())),
            AstNode::Symbol(s) => Ok(MapKey(format!("'{s}"))),
            AstNode::Number(n) => Ok(MapKey(n.to_string())),
            other => Err(EvalError::InvalidMapKey(other.type_name())),
        }
    }

    /// Recover the value this key was built from
    pub fn to_node(&self) -> AstNode {
        let key = self.0.as_str();
        if let Some(sym) = key.strip_prefix('\'') {
            AstNode::symbol(sym)
        } else if key.len() >= 2 && key.starts_with('"') && key.ends_with('"') {
            AstNode::String(key[1..key.len() - 1].to_string())
        } else if key.starts_with(':') {
            AstNode::Keyword(key.to_string())
        } else {
            key.parse().map(AstNode::Number).unwrap_or_default()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Build a map from alternating keys and values
pub fn map_from_pairs(name: &str, items: &[AstNode]) -> Result<Map, EvalError> {
    let mut map = Map::new();
    insert_pairs(name, &mut map, items)?;
    Ok(map)
}

/// Insert alternating keys and values, later keys replacing earlier ones
pub fn insert_pairs(name: &str, map: &mut Map, items: &[AstNode]) -> Result<(), EvalError> {
    if items.len() % 2 != 0 {
        return Err(EvalError::arity(name, "an even number of", items.len()));
    }
    for pair in items.chunks(2) {
        map.insert(MapKey::from_node(&pair[0])?, pair[1].clone());
    }
    Ok(())
}
