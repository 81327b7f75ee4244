//! Decision tree node model and tolerant JSON decoding.
//!
//! Trees come from an external generator and are frequently sloppy: amounts
//! arrive as numbers or strings, `children` may be `null`, missing, or some
//! unexpected shape. Decoding never fails on those fields; it degrades them
//! to "absent" instead.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::domain::error::DomainError;

/// Value attached to a node, as it appeared in the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    /// Numeric JSON value; a boolean amount counts as 1 or 0
    Number(f64),
    /// Anything else that was given as a scalar, kept verbatim for display
    Text(String),
}

impl Amount {
    /// Numeric value of this amount, `None` when it does not parse.
    ///
    /// NaN is treated as unparseable so that ranking stays total.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (!v.is_nan()).then_some(v)
    }

    /// Display form: two decimals when numeric, raw text otherwise.
    pub fn display(&self) -> String {
        match self.value() {
            Some(v) => format!("{:.2}", v),
            None => match self {
                Amount::Number(n) => n.to_string(),
                Amount::Text(s) => s.clone(),
            },
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One decision point (or terminal) of the tree.
///
/// `Clone` and `Drop` are iterative, so arbitrarily deep chains neither
/// overflow the stack when copied nor when released.
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct Node {
    /// Action label, may be empty
    #[serde(default, deserialize_with = "lenient_action")]
    pub action: String,
    /// Optional amount; unparseable values are kept for display only
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Amount>,
    /// Ordered children; empty means terminal
    #[serde(default, deserialize_with = "lenient_children")]
    pub children: Vec<Node>,
    /// Depth assigned by the annotation pass, not part of the input
    #[serde(skip)]
    pub depth: usize,
}

impl Node {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            amount: None,
            children: Vec::new(),
            depth: 0,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(Amount::Number(amount));
        self
    }

    pub fn with_text_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(Amount::Text(amount.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Numeric amount, `None` when absent or unparseable.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_ref().and_then(Amount::value)
    }

    /// `action` followed by the formatted amount on a second line.
    pub fn label(&self) -> String {
        match &self.amount {
            Some(amount) => format!("{}\n{}", self.action, amount.display()),
            None => self.action.clone(),
        }
    }

    /// Copy of this node without its children.
    pub fn shallow_copy(&self) -> Self {
        Self {
            action: self.action.clone(),
            amount: self.amount.clone(),
            children: Vec::new(),
            depth: self.depth,
        }
    }

    /// Parse a tree document.
    ///
    /// The document is either the root object itself or an array whose
    /// first element is the root. An empty array has no root and is fatal.
    /// Nesting depth is unbounded: the decoder grows its stack on demand.
    pub fn from_json(input: &str) -> Result<Self, DomainError> {
        let parse_err = |e: serde_json::Error| DomainError::Parse(e.to_string());

        let mut json = serde_json::Deserializer::from_str(input);
        json.disable_recursion_limit();
        let doc = TreeDocument::deserialize(serde_stacker::Deserializer::new(&mut json))
            .map_err(parse_err)?;
        json.end().map_err(parse_err)?;

        doc.0.ok_or(DomainError::EmptyRoot)
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        // post-order over an explicit stack: children are copied before their parent
        let mut finished: Vec<Node> = Vec::new();
        let mut stack: Vec<(&Node, bool)> = vec![(self, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let mut copy = node.shallow_copy();
                copy.children = finished.split_off(finished.len() - node.children.len());
                finished.push(copy);
            } else {
                stack.push((node, true));
                for child in node.children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        finished.pop().unwrap_or_default()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            // `node` goes out of scope childless
            pending.append(&mut node.children);
        }
    }
}

/// Top-level input: a root object, or a list whose first element is the root.
struct TreeDocument(Option<Node>);

impl<'de> Deserialize<'de> for TreeDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = TreeDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a tree node object or a non-empty array of them")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                Node::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(|root| TreeDocument(Some(root)))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let root = seq.next_element::<Node>()?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(TreeDocument(root))
            }
        }

        deserializer.deserialize_any(DocumentVisitor)
    }
}

/// Scalars become text; `null` becomes the empty label.
fn lenient_action<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let visitor = ScalarVisitor {
        bools_as_numbers: false,
    };
    Ok(match deserializer.deserialize_any(visitor)? {
        Some(Amount::Text(s)) => s,
        Some(Amount::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Amount>, D::Error> {
    deserializer.deserialize_any(ScalarVisitor {
        bools_as_numbers: true,
    })
}

/// Accepts any JSON value; scalars survive, the rest is absent.
#[derive(Clone, Copy)]
struct ScalarVisitor {
    bools_as_numbers: bool,
}

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Option<Amount>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Amount::Number(v as f64)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Amount::Number(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(Amount::Number(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(Amount::Text(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(Amount::Text(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        if self.bools_as_numbers {
            Ok(Some(Amount::Number(if v { 1.0 } else { 0.0 })))
        } else {
            Ok(Some(Amount::Text(v.to_string())))
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

fn lenient_children<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
    deserializer.deserialize_any(ChildrenVisitor)
}

/// Only an array yields children; every other shape means terminal.
struct ChildrenVisitor;

impl<'de> Visitor<'de> for ChildrenVisitor {
    type Value = Vec<Node>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of tree nodes or null")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut children = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(child) = seq.next_element::<Node>()? {
            children.push(child);
        }
        Ok(children)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_object_document_when_parsing_then_returns_root() {
        let root = Node::from_json(r#"{"action":"root","children":[{"action":"call","amount":1}]}"#)
            .unwrap();
        assert_eq!(root.action, "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].amount_value(), Some(1.0));
    }

    #[test]
    fn given_array_document_when_parsing_then_uses_first_element() {
        let root = Node::from_json(r#"[{"action":"first"},{"action":"second"}]"#).unwrap();
        assert_eq!(root.action, "first");
    }

    #[test]
    fn given_empty_array_when_parsing_then_fails_with_empty_root() {
        let err = Node::from_json("[]").unwrap_err();
        assert!(matches!(err, DomainError::EmptyRoot));
    }

    #[test]
    fn given_sloppy_fields_when_parsing_then_degrades_gracefully() {
        let root = Node::from_json(
            r#"{"action":null,"amount":"abc","children":{"oops":1},"extra":[1,2]}"#,
        )
        .unwrap();
        assert_eq!(root.action, "");
        assert_eq!(root.amount, Some(Amount::Text("abc".into())));
        assert_eq!(root.amount_value(), None);
        assert!(root.is_terminal());
    }

    #[test]
    fn given_text_amount_when_numeric_then_parses_for_ranking() {
        let node = Node::new("bet").with_text_amount(" 2.5 ");
        assert_eq!(node.amount_value(), Some(2.5));
        assert_eq!(node.label(), "bet\n2.50");
    }

    #[test]
    fn given_unparseable_amount_when_labelling_then_keeps_raw_text() {
        let node = Node::new("bet").with_text_amount("all-in");
        assert_eq!(node.label(), "bet\nall-in");
        assert_eq!(Node::new("fold").label(), "fold");
    }

    #[test]
    fn given_nan_text_when_reading_value_then_is_absent() {
        assert_eq!(Amount::Text("NaN".into()).value(), None);
    }

    #[test]
    fn given_boolean_amount_when_parsing_then_counts_as_number() {
        let root = Node::from_json(r#"{"action": true, "amount": true}"#).unwrap();
        assert_eq!(root.action, "true");
        assert_eq!(root.amount_value(), Some(1.0));
        assert_eq!(root.label(), "true\n1.00");
    }

    #[test]
    fn given_nesting_beyond_default_json_limit_when_parsing_then_succeeds() {
        let levels = 300;
        let json = format!(
            "{}{{\"action\":\"leaf\"}}{}",
            r#"{"action":"a","children":["#.repeat(levels),
            "]}".repeat(levels)
        );

        let root = Node::from_json(&json).unwrap();

        let mut depth = 0;
        let mut node = &root;
        while let [only] = node.children.as_slice() {
            node = only;
            depth += 1;
        }
        assert_eq!(depth, levels);
        assert_eq!(node.action, "leaf");
    }

    #[test]
    fn given_trailing_garbage_when_parsing_then_reports_parse_error() {
        let err = Node::from_json(r#"{"action":"root"} x"#).unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn given_deep_chain_when_cloning_and_dropping_then_no_stack_overflow() {
        let mut tree = Node::new("leaf").with_amount(1.0);
        for i in 0..50_000 {
            tree = Node::new(format!("n{}", i)).with_children(vec![tree]);
        }

        let copy = tree.clone();
        drop(tree);

        let mut depth = 0;
        let mut node = &copy;
        while let [only] = node.children.as_slice() {
            node = only;
            depth += 1;
        }
        assert_eq!(depth, 50_000);
        assert_eq!(node.amount_value(), Some(1.0));
    }

    #[test]
    fn given_invalid_json_when_parsing_then_reports_parse_error() {
        let err = Node::from_json("{\"action\":").unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }
}
