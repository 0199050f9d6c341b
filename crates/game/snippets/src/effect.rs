//! Effects attached to snippets.
//!
//! The dialogue system owns effect semantics; snippets only carry the
//! descriptor through so callers can run it when the snippet is examined.

use serde::Deserialize;
use serde_json::Value;

/// Effect descriptor run when a snippet is examined.
///
/// Content may give a single effect object or a list of them; both are
/// normalized to a list. `null` is not an effect.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "OneOrMany")]
pub struct ExamineEffect {
    effects: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

impl TryFrom<OneOrMany> for ExamineEffect {
    type Error = &'static str;

    fn try_from(raw: OneOrMany) -> Result<Self, Self::Error> {
        let effects = match raw {
            OneOrMany::Many(effects) => effects,
            OneOrMany::One(Value::Null) => return Err("effect_on_examine must not be null"),
            OneOrMany::One(effect) => vec![effect],
        };
        Ok(Self { effects })
    }
}

impl ExamineEffect {
    pub fn new(effects: Vec<Value>) -> Self {
        Self { effects }
    }

    /// Effect descriptors in declaration order.
    pub fn effects(&self) -> &[Value] {
        &self.effects
    }
}
