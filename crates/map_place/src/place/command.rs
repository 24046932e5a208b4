//! Structured placement commands and the translator seam that produces them.
//!
//! A [`CommandTranslator`] turns a free-text request into a JSON reply of the form
//!
//! ```json
//! {"function": "placeItemAdjacentToTree", "parameters": {"num": 3, "item": "Mushroom", "direction": "left"}}
//! ```
//!
//! which [`PlacementCommand::from_reply`] validates. Item names are resolved later against
//! an [`ItemCatalog`], directions when the command is executed.
use serde::Deserialize;
use serde_json::json;

use crate::classify::TREE_CATEGORY;
use crate::error::{Error, Result};
use crate::place::catalog::ItemCatalog;
use crate::place::rules::Rule;

/// Function names accepted in translator replies, besides the kebab-case rule names.
const FUNCTIONS: [(&str, fn() -> Rule); 4] = [
    ("placeItemAdjacentToTree", Rule::adjacent_to_tree),
    ("placeItemAdjacentToPath", || Rule::AdjacentToPath),
    ("placeItemsInsideFencedAreas", || Rule::EnclosedArea),
    ("placeItemAnywhere", || Rule::AnywhereOpen),
];

/// Validated request to place `count` copies of a named item under a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementCommand {
    pub rule: Rule,
    pub count: usize,
    /// Item name as given; resolved against the catalog on execution.
    pub item: String,
    /// Raw direction token; `None` for no preference.
    pub direction: Option<String>,
}

#[derive(Deserialize)]
struct Reply {
    function: Option<String>,
    parameters: Option<Parameters>,
}

#[derive(Deserialize)]
struct Parameters {
    num: Option<u64>,
    item: Option<String>,
    direction: Option<String>,
}

impl PlacementCommand {
    pub fn new(rule: Rule, count: usize, item: impl Into<String>) -> Self {
        Self {
            rule,
            count,
            item: item.into(),
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Parse a translator reply.
    ///
    /// The JSON object may be surrounded by prose or a code fence; the outermost `{...}`
    /// span is parsed. Any structural problem is an [`Error::Translation`].
    pub fn from_reply(reply: &str) -> Result<Self> {
        let body = match (reply.find('{'), reply.rfind('}')) {
            (Some(start), Some(end)) if start < end => &reply[start..=end],
            _ => {
                return Err(Error::Translation(
                    "reply does not contain a JSON object".into(),
                ))
            }
        };
        let parsed: Reply = serde_json::from_str(body)
            .map_err(|e| Error::Translation(format!("could not parse reply: {e}")))?;

        let (Some(function), Some(parameters)) = (parsed.function, parsed.parameters) else {
            return Err(Error::Translation(
                "reply needs both 'function' and 'parameters'".into(),
            ));
        };
        let rule = rule_for_function(&function)?;
        let count = parameters
            .num
            .ok_or_else(|| Error::Translation("parameter 'num' is missing".into()))?;
        let count = usize::try_from(count)
            .map_err(|_| Error::Translation(format!("parameter 'num' is too large: {count}")))?;
        let item = parameters
            .item
            .filter(|item| !item.trim().is_empty())
            .ok_or_else(|| Error::Translation("parameter 'item' is missing".into()))?;

        Ok(Self {
            rule,
            count,
            item,
            direction: parameters.direction,
        })
    }

    /// Canonical JSON reply for this command.
    pub fn to_reply(&self) -> String {
        json!({
            "function": function_for_rule(&self.rule),
            "parameters": {
                "num": self.count,
                "item": self.item,
                "direction": self.direction,
            }
        })
        .to_string()
    }
}

/// Map a reply's function name to a rule.
///
/// Accepts the camel-case function names listed by [`translator_instructions`] and the
/// kebab-case names produced by [`Rule`]'s `Display` implementation.
pub fn rule_for_function(name: &str) -> Result<Rule> {
    let name = name.trim();
    if let Some((_, rule)) = FUNCTIONS.iter().find(|(f, _)| *f == name) {
        return Ok(rule());
    }
    name.parse()
        .map_err(|_| Error::Translation(format!("unknown function '{name}'")))
}

fn function_for_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::AdjacentToCategory(category) if category == TREE_CATEGORY => FUNCTIONS[0].0,
        Rule::AdjacentToPath => FUNCTIONS[1].0,
        Rule::EnclosedArea => FUNCTIONS[2].0,
        Rule::AnywhereOpen => FUNCTIONS[3].0,
        Rule::AdjacentToCategory(_) => return rule.to_string(),
    };
    name.to_string()
}

/// Turns a free-text placement request into a JSON reply.
///
/// Implementations are usually backed by a language model; closures work for scripted
/// or rule-based translation.
pub trait CommandTranslator {
    fn translate(&mut self, phrase: &str, catalog: &ItemCatalog) -> Result<String>;
}

impl<F> CommandTranslator for F
where
    F: FnMut(&str, &ItemCatalog) -> Result<String>,
{
    fn translate(&mut self, phrase: &str, catalog: &ItemCatalog) -> Result<String> {
        self(phrase, catalog)
    }
}

/// Instructions for a language-model translator, listing functions and catalog items.
pub fn translator_instructions(catalog: &ItemCatalog) -> String {
    let functions: Vec<&str> = FUNCTIONS.iter().map(|(name, _)| *name).collect();
    let items: Vec<&str> = catalog.names().collect();
    format!(
        "You turn placement requests for a tile-based town map into JSON.\n\
         Requests look like \"place 3 Mushrooms adjacent to tree in the left direction\" or \
         \"place 5 Signs anywhere\".\n\
         Reply with a single JSON object containing:\n\
         1. \"function\": one of {functions}.\n\
         2. \"parameters\": an object with\n\
         \x20  - \"num\": number of items to place,\n\
         \x20  - \"item\": the item name, taken from the item list,\n\
         \x20  - \"direction\": one of \"left\", \"right\", \"up\", \"down\", or null.\n\
         Map phrases like \"above\" to \"up\" and descriptions like \"digging tool\" to the \
         closest listed item. Use null when no direction is mentioned.\n\
         Items: {items}.\n",
        functions = serde_json::Value::from(functions),
        items = serde_json::Value::from(items),
    )
}
