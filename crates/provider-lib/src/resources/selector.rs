//! Kubernetes-style label selectors shared by node and workload resources

use crate::convert;
use crate::proto::{LabelSelector, LabelSelectorRequirement};
use crate::schema::{Attribute, Block};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSelectorModel {
    pub match_labels: Option<BTreeMap<String, String>>,
    pub match_expressions: Option<Vec<MatchExpressionModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchExpressionModel {
    pub key: Option<String>,
    pub operator: Option<String>,
    pub values: Option<Vec<String>>,
}

impl LabelSelectorModel {
    pub fn to_wire(&self) -> LabelSelector {
        LabelSelector {
            match_labels: convert::map_to_wire(self.match_labels.as_ref()),
            match_expressions: self
                .match_expressions
                .iter()
                .flatten()
                .map(|expr| LabelSelectorRequirement {
                    key: convert::string_to_wire(expr.key.as_ref()),
                    operator: convert::operator_to_wire(expr.operator.as_deref().unwrap_or_default())
                        as i32,
                    values: convert::list_to_wire(expr.values.as_ref()),
                })
                .collect(),
        }
    }

    pub fn from_wire(selector: &LabelSelector) -> Self {
        let expressions: Vec<MatchExpressionModel> = selector
            .match_expressions
            .iter()
            .map(|req| MatchExpressionModel {
                key: convert::non_empty(&req.key),
                operator: convert::non_empty(convert::operator_from_wire(req.operator)),
                values: convert::non_empty_list(&req.values),
            })
            .collect();

        Self {
            match_labels: convert::non_empty_map(&selector.match_labels),
            match_expressions: (!expressions.is_empty()).then_some(expressions),
        }
    }

    /// Reads a selector back over this configured one. Empty lists and maps
    /// the configuration spelled out stay empty instead of turning unset.
    pub fn refreshed(&self, selector: &LabelSelector) -> Self {
        let mut fresh = Self::from_wire(selector);

        if fresh.match_labels.is_none() && self.match_labels.as_ref().is_some_and(BTreeMap::is_empty) {
            fresh.match_labels = Some(BTreeMap::new());
        }
        match (&self.match_expressions, fresh.match_expressions.as_mut()) {
            (Some(configured), Some(expressions)) => {
                for (configured, expr) in configured.iter().zip(expressions.iter_mut()) {
                    if expr.values.is_none() && configured.values.as_ref().is_some_and(Vec::is_empty) {
                        expr.values = Some(Vec::new());
                    }
                }
            }
            (Some(configured), None) if configured.is_empty() => {
                fresh.match_expressions = Some(Vec::new());
            }
            _ => {}
        }
        fresh
    }
}

/// Schema of a selector block. Node policies require `key` and `operator`
/// in every expression; workload targets leave both optional.
pub fn selector_attribute(strict: bool, description: &'static str) -> Attribute {
    let key = Attribute::string().describe("Label key the expression applies to");
    let operator =
        Attribute::string().describe("One of In, NotIn, Exists, DoesNotExist, Gt, Lt");
    let (key, operator) = if strict {
        (key.required(), operator.required())
    } else {
        (key.optional(), operator.optional())
    };

    Attribute::object(
        Block::new()
            .attribute(
                "match_labels",
                Attribute::string_map().optional().describe("Exact label matches"),
            )
            .attribute(
                "match_expressions",
                Attribute::object_list(
                    Block::new()
                        .attribute("key", key)
                        .attribute("operator", operator)
                        .attribute("values", Attribute::string_list().optional()),
                )
                .optional(),
            ),
    )
    .optional()
    .describe(description)
}
