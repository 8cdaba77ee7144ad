use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a code taking part in the payment dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexCategory {
    RevenueCode,
    PaymentType,
    PaymentGround,
}

impl fmt::Display for VertexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RevenueCode => "revenue code",
            Self::PaymentType => "payment type",
            Self::PaymentGround => "payment ground",
        };
        f.write_str(name)
    }
}

/// A typed code. Two vertices are equal only if both value and category match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub value: String,
    pub category: VertexCategory,
}

impl Vertex {
    pub fn new(value: impl Into<String>, category: VertexCategory) -> Self {
        Self {
            value: value.into(),
            category,
        }
    }

    pub fn revenue_code(value: impl Into<String>) -> Self {
        Self::new(value, VertexCategory::RevenueCode)
    }

    pub fn payment_type(value: impl Into<String>) -> Self {
        Self::new(value, VertexCategory::PaymentType)
    }

    pub fn payment_ground(value: impl Into<String>) -> Self {
        Self::new(value, VertexCategory::PaymentGround)
    }
}
