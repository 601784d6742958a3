use serde::{Deserialize, Serialize};

/// One sort key; a query applies its orders in list order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    field: String,
    #[serde(default = "default_ascending")]
    ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, ascending: bool) -> Self {
        Self {
            field: field.into(),
            ascending,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, true)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, false)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }
}
