use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    entities::material::{self, Entity as MaterialEntity},
    errors::ServiceError,
};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

const MAX_SUGGESTIONS: usize = 5;

/// Fields that can be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionField {
    CustomerName,
    ItemName,
    Model,
}

impl SuggestionField {
    /// Parses the wire name of a field (`customerName`, `itemName`, `model`).
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        match raw {
            "customerName" => Ok(Self::CustomerName),
            "itemName" => Ok(Self::ItemName),
            "model" => Ok(Self::Model),
            other => Err(ServiceError::BadRequest(format!(
                "Invalid suggestion field: {}",
                other
            ))),
        }
    }
}

/// Service producing text completions from the customer registry and the
/// materials ledger
#[derive(Clone)]
pub struct SuggestionService {
    db_pool: Arc<DbPool>,
}

impl SuggestionService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns up to five distinct values of `field` containing the query,
    /// matched case-insensitively. A blank query yields nothing.
    #[instrument(skip(self))]
    pub async fn suggest(
        &self,
        field: SuggestionField,
        query: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let values = match field {
            SuggestionField::CustomerName => {
                CustomerEntity::find()
                    .filter(contains_lower(customer::Column::Name, &pattern))
                    .order_by_asc(customer::Column::Name)
                    .all(self.db_pool.as_ref())
                    .await?
                    .into_iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
            }
            SuggestionField::ItemName => {
                MaterialEntity::find()
                    .filter(contains_lower(material::Column::ItemName, &pattern))
                    .order_by_asc(material::Column::ItemName)
                    .all(self.db_pool.as_ref())
                    .await?
                    .into_iter()
                    .map(|m| m.item_name)
                    .collect::<Vec<_>>()
            }
            SuggestionField::Model => {
                MaterialEntity::find()
                    .filter(contains_lower(material::Column::Model, &pattern))
                    .order_by_asc(material::Column::Model)
                    .all(self.db_pool.as_ref())
                    .await?
                    .into_iter()
                    .map(|m| m.model)
                    .collect::<Vec<_>>()
            }
        };

        Ok(dedupe_capped(values))
    }
}

fn contains_lower<C>(column: C, pattern: &str) -> SimpleExpr
where
    C: sea_orm::ColumnTrait,
{
    // The pattern is backslash-escaped; the clause must name that escape
    // character or SQLite treats the backslashes as literals.
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

fn dedupe_capped(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value.to_lowercase()) {
            out.push(value);
            if out.len() == MAX_SUGGESTIONS {
                break;
            }
        }
    }
    out
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_field_names() {
        assert_eq!(
            SuggestionField::parse("customerName").unwrap(),
            SuggestionField::CustomerName
        );
        assert_eq!(
            SuggestionField::parse("itemName").unwrap(),
            SuggestionField::ItemName
        );
        assert_eq!(
            SuggestionField::parse("model").unwrap(),
            SuggestionField::Model
        );
        assert!(SuggestionField::parse("mobile").is_err());
    }

    #[test]
    fn dedupes_case_insensitively_and_caps_at_five() {
        let values = vec![
            "Drill".to_string(),
            "drill".to_string(),
            "Driver".to_string(),
            "Drum".to_string(),
            "Dredger".to_string(),
            "Drone".to_string(),
            "Drain Rod".to_string(),
        ];
        let out = dedupe_capped(values);
        assert_eq!(out, vec!["Drill", "Driver", "Drum", "Dredger", "Drone"]);
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50% off_sale"), "50\\% off\\_sale");
    }
}
