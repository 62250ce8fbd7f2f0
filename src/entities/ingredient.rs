use crate::core::validation::{FieldRule, ValidatedPayload, ValidationSchema, filters, validators};
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Vegetable,
    Fruit,
    Protein,
    Grain,
    Dairy,
    #[default]
    Other,
}

impl Category {
    pub const NAMES: [&'static str; 6] = ["Vegetable", "Fruit", "Protein", "Grain", "Dairy", "Other"];
}

const CATEGORY_MESSAGE: &str =
    "Category must be one of: Vegetable, Fruit, Protein, Grain, Dairy, Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Ingredient, "ingredient", "ingredients", search = "name");

impl Ingredient {
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fields shown in collection listings
    pub const LIST_FIELDS: [&'static str; 4] = ["name", "description", "category", "_id"];
}

/// Body of `POST /ingredients`
#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub description: String,
    pub category: Category,
}

impl From<NewIngredient> for Ingredient {
    fn from(payload: NewIngredient) -> Self {
        Ingredient::new(payload.name, payload.description, payload.category)
    }
}

impl ValidatedPayload for NewIngredient {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(name_rule(FieldRule::required("name", "Name is required")))
            .field(description_rule(FieldRule::required(
                "description",
                "Description is required",
            )))
            .field(category_rule(FieldRule::required(
                "category",
                "Category is required",
            )))
    }
}

/// Body of `PUT /ingredients/{id}`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIngredient {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

impl UpdateIngredient {
    pub fn apply(self, ingredient: &mut Ingredient) {
        if let Some(name) = self.name {
            ingredient.name = name;
        }
        if let Some(description) = self.description {
            ingredient.description = description;
        }
        if let Some(category) = self.category {
            ingredient.category = category;
        }
    }
}

impl ValidatedPayload for UpdateIngredient {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(name_rule(FieldRule::optional("name")))
            .field(description_rule(FieldRule::optional("description")))
            .field(category_rule(FieldRule::optional("category")))
    }
}

fn name_rule(rule: FieldRule) -> FieldRule {
    rule.filter(filters::trim())
        .validate(validators::string())
        .validate(validators::non_empty("Name cannot be empty"))
}

fn description_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::non_empty("Description cannot be empty"))
}

fn category_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::in_list(&Category::NAMES, CATEGORY_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::validation::validate_payload;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let ingredient = Ingredient::new("Egg", "Chicken egg", Category::Protein);
        let json = ingredient.to_public_json();
        assert_eq!(json["_id"], ingredient.id.to_string());
        assert_eq!(json["category"], "Protein");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_new_ingredient_payload() {
        let payload: NewIngredient = validate_payload(json!({
            "name": "  Basil ",
            "description": "Herb",
            "category": "Vegetable"
        }))
        .unwrap();
        assert_eq!(payload.name, "Basil");
        assert_eq!(payload.category, Category::Vegetable);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result: Result<NewIngredient, _> = validate_payload(json!({
            "name": "Basil",
            "description": "Herb",
            "category": "Spice"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let mut ingredient = Ingredient::new("Egg", "Chicken egg", Category::Protein);
        let update: UpdateIngredient = validate_payload(json!({"description": "Duck egg"})).unwrap();
        update.apply(&mut ingredient);
        assert_eq!(ingredient.name, "Egg");
        assert_eq!(ingredient.description, "Duck egg");
    }
}
