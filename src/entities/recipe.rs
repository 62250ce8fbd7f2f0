use crate::core::validation::{FieldRule, ValidatedPayload, ValidationSchema, validators};
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a recipe's ingredient list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Id of the referenced ingredient
    pub ingredient: Uuid,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
    /// Id of the user who created the recipe
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Recipe, "recipe", "recipes", search = "title");

impl Recipe {
    pub const LIST_FIELDS: [&'static str; 5] = ["title", "ingredients", "instructions", "creator", "_id"];

    pub fn new(payload: NewRecipe, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: payload.title,
            ingredients: payload.ingredients,
            instructions: payload.instructions,
            creator,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /recipes`
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

impl ValidatedPayload for NewRecipe {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(title_rule(FieldRule::required("title", "Title is required.")))
            .field(
                FieldRule::required("ingredients", "Ingredients are required.")
                    .validate(validators::array())
                    .each_object(
                        ValidationSchema::new()
                            .field(ingredient_id_rule(FieldRule::required(
                                "ingredient",
                                "ID is required",
                            )))
                            .field(quantity_rule(FieldRule::required(
                                "quantity",
                                "Quantity is required.",
                            ))),
                    ),
            )
            .field(instructions_rule(FieldRule::required(
                "instructions",
                "Instructions are required.",
            )))
    }
}

/// Body of `PUT /recipes/{id}`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredient>>,
    pub instructions: Option<String>,
}

impl UpdateRecipe {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
    }
}

impl ValidatedPayload for UpdateRecipe {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(title_rule(FieldRule::optional("title")))
            .field(
                FieldRule::optional("ingredients")
                    .validate(validators::array())
                    .each_object(
                        ValidationSchema::new()
                            .field(ingredient_id_rule(FieldRule::required(
                                "ingredient",
                                "ID is required",
                            )))
                            .field(quantity_rule(FieldRule::required(
                                "quantity",
                                "Quantity is required.",
                            ))),
                    ),
            )
            .field(instructions_rule(FieldRule::optional("instructions")))
    }
}

fn title_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::non_empty("Title cannot be empty."))
}

fn instructions_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::non_empty("Instructions cannot be empty."))
}

fn ingredient_id_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::non_empty("ID cannot be empty"))
        .validate(validators::uuid("ID must be a valid UUID"))
}

fn quantity_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::non_empty("Quantity cannot be empty."))
}
