//! Domain records: ingredients, recipes and users

pub mod macros;

pub mod ingredient;
pub mod recipe;
pub mod user;

pub use ingredient::{Category, Ingredient, NewIngredient, UpdateIngredient};
pub use recipe::{NewRecipe, Recipe, RecipeIngredient, UpdateRecipe};
pub use user::{ChangePassword, Role, SignIn, SignUp, UpdateUser, User};
