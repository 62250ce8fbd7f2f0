//! Macros for reducing boilerplate when defining entities

/// Implement [`Entity`](crate::core::entity::Entity) for a record struct
///
/// The struct must have `id: Uuid`, `created_at` and `updated_at` fields.
/// Fields listed in `hidden` are removed from the public JSON.
///
/// # Example
/// ```rust,ignore
/// impl_entity!(User, "user", "users", search = "name", hidden = ["password"]);
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $type:ident,
        $singular:literal,
        $plural:literal,
        search = $search:literal
        $(, hidden = [$($hidden:literal),* $(,)?])?
        $(,)?
    ) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn search_field() -> &'static str {
                $search
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }

            #[allow(unused_mut)]
            fn to_public_json(&self) -> ::serde_json::Value {
                let mut value =
                    ::serde_json::to_value(self).unwrap_or(::serde_json::Value::Null);
                $(
                    if let Some(obj) = value.as_object_mut() {
                        $( obj.remove($hidden); )*
                    }
                )?
                value
            }
        }
    };
}
