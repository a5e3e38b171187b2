//! The user collection: entities keyed by `id`, stored as `user` models

use interact_core::{Result, UnitClass, Value, ValueMap};
use interact_entity::{self as entity, EntityCollection, ModelAdapter};

/// Adds a `display_name` built from the name fields
pub struct UserModel;

impl ModelAdapter for UserModel {
    fn kind(&self) -> &str {
        "user"
    }

    fn transform_properties(&self, fields: &mut ValueMap) -> entity::Result<()> {
        let first = fields.get("first").and_then(Value::as_str).unwrap_or_default();
        let last = fields.get("last").and_then(Value::as_str).unwrap_or_default();
        let display = format!("{} {}", first, last).trim().to_string();
        fields.insert("display_name".to_string(), display.into());
        Ok(())
    }
}

pub fn class() -> Result<UnitClass<EntityCollection>> {
    EntityCollection::derive("Users")?
        .selector("admins", |_, scoped, _| {
            let admins = scoped
                .as_map()
                .into_iter()
                .flat_map(|users| users.values())
                .filter(|user| user.get("admin").is_some_and(Value::is_truthy))
                .filter_map(|user| user.get("id").cloned())
                .collect();
            Ok(Value::list(admins))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::MountPath;
    use interact_entity::Collection;

    #[test]
    fn test_users_are_stored_as_models() {
        let users = class()
            .unwrap()
            .instantiate(EntityCollection::new().with_model(UserModel));
        users.mount_at(MountPath::new(["users"]));

        let ada = Value::record([
            ("id", Value::Int(1)),
            ("first", "Ada".into()),
            ("last", "Lovelace".into()),
            ("admin", true.into()),
        ]);
        let set = users.action("set").unwrap();
        let slice = users.apply_action(None, &set.call1(ada)).unwrap();
        let whole = Value::record([("users", slice)]);

        let stored = users.get_by_id(&whole, "1").unwrap().unwrap();
        assert_eq!(stored.as_model().map(|m| m.kind()), Some("user"));
        assert_eq!(stored.get("display_name"), Some(&Value::from("Ada Lovelace")));
        assert_eq!(
            users.select("admins", &whole, &[]).unwrap(),
            Value::from(vec![1i64])
        );
    }
}
