//! Generic planning of resource changes

use std::collections::BTreeMap;

use crate::schema::Schema;
use crate::value::Value;

/// Result of planning one resource
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannedChange {
    pub state: Value,
    /// Attribute paths whose change forces replacement
    pub requires_replace: Vec<Vec<String>>,
}

/// Plan a change from the prior state towards the proposed new state
///
/// Destroy plans are null. Create plans mark computed attributes the
/// configuration leaves null as unknown. Update plans do the same for
/// computed attributes unless they keep their prior value, and only when
/// something actually changes.
pub fn plan_resource_change(
    schema: &Schema,
    prior: &Value,
    proposed: &Value,
    config: &Value,
) -> PlannedChange {
    if proposed.is_null() {
        return PlannedChange::default();
    }

    let Value::Object(proposed_attrs) = proposed else {
        return PlannedChange {
            state: proposed.clone(),
            requires_replace: Vec::new(),
        };
    };

    if prior.is_null() {
        let state = schema
            .attributes
            .iter()
            .map(|attr| {
                let value = proposed_attrs.get(&attr.name).cloned().unwrap_or_default();
                let value = if attr.computed && value.is_null() {
                    Value::Unknown
                } else {
                    value
                };
                (attr.name.clone(), value)
            })
            .collect::<BTreeMap<_, _>>();
        return PlannedChange {
            state: Value::Object(state),
            requires_replace: Vec::new(),
        };
    }

    if prior == proposed {
        return PlannedChange {
            state: proposed.clone(),
            requires_replace: Vec::new(),
        };
    }

    let mut requires_replace = Vec::new();
    let mut state = BTreeMap::new();
    for attr in &schema.attributes {
        let prior_value = prior.get(&attr.name).unwrap_or(&Value::Null);
        let proposed_value = proposed_attrs.get(&attr.name).unwrap_or(&Value::Null);
        let config_value = config.get(&attr.name).unwrap_or(&Value::Null);

        let value = if attr.computed && config_value.is_null() && !attr.use_state_for_unknown {
            Value::Unknown
        } else {
            proposed_value.clone()
        };

        if attr.requires_replace && (value.is_unknown() || &value != prior_value) {
            // Computed attributes the appliance fills in never force replacement
            if !(attr.computed && config_value.is_null()) {
                requires_replace.push(vec![attr.name.clone()]);
            }
        }

        state.insert(attr.name.clone(), value);
    }

    PlannedChange {
        state: Value::Object(state),
        requires_replace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("test")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(Attribute::string("name").required().requires_replace())
            .attribute(Attribute::string("description").optional())
            .attribute(Attribute::string("updated_at").computed())
            .attribute(Attribute::string("status").optional().computed())
    }

    fn v(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    #[test]
    fn test_destroy_plans_null() {
        let prior = v(json!({"id": "1", "name": "a"}));
        let planned = plan_resource_change(&schema(), &prior, &Value::Null, &Value::Null);
        assert!(planned.state.is_null());
    }

    #[test]
    fn test_create_marks_computed_unknown() {
        let proposed = v(json!({
            "id": null, "name": "a", "description": null,
            "updated_at": null, "status": "active"
        }));
        let planned = plan_resource_change(&schema(), &Value::Null, &proposed, &proposed);

        assert_eq!(planned.state.get("id"), Some(&Value::Unknown));
        assert_eq!(planned.state.get("updated_at"), Some(&Value::Unknown));
        assert_eq!(planned.state.get("status"), Some(&Value::from("active")));
        assert_eq!(planned.state.get("description"), Some(&Value::Null));
        assert!(planned.requires_replace.is_empty());
    }

    #[test]
    fn test_no_change_keeps_prior() {
        let prior = v(json!({
            "id": "1", "name": "a", "description": "d",
            "updated_at": "t1", "status": "active"
        }));
        let config = v(json!({
            "id": null, "name": "a", "description": "d",
            "updated_at": null, "status": null
        }));
        let planned = plan_resource_change(&schema(), &prior, &prior, &config);
        assert_eq!(planned.state, prior);
    }

    #[test]
    fn test_update_marks_changing_computed_unknown() {
        let prior = v(json!({
            "id": "1", "name": "a", "description": "old",
            "updated_at": "t1", "status": "active"
        }));
        let proposed = v(json!({
            "id": "1", "name": "a", "description": "new",
            "updated_at": "t1", "status": "active"
        }));
        let config = v(json!({
            "id": null, "name": "a", "description": "new",
            "updated_at": null, "status": null
        }));
        let planned = plan_resource_change(&schema(), &prior, &proposed, &config);

        assert_eq!(planned.state.get("id"), Some(&Value::from("1")));
        assert_eq!(planned.state.get("updated_at"), Some(&Value::Unknown));
        assert_eq!(planned.state.get("status"), Some(&Value::Unknown));
        assert_eq!(planned.state.get("description"), Some(&Value::from("new")));
        assert!(planned.requires_replace.is_empty());
    }

    #[test]
    fn test_replace_on_changed_attribute() {
        let prior = v(json!({
            "id": "1", "name": "a", "description": null,
            "updated_at": "t1", "status": "active"
        }));
        let proposed = v(json!({
            "id": "1", "name": "b", "description": null,
            "updated_at": "t1", "status": "active"
        }));
        let planned = plan_resource_change(&schema(), &prior, &proposed, &proposed);
        assert_eq!(planned.requires_replace, vec![vec!["name".to_string()]]);
    }
}
