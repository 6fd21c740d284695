use serde::Serialize;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::Resource;

/// What reconciling a plan against the stored state will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    Create,
    Update,
    /// Delete then create, because the listed attributes cannot change in place.
    Replace { attributes: Vec<&'static str> },
    Delete,
    NoOp,
}

/// Decide the action for `plan` (desired, `None` = absent) given `state`
/// (stored, `None` = absent).
pub fn decide<R: Resource>(plan: Option<&R::Model>, state: Option<&R::Model>) -> PlannedAction {
    match (plan, state) {
        (None, None) => PlannedAction::NoOp,
        (Some(_), None) => PlannedAction::Create,
        (None, Some(_)) => PlannedAction::Delete,
        (Some(plan), Some(state)) => {
            let plan = R::normalize_plan(plan.clone(), state);
            if plan == *state {
                return PlannedAction::NoOp;
            }
            let attributes = R::replace_triggers(&plan, state);
            if attributes.is_empty() {
                PlannedAction::Update
            } else {
                PlannedAction::Replace { attributes }
            }
        }
    }
}

/// Drive `resource` from `state` to `plan` and return the new state.
pub async fn apply<R: Resource>(
    resource: &R,
    plan: Option<&R::Model>,
    state: Option<&R::Model>,
) -> ProviderResult<Option<R::Model>> {
    let action = decide::<R>(plan, state);
    debug!("{}: {action:?}", R::TYPE_NAME);

    match (action, plan, state) {
        (PlannedAction::Create, Some(plan), _) => resource.create(plan).await.map(Some),
        (PlannedAction::Update, Some(plan), Some(state)) => {
            let plan = R::normalize_plan(plan.clone(), state);
            resource.update(&plan, state).await.map(Some)
        }
        (PlannedAction::Replace { .. }, Some(plan), Some(state)) => {
            resource.delete(state).await?;
            let plan = R::normalize_plan(plan.clone(), state);
            resource.create(&plan).await.map(Some)
        }
        (PlannedAction::Delete, _, Some(state)) => {
            resource.delete(state).await?;
            Ok(None)
        }
        _ => Ok(state.cloned()),
    }
}

/// Re-read `state` from the appliance; `None` when it disappeared.
pub async fn refresh<R: Resource>(
    resource: &R,
    state: &R::Model,
) -> ProviderResult<Option<R::Model>> {
    let refreshed = resource.read(state).await?;
    if refreshed.is_none() {
        debug!("{}: gone from the appliance, dropping state", R::TYPE_NAME);
    }
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
        size: u32,
        computed: Option<String>,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Resource for Recorder {
        type Model = Widget;
        const TYPE_NAME: &'static str = "test_widget";

        fn replace_triggers(plan: &Widget, state: &Widget) -> Vec<&'static str> {
            crate::provider::changed(&[("name", plan.name != state.name)])
        }

        fn normalize_plan(mut plan: Widget, state: &Widget) -> Widget {
            plan.computed = state.computed.clone();
            plan
        }

        async fn create(&self, plan: &Widget) -> ProviderResult<Widget> {
            self.calls.lock().unwrap().push(format!("create {}", plan.name));
            Ok(plan.clone())
        }

        async fn read(&self, state: &Widget) -> ProviderResult<Option<Widget>> {
            Ok(Some(state.clone()))
        }

        async fn update(&self, plan: &Widget, _state: &Widget) -> ProviderResult<Widget> {
            self.calls.lock().unwrap().push(format!("update {}", plan.name));
            Ok(plan.clone())
        }

        async fn delete(&self, state: &Widget) -> ProviderResult<()> {
            self.calls.lock().unwrap().push(format!("delete {}", state.name));
            Ok(())
        }
    }

    fn widget(name: &str, size: u32) -> Widget {
        Widget {
            name: name.into(),
            size,
            computed: None,
        }
    }

    #[test]
    fn absent_state_means_create() {
        assert_eq!(
            decide::<Recorder>(Some(&widget("a", 1)), None),
            PlannedAction::Create
        );
        assert_eq!(
            decide::<Recorder>(None, Some(&widget("a", 1))),
            PlannedAction::Delete
        );
        assert_eq!(decide::<Recorder>(None, None), PlannedAction::NoOp);
    }

    #[test]
    fn computed_attributes_do_not_cause_a_diff() {
        let mut state = widget("a", 1);
        state.computed = Some("signed".into());
        assert_eq!(
            decide::<Recorder>(Some(&widget("a", 1)), Some(&state)),
            PlannedAction::NoOp
        );
    }

    #[test]
    fn trigger_attributes_force_replacement() {
        assert_eq!(
            decide::<Recorder>(Some(&widget("b", 1)), Some(&widget("a", 1))),
            PlannedAction::Replace {
                attributes: vec!["name"]
            }
        );
        assert_eq!(
            decide::<Recorder>(Some(&widget("a", 2)), Some(&widget("a", 1))),
            PlannedAction::Update
        );
    }

    #[tokio::test]
    async fn replace_deletes_before_creating() {
        let resource = Recorder::default();
        let state = apply(&resource, Some(&widget("b", 1)), Some(&widget("a", 1)))
            .await
            .unwrap();
        assert_eq!(state, Some(widget("b", 1)));
        assert_eq!(*resource.calls.lock().unwrap(), ["delete a", "create b"]);
    }

    #[tokio::test]
    async fn delete_clears_state() {
        let resource = Recorder::default();
        let state = apply(&resource, None, Some(&widget("a", 1))).await.unwrap();
        assert_eq!(state, None);
        assert_eq!(*resource.calls.lock().unwrap(), ["delete a"]);
    }

    #[test]
    fn planned_action_serializes_with_a_tag() {
        let json = serde_json::to_value(PlannedAction::Replace {
            attributes: vec!["zone"],
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "replace", "attributes": ["zone"]})
        );
    }
}
