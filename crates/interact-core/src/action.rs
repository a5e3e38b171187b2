//! Actions and detached action creators

use crate::{ActionTag, Value};
use serde::{Deserialize, Serialize};

/// A request to run one transition with positional arguments
///
/// `args` is kept as a raw [`Value`] because actions may be built by hand or
/// decoded from outside; a unit treats any action whose `args` is not a list
/// as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Which transition this action targets
    pub tag: ActionTag,
    /// Positional arguments forwarded to the transition
    pub args: Value,
}

impl Action {
    /// Create an action with positional arguments
    pub fn new(tag: impl Into<ActionTag>, args: Vec<Value>) -> Self {
        Self {
            tag: tag.into(),
            args: Value::list(args),
        }
    }

    /// Create an action with raw arguments, well-formed or not
    pub fn raw(tag: impl Into<ActionTag>, args: Value) -> Self {
        Self {
            tag: tag.into(),
            args,
        }
    }

    /// The positional arguments, if `args` is a list
    pub fn arg_list(&self) -> Option<&[Value]> {
        self.args.as_list()
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        let mut args = self.arg_list().map(<[Value]>::to_vec).unwrap_or_default();
        args.push(arg.into());
        self.args = Value::list(args);
        self
    }
}

/// Builds actions for one transition of one unit
///
/// Holds nothing but the tag, so it can be cloned and handed around freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCreator {
    tag: ActionTag,
}

impl ActionCreator {
    pub(crate) fn new(tag: ActionTag) -> Self {
        Self { tag }
    }

    /// The tag this creator stamps on its actions
    pub fn tag(&self) -> &ActionTag {
        &self.tag
    }

    /// Build an action carrying `args`
    pub fn create(&self, args: Vec<Value>) -> Action {
        Action::new(self.tag.clone(), args)
    }

    /// Build an action with no arguments
    pub fn call0(&self) -> Action {
        self.create(Vec::new())
    }

    /// Build an action with a single argument
    pub fn call1(&self, arg: impl Into<Value>) -> Action {
        self.create(vec![arg.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_args() {
        let action = Action::new("Todos:add#0", vec![Value::from("milk")]).with_arg(false);
        assert_eq!(action.arg_list().map(|a| a.len()), Some(2));
        assert_eq!(action.tag.as_str(), "Todos:add#0");
    }

    #[test]
    fn test_raw_action_args() {
        let action = Action::raw("Todos:add#0", Value::Int(1));
        assert!(action.arg_list().is_none());
    }

    #[test]
    fn test_action_creator() {
        let creator = ActionCreator::new(ActionTag::new("Foos:add#3"));
        let action = creator.call1(2);
        assert_eq!(&action.tag, creator.tag());
        assert_eq!(action.args, Value::from(vec![2i64]));
        assert_eq!(creator.call0().arg_list().map(|a| a.len()), Some(0));
    }

    #[test]
    fn test_action_from_ron() {
        let action: Action = ron::from_str(r#"(tag: "Foos:add#3", args: List([Int(2)]))"#)
            .expect("valid action");
        assert_eq!(action.tag.as_str(), "Foos:add#3");
        assert_eq!(action.arg_list().map(|a| a.len()), Some(1));
    }
}
