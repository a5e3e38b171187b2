//! The todo list unit: an ordered list of `{ id, text, completed }` records

use interact_core::{Error, Result, UnitClass, Value};

static NULL: Value = Value::Null;

pub fn class() -> Result<UnitClass<()>> {
    UnitClass::<()>::builder("Todos")
        .initial_state(|| Value::list(Vec::new()))
        .transition("add", |_, state, args| {
            let text = string_arg(args, 0)?;
            let mut items = state.expect_list()?.to_vec();
            let id = items.iter().filter_map(todo_id).max().unwrap_or(0) + 1;
            items.push(Value::record([
                ("id", Value::Int(id)),
                ("text", text.into()),
                ("completed", false.into()),
            ]));
            Ok(Value::list(items))
        })
        .transition("toggle", |_, state, args| {
            let id = int_arg(args, 0)?;
            update_where(state, |todo| todo_id(todo) == Some(id), |todo| {
                Some(todo.set_in(&["completed"], (!is_completed(todo)).into()))
            })
        })
        .transition("edit", |_, state, args| {
            let id = int_arg(args, 0)?;
            let text = string_arg(args, 1)?;
            update_where(state, |todo| todo_id(todo) == Some(id), |todo| {
                Some(todo.set_in(&["text"], text.as_str().into()))
            })
        })
        .transition("delete", |_, state, args| {
            let id = int_arg(args, 0)?;
            update_where(state, |todo| todo_id(todo) == Some(id), |_| None)
        })
        .transition("toggle_all", |_, state, _| {
            let all_done = state.expect_list()?.iter().all(is_completed);
            update_where(
                state,
                |todo| is_completed(todo) == all_done,
                |todo| Some(todo.set_in(&["completed"], (!all_done).into())),
            )
        })
        .transition("clear_completed", |_, state, _| {
            update_where(state, is_completed, |_| None)
        })
        .selector("remaining", |_, scoped, _| {
            let open = scoped.expect_list()?.iter().filter(|t| !is_completed(t)).count();
            Ok(Value::Int(open as i64))
        })
        .thunk("add_many", |unit, texts, ctx| {
            for text in texts.expect_list()? {
                ctx.dispatch(unit.create("add", vec![text.clone()])?);
            }
            Ok(ctx.state())
        })
        .build()
}

/// Rewrite (`Some`) or drop (`None`) every todo matching `pred`
///
/// The list comes back untouched when nothing matched.
fn update_where(
    state: Value,
    pred: impl Fn(&Value) -> bool,
    f: impl Fn(&Value) -> Option<Value>,
) -> Result<Value> {
    let items = state.expect_list()?;
    if !items.iter().any(&pred) {
        return Ok(state);
    }
    let next = items
        .iter()
        .filter_map(|todo| if pred(todo) { f(todo) } else { Some(todo.clone()) })
        .collect();
    Ok(Value::list(next))
}

fn todo_id(todo: &Value) -> Option<i64> {
    todo.get("id").and_then(Value::as_int)
}

fn is_completed(todo: &Value) -> bool {
    todo.get("completed").is_some_and(Value::is_truthy)
}

fn int_arg(args: &[Value], index: usize) -> Result<i64> {
    let arg = args.get(index).unwrap_or(&NULL);
    arg.as_int().ok_or_else(|| Error::type_error("int", arg))
}

fn string_arg(args: &[Value], index: usize) -> Result<String> {
    let arg = args.get(index).unwrap_or(&NULL);
    arg.as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::type_error("string", arg))
}
