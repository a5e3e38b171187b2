//! Todos Example
//!
//! Composes a todo list and a user collection into one state tree,
//! `{ todos, entities: { users } }`, and drives it with a scripted series of
//! actions, printing the tree after each one.
//!
//! Set `RUST_LOG=debug` to see mounting and reconciliation events.

mod todos;
mod users;

use interact_combine::{combine_with_config, CombineConfig, CombinedReducer, MountSpec};
use interact_core::{Action, ThunkContext, Value};
use interact_entity::{Collection, EntityCollection};
use std::cell::RefCell;
use std::error::Error;
use tracing_subscriber::EnvFilter;
use users::UserModel;

const CONFIG: &str = "(isolate_panics: true, log_failures: true)";

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    println!("=== Interact Todos Example ===\n");

    let todos = todos::class()?.instantiate(());
    let users = users::class()?.instantiate(EntityCollection::new().with_model(UserModel));

    let reducer = combine_with_config(
        MountSpec::new()
            .mount("todos", todos.clone())
            .group("entities", MountSpec::new().mount("users", users.clone())),
        CombineConfig::from_ron(CONFIG)?,
    )?;
    for (path, class) in reducer.units() {
        println!("mounted {} at '{}'", class, path);
    }

    let mut state = reducer.reduce(&Value::Null, &Action::new("@@init", vec![]));
    print_state("initial", &state)?;

    let ada = Value::record([
        ("id", Value::Int(1)),
        ("first", "Ada".into()),
        ("last", "Lovelace".into()),
        ("admin", true.into()),
    ]);
    let grace = Value::record([
        ("id", Value::Int(2)),
        ("first", "Grace".into()),
        ("last", "Hopper".into()),
    ]);

    let script = vec![
        ("add 'Buy milk'", todos.create("add", vec!["Buy milk".into()])?),
        ("add 'Write report'", todos.create("add", vec!["Write report".into()])?),
        ("toggle 1", todos.create("toggle", vec![1.into()])?),
        ("edit 2", todos.create("edit", vec![2.into(), "Write the report".into()])?),
        ("set users", users.create("set_all", vec![vec![ada.clone(), grace].into()])?),
        ("set ada again", users.create("set", vec![ada])?),
        ("toggle all", todos.create("toggle_all", vec![])?),
        ("clear completed", todos.create("clear_completed", vec![])?),
        ("delete user 2", users.create("delete", vec!["2".into()])?),
        ("bad toggle", todos.create("toggle", vec!["one".into()])?),
    ];

    for (label, action) in script {
        let report = reducer.dispatch(&state, &action);
        tracing::info!(label, tag = %action.tag, changed = report.changed.len(), "dispatched");
        if !report.is_changed() {
            println!("{}: no slice changed", label);
        }
        for failure in &report.failures {
            println!("{}: {} at '{}' failed: {}", label, failure.class, failure.path, failure.reason);
        }
        state = report.state;
        print_state(label, &state)?;
    }

    let add_many = todos.thunk("add_many", Value::from(vec!["Call mom", "Pay rent"]))?;
    state = run_thunk(&reducer, state, |ctx| add_many.run(ctx).map(drop))?;
    print_state("add_many thunk", &state)?;

    println!("remaining todos: {}", todos.select("remaining", &state, &[])?);
    println!("user ids: {:?}", users.get_all_ids(&state)?);
    println!("admins: {}", users.select("admins", &state, &[])?);

    // state restored from storage holds plain records
    let restored = state.set_in(
        &["entities", "users", "3"],
        Value::record([("id", Value::Int(3)), ("first", "Alan".into()), ("last", "Turing".into())]),
    );
    let reindexed = users.reindex_whole_tree(&restored)?;
    print_state("reindexed", &reindexed)?;

    Ok(())
}

/// Run a thunk against the reducer, threading state through its dispatches
fn run_thunk(
    reducer: &CombinedReducer,
    state: Value,
    body: impl FnOnce(&mut ThunkContext<'_>) -> interact_core::Result<()>,
) -> interact_core::Result<Value> {
    let cell = RefCell::new(state);
    let mut dispatch = |action: Action| {
        let next = reducer.reduce(&cell.borrow(), &action);
        *cell.borrow_mut() = next;
    };
    let get_state = || cell.borrow().clone();
    let mut ctx = ThunkContext::new(&mut dispatch, &get_state);
    body(&mut ctx)?;
    Ok(cell.into_inner())
}

fn print_state(label: &str, state: &Value) -> Result<(), ron::Error> {
    let text = ron::ser::to_string_pretty(state, ron::ser::PrettyConfig::default())?;
    println!("--- {} ---\n{}\n", label, text);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
