//! Tree updates reconstruct exactly what the renderer produces

use livepatch_template::Template;
use livepatch_tree::{Tree, TreeClient, TreeDiffer};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use test_case::test_case;

const TODO_LIST: &str = r#"<section><h2>{{.Title}}</h2>{{if .Items}}<ul>{{range .Items}}<li class="{{if .Done}}done{{else}}open{{end}}">{{.Text}}</li>{{end}}</ul>{{else}}<p>Nothing to do</p>{{end}}{{with .Owner}}<footer>{{.Name}}</footer>{{end}}</section>"#;

fn todo_template() -> Template {
    Template::parse("todos", TODO_LIST).unwrap()
}

/// Diff, apply and compare against a plain render
fn step(differ: &TreeDiffer, client: &mut TreeClient, template: &Template, data: &Value) -> Tree {
    let update = differ.diff("todos", template, data).unwrap();
    assert!(update.slots_interleave(), "slot keys must sit between statics");
    let expected = template.render(data).unwrap();
    assert_eq!(client.apply(&update).unwrap(), expected);
    update
}

#[test]
fn test_identical_renders_yield_empty_tree() {
    let differ = TreeDiffer::default();
    let template = todo_template();
    let data = json!({"Title": "Today", "Items": [{"Text": "a", "Done": false}]});

    let first = differ.diff("todos", &template, &data).unwrap();
    let second = differ.diff("todos", &template, &data).unwrap();
    assert!(!first.is_empty());
    assert!(second.is_empty());
    assert_eq!(serde_json::to_string(&second).unwrap(), "{}");
}

#[test_case(json!({"Title": "A", "Items": []}), json!({"Title": "B", "Items": []}) ; "title only")]
#[test_case(json!({"Title": "A", "Items": []}), json!({"Title": "A", "Items": [{"Text": "x", "Done": true}]}) ; "empty to list")]
#[test_case(json!({"Title": "A", "Items": [{"Text": "x", "Done": true}]}), json!({"Title": "A", "Items": [{"Text": "x", "Done": false}, {"Text": "y", "Done": true}]}) ; "toggle and append")]
#[test_case(json!({"Title": "A", "Owner": {"Name": "Ada"}}), json!({"Title": "A"}) ; "with block disappears")]
fn test_transition_round_trips(before: Value, after: Value) {
    let differ = TreeDiffer::default();
    let mut client = TreeClient::new("todos");
    let template = todo_template();

    assert!(step(&differ, &mut client, &template, &before).contains_statics());
    let update = step(&differ, &mut client, &template, &after);
    assert!(update.statics.is_none(), "root statics must not be resent");
}

#[test]
fn test_wire_has_no_dynamics_wrapper() {
    let differ = TreeDiffer::default();
    let template = Template::parse("greet", "<p>Hello {{.Name}}</p>").unwrap();
    let wire = serde_json::to_value(differ.diff("greet", &template, &json!({"Name": "Ada"})).unwrap()).unwrap();
    assert_eq!(wire["s"], json!(["<p>Hello ", "</p>"]));
    assert_eq!(wire["0"], json!("Ada"));
    assert!(wire["h"].is_string());
    assert!(wire.get("dynamics").is_none());

    let next = serde_json::to_value(differ.diff("greet", &template, &json!({"Name": "Bo"})).unwrap()).unwrap();
    let hash = wire["h"].clone();
    assert_eq!(next, json!({"h": hash, "0": "Bo"}));
}

#[test]
fn test_updates_survive_serialization() {
    let differ = TreeDiffer::default();
    let mut client = TreeClient::new("todos");
    let template = todo_template();
    for data in [
        json!({"Title": "A", "Items": [{"Text": "x", "Done": true}]}),
        json!({"Title": "A", "Items": []}),
        json!({"Title": "B", "Items": [{"Text": "y", "Done": false}]}),
    ] {
        let update = differ.diff("todos", &template, &data).unwrap();
        let decoded: Tree = serde_json::from_str(&serde_json::to_string(&update).unwrap()).unwrap();
        assert_eq!(client.apply(&decoded).unwrap(), template.render(&data).unwrap());
    }
}

#[test]
fn test_fragments_in_parallel() {
    let differ = Arc::new(TreeDiffer::default());
    let template = Arc::new(todo_template());

    thread::scope(|scope| {
        for worker in 0..6 {
            let differ = Arc::clone(&differ);
            let template = Arc::clone(&template);
            scope.spawn(move || {
                let id = format!("todos-{worker}");
                let mut client = TreeClient::new(id.clone());
                for round in 0..20 {
                    let data = json!({"Title": format!("{worker}-{round}"), "Items": []});
                    let update = differ.diff(&id, &template, &data).unwrap();
                    assert_eq!(client.apply(&update).unwrap(), template.render(&data).unwrap());
                }
            });
        }
    });

    assert_eq!(differ.fragment_count(), 6);
}

fn item() -> impl Strategy<Value = Value> {
    ("[a-z<&]{0,5}", any::<bool>()).prop_map(|(text, done)| json!({"Text": text, "Done": done}))
}

fn state() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z ]{0,8}",
        prop::collection::vec(item(), 0..4),
        prop::option::of("[a-z]{1,5}"),
    )
        .prop_map(|(title, items, owner)| {
            let mut data = json!({"Title": title, "Items": items});
            if let Some(name) = owner {
                data["Owner"] = json!({"Name": name});
            }
            data
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tree_sequence_matches_renderer(states in prop::collection::vec(state(), 1..6)) {
        let differ = TreeDiffer::default();
        let mut client = TreeClient::new("todos");
        let template = todo_template();

        for (i, data) in states.iter().enumerate() {
            let update = differ.diff("todos", &template, data).unwrap();
            prop_assert!(update.slots_interleave());
            if i > 0 {
                prop_assert!(update.statics.is_none());
            }
            let html = client.apply(&update).unwrap().to_string();
            prop_assert_eq!(html, template.render(data).unwrap());
        }
    }
}
