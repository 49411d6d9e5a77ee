mod helpers;

use helpers::{test_engine, user};
use scoped_memory::memory::MemoryBackend;
use serde_json::Value;

fn memories(value: &Value) -> Vec<String> {
    value["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["memory"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn add_then_list_for_one_user() {
    let engine = test_engine();
    let alice = user("alice");

    let added = engine.add("prefers tea", &alice).unwrap();
    assert_eq!(added["results"][0]["event"], "ADD");
    assert_eq!(added["results"][0]["memory"], "prefers tea");

    engine.add("lives in oslo", &alice).unwrap();

    let listed = engine.get_all(&alice).unwrap();
    let mut texts = memories(&listed);
    texts.sort();
    assert_eq!(texts, vec!["lives in oslo", "prefers tea"]);
    assert!(listed["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["user_id"] == "alice"));
}

#[test]
fn users_never_see_each_others_memories() {
    let engine = test_engine();
    let (alice, bob) = (user("alice"), user("bob"));

    engine.add("prefers tea", &alice).unwrap();
    engine.add("owns a dog", &bob).unwrap();

    assert_eq!(memories(&engine.get_all(&alice).unwrap()), vec!["prefers tea"]);
    assert_eq!(memories(&engine.get_all(&bob).unwrap()), vec!["owns a dog"]);

    let found = engine.search("dog", &alice, 10).unwrap();
    assert_eq!(memories(&found), vec!["prefers tea"]);
}

#[test]
fn duplicate_text_updates_instead_of_inserting() {
    let engine = test_engine();
    let alice = user("alice");

    let first = engine.add("prefers tea", &alice).unwrap();
    let second = engine.add("Prefers tea!", &alice).unwrap();

    assert_eq!(second["results"][0]["event"], "UPDATE");
    assert_eq!(second["results"][0]["id"], first["results"][0]["id"]);
    assert_eq!(memories(&engine.get_all(&alice).unwrap()), vec!["Prefers tea!"]);
}

#[test]
fn dedup_does_not_cross_users() {
    let engine = test_engine();

    engine.add("prefers tea", &user("alice")).unwrap();
    let bob = engine.add("prefers tea", &user("bob")).unwrap();

    assert_eq!(bob["results"][0]["event"], "ADD");
    assert_eq!(memories(&engine.get_all(&user("alice")).unwrap()).len(), 1);
}

#[test]
fn search_ranks_by_similarity_and_respects_limit() {
    let engine = test_engine();
    let alice = user("alice");

    engine.add("prefers tea", &alice).unwrap();
    engine.add("lives in oslo", &alice).unwrap();
    engine.add("owns a cat", &alice).unwrap();

    let top = engine.search("what tea", &alice, 1).unwrap();
    assert_eq!(memories(&top), vec!["prefers tea"]);
    let score = top["results"][0]["score"].as_f64().unwrap();
    assert!(score > 0.99, "score {score}");

    let all = engine.search("what tea", &alice, 10).unwrap();
    assert_eq!(memories(&all).len(), 3);
    assert!(engine.search("tea", &alice, 0).unwrap()["results"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn delete_all_only_removes_that_user() {
    let engine = test_engine();
    let (alice, bob) = (user("alice"), user("bob"));

    engine.add("prefers tea", &alice).unwrap();
    engine.add("lives in paris", &alice).unwrap();
    engine.add("owns a dog", &bob).unwrap();

    let deleted = engine.delete_all(&alice).unwrap();
    assert_eq!(deleted["deleted"], 2);

    assert!(memories(&engine.get_all(&alice).unwrap()).is_empty());
    assert_eq!(memories(&engine.get_all(&bob).unwrap()), vec!["owns a dog"]);
}

#[test]
fn close_checkpoints_without_error() {
    let engine = test_engine();
    engine.add("prefers coffee", &user("alice")).unwrap();
    engine.close().unwrap();
}
