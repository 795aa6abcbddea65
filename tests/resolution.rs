use hornlite::{parse_query, solve, Answer, KnowledgeBase, Value};

fn family() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.consult(
        "% a small family tree\n\
         parent(tom, bob).\n\
         parent(tom, liz).\n\
         parent(bob, ann).\n\
         parent(bob, pat).\n\
         grandparent(X, Z) :- parent(X, Y), parent(Y, Z).\n",
    )
    .expect("knowledge base loads");
    kb
}

fn ask(kb: &KnowledgeBase, query: &str) -> (Answer, String) {
    let query = parse_query(query).expect("query parses");
    let mut out = Vec::new();
    let answer = solve(kb, &query, &mut out).expect("query evaluates");
    (answer, String::from_utf8(out).unwrap())
}

fn atom(text: &str) -> Option<Value> {
    Some(Value::Atom(text.into()))
}

#[test]
fn ground_facts_answer_yes_and_no() {
    let kb = family();
    assert_eq!(ask(&kb, "parent(tom, bob).").0, Answer::Yes(vec![]));
    assert_eq!(
        ask(&kb, "parent(liz, bob).").0,
        Answer::No { undefined: None }
    );
}

#[test]
fn free_variable_takes_the_first_matching_fact() {
    let kb = family();
    let (answer, _) = ask(&kb, "parent(tom, X).");
    assert_eq!(answer, Answer::Yes(vec![("X".to_string(), atom("bob"))]));
}

#[test]
fn rules_resolve_through_their_bodies() {
    let kb = family();
    let (answer, _) = ask(&kb, "grandparent(A, B).");
    assert_eq!(
        answer,
        Answer::Yes(vec![
            ("A".to_string(), atom("tom")),
            ("B".to_string(), atom("ann")),
        ])
    );
}

#[test]
fn queries_are_independent() {
    let kb = family();
    let (first, _) = ask(&kb, "parent(bob, X).");
    assert_eq!(first, Answer::Yes(vec![("X".to_string(), atom("ann"))]));

    // same query again: the previous binding left no residue anywhere
    let (second, _) = ask(&kb, "parent(bob, X).");
    assert_eq!(second, Answer::Yes(vec![("X".to_string(), atom("ann"))]));

    let (third, _) = ask(&kb, "parent(bob, pat).");
    assert_eq!(third, Answer::Yes(vec![]));
}

#[test]
fn undefined_predicates_are_reported_by_key() {
    let kb = family();
    let (answer, _) = ask(&kb, "sibling(ann, pat).");
    assert_eq!(
        answer,
        Answer::No { undefined: Some("sibling/2".to_string()) }
    );
}

#[test]
fn listing_round_trips_the_loaded_clauses() {
    let kb = family();
    let (answer, out) = ask(&kb, "listing().");
    assert_eq!(answer, Answer::Yes(vec![]));
    assert_eq!(
        out,
        "parent(tom, bob) :- 1.\n\
         parent(tom, liz) :- 1.\n\
         parent(bob, ann) :- 1.\n\
         parent(bob, pat) :- 1.\n\
         grandparent(X, Z) :- and(parent(X, Y), parent(Y, Z)).\n"
    );
}

#[test]
fn side_effects_interleave_with_resolution() {
    let kb = family();
    let (answer, out) = ask(&kb, "and(write(checking), and(nl(), parent(tom, bob))).");
    assert_eq!(answer, Answer::Yes(vec![]));
    assert_eq!(out, "checking\n");
}

#[test]
fn query_with_a_body_filters_its_head() {
    let kb = family();
    // body-first evaluation: the body binds X before the head is proved
    let (answer, _) = ask(&kb, "parent(tom, X) :- parent(tom, X).");
    assert_eq!(answer, Answer::Yes(vec![("X".to_string(), atom("bob"))]));
}
