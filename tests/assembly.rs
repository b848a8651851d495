//! End-to-end message assembly
//!
//! Three behaviors are fixed here on purpose:
//! - a visitor returning `false` prunes only its own branch, and running out
//!   of budget is the only thing that stops the whole walk
//! - truncation counts tokens and keeps the tail of the note
//! - the `SYSTEM PROMPT` marker only applies to root notes
//!
//! Run with: `cargo test --test assembly`

mod common;

use canvas_chat::{
    AssemblyOptions, Canvas, CanvasNode, ContentResolver, Message, MessageAssembler, NodeId, Role,
};
use common::{chain, diamond, random_dag, CountingResolver, FailingResolver};
use std::collections::HashSet;
use std::sync::Arc;

const SYSTEM: &str = "sys";

fn options() -> AssemblyOptions {
    AssemblyOptions {
        system_prompt: SYSTEM.to_string(),
        ..Default::default()
    }
}

async fn assemble_with(
    resolver: Arc<dyn ContentResolver>,
    options: AssemblyOptions,
    canvas: &Canvas,
    start: &str,
) -> Vec<Message> {
    MessageAssembler::new(resolver, options)
        .assemble(canvas, &NodeId::from(start))
        .await
        .messages
}

fn contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn chain_is_oldest_first_after_system() {
    let canvas = chain(&["A", "B", "C", "D"]);
    let messages = assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "D").await;

    assert_eq!(contents(&messages), vec![SYSTEM, "A", "B", "C", "D"]);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[1..].iter().all(|m| m.role == Role::User));
}

#[tokio::test]
async fn diamond_ancestor_appears_once() {
    let canvas = diamond();
    let resolver = Arc::new(CountingResolver::new());
    let messages = assemble_with(resolver.clone(), options(), &canvas, "LEAF").await;

    // BFS visits LEAF, L, R, ROOT; output is that order reversed
    assert_eq!(contents(&messages), vec![SYSTEM, "root", "right", "left", "leaf"]);

    let calls = resolver.calls();
    let unique: HashSet<_> = calls.iter().collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(unique.len(), 4);
}

#[tokio::test]
async fn assistant_notes_keep_their_role() {
    let mut canvas = Canvas::new("roles");
    let q = canvas.add_node(CanvasNode::text("question").with_id("q"));
    let a = canvas.add_node(CanvasNode::text("answer").with_id("a").as_assistant());
    let f = canvas.add_node(CanvasNode::text("follow-up").with_id("f"));
    canvas.connect(&q, &a);
    canvas.connect(&a, &f);

    let messages = assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "f").await;
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
}

// ============================================================================
// Budget
// ============================================================================

#[tokio::test]
async fn overflowing_ancestor_is_cut_and_deeper_ones_dropped() {
    // Each note is 30 chars = 10 units; the system prompt costs 1
    let mut canvas = Canvas::new("budget");
    let ids = ["A", "B", "C", "D"];
    for (i, id) in ids.iter().enumerate() {
        let text = id.to_lowercase().repeat(30);
        canvas.add_node(CanvasNode::text(text).with_id(*id).at(0.0, i as f64));
    }
    for pair in ids.windows(2) {
        canvas.connect(&NodeId::from(pair[0]), &NodeId::from(pair[1]));
    }

    let budget = 26;
    let assembler = MessageAssembler::new(
        Arc::new(CountingResolver::new()),
        AssemblyOptions {
            token_budget: budget,
            ..options()
        },
    );
    let assembly = assembler.assemble(&canvas, &NodeId::from("D")).await;

    assert!(assembly.truncated);
    assert!(assembly.budget_used <= budget);
    let texts = contents(&assembly.messages);
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[0], SYSTEM);
    // B keeps its last 15 chars (5 units); A never appears
    assert_eq!(texts[1], "b".repeat(15));
    assert_eq!(texts[2], "c".repeat(30));
    assert_eq!(texts[3], "d".repeat(30));
    assert!(!texts.iter().any(|t| t.contains('a')));
}

#[tokio::test]
async fn exhausted_budget_stops_sibling_branches_too() {
    let mut canvas = diamond();
    canvas.nodes.get_mut(&NodeId::from("L")).unwrap().content = canvas_chat::NodeContent::Text {
        text: "x".repeat(300),
    };

    let assembler = MessageAssembler::new(
        Arc::new(CountingResolver::new()),
        AssemblyOptions {
            token_budget: 20,
            ..options()
        },
    );
    let assembly = assembler.assemble(&canvas, &NodeId::from("LEAF")).await;

    let texts = contents(&assembly.messages);
    assert!(assembly.truncated);
    assert!(!texts.contains(&"right"));
    assert!(!texts.contains(&"root"));
    assert_eq!(texts.last(), Some(&"leaf"));
}

// ============================================================================
// System prompt marker
// ============================================================================

#[tokio::test]
async fn root_marker_replaces_system_prompt() {
    let mut canvas = Canvas::new("marker");
    let root = canvas.add_node(CanvasNode::text("SYSTEM PROMPT\nBe terse.").with_id("root"));
    let question = canvas.add_node(CanvasNode::text("question").with_id("q"));
    canvas.connect(&root, &question);

    let assembler = MessageAssembler::new(Arc::new(CountingResolver::new()), options());
    let assembly = assembler.assemble(&canvas, &question).await;

    assert_eq!(
        assembly.messages,
        vec![
            Message {
                role: Role::System,
                content: "Be terse.".to_string()
            },
            Message {
                role: Role::User,
                content: "question".to_string()
            },
        ]
    );
    assert_eq!(assembly.system_override, Some(root));
}

#[tokio::test]
async fn interior_marker_is_ordinary_text() {
    let mut canvas = Canvas::new("marker");
    let root = canvas.add_node(CanvasNode::text("hi").with_id("root"));
    let mid = canvas.add_node(CanvasNode::text("SYSTEM PROMPT\nFoo").with_id("mid"));
    let leaf = canvas.add_node(CanvasNode::text("leaf").with_id("leaf"));
    canvas.connect(&root, &mid);
    canvas.connect(&mid, &leaf);

    let messages =
        assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "leaf").await;

    assert_eq!(contents(&messages), vec![SYSTEM, "hi", "SYSTEM PROMPT\nFoo", "leaf"]);
    assert_eq!(messages[2].role, Role::User);
}

#[tokio::test]
async fn first_marker_root_in_walk_order_wins() {
    let mut canvas = Canvas::new("marker");
    let first =
        canvas.add_node(CanvasNode::text("SYSTEM PROMPT\nfirst").with_id("r1").at(0.0, 0.0));
    let second =
        canvas.add_node(CanvasNode::text("SYSTEM PROMPT\nsecond").with_id("r2").at(100.0, 0.0));
    let question = canvas.add_node(CanvasNode::text("q").with_id("q").at(50.0, 100.0));
    canvas.connect(&second, &question);
    canvas.connect(&first, &question);

    let assembler = MessageAssembler::new(Arc::new(CountingResolver::new()), options());
    let assembly = assembler.assemble(&canvas, &question).await;

    let pairs: Vec<(Role, &str)> =
        assembly.messages.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(pairs, vec![(Role::System, "first"), (Role::User, "q")]);
    assert_eq!(assembly.system_override, Some(first));
}

#[tokio::test]
async fn bare_marker_root_suppresses_system_message() {
    let mut canvas = Canvas::new("marker");
    let root = canvas.add_node(CanvasNode::text("SYSTEM PROMPT").with_id("root"));
    let question = canvas.add_node(CanvasNode::text("q").with_id("q"));
    canvas.connect(&root, &question);

    let messages = assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "q").await;

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "q");
    assert!(!contents(&messages).contains(&SYSTEM));
}

#[tokio::test]
async fn system_prompt_over_budget_yields_empty_assembly() {
    let mut canvas = Canvas::new("tight");
    let question = canvas.add_node(CanvasNode::text("q").with_id("q"));

    let assembler = MessageAssembler::new(
        Arc::new(CountingResolver::new()),
        AssemblyOptions {
            token_budget: 2,
            system_prompt: "p".repeat(30),
            ..Default::default()
        },
    );
    let assembly = assembler.assemble(&canvas, &question).await;

    assert!(assembly.is_empty());
    assert_eq!(assembly.budget_used, 0);
}

#[tokio::test]
async fn marker_root_beyond_budget_cut_still_sets_system_prompt() {
    // r is two levels above the cut at a; the discovery pass still finds it
    let mut canvas = Canvas::new("cut");
    let r = canvas.add_node(CanvasNode::text("SYSTEM PROMPT\nBe terse.").with_id("r"));
    let a = canvas.add_node(CanvasNode::text("x".repeat(300)).with_id("a"));
    let b = canvas.add_node(CanvasNode::text("b").with_id("b"));
    canvas.connect(&r, &a);
    canvas.connect(&a, &b);

    let resolver = Arc::new(CountingResolver::new());
    let assembler = MessageAssembler::new(
        resolver.clone(),
        AssemblyOptions {
            token_budget: 10,
            ..options()
        },
    );
    let assembly = assembler.assemble(&canvas, &b).await;

    // "Be terse." costs 3, "b" costs 1, a keeps its last 18 chars (6 units)
    let pairs: Vec<(Role, &str)> =
        assembly.messages.iter().map(|m| (m.role, m.content.as_str())).collect();
    let tail = "x".repeat(18);
    assert_eq!(
        pairs,
        vec![(Role::System, "Be terse."), (Role::User, tail.as_str()), (Role::User, "b")]
    );
    assert!(assembly.truncated);
    assert_eq!(assembly.budget_used, 10);
    assert_eq!(assembly.system_override, Some(r.clone()));
    assert_eq!(resolver.calls(), vec![r, b, a]);
}

// ============================================================================
// Blank and failing notes
// ============================================================================

#[tokio::test]
async fn all_blank_yields_no_messages() {
    let mut canvas = Canvas::new("blank");
    let a = canvas.add_node(CanvasNode::text("   ").with_id("a"));
    let b = canvas.add_node(CanvasNode::text("\n\t").with_id("b"));
    canvas.connect(&a, &b);

    let messages = assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "b").await;
    assert!(messages.is_empty());
}

#[tokio::test]
async fn blank_notes_are_skipped_but_walked_through() {
    let mut canvas = chain(&["A", "B", "C"]);
    canvas.nodes.get_mut(&NodeId::from("B")).unwrap().content =
        canvas_chat::NodeContent::Text { text: String::new() };

    let messages = assemble_with(Arc::new(CountingResolver::new()), options(), &canvas, "C").await;
    assert_eq!(contents(&messages), vec![SYSTEM, "A", "C"]);
}

#[tokio::test]
async fn resolver_failure_is_not_fatal() {
    let canvas = chain(&["A", "B", "C"]);
    let resolver = Arc::new(FailingResolver::new(["B"]));
    let messages = assemble_with(resolver, options(), &canvas, "C").await;

    assert_eq!(contents(&messages), vec![SYSTEM, "A", "C"]);
}

// ============================================================================
// Depth and resolver calls
// ============================================================================

#[tokio::test]
async fn depth_two_resolves_exactly_three_notes() {
    let canvas = chain(&["n1", "n2", "n3", "n4", "n5"]);
    let resolver = Arc::new(CountingResolver::new());
    let messages = assemble_with(
        resolver.clone(),
        AssemblyOptions {
            max_depth: 2,
            ..options()
        },
        &canvas,
        "n5",
    )
    .await;

    assert_eq!(contents(&messages), vec![SYSTEM, "n3", "n4", "n5"]);
    assert_eq!(resolver.call_count(), 3);
    assert!(!resolver.was_queried("n1"));
    assert!(!resolver.was_queried("n2"));
}

#[tokio::test]
async fn random_dags_resolve_each_note_at_most_once() {
    for seed in 0..20 {
        let canvas = random_dag(30, 0.15, seed);
        let resolver = Arc::new(CountingResolver::new());
        let messages = assemble_with(resolver.clone(), options(), &canvas, "n29").await;

        let calls = resolver.calls();
        let unique: HashSet<_> = calls.iter().collect();
        assert_eq!(calls.len(), unique.len(), "seed {} resolved a note twice", seed);

        let texts: Vec<&str> = contents(&messages).into_iter().skip(1).collect();
        let distinct: HashSet<_> = texts.iter().collect();
        assert_eq!(texts.len(), distinct.len(), "seed {} repeated a message", seed);
        assert_eq!(texts.last(), Some(&"note 29"));
    }
}
