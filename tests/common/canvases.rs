use canvas_chat::{Canvas, CanvasNode, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Linear chain `ids[0] -> ids[1] -> ...`, each note's text equal to its id
pub fn chain(ids: &[&str]) -> Canvas {
    let mut canvas = Canvas::new("chain");
    let mut previous: Option<NodeId> = None;
    for (i, id) in ids.iter().enumerate() {
        let node = canvas.add_node(CanvasNode::text(*id).with_id(*id).at(0.0, i as f64 * 100.0));
        if let Some(parent) = previous {
            canvas.connect(&parent, &node);
        }
        previous = Some(node);
    }
    canvas
}

/// ROOT feeds L and R, both of which feed LEAF
pub fn diamond() -> Canvas {
    let mut canvas = Canvas::new("diamond");
    let root = canvas.add_node(CanvasNode::text("root").with_id("ROOT").at(0.0, 0.0));
    let left = canvas.add_node(CanvasNode::text("left").with_id("L").at(-100.0, 100.0));
    let right = canvas.add_node(CanvasNode::text("right").with_id("R").at(100.0, 100.0));
    let leaf = canvas.add_node(CanvasNode::text("leaf").with_id("LEAF").at(0.0, 200.0));
    canvas.connect(&root, &left);
    canvas.connect(&root, &right);
    canvas.connect(&left, &leaf);
    canvas.connect(&right, &leaf);
    canvas
}

/// Random DAG over `n` notes named `n0..n{n-1}`; edges only run from a
/// lower index to a higher one
pub fn random_dag(n: usize, edge_chance: f64, seed: u64) -> Canvas {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut canvas = Canvas::new(format!("dag-{}", seed).as_str());
    let ids: Vec<NodeId> = (0..n)
        .map(|i| {
            let x = rng.gen_range(-500.0..500.0);
            let y = rng.gen_range(-500.0..500.0);
            let node = CanvasNode::text(format!("note {}", i)).with_id(format!("n{}", i));
            canvas.add_node(node.at(x, y))
        })
        .collect();
    for child in 1..n {
        for parent in 0..child {
            if rng.gen_bool(edge_chance) {
                canvas.connect(&ids[parent], &ids[child]);
            }
        }
    }
    canvas
}
