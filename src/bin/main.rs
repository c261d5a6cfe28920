use avl_suggest::{NumberTree, Rotation, WordTree};

fn print_rotations<K: std::fmt::Debug>(label: &str, rotations: &[Rotation<K>]) {
    for r in rotations {
        println!("  {label}: {:?} rotation at {:?}, {:?} rises", r.kind, r.pivot, r.new_root);
    }
}

fn main() {
    let mut tree = NumberTree::new();

    for key in [10, 20, 30, 40, 50, 25] {
        let rotations = tree.insert(key).unwrap();
        tree.assert_invariants();
        println!("{:?}", tree.iter().map(|node| *node.key()).collect::<Vec<_>>());
        print_rotations("insert", &rotations);
    }

    for key in [10, 20] {
        let rotations = tree.remove(key).unwrap();
        tree.assert_invariants();
        println!("{:?}", tree.iter().map(|node| *node.key()).collect::<Vec<_>>());
        print_rotations("remove", &rotations);
    }

    println!("{:?}", tree.stats());

    let mut words = WordTree::new();
    for word in ["Google", "Golf", "Gorilla", "Apple"] {
        words.insert(word.to_string()).unwrap();
    }

    let found: Vec<_> = words.suggest("go", 10).into_iter().map(|s| s.display).collect();
    println!("go -> {found:?}");

    drop(tree);
}
