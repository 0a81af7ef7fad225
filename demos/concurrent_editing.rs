//! Concurrent editing example for the LSEQ CRDT.
//!
//! This example walks through the delivery-order hazards the engine is built
//! to absorb: operations arriving reversed, duplicated, and deletes arriving
//! before the insert they target.
//!
//! Run with: cargo run --example concurrent_editing

use crdt_lseq::{Lseq, LseqOptions, RemoteOp};

fn replica(site_id: u64) -> Lseq {
    Lseq::with_options(LseqOptions {
        seed: Some(site_id),
        ..LseqOptions::new(site_id)
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Concurrent Editing Example ===\n");

    // One writer produces a small edit history.
    let mut writer = replica(1);
    let mut ops = Vec::new();
    for (i, ch) in "shared".chars().enumerate() {
        ops.push(RemoteOp::Insert {
            char: writer.handle_local_insert(i, ch).unwrap(),
        });
    }
    ops.push(RemoteOp::Delete {
        char: writer.handle_local_delete(0).unwrap(),
    });
    println!("Writer's document: '{}'", writer.text());

    // Reader A gets the operations in order.
    let mut in_order = replica(2);
    for op in &ops {
        in_order.apply_remote(op.clone());
    }
    println!("Reader (in order):        '{}'", in_order.text());

    // Reader B gets them fully reversed: the delete arrives first and waits
    // in the deletion buffer until its insert shows up.
    let mut reversed = replica(3);
    for op in ops.iter().rev() {
        reversed.apply_remote(op.clone());
    }
    println!("Reader (reversed order):  '{}'", reversed.text());

    // Reader C additionally sees every operation twice.
    let mut duplicated = replica(4);
    for op in ops.iter().rev().chain(ops.iter()) {
        duplicated.apply_remote(op.clone());
    }
    println!("Reader (with duplicates): '{}'", duplicated.text());

    assert_eq!(writer.text(), in_order.text());
    assert_eq!(writer.text(), reversed.text());
    assert_eq!(writer.text(), duplicated.text());

    // Concurrent insertion at the same spot from two sites.
    println!("\n--- Concurrent insertion between neighbors ---");
    let mut alice = replica(5);
    let a = alice.handle_local_insert(0, 'a').unwrap();
    let b = alice.handle_local_insert(1, 'b').unwrap();

    let mut bob = replica(6);
    bob.handle_remote_insert(a.clone());
    bob.handle_remote_insert(b.clone());
    let x = bob.handle_local_insert(1, 'X').unwrap();

    alice.handle_remote_insert(x);
    println!("Alice after Bob's concurrent insert: '{}'", alice.text());
    assert_eq!(alice.text(), "aXb");
    assert_eq!(alice.text(), bob.text());

    println!("\nAll replicas converged regardless of delivery order.");
}
