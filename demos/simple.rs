//! Simple standalone example of LSEQ CRDT usage.
//!
//! This example demonstrates the basic functionality of the engine
//! in a simple, easy-to-understand scenario.
//!
//! Run with: cargo run --example simple

use crdt_lseq::{Lseq, LseqOptions};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Simple LSEQ CRDT Example ===\n");

    // Create two replicas representing two users. Seeds make the run
    // reproducible; real hosts would omit them.
    let mut alice = Lseq::with_options(LseqOptions {
        seed: Some(1),
        ..LseqOptions::new(1)
    });
    let mut bob = Lseq::with_options(LseqOptions {
        seed: Some(2),
        ..LseqOptions::new(2)
    });

    println!("Alice (site 1) and Bob (site 2) start editing a document\n");

    // Alice types "Hello"
    println!("Alice types 'Hello':");
    let mut alice_ops = Vec::new();
    for (i, ch) in "Hello".chars().enumerate() {
        alice_ops.push(alice.handle_local_insert(i, ch).unwrap());
    }
    println!("  Alice's document: '{}'", alice.text());

    // Bob concurrently types "World!" from the beginning of his empty copy
    println!("\nBob concurrently types 'World!':");
    let mut bob_ops = Vec::new();
    for (i, ch) in "World!".chars().enumerate() {
        bob_ops.push(bob.handle_local_insert(i, ch).unwrap());
    }
    println!("  Bob's document: '{}'", bob.text());

    println!("\n--- Before Synchronization ---");
    println!("  Alice sees: '{}'", alice.text());
    println!("  Bob sees:   '{}'", bob.text());

    // Synchronize: each side receives the other's broadcast elements
    println!("\n--- Synchronizing Changes ---");
    for op in bob_ops {
        alice.handle_remote_insert(op);
    }
    for op in alice_ops {
        bob.handle_remote_insert(op);
    }

    println!("  Alice sees: '{}'", alice.text());
    println!("  Bob sees:   '{}'", bob.text());
    assert_eq!(alice.text(), bob.text());

    // Alice deletes the first character; Bob applies the same delete
    println!("\nAlice deletes the first character:");
    let deleted = alice.handle_local_delete(0).unwrap();
    bob.handle_remote_delete(deleted);

    println!("  Alice sees: '{}'", alice.text());
    println!("  Bob sees:   '{}'", bob.text());
    assert_eq!(alice.text(), bob.text());

    println!("\nBoth replicas converged without any coordination.");
}
